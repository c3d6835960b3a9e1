use clap::Parser;

/// Economic event notifier CLI arguments
#[derive(Debug, Parser)]
#[command(
    name = "econ-event-notifier",
    version,
    about = "Daily digests and 15-minute alerts for economic calendar events"
)]
pub struct Cli {
    /// IANA time zone of the calendar (overrides TIMEZONE)
    #[arg(long)]
    pub timezone: Option<String>,

    /// How bot commands are received: webhook or polling (overrides TRANSPORT)
    #[arg(long)]
    pub transport: Option<String>,

    /// Alert polling interval in seconds
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Local time of the daily digest, HH:MM
    #[arg(long)]
    pub digest_time: Option<String>,

    /// Region whose events are reported
    #[arg(long)]
    pub region: Option<String>,

    /// Log messages instead of sending them to Telegram
    #[arg(long)]
    pub dry_run: bool,

    /// Send today's digest once and exit
    #[arg(long)]
    pub digest_now: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from([
            "econ-event-notifier",
            "--timezone",
            "Asia/Riyadh",
            "--poll-interval",
            "30",
            "--dry-run",
        ]);

        assert_eq!(cli.timezone.as_deref(), Some("Asia/Riyadh"));
        assert_eq!(cli.poll_interval, Some(30));
        assert!(cli.dry_run);
        assert!(!cli.digest_now);
    }
}
