//! Message bodies sent to subscribers

use crate::calendar::types::Event;

pub const SEPARATOR: &str = "➖➖➖➖➖➖➖➖";

/// Body of the pre-event alert.
pub fn alert_message(event: &Event, lead_minutes: i64) -> String {
    format!(
        "🚨 Economic event in {} minutes 🚨\n\n⏰ Time: {}\n📊 Event: {}\n📈 Impact: {}\n",
        lead_minutes, event.time_of_day, event.title, event.impact
    )
}

/// Body of one digest message. `part`/`parts` are 1-based.
pub fn digest_message<'a>(
    region_label: &str,
    part: usize,
    parts: usize,
    events: impl IntoIterator<Item = &'a Event>,
) -> String {
    let mut body = if parts > 1 {
        format!("📅 Today's {} economic events ({}/{}):\n\n", region_label, part, parts)
    } else {
        format!("📅 Today's {} economic events:\n\n", region_label)
    };

    for event in events {
        body.push_str(&event_block(event));
    }
    body
}

/// One event block inside a digest message.
pub fn event_block(event: &Event) -> String {
    format!(
        "⏰ {}\n📊 {}\n📈 Impact: {}\n{}\n",
        event.time_of_day, event.title, event.impact, SEPARATOR
    )
}

/// Reply to the `/start` command.
pub fn welcome_message(lead_minutes: i64) -> String {
    format!(
        "✅ Economic alerts bot is running!\nYou will receive:\n- a daily summary of events\n- an alert {} minutes before each event\n",
        lead_minutes
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::types::Impact;

    #[test]
    fn alert_message_lists_time_title_and_impact() {
        let event = Event::new("15:30", "CPI m/m", Impact::Strong);
        let body = alert_message(&event, 15);

        assert!(body.contains("15 minutes"));
        assert!(body.contains("15:30"));
        assert!(body.contains("CPI m/m"));
        assert!(body.contains("Strong 🔴"));
    }

    #[test]
    fn digest_message_numbers_parts_only_when_split() {
        let events = [Event::new("15:30", "CPI", Impact::Moderate)];

        let single = digest_message("United States", 1, 1, events.iter());
        let split = digest_message("United States", 2, 3, events.iter());

        assert!(!single.contains("(1/1)"));
        assert!(split.contains("(2/3)"));
        assert_eq!(single.matches(SEPARATOR).count(), 1);
    }
}
