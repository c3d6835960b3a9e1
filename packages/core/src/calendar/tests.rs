//! Cross-component tests for the calendar core
//!
//! Property-based tests for the digest partitioning, region filtering and
//! alert deduplication, plus engine tests against an in-memory feed.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use chrono_tz::Tz;
    use proptest::prelude::*;

    use crate::calendar::{
        clock::ManualClock,
        config::{AlertConfig, DigestConfig},
        digest::DigestBuilder,
        engine::CalendarEngine,
        normalizer::EventNormalizer,
        types::*,
        AlertScheduler,
    };
    use crate::services::mock_feed::{raw_row, MockFeed};

    const TZ: Tz = chrono_tz::Asia::Riyadh;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn local(h: u32, m: u32) -> DateTime<Utc> {
        TZ.with_ymd_and_hms(2026, 10, 16, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    fn engine_with(feed: Arc<MockFeed>, clock: Arc<ManualClock>) -> CalendarEngine {
        CalendarEngine::with_clock(
            feed,
            EventNormalizer::new("United States"),
            AlertConfig::default(),
            DigestConfig::default(),
            clock,
        )
    }

    // Events named by their input position, at arbitrary times of day.
    fn events_strategy() -> impl Strategy<Value = Vec<Event>> {
        prop::collection::vec((0u32..24, 0u32..60, prop::bool::ANY), 0..40).prop_map(|slots| {
            slots
                .into_iter()
                .enumerate()
                .map(|(i, (h, m, strong))| {
                    let impact = if strong { Impact::Strong } else { Impact::Moderate };
                    Event::new(format!("{:02}:{:02}", h, m), format!("event-{}", i), impact)
                })
                .collect()
        })
    }

    fn region_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["United States", "united states", "Germany", "Japan"])
    }

    fn impact_strategy() -> impl Strategy<Value = &'static str> {
        prop::sample::select(vec!["High Volatility Expected", "medium", "Low Volatility Expected", ""])
    }

    // =============================================================================
    // PROPERTY TESTS - Digest partitioning
    // =============================================================================

    proptest! {
        #[test]
        fn prop_digest_preserves_every_event_in_stable_time_order(
            events in events_strategy(),
            max_messages in 1usize..6,
        ) {
            let builder = DigestBuilder::new(DigestConfig {
                max_messages,
                ..DigestConfig::default()
            });

            match builder.build(&events, day()) {
                None => prop_assert!(events.is_empty()),
                Some(digest) => {
                    let mut expected = events.clone();
                    expected.sort_by(|a, b| a.time_of_day.cmp(&b.time_of_day));

                    let actual: Vec<Event> = digest
                        .messages
                        .iter()
                        .flat_map(|m| m.events.iter().map(|s| s.event.clone()))
                        .collect();

                    prop_assert_eq!(actual, expected);
                }
            }
        }

        #[test]
        fn prop_digest_never_exceeds_message_cap(
            events in events_strategy(),
            max_messages in 1usize..6,
        ) {
            let builder = DigestBuilder::new(DigestConfig {
                max_messages,
                ..DigestConfig::default()
            });

            if let Some(digest) = builder.build(&events, day()) {
                let chunk_size = events.len().div_ceil(max_messages);

                prop_assert!(digest.messages.len() <= max_messages);
                prop_assert!(digest.messages.iter().all(|m| !m.events.is_empty()));
                prop_assert!(digest.messages.iter().all(|m| m.events.len() <= chunk_size));
                // every message except the last is full
                for message in &digest.messages[..digest.messages.len() - 1] {
                    prop_assert_eq!(message.events.len(), chunk_size);
                }
            }
        }
    }

    // =============================================================================
    // PROPERTY TESTS - Normalization
    // =============================================================================

    proptest! {
        #[test]
        fn prop_normalizer_keeps_only_target_region_notable_rows(
            cells in prop::collection::vec((region_strategy(), impact_strategy()), 0..30),
        ) {
            let rows: Vec<RawRow> = cells
                .iter()
                .enumerate()
                .map(|(i, (region, impact))| raw_row(region, "12:00", &format!("row-{}", i), impact))
                .collect();

            let output = EventNormalizer::new("United States").normalize(&rows);

            let expected: Vec<String> = cells
                .iter()
                .enumerate()
                .filter(|(_, (region, impact))| {
                    region.eq_ignore_ascii_case("united states")
                        && (impact.starts_with("High") || *impact == "medium")
                })
                .map(|(i, _)| format!("row-{}", i))
                .collect();
            let titles: Vec<String> = output.events.iter().map(|e| e.title.clone()).collect();

            prop_assert_eq!(titles, expected);
            prop_assert_eq!(output.stats.total, rows.len());
            prop_assert_eq!(output.stats.retained, output.events.len());
            prop_assert!(output.stats.retained <= output.stats.in_region);
        }

        #[test]
        fn prop_engine_load_matches_direct_normalization(
            cells in prop::collection::vec((region_strategy(), impact_strategy()), 0..30),
        ) {
            let rows: Vec<RawRow> = cells
                .iter()
                .enumerate()
                .map(|(i, (region, impact))| raw_row(region, "12:00", &format!("row-{}", i), impact))
                .collect();
            let feed = Arc::new(MockFeed::new().with_rows(rows.clone()));
            let engine = engine_with(feed, Arc::new(ManualClock::new(local(9, 0))));

            let loaded = tokio_test::block_on(engine.load_events());
            let direct = EventNormalizer::new("United States").normalize(&rows);

            prop_assert!(loaded.fetched);
            prop_assert_eq!(loaded.events, direct.events);
            prop_assert_eq!(loaded.stats, direct.stats);
        }
    }

    // =============================================================================
    // PROPERTY TESTS - Alert deduplication
    // =============================================================================

    proptest! {
        #[test]
        fn prop_each_event_alerts_exactly_once_per_day(
            hour in 1u32..23,
            minute in 0u32..60,
            step_secs in 10i64..=120,
        ) {
            let clock = Arc::new(ManualClock::new(local(hour - 1, minute)));
            let mut scheduler = AlertScheduler::with_clock(AlertConfig::default(), clock.clone());
            let events = vec![Event::new(format!("{:02}:{:02}", hour, minute), "Payrolls", Impact::Strong)];

            let mut alerts = 0;
            // sweep two hours, a tick every step_secs
            for _ in 0..(7200 / step_secs) {
                alerts += scheduler.tick(&events).len();
                clock.advance(Duration::seconds(step_secs));
            }

            prop_assert_eq!(alerts, 1);
        }
    }

    // =============================================================================
    // UNIT TESTS - Calendar Engine
    // =============================================================================

    #[tokio::test]
    async fn test_engine_feed_failure_degrades_to_empty_cycle() {
        let feed = Arc::new(MockFeed::new().with_bad_status(503));
        let engine = engine_with(feed.clone(), Arc::new(ManualClock::new(local(9, 0))));

        let loaded = engine.load_events().await;

        assert!(!loaded.fetched);
        assert!(loaded.events.is_empty());
        assert_eq!(feed.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_engine_loads_and_reports_stats() {
        let feed = Arc::new(MockFeed::new().with_rows(vec![
            raw_row("United States", "15:30", "CPI m/m", "High Volatility Expected"),
            raw_row("United States", "16:00", "Redbook", "Low Volatility Expected"),
            raw_row("Germany", "09:00", "Ifo", "High Volatility Expected"),
            RawRow::default(),
        ]));
        let engine = engine_with(feed, Arc::new(ManualClock::new(local(9, 0))));

        let loaded = engine.load_events().await;

        assert!(loaded.fetched);
        assert_eq!(loaded.events.len(), 1);
        assert_eq!(
            loaded.stats,
            NormalizeStats {
                total: 4,
                in_region: 2,
                retained: 1,
                rejected: 1,
            }
        );
    }

    #[tokio::test]
    async fn test_engine_remembers_alerts_until_the_next_day() {
        let feed = Arc::new(MockFeed::new().with_rows(vec![raw_row(
            "United States",
            "15:30",
            "CPI m/m",
            "High Volatility Expected",
        )]));
        let clock = Arc::new(ManualClock::new(local(15, 15)));
        let engine = engine_with(feed, clock.clone());

        let events = engine.load_events().await.events;
        assert_eq!(engine.due_alerts(&events).await.len(), 1);
        assert_eq!(engine.alerted_count().await, 1);

        clock.advance(Duration::seconds(30));
        assert!(engine.due_alerts(&events).await.is_empty());

        // next day: yesterday's record is pruned and the event alerts again
        clock.set(local(15, 15) + Duration::days(1));
        assert_eq!(engine.due_alerts(&events).await.len(), 1);
        assert_eq!(engine.alerted_count().await, 1);
    }

    #[tokio::test]
    async fn test_engine_changed_title_is_a_new_event() {
        let feed = Arc::new(MockFeed::new().with_rows(vec![raw_row(
            "United States",
            "15:30",
            "CPI m/m",
            "high",
        )]));
        let clock = Arc::new(ManualClock::new(local(15, 15)));
        let engine = engine_with(feed.clone(), clock.clone());

        let first = engine.load_events().await.events;
        assert_eq!(engine.due_alerts(&first).await.len(), 1);

        feed.set_rows(vec![raw_row("United States", "15:30", "CPI m/m (revised)", "high")]);
        clock.advance(Duration::seconds(60));
        let second = engine.load_events().await.events;

        assert_eq!(engine.due_alerts(&second).await.len(), 1);
        assert_eq!(engine.alerted_count().await, 2);
    }

    #[tokio::test]
    async fn test_engine_digest_uses_clock_date() {
        let feed = Arc::new(MockFeed::new().with_rows(vec![
            raw_row("United States", "17:00", "Crude Oil Inventories", "medium"),
            raw_row("United States", "15:30", "CPI m/m", "high"),
        ]));
        let engine = engine_with(feed, Arc::new(ManualClock::new(local(0, 0))));

        let events = engine.load_events().await.events;
        let digest = engine.todays_digest(&events).unwrap();

        assert_eq!(digest.date, day());
        assert_eq!(digest.event_count(), 2);
        assert_eq!(digest.messages[0].events[0].event.title, "CPI m/m");
    }
}
