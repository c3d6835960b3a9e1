//! Event Normalizer
//!
//! Turns raw feed rows into [`Event`]s: keeps one region, keeps the two
//! impact tiers worth notifying about and fills missing cells with
//! [`UNSPECIFIED`]. A bad row is logged and skipped; it never loses the rest
//! of the feed.

use std::sync::Arc;

use crate::calendar::{
    classifier::{ImpactClassifier, KeywordClassifier},
    error::RowError,
    types::{Event, NormalizeOutput, RawRow, UNSPECIFIED},
};

pub struct EventNormalizer {
    target_region: String,
    classifier: Arc<dyn ImpactClassifier>,
}

impl EventNormalizer {
    /// Normalizer for `target_region` using the default keyword classifier.
    pub fn new(target_region: impl Into<String>) -> Self {
        Self::with_classifier(target_region, Arc::new(KeywordClassifier::default()))
    }

    pub fn with_classifier(
        target_region: impl Into<String>,
        classifier: Arc<dyn ImpactClassifier>,
    ) -> Self {
        Self {
            target_region: canonical_region(&target_region.into()),
            classifier,
        }
    }

    /// Normalize a whole listing, preserving input order.
    pub fn normalize(&self, rows: &[RawRow]) -> NormalizeOutput {
        let mut output = NormalizeOutput::default();
        output.stats.total = rows.len();

        for (index, row) in rows.iter().enumerate() {
            match self.normalize_row(index, row) {
                Ok(RowOutcome::Retained(event)) => {
                    output.stats.in_region += 1;
                    output.stats.retained += 1;
                    tracing::debug!(
                        "Retained event: {} | time: {} | impact: {}",
                        event.title,
                        event.time_of_day,
                        event.impact
                    );
                    output.events.push(event);
                }
                Ok(RowOutcome::BelowThreshold) => output.stats.in_region += 1,
                Ok(RowOutcome::OtherRegion) => {}
                Err(err) => {
                    output.stats.rejected += 1;
                    tracing::error!("Skipping feed row: {}", err);
                }
            }
        }

        tracing::info!(
            "Event stats: total: {}, in region: {}, retained: {}, rejected: {}",
            output.stats.total,
            output.stats.in_region,
            output.stats.retained,
            output.stats.rejected,
        );

        output
    }

    fn normalize_row(&self, index: usize, row: &RawRow) -> Result<RowOutcome, RowError> {
        if row.is_empty() {
            return Err(RowError::Empty { index });
        }

        let in_region = row
            .region
            .as_deref()
            .map(|region| canonical_region(region) == self.target_region)
            .unwrap_or(false);
        if !in_region {
            return Ok(RowOutcome::OtherRegion);
        }

        let impact = match self.classifier.classify(row.impact.as_deref().unwrap_or("")) {
            Some(impact) => impact,
            None => return Ok(RowOutcome::BelowThreshold),
        };

        Ok(RowOutcome::Retained(Event {
            time_of_day: cell_or_unspecified(row.time.as_deref()),
            title: cell_or_unspecified(row.title.as_deref()),
            impact,
        }))
    }
}

enum RowOutcome {
    Retained(Event),
    BelowThreshold,
    OtherRegion,
}

/// Region tags compare case-insensitively with `_` treated as a space, so
/// the markup token `United_States` matches `united states`.
fn canonical_region(raw: &str) -> String {
    raw.trim()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn cell_or_unspecified(cell: Option<&str>) -> String {
    match cell.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNSPECIFIED.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::types::Impact;

    fn row(region: &str, time: &str, title: &str, impact: &str) -> RawRow {
        RawRow {
            region: Some(region.to_string()),
            time: Some(time.to_string()),
            title: Some(title.to_string()),
            impact: Some(impact.to_string()),
        }
    }

    #[test]
    fn rows_from_other_regions_are_dropped() {
        let normalizer = EventNormalizer::new("United States");
        let rows = vec![
            row("Germany", "09:00", "German ZEW", "High Volatility Expected"),
            row("United_States", "15:30", "Nonfarm Payrolls", "High Volatility Expected"),
        ];

        let output = normalizer.normalize(&rows);

        assert_eq!(output.events.len(), 1);
        assert_eq!(output.events[0].title, "Nonfarm Payrolls");
        assert_eq!(output.stats.total, 2);
        assert_eq!(output.stats.in_region, 1);
    }

    #[test]
    fn region_matching_ignores_case_and_underscores() {
        let normalizer = EventNormalizer::new("united_states");
        let rows = vec![row("UNITED STATES", "15:30", "CPI", "high")];
        assert_eq!(normalizer.normalize(&rows).events.len(), 1);
    }

    #[test]
    fn low_impact_rows_are_dropped_but_counted_in_region() {
        let normalizer = EventNormalizer::new("United States");
        let rows = vec![
            row("United States", "15:30", "Crude Oil Inventories", "Low Volatility Expected"),
            row("United States", "16:00", "ISM Manufacturing PMI", "Medium Volatility Expected"),
        ];

        let output = normalizer.normalize(&rows);

        assert_eq!(output.events, vec![Event::new("16:00", "ISM Manufacturing PMI", Impact::Moderate)]);
        assert_eq!(output.stats.in_region, 2);
        assert_eq!(output.stats.retained, 1);
    }

    #[test]
    fn missing_cells_become_unspecified() {
        let normalizer = EventNormalizer::new("United States");
        let rows = vec![RawRow {
            region: Some("United States".to_string()),
            time: None,
            title: Some("   ".to_string()),
            impact: Some("High".to_string()),
        }];

        let output = normalizer.normalize(&rows);

        assert_eq!(output.events[0].time_of_day, UNSPECIFIED);
        assert_eq!(output.events[0].title, UNSPECIFIED);
    }

    #[test]
    fn malformed_row_does_not_lose_the_rest_of_the_feed() {
        let normalizer = EventNormalizer::new("United States");
        let mut rows: Vec<RawRow> = (0..10)
            .map(|i| row("United States", &format!("1{}:00", i), &format!("Event {}", i), "High"))
            .collect();
        rows[4].title = None;
        rows.insert(7, RawRow::default());

        let output = normalizer.normalize(&rows);

        assert_eq!(output.events.len(), 10);
        assert_eq!(output.events[4].title, UNSPECIFIED);
        assert_eq!(output.stats.rejected, 1);
    }

    #[test]
    fn output_preserves_input_order() {
        let normalizer = EventNormalizer::new("United States");
        let rows = vec![
            row("United States", "18:00", "Late", "high"),
            row("United States", "08:00", "Early", "medium"),
        ];

        let titles: Vec<_> = normalizer
            .normalize(&rows)
            .events
            .into_iter()
            .map(|e| e.title)
            .collect();

        assert_eq!(titles, vec!["Late", "Early"]);
    }
}
