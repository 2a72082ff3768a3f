//! Record filtering.
//!
//! The application narrowing step: upstream records go through a
//! [`RecordFilter`] and only the survivors are rendered. Filtering never
//! mutates the input; it returns the indices (or references) of the records
//! that pass.

use chrono::{DateTime, Duration, Utc};

use crate::feature::{FeatureRecord, Severity, Status};

/// Declarative filter over feature records.
///
/// Empty criteria match everything. All non-empty criteria must match.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    /// Keep records started within this window before `now`
    window: Option<Duration>,
    /// Keep records started at or after this instant
    since: Option<DateTime<Utc>>,
    /// Keep records started at or before this instant
    until: Option<DateTime<Utc>>,
    severities: Vec<Severity>,
    statuses: Vec<Status>,
    /// Property equality constraints (`region`, `line`, ...)
    properties: Vec<(String, String)>,
    search: Option<String>,
}

impl RecordFilter {
    /// Filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep records whose start lies within `window` of the evaluation time.
    pub fn within(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Keep records started in `[since, until]`.
    pub fn between(mut self, since: DateTime<Utc>, until: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self.until = Some(until);
        self
    }

    /// Keep records of the given severity (may be called repeatedly).
    pub fn with_severity(mut self, severity: Severity) -> Self {
        if !self.severities.contains(&severity) {
            self.severities.push(severity);
        }
        self
    }

    /// Keep records with the given status (may be called repeatedly).
    pub fn with_status(mut self, status: Status) -> Self {
        if !self.statuses.contains(&status) {
            self.statuses.push(status);
        }
        self
    }

    /// Keep records whose string property `key` equals `value`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }

    /// Keep records whose id or name contains `text` (case-insensitive).
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        let text = text.into().trim().to_lowercase();
        self.search = if text.is_empty() { None } else { Some(text) };
        self
    }

    /// True if the record passes every criterion, evaluated at `now`.
    pub fn matches(&self, record: &FeatureRecord, now: DateTime<Utc>) -> bool {
        let time_bound = self.window.is_some() || self.since.is_some() || self.until.is_some();
        if time_bound {
            let Some(started) = record.started_at else {
                return false;
            };
            if let Some(window) = self.window {
                // A window reaching past the representable range has no lower bound
                let too_old = now
                    .checked_sub_signed(window)
                    .is_some_and(|lower| started < lower);
                if too_old || started > now {
                    return false;
                }
            }
            if self.since.is_some_and(|since| started < since) {
                return false;
            }
            if self.until.is_some_and(|until| started > until) {
                return false;
            }
        }

        if !self.severities.is_empty() && !self.severities.contains(&record.severity) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&record.status) {
            return false;
        }

        let properties_match = self
            .properties
            .iter()
            .all(|(key, value)| record.property_str(key) == Some(value.as_str()));
        if !properties_match {
            return false;
        }

        match &self.search {
            None => true,
            Some(text) => {
                record.id.to_lowercase().contains(text)
                    || record
                        .name()
                        .is_some_and(|name| name.to_lowercase().contains(text))
            }
        }
    }

    /// Indices of the records that pass, in input order.
    pub fn apply_indices(&self, records: &[FeatureRecord], now: DateTime<Utc>) -> Vec<usize> {
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| self.matches(record, now))
            .map(|(index, _)| index)
            .collect()
    }

    /// The records that pass, in input order.
    pub fn apply<'a>(
        &self,
        records: &'a [FeatureRecord],
        now: DateTime<Utc>,
    ) -> Vec<&'a FeatureRecord> {
        records
            .iter()
            .filter(|record| self.matches(record, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::LngLat;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn record(id: &str, severity: Severity, age_hours: i64) -> FeatureRecord {
        FeatureRecord::point(id, LngLat::new(-46.0, -23.0), severity, Status::Pending)
            .with_started_at(now() - Duration::hours(age_hours))
    }

    #[test]
    fn test_huge_window_has_no_lower_bound() {
        let old = FeatureRecord::point("old", LngLat::new(-46.0, -23.0), Severity::Low, Status::Pending)
            .with_started_at(Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap());
        let future = record("future", Severity::High, -1);
        let records = vec![record("a", Severity::High, 1), old, future];

        let filter = RecordFilter::new().within(Duration::days(100_000_000));
        assert_eq!(filter.apply_indices(&records, now()), vec![0, 1]);
    }

    #[test]
    fn test_window_keeps_recent_records() {
        let records = vec![
            record("a", Severity::High, 1),
            record("b", Severity::High, 30),
            record("c", Severity::Medium, 2),
        ];
        let filter = RecordFilter::new().within(Duration::hours(24));
        assert_eq!(filter.apply_indices(&records, now()), vec![0, 2]);
    }

    #[test]
    fn test_window_drops_untimed_records() {
        let untimed = FeatureRecord::point("u", LngLat::new(0.0, 0.0), Severity::Low, Status::Pending);
        let filter = RecordFilter::new().within(Duration::hours(24));
        assert!(!filter.matches(&untimed, now()));
        assert!(RecordFilter::new().matches(&untimed, now()));
    }

    #[test]
    fn test_severity_and_status() {
        let records = vec![
            record("a", Severity::High, 1),
            record("b", Severity::Low, 1),
            record("c", Severity::Medium, 1).with_property("unused", 1),
        ];
        let filter = RecordFilter::new()
            .with_severity(Severity::High)
            .with_severity(Severity::Medium);
        assert_eq!(filter.apply_indices(&records, now()), vec![0, 2]);

        let by_status = RecordFilter::new().with_status(Status::Critical);
        assert!(by_status.apply(&records, now()).is_empty());
    }

    #[test]
    fn test_property_and_search() {
        let records = vec![
            record("ev-100", Severity::Low, 1)
                .with_property("region", "Sul")
                .with_property("name", "Travessia BR-116"),
            record("ev-200", Severity::Low, 1).with_property("region", "Norte"),
        ];

        let by_region = RecordFilter::new().with_property("region", "Sul");
        assert_eq!(by_region.apply_indices(&records, now()), vec![0]);

        let by_name = RecordFilter::new().with_search("br-116");
        assert_eq!(by_name.apply_indices(&records, now()), vec![0]);

        let by_id = RecordFilter::new().with_search("EV-2");
        assert_eq!(by_id.apply_indices(&records, now()), vec![1]);

        let blank = RecordFilter::new().with_search("   ");
        assert_eq!(blank.apply_indices(&records, now()), vec![0, 1]);
    }

    #[test]
    fn test_between() {
        let records = vec![record("a", Severity::Low, 5), record("b", Severity::Low, 50)];
        let filter = RecordFilter::new().between(now() - Duration::hours(10), now());
        assert_eq!(filter.apply_indices(&records, now()), vec![0]);
    }
}
