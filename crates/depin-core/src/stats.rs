//! Derived figures shown next to the views.

use serde::Serialize;

use depin_types::{HistoryEntry, HistoryStatus, Severity};

/// Accuracy is kept within this band while drifting.
pub const ACCURACY_BOUNDS: (f64, f64) = (90.0, 99.9);
/// Uptime is kept within this band while drifting.
pub const UPTIME_BOUNDS: (f64, f64) = (98.0, 100.0);

/// `part` as a percentage of `total`; zero when `total` is zero.
///
/// ```
/// use depin_core::stats::percentage;
///
/// assert_eq!(percentage(1, 4), 25.0);
/// assert_eq!(percentage(3, 0), 0.0);
/// ```
pub fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Apply `delta` to an accuracy figure and clamp it to [`ACCURACY_BOUNDS`].
pub fn drift_accuracy(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(ACCURACY_BOUNDS.0, ACCURACY_BOUNDS.1)
}

/// Apply `delta` to an uptime figure and clamp it to [`UPTIME_BOUNDS`].
pub fn drift_uptime(current: f64, delta: f64) -> f64 {
    (current + delta).clamp(UPTIME_BOUNDS.0, UPTIME_BOUNDS.1)
}

/// Number of results per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityCounts {
    pub fn from_severities(severities: impl IntoIterator<Item = Severity>) -> Self {
        let mut counts = Self::default();
        for s in severities {
            match s {
                Severity::Low => counts.low += 1,
                Severity::Medium => counts.medium += 1,
                Severity::High => counts.high += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}

/// Per-status breakdown of history entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub verified: usize,
    pub pending: usize,
    pub failed: usize,
}

impl HistorySummary {
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a HistoryEntry>) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            match entry.status {
                HistoryStatus::Verified => summary.verified += 1,
                HistoryStatus::Pending => summary.pending += 1,
                HistoryStatus::Failed => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.verified + self.pending + self.failed
    }

    pub fn count(&self, status: HistoryStatus) -> usize {
        match status {
            HistoryStatus::Verified => self.verified,
            HistoryStatus::Pending => self.pending,
            HistoryStatus::Failed => self.failed,
        }
    }

    /// Share of entries that are verified, in percent.
    pub fn verification_rate(&self) -> f64 {
        percentage(self.verified, self.total())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn entry(status: HistoryStatus) -> HistoryEntry {
        HistoryEntry {
            id: 0,
            device: "Sensor-01".into(),
            hash: "0x00".into(),
            value: "1.0°C".into(),
            timestamp: OffsetDateTime::UNIX_EPOCH,
            status,
        }
    }

    #[test]
    fn test_drift_clamps() {
        assert_eq!(drift_accuracy(99.85, 0.2), 99.9);
        assert_eq!(drift_accuracy(90.1, -0.2), 90.0);
        assert_eq!(drift_uptime(99.95, 0.1), 100.0);
        assert_eq!(drift_uptime(98.05, -0.1), 98.0);
        assert!((drift_uptime(99.0, 0.1) - 99.1).abs() < 1e-9);
    }

    #[test]
    fn test_history_summary() {
        let entries = [
            entry(HistoryStatus::Verified),
            entry(HistoryStatus::Verified),
            entry(HistoryStatus::Pending),
            entry(HistoryStatus::Failed),
        ];
        let summary = HistorySummary::from_entries(&entries);
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.count(HistoryStatus::Verified), 2);
        assert_eq!(summary.verification_rate(), 50.0);
        assert_eq!(HistorySummary::default().verification_rate(), 0.0);
    }

    #[test]
    fn test_severity_counts() {
        let counts =
            SeverityCounts::from_severities([Severity::High, Severity::Low, Severity::High]);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.total(), 3);
    }
}
