//! AI analysis view: recent detections, accuracy stats and model filter.

use std::time::Duration;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use depin_types::{AiStats, AnalysisResult, Severity};

use crate::bounded::BoundedList;
use crate::error::Result;
use crate::source::{DataSource, SourceKind};
use crate::stats::SeverityCounts;
use crate::view::View;

/// Maximum number of analysis results kept.
pub const ANALYSIS_CAP: usize = 15;

/// Model names the detector reports.
pub const MODELS: [&str; 5] = [
    "Isolation Forest",
    "LSTM Neural Network",
    "Random Forest",
    "Deep Learning",
    "Autoencoder",
];

/// What the source needs to produce the next analysis update.
#[derive(Debug, Clone, Default)]
pub struct AnalysisContext {
    pub stats: AiStats,
    /// Whether the view holds no results yet.
    pub empty: bool,
}

/// One analysis sync result.
#[derive(Debug, Clone)]
pub enum AnalysisUpdate {
    /// Replace the list with these newest-first results.
    Snapshot {
        stats: AiStats,
        results: Vec<AnalysisResult>,
    },
    /// Prepend one new detection.
    Detected {
        result: AnalysisResult,
        stats: AiStats,
    },
}

#[derive(Debug, Clone)]
pub struct AnalysisView {
    pub stats: AiStats,
    results: BoundedList<AnalysisResult>,
    /// `None` shows all models.
    model_filter: Option<String>,
    last_synced: Option<OffsetDateTime>,
}

impl Default for AnalysisView {
    fn default() -> Self {
        Self {
            stats: AiStats::default(),
            results: BoundedList::new(ANALYSIS_CAP),
            model_filter: None,
            last_synced: None,
        }
    }
}

impl AnalysisView {
    pub fn results(&self) -> &BoundedList<AnalysisResult> {
        &self.results
    }

    pub fn model_filter(&self) -> Option<&str> {
        self.model_filter.as_deref()
    }

    pub fn set_model_filter(&mut self, model: Option<String>) {
        self.model_filter = model;
    }

    /// Step the filter through "all" and then each known model.
    pub fn cycle_model_filter(&mut self) {
        let next = match self.model_filter.as_deref() {
            None => Some(0),
            Some(current) => MODELS
                .iter()
                .position(|m| *m == current)
                .and_then(|i| (i + 1 < MODELS.len()).then_some(i + 1)),
        };
        self.model_filter = next.map(|i| MODELS[i].to_string());
    }

    /// Results matching the model filter, newest first.
    pub fn filtered(&self) -> Vec<&AnalysisResult> {
        self.results
            .iter()
            .filter(|r| self.model_filter.as_deref().is_none_or(|m| r.model == m))
            .collect()
    }

    /// Severity breakdown of the kept results.
    pub fn severity_counts(&self) -> SeverityCounts {
        SeverityCounts::from_severities(self.results.iter().map(|r| r.severity))
    }

    /// Number of kept high-severity results.
    pub fn high_severity(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.severity == Severity::High)
            .count()
    }

    pub fn last_synced(&self) -> Option<OffsetDateTime> {
        self.last_synced
    }
}

impl View for AnalysisView {
    const NAME: &'static str = "analysis";
    type Context = AnalysisContext;
    type Update = AnalysisUpdate;

    fn default_interval(kind: SourceKind) -> Duration {
        match kind {
            SourceKind::Live => Duration::from_millis(3000),
            SourceKind::Simulated => Duration::from_millis(8000),
        }
    }

    fn context(&self) -> AnalysisContext {
        AnalysisContext {
            stats: self.stats,
            empty: self.results.is_empty(),
        }
    }

    fn fetch<'a>(
        source: &'a dyn DataSource,
        ctx: &'a AnalysisContext,
    ) -> BoxFuture<'a, Result<AnalysisUpdate>> {
        source.analysis(ctx)
    }

    fn apply(&mut self, update: AnalysisUpdate, now: OffsetDateTime) {
        match update {
            AnalysisUpdate::Snapshot { stats, results } => {
                self.stats = stats;
                self.results.replace(results);
            }
            AnalysisUpdate::Detected { result, stats } => {
                self.stats = stats;
                self.results.push(result);
            }
        }
        self.last_synced = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: u64, model: &str, severity: Severity) -> AnalysisResult {
        AnalysisResult {
            id,
            device: "Sensor-01".into(),
            detection_type: "Temperature Anomaly".into(),
            severity,
            confidence: 90,
            description: String::new(),
            recommendation: String::new(),
            model: model.into(),
            detected_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn detect(view: &mut AnalysisView, r: AnalysisResult) {
        let stats = view.stats;
        view.apply(
            AnalysisUpdate::Detected { result: r, stats },
            OffsetDateTime::UNIX_EPOCH,
        );
    }

    #[test]
    fn test_cap() {
        let mut view = AnalysisView::default();
        for i in 0..20 {
            detect(&mut view, result(i, MODELS[0], Severity::Low));
        }
        assert_eq!(view.results().len(), ANALYSIS_CAP);
        assert_eq!(view.results().head().unwrap().id, 19);
        assert!(!view.context().empty);
    }

    #[test]
    fn test_model_filter() {
        let mut view = AnalysisView::default();
        detect(&mut view, result(1, "Random Forest", Severity::High));
        detect(&mut view, result(2, "Autoencoder", Severity::Low));
        detect(&mut view, result(3, "Random Forest", Severity::Medium));

        assert_eq!(view.filtered().len(), 3);
        view.set_model_filter(Some("Random Forest".into()));
        let ids: Vec<u64> = view.filtered().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_cycle_model_filter_wraps_to_all() {
        let mut view = AnalysisView::default();
        view.cycle_model_filter();
        assert_eq!(view.model_filter(), Some("Isolation Forest"));
        for _ in 1..MODELS.len() {
            view.cycle_model_filter();
        }
        assert_eq!(view.model_filter(), Some("Autoencoder"));
        view.cycle_model_filter();
        assert_eq!(view.model_filter(), None);
    }

    #[test]
    fn test_severity_counts() {
        let mut view = AnalysisView::default();
        detect(&mut view, result(1, MODELS[1], Severity::High));
        detect(&mut view, result(2, MODELS[1], Severity::High));
        detect(&mut view, result(3, MODELS[1], Severity::Low));
        let counts = view.severity_counts();
        assert_eq!(counts.high, 2);
        assert_eq!(counts.medium, 0);
        assert_eq!(counts.low, 1);
        assert_eq!(view.high_severity(), 2);
    }
}
