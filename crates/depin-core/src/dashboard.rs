//! Dashboard view: aggregate stats, recent readings and the activity chart.

use std::time::Duration;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use depin_types::{DashboardStats, ReadingStatus, SensorReading};

use crate::chart::{ActivityChart, ChartPeriod};
use crate::error::Result;
use crate::source::{DataSource, SourceKind};
use crate::view::View;

/// Maximum number of recent readings kept on the dashboard.
pub const READINGS_CAP: usize = 5;

/// What the source needs to produce the next dashboard update.
#[derive(Debug, Clone, Default)]
pub struct DashboardContext {
    pub stats: DashboardStats,
    pub readings: Vec<SensorReading>,
}

/// One dashboard sync result.
#[derive(Debug, Clone)]
pub struct DashboardUpdate {
    pub stats: DashboardStats,
    /// Newest first.
    pub readings: Vec<SensorReading>,
    /// New activity value to append to the chart, if the source produces one.
    pub activity: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub stats: DashboardStats,
    readings: Vec<SensorReading>,
    chart: ActivityChart,
    last_synced: Option<OffsetDateTime>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new(ChartPeriod::default())
    }
}

impl DashboardView {
    pub fn new(period: ChartPeriod) -> Self {
        Self {
            stats: DashboardStats::default(),
            readings: Vec::new(),
            chart: ActivityChart::generate(period, &mut rand::rng()),
            last_synced: None,
        }
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn chart(&self) -> &ActivityChart {
        &self.chart
    }

    pub fn last_synced(&self) -> Option<OffsetDateTime> {
        self.last_synced
    }

    /// Switch the chart period, regenerating the series.
    pub fn set_period(&mut self, period: ChartPeriod) {
        self.chart = ActivityChart::generate(period, &mut rand::rng());
    }

    /// Readings per status, as `(normal, warning, critical)`.
    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.readings
            .iter()
            .fold((0, 0, 0), |(n, w, c), r| match r.status {
                ReadingStatus::Normal => (n + 1, w, c),
                ReadingStatus::Warning => (n, w + 1, c),
                ReadingStatus::Critical => (n, w, c + 1),
            })
    }
}

impl View for DashboardView {
    const NAME: &'static str = "dashboard";
    type Context = DashboardContext;
    type Update = DashboardUpdate;

    fn default_interval(kind: SourceKind) -> Duration {
        match kind {
            SourceKind::Live => Duration::from_millis(2000),
            SourceKind::Simulated => Duration::from_millis(3000),
        }
    }

    fn context(&self) -> DashboardContext {
        DashboardContext {
            stats: self.stats,
            readings: self.readings.clone(),
        }
    }

    fn fetch<'a>(
        source: &'a dyn DataSource,
        ctx: &'a DashboardContext,
    ) -> BoxFuture<'a, Result<DashboardUpdate>> {
        source.dashboard(ctx)
    }

    fn apply(&mut self, update: DashboardUpdate, now: OffsetDateTime) {
        self.stats = update.stats;
        self.readings = update.readings;
        self.readings.truncate(READINGS_CAP);
        if let Some(value) = update.activity {
            self.chart.shift(value);
        }
        self.last_synced = Some(now);
    }
}
