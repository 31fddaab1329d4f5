//! All console views behind one data source.
//!
//! [`Monitor`] owns the shared state of every view and starts one
//! subscription per view. The returned [`MonitorHandle`] stops them all
//! when dropped.
//!
//! Shell notifications are always generated client-side. A live monitor
//! keeps its own [`Simulator`] for them, since the backend has no
//! notification endpoint.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::analysis::AnalysisView;
use crate::blockchain::BlockchainView;
use crate::dashboard::DashboardView;
use crate::error::Result;
use crate::history::HistoryView;
use crate::notifications::NotificationFeed;
use crate::poller::{PollOptions, Subscription, SyncStats, subscribe, sync_once};
use crate::simulator::Simulator;
use crate::source::{DataSource, SourceKind};
use crate::view::{Shared, View};

/// Per-view interval overrides in milliseconds. Unset views use their
/// default cadence for the source kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Intervals {
    pub dashboard: Option<u64>,
    pub blockchain: Option<u64>,
    pub analysis: Option<u64>,
    pub history: Option<u64>,
    pub notifications: Option<u64>,
}

impl Intervals {
    fn override_for(&self, name: &str) -> Option<u64> {
        [
            (DashboardView::NAME, self.dashboard),
            (BlockchainView::NAME, self.blockchain),
            (AnalysisView::NAME, self.analysis),
            (HistoryView::NAME, self.history),
            (NotificationFeed::NAME, self.notifications),
        ]
        .into_iter()
        .find(|(view, _)| *view == name)
        .and_then(|(_, ms)| ms)
    }

    /// Poll options for view `V` under `kind`.
    pub fn options_for<V: View>(&self, kind: SourceKind) -> PollOptions {
        match self.override_for(V::NAME) {
            Some(ms) => PollOptions::with_interval(Duration::from_millis(ms)),
            None => PollOptions::for_view::<V>(kind),
        }
    }
}

/// Every view of the console, synced from one source.
#[derive(Clone)]
pub struct Monitor {
    source: Arc<dyn DataSource>,
    notifier: Arc<dyn DataSource>,
    pub dashboard: Shared<DashboardView>,
    pub blockchain: Shared<BlockchainView>,
    pub analysis: Shared<AnalysisView>,
    pub history: Shared<HistoryView>,
    pub notifications: Shared<NotificationFeed>,
}

impl Monitor {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        let notifier: Arc<dyn DataSource> = match source.kind() {
            SourceKind::Simulated => Arc::clone(&source),
            SourceKind::Live => Arc::new(Simulator::new()),
        };
        Self {
            source,
            notifier,
            dashboard: Shared::default(),
            blockchain: Shared::default(),
            analysis: Shared::default(),
            history: Shared::default(),
            notifications: Shared::new(NotificationFeed::seeded(OffsetDateTime::now_utc())),
        }
    }

    pub fn source(&self) -> &Arc<dyn DataSource> {
        &self.source
    }

    pub fn kind(&self) -> SourceKind {
        self.source.kind()
    }

    /// Replace the generator behind the notification feed.
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn DataSource>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Start generating shell notifications. The first one arrives after a
    /// full interval; the feed is already seeded.
    pub fn watch_notifications(&self, intervals: &Intervals) -> Result<Subscription> {
        subscribe(
            self.notifications.clone(),
            Arc::clone(&self.notifier),
            intervals
                .options_for::<NotificationFeed>(self.notifier.kind())
                .immediate(false),
        )
    }

    /// Start syncing a single view at its configured cadence.
    pub fn watch<V: View>(&self, view: &Shared<V>, intervals: &Intervals) -> Result<Subscription> {
        subscribe(
            view.clone(),
            Arc::clone(&self.source),
            intervals.options_for::<V>(self.kind()),
        )
    }

    /// Start a subscription for every view.
    pub fn start(&self, intervals: &Intervals) -> Result<MonitorHandle> {
        info!("Starting monitor with {} source", self.kind());

        let notifications = self.watch_notifications(intervals)?;
        let subscriptions = vec![
            self.watch(&self.dashboard, intervals)?,
            self.watch(&self.blockchain, intervals)?,
            self.watch(&self.analysis, intervals)?,
            self.watch(&self.history, intervals)?,
            notifications,
        ];

        Ok(MonitorHandle { subscriptions })
    }

    /// Sync every data view once, concurrently. Returns the first error, if
    /// any, after all requests have finished.
    pub async fn sync_all(&self) -> Result<()> {
        let source = self.source.as_ref();
        let (dashboard, blockchain, analysis, history) = futures::join!(
            sync_once(&self.dashboard, source),
            sync_once(&self.blockchain, source),
            sync_once(&self.analysis, source),
            sync_once(&self.history, source),
        );
        dashboard.and(blockchain).and(analysis).and(history)
    }

    /// Run `cycles` analysis passes back to back.
    pub async fn run_analysis(&self, cycles: usize) -> Result<()> {
        for _ in 0..cycles {
            sync_once(&self.analysis, self.source.as_ref()).await?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Monitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Monitor")
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

/// Running subscriptions of a [`Monitor`].
#[derive(Debug)]
pub struct MonitorHandle {
    subscriptions: Vec<Subscription>,
}

impl MonitorHandle {
    /// Stop every subscription.
    pub fn stop(&self) {
        for sub in &self.subscriptions {
            sub.stop();
        }
    }

    /// Sync counters per view name.
    pub fn stats(&self) -> Vec<(&'static str, SyncStats)> {
        self.subscriptions
            .iter()
            .map(|s| (s.name(), s.stats()))
            .collect()
    }

    /// The source counts as online unless every view's last sync failed.
    pub fn is_online(&self) -> bool {
        let failing = self
            .subscriptions
            .iter()
            .filter(|s| s.stats().is_failing())
            .count();
        failing == 0 || failing < self.subscriptions.len()
    }

    /// Most recent error among failing views.
    pub fn last_error(&self) -> Option<String> {
        self.subscriptions
            .iter()
            .find_map(|s| s.stats().last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Simulator;

    #[test]
    fn test_interval_overrides() {
        let intervals = Intervals {
            history: Some(1500),
            ..Intervals::default()
        };
        let opts = intervals.options_for::<HistoryView>(SourceKind::Live);
        assert_eq!(opts.interval, Duration::from_millis(1500));
        let opts = intervals.options_for::<BlockchainView>(SourceKind::Simulated);
        assert_eq!(opts.interval, Duration::from_millis(10_000));
    }

    #[test]
    fn test_intervals_deserialize_partial() {
        let intervals: Intervals = serde_json::from_str(r#"{"dashboard": 500}"#).unwrap();
        assert_eq!(intervals.dashboard, Some(500));
        assert_eq!(intervals.analysis, None);
    }

    #[tokio::test]
    async fn test_sync_all_seeds_views() {
        let monitor = Monitor::new(Arc::new(Simulator::with_seed(3)));
        monitor.sync_all().await.unwrap();
        assert_eq!(monitor.dashboard.read(|v| v.readings().len()), 4);
        assert_eq!(monitor.blockchain.read(|v| v.blocks().len()), 3);
        assert!(monitor.blockchain.read(|v| v.is_linked()));
        assert_eq!(monitor.history.read(|v| v.entries().len()), 8);
        assert!(!monitor.analysis.read(|v| v.results().is_empty()));
    }

    #[tokio::test]
    async fn test_run_analysis_adds_results() {
        let monitor = Monitor::new(Arc::new(Simulator::with_seed(4)));
        monitor.sync_all().await.unwrap();
        let before = monitor.analysis.read(|v| v.results().len());
        monitor.run_analysis(3).await.unwrap();
        assert_eq!(monitor.analysis.read(|v| v.results().len()), before + 3);
    }

    #[tokio::test]
    async fn test_sync_all_reports_failure() {
        let sim = Arc::new(Simulator::with_seed(5));
        sim.set_should_fail(true);
        let monitor = Monitor::new(sim);
        assert!(monitor.sync_all().await.is_err());
        assert_eq!(monitor.dashboard.revision(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notifications_grow_every_thirty_seconds() {
        let monitor = Monitor::new(Arc::new(Simulator::with_seed(8)));
        let sub = monitor.watch_notifications(&Intervals::default()).unwrap();

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(monitor.notifications.read(NotificationFeed::len), 5);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(monitor.notifications.read(NotificationFeed::len), 6);
        sub.stop();
    }

    #[cfg(feature = "api-client")]
    #[tokio::test(start_paused = true)]
    async fn test_live_monitor_still_generates_notifications() {
        let client = crate::api_client::ApiClient::new("http://127.0.0.1:9", None).unwrap();
        let monitor = Monitor::new(Arc::new(client))
            .with_notifier(Arc::new(Simulator::with_seed(9)));
        assert_eq!(monitor.kind(), SourceKind::Live);
        let sub = monitor.watch_notifications(&Intervals::default()).unwrap();

        tokio::time::sleep(Duration::from_secs(125)).await;
        let (len, unread) =
            monitor
                .notifications
                .read(|feed| (feed.len(), feed.unread_count()));
        assert_eq!(len, 9);
        assert_eq!(unread, 7);
        assert_eq!(sub.stats().failures, 0);
        sub.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_reports_offline() {
        let sim = Arc::new(Simulator::with_seed(6));
        let monitor = Monitor::new(sim.clone());
        let handle = monitor.start(&Intervals::default()).unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_online());

        sim.set_should_fail(true);
        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(!handle.is_online());
        assert!(handle.last_error().is_some());
        handle.stop();
    }
}
