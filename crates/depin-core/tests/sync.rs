//! End-to-end sync tests against the simulator, plus live backend tests.
//!
//! The live tests need a running backend and are ignored by default:
//! ```
//! DEPIN_API_URL=http://localhost:8000 cargo test --package depin-core --test sync -- --ignored
//! ```

use std::sync::Arc;
use std::time::Duration;

use depin_core::history::{HISTORY_CAP, PAGE_SIZE, StatusFilter};
use depin_core::{HistoryStatus, Intervals, Monitor, Simulator};

fn simulated() -> (Arc<Simulator>, Monitor) {
    let sim = Arc::new(Simulator::with_seed(2024));
    let monitor = Monitor::new(sim.clone());
    (sim, monitor)
}

// --- Simulated scenarios ---

#[tokio::test(start_paused = true)]
async fn test_chain_stays_linked_while_growing() {
    let (_sim, monitor) = simulated();
    let handle = monitor.start(&Intervals::default()).unwrap();

    tokio::time::sleep(Duration::from_secs(125)).await;

    monitor.blockchain.read(|chain| {
        assert_eq!(chain.blocks().len(), 10);
        assert!(chain.is_linked());
        let head = chain.head().unwrap();
        assert!(head.height > 12543);
        assert_eq!(chain.stats.total_blocks, head.height);
    });
    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_views_respect_caps() {
    let (_sim, monitor) = simulated();
    let intervals = Intervals {
        history: Some(100),
        analysis: Some(100),
        ..Intervals::default()
    };
    let handle = monitor.start(&intervals).unwrap();

    tokio::time::sleep(Duration::from_secs(30)).await;
    handle.stop();

    assert!(monitor.history.read(|v| v.entries().len()) <= HISTORY_CAP);
    assert_eq!(monitor.history.read(|v| v.entries().len()), HISTORY_CAP);
    assert_eq!(monitor.analysis.read(|v| v.results().len()), 15);
    assert_eq!(monitor.dashboard.read(|v| v.readings().len()), 4);
    assert!(monitor.notifications.read(|v| v.len()) <= 10);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_freezes_every_view() {
    let (_sim, monitor) = simulated();
    let handle = monitor.start(&Intervals::default()).unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;
    drop(handle);

    let revisions = (
        monitor.dashboard.revision(),
        monitor.blockchain.revision(),
        monitor.analysis.revision(),
        monitor.history.revision(),
        monitor.notifications.revision(),
    );
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(
        revisions,
        (
            monitor.dashboard.revision(),
            monitor.blockchain.revision(),
            monitor.analysis.revision(),
            monitor.history.revision(),
            monitor.notifications.revision(),
        )
    );
}

#[tokio::test(start_paused = true)]
async fn test_outage_and_recovery() {
    let (sim, monitor) = simulated();
    let handle = monitor.start(&Intervals::default()).unwrap();
    tokio::time::sleep(Duration::from_millis(10)).await;
    let height = monitor.blockchain.read(|v| v.head().map(|b| b.height));

    sim.set_should_fail(true);
    tokio::time::sleep(Duration::from_secs(35)).await;
    assert!(!handle.is_online());
    assert_eq!(monitor.blockchain.read(|v| v.head().map(|b| b.height)), height);

    sim.set_should_fail(false);
    tokio::time::sleep(Duration::from_secs(11)).await;
    assert!(handle.is_online());
    assert!(monitor.blockchain.read(|v| v.head().map(|b| b.height)) > height);
}

#[tokio::test]
async fn test_history_query_and_export() {
    let (_sim, monitor) = simulated();
    monitor.sync_all().await.unwrap();

    monitor.history.update(|history| {
        history.query.set_status(StatusFilter::Only(HistoryStatus::Verified));
        let summary = history.summary();
        history.with_page(|page| {
            assert_eq!(page.matches, summary.verified);
            assert!(page.entries.len() <= PAGE_SIZE);
            assert!(
                page.entries
                    .iter()
                    .all(|e| e.status == HistoryStatus::Verified)
            );
        });

        let csv = history.export_csv();
        assert_eq!(csv.lines().count(), summary.verified + 1);

        history.query.set_search("no-such-device");
        assert_eq!(history.total_pages(), 0);
        assert_eq!(history.current_page(), 1);
    });
}

// --- Live backend ---

#[cfg(feature = "api-client")]
mod live {
    use depin_core::{ApiClient, Monitor};
    use std::sync::Arc;

    fn client() -> ApiClient {
        let url =
            std::env::var("DEPIN_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_string());
        let key = std::env::var("DEPIN_API_KEY").ok();
        ApiClient::new(&url, key.as_deref()).unwrap()
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_backend_health() {
        let health = client().health().await.unwrap();
        println!("Backend status: {}", health.status);
    }

    #[tokio::test]
    #[ignore]
    async fn test_live_sync_all() {
        let monitor = Monitor::new(Arc::new(client()));
        monitor.sync_all().await.unwrap();
        assert!(monitor.blockchain.read(|v| v.is_linked()));
        assert!(monitor.dashboard.read(|v| v.readings().len()) <= 5);
    }
}
