//! Sync engine for the DePIN monitoring console.
//!
//! This crate keeps the console's views (dashboard, ledger, analysis,
//! history and notifications) in sync with a data source, either the
//! monitoring backend's REST API or a local simulator.
//!
//! # Features
//!
//! - **Views**: state for each screen, updated only through [`View::apply`]
//! - **Subscriptions**: cancellable background polling that never overlaps
//! - **Data sources**: live HTTP client ([`ApiClient`]) and [`Simulator`]
//! - **History tools**: search, status filter, pagination and CSV export
//! - **Persistence**: settings, theme and login state in a key-value store
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use depin_core::{Intervals, Monitor, Simulator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let monitor = Monitor::new(Arc::new(Simulator::new()));
//!     let handle = monitor.start(&Intervals::default())?;
//!
//!     tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//!     let height = monitor.blockchain.read(|v| v.head().map(|b| b.height));
//!     println!("Chain head: {:?}", height);
//!
//!     handle.stop();
//!     Ok(())
//! }
//! ```

pub mod analysis;
#[cfg(feature = "api-client")]
pub mod api_client;
pub mod blockchain;
pub mod bounded;
pub mod chart;
pub mod context;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod history;
pub mod monitor;
pub mod notifications;
pub mod poller;
pub mod settings;
pub mod simulator;
pub mod source;
pub mod stats;
pub mod view;

#[cfg(feature = "api-client")]
pub use api_client::ApiClient;
pub use bounded::BoundedList;
pub use context::{AppContext, FileStore, KeyValueStore, MemoryStore, SettingsStore};
pub use error::{Error, Result};
pub use monitor::{Intervals, Monitor, MonitorHandle};
pub use notifications::NotificationFeed;
pub use poller::{PollOptions, Subscription, SyncStats, subscribe, sync_once};
pub use settings::SettingsForm;
pub use simulator::Simulator;
pub use source::{DataSource, SourceKind};
pub use view::{Shared, View};

// Re-export from depin-types
pub use depin_types::{
    AiStats, AnalysisResult, Block, ChainStats, DashboardStats, HistoryEntry, HistoryStatus,
    Notification, NotificationKind, ReadingStatus, SensorReading, Settings, Severity, Theme, Unit,
};
