//! Data-source abstraction shared by every view.
//!
//! A [`DataSource`] answers one request per view. The live backend client and
//! the synthetic generator both implement it, so views and the poller never
//! care where their data comes from.

use core::fmt;
use core::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use depin_types::{Notification, ParseError};

use crate::analysis::{AnalysisContext, AnalysisUpdate};
use crate::blockchain::{ChainContext, ChainUpdate};
use crate::dashboard::{DashboardContext, DashboardUpdate};
use crate::error::Result;
use crate::history::{HistoryContext, HistoryUpdate};

/// Where a source gets its data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Remote HTTP backend.
    Live,
    /// Client-side random generator.
    #[default]
    Simulated,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Live => write!(f, "live"),
            SourceKind::Simulated => write!(f, "simulated"),
        }
    }
}

impl FromStr for SourceKind {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" | "api" => Ok(SourceKind::Live),
            "simulated" | "sim" | "demo" => Ok(SourceKind::Simulated),
            other => Err(ParseError::UnknownValue {
                kind: "source",
                value: other.to_string(),
            }),
        }
    }
}

/// Trait abstracting where view data comes from.
///
/// Each method receives a small snapshot of the view's current state (the
/// chain head, pending history ids, ...) and returns an update for the view
/// to apply. Implementations must not hold on to the context.
///
/// # Example
///
/// ```
/// use depin_core::{DataSource, Simulator};
/// use depin_core::dashboard::DashboardView;
/// use depin_core::view::View;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> depin_core::Result<()> {
/// let source = Simulator::with_seed(7);
/// let view = DashboardView::default();
/// let update = source.dashboard(&view.context()).await?;
/// # let _ = update;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Which kind of source this is; selects per-view default intervals.
    fn kind(&self) -> SourceKind;

    /// Aggregate stats and recent readings.
    async fn dashboard(&self, ctx: &DashboardContext) -> Result<DashboardUpdate>;

    /// Chain stats and new or recent blocks.
    async fn blockchain(&self, ctx: &ChainContext) -> Result<ChainUpdate>;

    /// Analysis stats and new or recent detections.
    async fn analysis(&self, ctx: &AnalysisContext) -> Result<AnalysisUpdate>;

    /// New or recent history entries.
    async fn history(&self, ctx: &HistoryContext) -> Result<HistoryUpdate>;

    /// Next shell notification, if this source produces any.
    async fn notification(&self) -> Result<Option<Notification>> {
        Ok(None)
    }
}
