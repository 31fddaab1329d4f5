//! Periodic view synchronisation.
//!
//! [`subscribe`] spawns a background task that syncs one view against a
//! [`DataSource`] on a fixed cadence. Syncs never overlap: the next tick is
//! only awaited once the previous request has finished, and ticks missed
//! while a slow request was in flight are skipped rather than replayed.
//!
//! Dropping or [stopping](Subscription::stop) the returned [`Subscription`]
//! ends the task. Once `stop` returns, the view is never written again, even
//! if a request was in flight at that moment.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{Error, Result};
use crate::source::{DataSource, SourceKind};
use crate::view::{Shared, View};

/// Number of consecutive failures logged at warn level before going quiet.
const LOUD_FAILURES: u32 = 3;

/// Options for a view subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Time between sync starts.
    pub interval: Duration,
    /// Sync once right away instead of waiting a full interval first.
    /// Default: true.
    pub immediate: bool,
}

impl PollOptions {
    /// Options with the view's default cadence for `kind`.
    pub fn for_view<V: View>(kind: SourceKind) -> Self {
        Self::with_interval(V::default_interval(kind))
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval,
            immediate: true,
        }
    }

    #[must_use]
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }

    /// Validate the options and return an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig("interval must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Outcome counters for one subscription.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncStats {
    pub successes: u64,
    pub failures: u64,
    pub consecutive_failures: u32,
    pub last_error: Option<String>,
    pub last_success: Option<OffsetDateTime>,
}

impl SyncStats {
    /// Whether the most recent sync failed.
    pub fn is_failing(&self) -> bool {
        self.consecutive_failures > 0
    }

    fn record_success(&mut self, now: OffsetDateTime) -> u32 {
        let recovered_from = self.consecutive_failures;
        self.successes += 1;
        self.consecutive_failures = 0;
        self.last_error = None;
        self.last_success = Some(now);
        recovered_from
    }

    fn record_failure(&mut self, error: &Error) -> u32 {
        self.failures += 1;
        self.consecutive_failures += 1;
        self.last_error = Some(error.to_string());
        self.consecutive_failures
    }
}

/// Run one sync cycle for `view` outside of any subscription.
pub async fn sync_once<V: View>(view: &Shared<V>, source: &dyn DataSource) -> Result<()> {
    let ctx = view.read(V::context);
    let update = V::fetch(source, &ctx).await?;
    view.update(|v| v.apply(update, OffsetDateTime::now_utc()));
    Ok(())
}

/// A running view subscription.
///
/// The background task stops when [`stop`](Self::stop) is called or the
/// subscription is dropped.
pub struct Subscription {
    name: &'static str,
    handle: JoinHandle<()>,
    cancel_token: CancellationToken,
    open: Arc<Mutex<bool>>,
    stats: Arc<Mutex<SyncStats>>,
}

impl Subscription {
    /// Stop syncing. The view is not modified after this returns.
    pub fn stop(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if *open {
            debug!("Stopping {} sync", self.name);
        }
        *open = false;
        self.cancel_token.cancel();
    }

    /// Name of the view being synced.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Get a cancellation token that stops the background task when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Check if the background task is still running.
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    /// Snapshot of the sync counters.
    pub fn stats(&self) -> SyncStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("name", &self.name)
            .field("active", &self.is_active())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// Start syncing `view` from `source` in the background.
///
/// Must be called from within a Tokio runtime.
pub fn subscribe<V: View>(
    view: Shared<V>,
    source: Arc<dyn DataSource>,
    options: PollOptions,
) -> Result<Subscription> {
    options.validate()?;

    let cancel_token = CancellationToken::new();
    let open = Arc::new(Mutex::new(true));
    let stats = Arc::new(Mutex::new(SyncStats::default()));

    let task_token = cancel_token.clone();
    let task_open = Arc::clone(&open);
    let task_stats = Arc::clone(&stats);

    info!(
        "Starting {} sync ({} source, every {}ms)",
        V::NAME,
        source.kind(),
        options.interval.as_millis()
    );

    let handle = tokio::spawn(async move {
        let mut ticker = if options.immediate {
            interval(options.interval)
        } else {
            interval_at(Instant::now() + options.interval, options.interval)
        };
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = task_token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let ctx = view.read(V::context);
            let result = tokio::select! {
                biased;
                _ = task_token.cancelled() => break,
                result = V::fetch(source.as_ref(), &ctx) => result,
            };

            match result {
                Ok(update) => {
                    let now = OffsetDateTime::now_utc();
                    {
                        let open = task_open.lock().unwrap_or_else(PoisonError::into_inner);
                        if !*open {
                            break;
                        }
                        view.update(|v| v.apply(update, now));
                    }

                    let recovered_from = task_stats
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record_success(now);
                    if recovered_from > 0 {
                        info!("{} sync recovered after {} failures", V::NAME, recovered_from);
                    } else {
                        debug!("Synced {}", V::NAME);
                    }
                }
                Err(e) => {
                    let attempt = task_stats
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .record_failure(&e);
                    if attempt <= LOUD_FAILURES {
                        warn!("Failed to sync {}: {} (attempt {})", V::NAME, e, attempt);
                    } else if attempt == LOUD_FAILURES + 1 {
                        error!(
                            "Failed to sync {} after {} attempts, will continue trying silently",
                            V::NAME,
                            attempt
                        );
                    }
                }
            }
        }

        debug!("{} sync stopped", V::NAME);
    });

    Ok(Subscription {
        name: V::NAME,
        handle,
        cancel_token,
        open,
        stats,
    })
}
