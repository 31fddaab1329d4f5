//! The view abstraction driven by the poller.
//!
//! A view owns its state and knows three things: which request to make
//! ([`View::fetch`]), what to hand the source for it ([`View::context`]), and
//! how to fold the answer back in ([`View::apply`]). The poller only sees this
//! trait, and views are shared with the front end through [`Shared`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use crate::error::Result;
use crate::source::{DataSource, SourceKind};

/// A piece of UI state kept in sync with a [`DataSource`].
pub trait View: Send + Sync + 'static {
    /// Name used in logs and sync statistics.
    const NAME: &'static str;

    /// Snapshot of view state the source needs to produce the next update.
    type Context: Send + Sync + 'static;

    /// What one sync cycle produces.
    type Update: Send + 'static;

    /// Default sync cadence for the given source kind.
    fn default_interval(kind: SourceKind) -> Duration;

    /// Capture the context for the next request.
    fn context(&self) -> Self::Context;

    /// Issue the request for this view.
    fn fetch<'a>(
        source: &'a dyn DataSource,
        ctx: &'a Self::Context,
    ) -> BoxFuture<'a, Result<Self::Update>>;

    /// Fold an update into the view. Must be a pure state transition.
    fn apply(&mut self, update: Self::Update, now: OffsetDateTime);
}

/// A view shared between its poller and its readers.
///
/// Readers take short closures over the state; every [`update`](Self::update)
/// bumps a revision counter so a renderer can tell when something changed.
pub struct Shared<V> {
    inner: Arc<SharedInner<V>>,
}

struct SharedInner<V> {
    state: RwLock<V>,
    revision: AtomicU64,
}

impl<V> Clone for Shared<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Shared<V> {
    pub fn new(view: V) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                state: RwLock::new(view),
                revision: AtomicU64::new(0),
            }),
        }
    }

    /// Run `f` with read access to the state.
    pub fn read<R>(&self, f: impl FnOnce(&V) -> R) -> R {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Run `f` with write access to the state and bump the revision.
    pub fn update<R>(&self, f: impl FnOnce(&mut V) -> R) -> R {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut guard);
        self.inner.revision.fetch_add(1, Ordering::Release);
        out
    }

    /// Number of updates applied so far.
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Clone the current state.
    pub fn snapshot(&self) -> V
    where
        V: Clone,
    {
        self.read(V::clone)
    }
}

impl<V: Default> Default for Shared<V> {
    fn default() -> Self {
        Self::new(V::default())
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Shared<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.read(|v| {
            f.debug_struct("Shared")
                .field("revision", &self.revision())
                .field("state", v)
                .finish()
        })
    }
}
