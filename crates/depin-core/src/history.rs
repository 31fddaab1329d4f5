//! History view: the verified-data log with search, status filter,
//! pagination and CSV export.

use core::fmt;
use core::str::FromStr;
use std::time::Duration;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use depin_types::{HistoryEntry, HistoryStatus, ParseError};

use crate::bounded::BoundedList;
use crate::error::Result;
use crate::export::history_csv;
use crate::source::{DataSource, SourceKind};
use crate::stats::HistorySummary;
use crate::view::View;

/// Maximum number of history entries kept.
pub const HISTORY_CAP: usize = 100;

/// Rows per page.
pub const PAGE_SIZE: usize = 8;

/// Status filter with an "all" passthrough.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    #[default]
    All,
    Only(HistoryStatus),
}

impl StatusFilter {
    /// Filters in key order: all, verified, pending, failed.
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Only(HistoryStatus::Verified),
        StatusFilter::Only(HistoryStatus::Pending),
        StatusFilter::Only(HistoryStatus::Failed),
    ];

    pub fn matches(self, status: HistoryStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => write!(f, "{status}"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

/// Entries matching `search` (case-insensitive substring of device or hash)
/// and `status`, in their original order.
pub fn filter_entries<'a>(
    entries: impl IntoIterator<Item = &'a HistoryEntry>,
    search: &str,
    status: StatusFilter,
) -> Vec<&'a HistoryEntry> {
    let needle = search.to_lowercase();
    entries
        .into_iter()
        .filter(|e| status.matches(e.status))
        .filter(|e| {
            needle.is_empty()
                || e.device.to_lowercase().contains(&needle)
                || e.hash.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Number of pages needed for `count` items.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

/// Clamp a 1-based page index to `[1, max(1, total_pages)]`.
///
/// ```
/// use depin_core::history::clamp_page;
///
/// assert_eq!(clamp_page(0, 3), 1);
/// assert_eq!(clamp_page(4, 3), 3);
/// assert_eq!(clamp_page(5, 0), 1);
/// ```
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// The items on 1-based `page`, after clamping.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_pages(items.len(), page_size));
    let start = ((page - 1) * page_size).min(items.len());
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// Search text, status filter and current page of the history table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    search: String,
    status: StatusFilter,
    page: usize,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            status: StatusFilter::All,
            page: 1,
        }
    }
}

impl HistoryQuery {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn status(&self) -> StatusFilter {
        self.status
    }

    /// Requested page; may exceed the page count until it is clamped.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Change the search text. Any change returns to page 1.
    pub fn set_search(&mut self, search: impl Into<String>) {
        let search = search.into();
        if search != self.search {
            self.search = search;
            self.page = 1;
        }
    }

    /// Change the status filter. Any change returns to page 1.
    pub fn set_status(&mut self, status: StatusFilter) {
        if status != self.status {
            self.status = status;
            self.page = 1;
        }
    }
}

/// One rendered page of history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage<'a> {
    pub entries: &'a [&'a HistoryEntry],
    /// 1-based current page.
    pub page: usize,
    pub total_pages: usize,
    /// Number of entries matching the query across all pages.
    pub matches: usize,
}

/// What the source needs to produce the next history update.
#[derive(Debug, Clone, Default)]
pub struct HistoryContext {
    /// Ids of entries still pending verification.
    pub pending: Vec<u64>,
    /// Whether the view holds no entries yet.
    pub empty: bool,
}

/// One history sync result.
#[derive(Debug, Clone)]
pub enum HistoryUpdate {
    /// Replace the log with these newest-first entries.
    Snapshot(Vec<HistoryEntry>),
    /// A new entry and/or pending entries that are now verified.
    Recorded {
        entry: Option<HistoryEntry>,
        confirmed: Vec<u64>,
    },
}

#[derive(Debug, Clone)]
pub struct HistoryView {
    entries: BoundedList<HistoryEntry>,
    pub query: HistoryQuery,
    last_synced: Option<OffsetDateTime>,
}

impl Default for HistoryView {
    fn default() -> Self {
        Self {
            entries: BoundedList::new(HISTORY_CAP),
            query: HistoryQuery::default(),
            last_synced: None,
        }
    }
}

impl HistoryView {
    /// Build a view over newest-first entries.
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        Self {
            entries: BoundedList::from_newest_first(HISTORY_CAP, entries),
            ..Self::default()
        }
    }

    pub fn entries(&self) -> &BoundedList<HistoryEntry> {
        &self.entries
    }

    /// All entries matching the current query, newest first.
    pub fn filtered(&self) -> Vec<&HistoryEntry> {
        filter_entries(&self.entries, &self.query.search, self.query.status)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.filtered().len(), PAGE_SIZE)
    }

    /// The current page index after clamping against the filtered set.
    pub fn current_page(&self) -> usize {
        clamp_page(self.query.page, self.total_pages())
    }

    /// Jump to `page`, clamped to the available pages.
    pub fn set_page(&mut self, page: usize) {
        self.query.page = clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.current_page() + 1);
    }

    pub fn prev_page(&mut self) {
        self.set_page(self.current_page().saturating_sub(1));
    }

    /// Run `f` over the current page.
    pub fn with_page<R>(&self, f: impl FnOnce(HistoryPage<'_>) -> R) -> R {
        let filtered = self.filtered();
        let pages = total_pages(filtered.len(), PAGE_SIZE);
        let page = clamp_page(self.query.page, pages);
        f(HistoryPage {
            entries: paginate(&filtered, page, PAGE_SIZE),
            page,
            total_pages: pages,
            matches: filtered.len(),
        })
    }

    /// Counts per status over all kept entries, for filter labels.
    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_entries(&self.entries)
    }

    /// The filtered (not paginated) set as CSV.
    pub fn export_csv(&self) -> String {
        history_csv(self.filtered())
    }

    pub fn last_synced(&self) -> Option<OffsetDateTime> {
        self.last_synced
    }
}

impl View for HistoryView {
    const NAME: &'static str = "history";
    type Context = HistoryContext;
    type Update = HistoryUpdate;

    fn default_interval(kind: SourceKind) -> Duration {
        match kind {
            SourceKind::Live => Duration::from_millis(5000),
            SourceKind::Simulated => Duration::from_millis(6000),
        }
    }

    fn context(&self) -> HistoryContext {
        HistoryContext {
            pending: self
                .entries
                .iter()
                .filter(|e| e.status == HistoryStatus::Pending)
                .map(|e| e.id)
                .collect(),
            empty: self.entries.is_empty(),
        }
    }

    fn fetch<'a>(
        source: &'a dyn DataSource,
        ctx: &'a HistoryContext,
    ) -> BoxFuture<'a, Result<HistoryUpdate>> {
        source.history(ctx)
    }

    fn apply(&mut self, update: HistoryUpdate, now: OffsetDateTime) {
        match update {
            HistoryUpdate::Snapshot(entries) => self.entries.replace(entries),
            HistoryUpdate::Recorded { entry, confirmed } => {
                for e in self.entries.iter_mut() {
                    if e.status == HistoryStatus::Pending && confirmed.contains(&e.id) {
                        e.status = HistoryStatus::Verified;
                    }
                }
                if let Some(entry) = entry {
                    self.entries.push(entry);
                }
            }
        }
        self.last_synced = Some(now);
    }
}
