//! Blockchain view: recent blocks and chain stats.

use std::time::Duration;

use futures::future::BoxFuture;
use time::OffsetDateTime;

use depin_types::{Block, ChainStats, verify_linkage};

use crate::bounded::BoundedList;
use crate::error::Result;
use crate::source::{DataSource, SourceKind};
use crate::view::View;

/// Maximum number of blocks kept.
pub const BLOCK_CAP: usize = 10;

/// What the source needs to produce the next chain update.
#[derive(Debug, Clone, Default)]
pub struct ChainContext {
    pub stats: ChainStats,
    /// Current newest block, if any.
    pub head: Option<Block>,
}

/// One chain sync result.
#[derive(Debug, Clone)]
pub enum ChainUpdate {
    /// Replace the list with these newest-first blocks.
    Snapshot { stats: ChainStats, blocks: Vec<Block> },
    /// Prepend one newly produced block.
    Mined { block: Block, stats: ChainStats },
}

#[derive(Debug, Clone)]
pub struct BlockchainView {
    pub stats: ChainStats,
    blocks: BoundedList<Block>,
    last_synced: Option<OffsetDateTime>,
}

impl Default for BlockchainView {
    fn default() -> Self {
        Self {
            stats: ChainStats::default(),
            blocks: BoundedList::new(BLOCK_CAP),
            last_synced: None,
        }
    }
}

impl BlockchainView {
    /// Start from an existing head block.
    pub fn with_head(head: Block) -> Self {
        let mut view = Self::default();
        view.stats.total_blocks = head.height;
        view.blocks.push(head);
        view
    }

    pub fn blocks(&self) -> &BoundedList<Block> {
        &self.blocks
    }

    pub fn head(&self) -> Option<&Block> {
        self.blocks.head()
    }

    pub fn last_synced(&self) -> Option<OffsetDateTime> {
        self.last_synced
    }

    /// Whether the kept blocks form an unbroken newest-first chain.
    pub fn is_linked(&self) -> bool {
        verify_linkage(&self.blocks.to_vec())
    }
}

impl View for BlockchainView {
    const NAME: &'static str = "blockchain";
    type Context = ChainContext;
    type Update = ChainUpdate;

    fn default_interval(kind: SourceKind) -> Duration {
        match kind {
            SourceKind::Live => Duration::from_millis(3000),
            SourceKind::Simulated => Duration::from_millis(10_000),
        }
    }

    fn context(&self) -> ChainContext {
        ChainContext {
            stats: self.stats,
            head: self.blocks.head().cloned(),
        }
    }

    fn fetch<'a>(
        source: &'a dyn DataSource,
        ctx: &'a ChainContext,
    ) -> BoxFuture<'a, Result<ChainUpdate>> {
        source.blockchain(ctx)
    }

    fn apply(&mut self, update: ChainUpdate, now: OffsetDateTime) {
        match update {
            ChainUpdate::Snapshot { stats, blocks } => {
                self.stats = stats;
                self.blocks.replace(blocks);
            }
            ChainUpdate::Mined { block, stats } => {
                self.stats = stats;
                self.blocks.push(block);
            }
        }
        self.last_synced = Some(now);
    }
}
