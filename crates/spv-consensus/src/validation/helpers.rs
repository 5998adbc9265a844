use tracing::trace;

use super::ValidationError;
use crate::{blockdata::block::Block, chain::BlockChainAccessor};

/// Number of blocks in the median-time-past window.
pub const MEDIAN_TIME_SPAN: u32 = 11;

/// Ancestor lookups that fail with [`ValidationError::NoPreviousBlock`].
#[derive(Clone, Copy)]
pub struct BlockHelper<'a> {
    accessor: &'a dyn BlockChainAccessor,
}

impl<'a> BlockHelper<'a> {
    pub fn new(accessor: &'a dyn BlockChainAccessor) -> Self {
        BlockHelper { accessor }
    }

    pub fn accessor(&self) -> &'a dyn BlockChainAccessor {
        self.accessor
    }

    /// The ancestor `count` blocks behind `block`.
    pub fn previous(&self, block: &Block, count: u32) -> Result<Block, ValidationError> {
        self.accessor.previous(block, count).ok_or_else(|| {
            let height = block.height().saturating_sub(count);
            trace!(from = block.height(), height, "missing ancestor");
            ValidationError::NoPreviousBlock { height }
        })
    }

    /// The `count` blocks preceding `block`, oldest first.
    pub fn previous_window(&self, block: &Block, count: u32) -> Result<Vec<Block>, ValidationError> {
        self.accessor.previous_window(block, count).ok_or_else(|| {
            let height = block.height().saturating_sub(count);
            trace!(from = block.height(), count, "missing ancestor window");
            ValidationError::NoPreviousBlock { height }
        })
    }
}

/// Bitcoin Cash lookups on top of [`BlockHelper`].
#[derive(Clone, Copy)]
pub struct BitcoinCashHelper<'a> {
    helper: BlockHelper<'a>,
}

impl<'a> BitcoinCashHelper<'a> {
    pub fn new(accessor: &'a dyn BlockChainAccessor) -> Self {
        BitcoinCashHelper {
            helper: BlockHelper::new(accessor),
        }
    }

    pub fn previous(&self, block: &Block, count: u32) -> Result<Block, ValidationError> {
        self.helper.previous(block, count)
    }

    /// Median timestamp of the eleven blocks ending at `block`.
    ///
    /// Near genesis the window shrinks to the blocks that exist. When the
    /// accessor returns fewer timestamps than the window should hold, the
    /// block's own timestamp is used instead.
    pub fn median_time_past(&self, block: &Block) -> u32 {
        let to_height = block.height();
        let from_height = to_height.saturating_sub(MEDIAN_TIME_SPAN - 1);
        let expected = usize::try_from(to_height - from_height + 1).unwrap_or(usize::MAX);

        let mut timestamps = self.helper.accessor().timestamps(from_height, to_height, true);
        if timestamps.len() < expected {
            return block.timestamp();
        }
        timestamps.sort_unstable();
        timestamps
            .get(timestamps.len() / 2)
            .copied()
            .unwrap_or_else(|| block.timestamp())
    }
}
