use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use super::BlockChainAccessor;
use crate::blockdata::block::{Block, BlockHash};

/// Header history held in memory.
///
/// Blocks are indexed by hash, and the most recently inserted block at each
/// height is recorded as the best chain for [`BlockChainAccessor::timestamps`].
/// Ancestor lookups follow `prev_blockhash` links, so they stay correct for
/// blocks on a side branch.
#[derive(Debug, Default, Clone)]
pub struct MemoryChain {
    blocks: HashMap<BlockHash, Block>,
    best_chain: BTreeMap<u32, BlockHash>,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a block and makes it the best block at its height.
    pub fn insert(&mut self, block: Block) {
        trace!(height = block.height(), hash = %block.hash(), "storing block");
        self.best_chain.insert(block.height(), block.hash());
        self.blocks.insert(block.hash(), block);
    }

    /// Returns the best-chain block with the greatest height.
    pub fn tip(&self) -> Option<&Block> {
        self.best_chain
            .last_key_value()
            .and_then(|(_, hash)| self.blocks.get(hash))
    }

    /// Returns the best-chain block at `height`.
    pub fn at_height(&self, height: u32) -> Option<&Block> {
        self.best_chain.get(&height).and_then(|hash| self.blocks.get(hash))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn parent(&self, block: &Block) -> Option<&Block> {
        self.blocks.get(&block.previous_hash())
    }
}

impl FromIterator<Block> for MemoryChain {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        let mut chain = MemoryChain::new();
        for block in iter {
            chain.insert(block);
        }
        chain
    }
}

impl BlockChainAccessor for MemoryChain {
    fn block(&self, hash: &BlockHash) -> Option<Block> {
        self.blocks.get(hash).cloned()
    }

    fn previous(&self, block: &Block, count: u32) -> Option<Block> {
        let mut cursor = block;
        for _ in 0..count {
            cursor = self.parent(cursor)?;
        }
        Some(cursor.clone())
    }

    fn previous_window(&self, block: &Block, count: u32) -> Option<Vec<Block>> {
        let mut window = Vec::with_capacity(usize::try_from(count).unwrap_or_default());
        let mut cursor = block;
        for _ in 0..count {
            cursor = self.parent(cursor)?;
            window.push(cursor.clone());
        }
        window.reverse();
        Some(window)
    }

    fn timestamps(&self, from_height: u32, to_height: u32, ascending: bool) -> Vec<u32> {
        if from_height > to_height {
            return Vec::new();
        }
        let mut timestamps: Vec<u32> = self
            .best_chain
            .range(from_height..=to_height)
            .filter_map(|(_, hash)| self.blocks.get(hash))
            .map(Block::timestamp)
            .collect();
        timestamps.sort_unstable();
        if !ascending {
            timestamps.reverse();
        }
        timestamps
    }
}
