//! Read access to already-accepted block history.
//!
//! Validators never own block history. They borrow a [`BlockChainAccessor`]
//! and pull the ancestors their rule needs. Storage backends implement the
//! trait; [`MemoryChain`] is the in-memory implementation.

mod memory;

pub use memory::MemoryChain;

use crate::blockdata::block::{Block, BlockHash};

/// Read-only queries over stored headers.
///
/// Implementations must be safe to query from several threads at once; the
/// validators call them without holding any lock of their own.
pub trait BlockChainAccessor: Send + Sync {
    /// Looks up a stored block by hash.
    fn block(&self, hash: &BlockHash) -> Option<Block>;

    /// Returns the ancestor `count` blocks behind `block`, or `None` when the
    /// stored history is not deep enough.
    fn previous(&self, block: &Block, count: u32) -> Option<Block>;

    /// Returns the `count` blocks immediately preceding `block`, oldest first,
    /// or `None` when fewer than `count` ancestors are stored.
    fn previous_window(&self, block: &Block, count: u32) -> Option<Vec<Block>>;

    /// Returns the timestamps of the best-chain blocks with heights in
    /// `from_height..=to_height`, sorted by value.
    fn timestamps(&self, from_height: u32, to_height: u32, ascending: bool) -> Vec<u32>;
}

impl<T: BlockChainAccessor + ?Sized> BlockChainAccessor for &T {
    fn block(&self, hash: &BlockHash) -> Option<Block> {
        (**self).block(hash)
    }

    fn previous(&self, block: &Block, count: u32) -> Option<Block> {
        (**self).previous(block, count)
    }

    fn previous_window(&self, block: &Block, count: u32) -> Option<Vec<Block>> {
        (**self).previous_window(block, count)
    }

    fn timestamps(&self, from_height: u32, to_height: u32, ascending: bool) -> Vec<u32> {
        (**self).timestamps(from_height, to_height, ascending)
    }
}
