//! Fixtures shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use bitcoin::{hashes::Hash, TxMerkleNode};

use crate::{
    blockdata::block::{Block, BlockHash, BlockHeader},
    chain::{BlockChainAccessor, MemoryChain},
    pow::CompactTarget,
};

pub(crate) const GENESIS_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";
pub(crate) const BLOCK_1_HEX: &str = "010000006fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e61bc6649ffff001d01e36299";
pub(crate) const BLOCK_2_HEX: &str = "010000004860eb18bf1b1620e37e9490fc8a427514416fd75159ab86688e9a8300000000d5fdcc541e25de1c7a5addedf24858b8bb665c9f36ef744ee42c316022c90f9bb0bc6649ffff001d08d2bd61";
pub(crate) const BLOCK_100000_HEX: &str = "0100000050120119172a610421a6c3011dd330d9df07b63616c2cc1f1cd00200000000006657a9252aacd5c0b2940996ecff952228c3067cc38d4885efb5a4ac4247e9f337221b4d4c86041b0f2b5710";

fn real_block(hex: &str, height: u32) -> Block {
    Block::new(BlockHeader::from_hex(hex).unwrap(), height)
}

pub(crate) fn bitcoin_genesis() -> Block {
    real_block(GENESIS_HEX, 0)
}

pub(crate) fn bitcoin_block_1() -> Block {
    real_block(BLOCK_1_HEX, 1)
}

pub(crate) fn bitcoin_block_2() -> Block {
    real_block(BLOCK_2_HEX, 2)
}

pub(crate) fn bitcoin_block_100000() -> Block {
    real_block(BLOCK_100000_HEX, 100_000)
}

/// A synthetic block linked to `parent`. The nonce is the height so sibling
/// blocks with equal fields still hash differently.
pub(crate) fn child(parent: &Block, timestamp: u32, bits: u32) -> Block {
    let height = parent.height() + 1;
    let header = BlockHeader::new(
        1,
        parent.hash(),
        TxMerkleNode::all_zeros(),
        timestamp,
        CompactTarget::new(bits),
        height,
    );
    Block::new(header, height)
}

/// Builds a linked run of synthetic blocks starting at `start_height`.
pub(crate) struct ChainBuilder {
    start_height: u32,
    default_bits: u32,
    timestamps: Vec<u32>,
    bits: Vec<Option<u32>>,
}

impl ChainBuilder {
    pub(crate) fn new(start_height: u32, default_bits: u32) -> Self {
        ChainBuilder {
            start_height,
            default_bits,
            timestamps: Vec::new(),
            bits: Vec::new(),
        }
    }

    /// One block per timestamp.
    pub(crate) fn timestamps(mut self, timestamps: &[u32]) -> Self {
        self.timestamps = timestamps.to_vec();
        self.bits = vec![None; timestamps.len()];
        self
    }

    /// `count` blocks, `spacing` seconds apart.
    pub(crate) fn spaced(self, count: u32, start_time: u32, spacing: u32) -> Self {
        let timestamps: Vec<u32> = (0..count).map(|i| start_time + i * spacing).collect();
        self.timestamps(&timestamps)
    }

    /// Overrides the bits of every block, oldest first.
    pub(crate) fn all_bits(mut self, bits: &[u32]) -> Self {
        assert_eq!(bits.len(), self.timestamps.len());
        self.bits = bits.iter().copied().map(Some).collect();
        self
    }

    pub(crate) fn blocks(&self) -> Vec<Block> {
        let mut blocks: Vec<Block> = Vec::with_capacity(self.timestamps.len());
        for (index, timestamp) in self.timestamps.iter().enumerate() {
            let height = self.start_height + index as u32;
            let bits = CompactTarget::new(self.bits[index].unwrap_or(self.default_bits));
            let previous = blocks.last().map_or_else(BlockHash::all_zeros, Block::hash);
            let header = BlockHeader::new(1, previous, TxMerkleNode::all_zeros(), *timestamp, bits, height);
            blocks.push(Block::new(header, height));
        }
        blocks
    }

    pub(crate) fn build(&self) -> MemoryChain {
        self.blocks().into_iter().collect()
    }
}

/// Wraps an accessor and counts every query made through it.
pub(crate) struct CountingAccessor<A> {
    inner: A,
    calls: AtomicUsize,
}

impl<A> CountingAccessor<A> {
    pub(crate) fn new(inner: A) -> Self {
        CountingAccessor {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<A: BlockChainAccessor> BlockChainAccessor for CountingAccessor<A> {
    fn block(&self, hash: &BlockHash) -> Option<Block> {
        self.record();
        self.inner.block(hash)
    }

    fn previous(&self, block: &Block, count: u32) -> Option<Block> {
        self.record();
        self.inner.previous(block, count)
    }

    fn previous_window(&self, block: &Block, count: u32) -> Option<Vec<Block>> {
        self.record();
        self.inner.previous_window(block, count)
    }

    fn timestamps(&self, from_height: u32, to_height: u32, ascending: bool) -> Vec<u32> {
        self.record();
        self.inner.timestamps(from_height, to_height, ascending)
    }
}
