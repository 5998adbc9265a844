//! Bitcoin-layout block header.
//!
//! Every supported chain (Bitcoin, Bitcoin Cash, Dash) shares the 80-byte
//! header layout, so a single wrapper over the `bitcoin` crate header serves
//! all of them. Chain-specific hashing lives with [`Block`](super::Block).

use bitcoin::block::{BlockHash, Version};
use bitcoin::consensus::{deserialize, serialize};
pub use bitcoin::blockdata::block::Header as InnerBitcoinHeader;
use bitcoin::TxMerkleNode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pow::CompactTarget;

/// Errors raised while parsing a serialized header.
#[derive(Debug, Error)]
pub enum HeaderDecodeError {
    #[error("invalid header hex: {0}")]
    Hex(#[from] hex::FromHexError),
    #[error("invalid header encoding: {0}")]
    Encoding(#[from] bitcoin::consensus::encode::Error),
}

/// A wrapper around Bitcoin's standard block header.
///
/// The header contains all the standard fields:
/// - Version number
/// - Previous block hash
/// - Merkle root of transactions
/// - Timestamp
/// - Difficulty target (compact format)
/// - Nonce
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockHeader(InnerBitcoinHeader);

impl BlockHeader {
    /// The size of a serialized header in bytes.
    pub const SIZE: usize = InnerBitcoinHeader::SIZE;

    /// Builds a header from its fields.
    pub fn new(
        version: i32,
        prev_blockhash: BlockHash,
        merkle_root: TxMerkleNode,
        time: u32,
        bits: CompactTarget,
        nonce: u32,
    ) -> Self {
        BlockHeader(InnerBitcoinHeader {
            version: Version::from_consensus(version),
            prev_blockhash,
            merkle_root,
            time,
            bits: bits.into(),
            nonce,
        })
    }

    /// Parses the 80-byte consensus serialization.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HeaderDecodeError> {
        Ok(BlockHeader(deserialize(bytes)?))
    }

    /// Parses the hex form of the consensus serialization.
    pub fn from_hex(hex: &str) -> Result<Self, HeaderDecodeError> {
        Self::from_bytes(&hex::decode(hex.trim())?)
    }

    /// Returns the consensus serialization.
    pub fn to_bytes(&self) -> Vec<u8> {
        serialize(&self.0)
    }

    /// Computes the double-SHA256 header hash.
    pub fn block_hash(&self) -> BlockHash {
        self.0.block_hash()
    }

    pub fn version(&self) -> i32 {
        self.0.version.to_consensus()
    }

    pub fn prev_blockhash(&self) -> BlockHash {
        self.0.prev_blockhash
    }

    pub fn merkle_root(&self) -> TxMerkleNode {
        self.0.merkle_root
    }

    pub fn time(&self) -> u32 {
        self.0.time
    }

    pub fn bits(&self) -> CompactTarget {
        self.0.bits.into()
    }

    pub fn nonce(&self) -> u32 {
        self.0.nonce
    }
}

impl From<InnerBitcoinHeader> for BlockHeader {
    fn from(header: InnerBitcoinHeader) -> Self {
        BlockHeader(header)
    }
}

impl From<BlockHeader> for InnerBitcoinHeader {
    fn from(header: BlockHeader) -> Self {
        header.0
    }
}
