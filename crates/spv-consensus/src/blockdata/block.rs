mod header;

pub use bitcoin::block::BlockHash;
pub use header::{BlockHeader, HeaderDecodeError, InnerBitcoinHeader};

use crate::pow::{CompactTarget, Target};

/// A header placed in the chain.
///
/// A `Block` contains:
/// - The header as received from the network
/// - Its height, which is the only ordering key validators rely on
/// - The hash identifying it, which is also the hash its proof of work is
///   checked against
///
/// The link to the previous block is the header's `prev_blockhash`, resolved
/// through a [`BlockChainAccessor`](crate::chain::BlockChainAccessor) rather
/// than held as a pointer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    header: BlockHeader,
    hash: BlockHash,
    height: u32,
}

impl Block {
    /// Creates a block whose hash is the double-SHA256 of its header.
    pub fn new(header: BlockHeader, height: u32) -> Self {
        let hash = header.block_hash();
        Block {
            header,
            hash,
            height,
        }
    }

    /// Creates a block with a hash supplied by the caller.
    ///
    /// Chains that do not hash headers with double-SHA256 (Dash uses X11)
    /// compute the hash in the wire layer and hand it over here.
    pub fn with_hash(header: BlockHeader, hash: BlockHash, height: u32) -> Self {
        Block {
            header,
            hash,
            height,
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn hash(&self) -> BlockHash {
        self.hash
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn previous_hash(&self) -> BlockHash {
        self.header.prev_blockhash()
    }

    pub fn timestamp(&self) -> u32 {
        self.header.time()
    }

    pub fn bits(&self) -> CompactTarget {
        self.header.bits()
    }

    /// Decodes the block's declared target.
    pub fn target(&self) -> Result<Target, crate::pow::CompactTargetError> {
        Target::from_compact(self.bits())
    }
}
