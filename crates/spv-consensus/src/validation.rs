//! Header validation.
//!
//! Every rule implements [`BlockValidator`]: a pure function of the candidate
//! block, its already-accepted predecessor and whatever ancestors the rule
//! pulls from a [`BlockChainAccessor`](crate::chain::BlockChainAccessor).
//! Rules are composed with [`BlockValidatorChain`] (first applicable rule
//! runs) and [`BlockValidatorSet`] (every member runs, first failure wins).

mod bits;
mod composite;
mod daa;
mod dark_gravity_wave;
mod eda;
mod helpers;
mod legacy;
pub mod network;
mod proof_of_work;

pub use bits::BitsValidator;
pub use composite::{BlockValidatorChain, BlockValidatorSet, ChainedValidator, SetValidator};
pub use daa::{DaaValidator, DAA_HEIGHT_INTERVAL};
pub use dark_gravity_wave::{DarkGravityWaveTestNetValidator, DarkGravityWaveValidator};
pub use eda::EdaValidator;
pub use helpers::{BitcoinCashHelper, BlockHelper, MEDIAN_TIME_SPAN};
pub use legacy::{LegacyDifficultyAdjustmentValidator, LegacyTestNetDifficultyValidator};
pub use network::validator_set;
pub use proof_of_work::ProofOfWorkValidator;

use thiserror::Error;

use crate::{
    blockdata::block::{Block, BlockHash},
    pow::{CompactTarget, CompactTargetError},
};

/// Reasons a candidate header is rejected.
///
/// All of them are final for the candidate: the caller discards it and decides
/// whether to penalize the peer that sent it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// An ancestor the rule needs is not stored.
    #[error("no previous block available at height {height}")]
    NoPreviousBlock { height: u32 },

    /// The block's bits differ from the value carried over by the rule.
    #[error("bits mismatch: expected {expected}, found {found}")]
    NotEqualBits {
        expected: CompactTarget,
        found: CompactTarget,
    },

    /// The block's bits differ from the retarget computed for it.
    #[error("difficulty transition mismatch: expected {expected}, found {found}")]
    NotDifficultyTransitionEqualBits {
        expected: CompactTarget,
        found: CompactTarget,
    },

    /// The header hash does not satisfy the block's own target.
    #[error("block {hash} does not meet its target {bits}")]
    InvalidProofOfWork { hash: BlockHash, bits: CompactTarget },

    /// The trusted checkpoint block is not stored.
    #[error("checkpoint block {hash} is not available")]
    NoCheckpointBlock { hash: BlockHash },

    /// Stored ancestor bits cannot be decoded.
    #[error(transparent)]
    InvalidCompactTarget(#[from] CompactTargetError),
}

/// A single header validation rule.
pub trait BlockValidator {
    /// Checks `block` against its predecessor `previous`.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing the first violated condition.
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError>;

    /// Whether the rule governs `block`. A [`BlockValidatorChain`] runs only the
    /// first of its rules that answers `true`.
    fn is_block_validatable(&self, _block: &Block, _previous: &Block) -> bool {
        true
    }
}

/// Signed difference `later - earlier` between two header timestamps.
pub(crate) fn time_delta(later: u32, earlier: u32) -> i64 {
    i64::from(later) - i64::from(earlier)
}

/// Clamps a signed timespan and converts it for target scaling.
pub(crate) fn clamp_timespan(timespan: i64, min: u32, max: u32) -> u64 {
    timespan.clamp(i64::from(min), i64::from(max)).unsigned_abs()
}
