use bitcoin::hashes::Hash;

use super::{BlockValidator, ValidationError};
use crate::{blockdata::block::Block, pow::Target};

/// Checks that the header hash satisfies the block's own target.
///
/// The target is what the header claims; whether that claim is the right
/// difficulty is left to the retarget rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProofOfWorkValidator;

impl ProofOfWorkValidator {
    pub fn new() -> Self {
        ProofOfWorkValidator
    }
}

impl BlockValidator for ProofOfWorkValidator {
    fn validate(&self, block: &Block, _previous: &Block) -> Result<(), ValidationError> {
        let invalid = || ValidationError::InvalidProofOfWork {
            hash: block.hash(),
            bits: block.bits(),
        };

        // Negative or overflowing targets can never be met
        let target = block.target().map_err(|_| invalid())?;
        let hash = Target::from_le_bytes(block.hash().as_byte_array());
        if hash >= target {
            return Err(invalid());
        }
        Ok(())
    }
}
