use super::{BlockValidator, ValidationError};
use crate::blockdata::block::Block;

/// Requires the bits to carry over unchanged from the previous block.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitsValidator;

impl BitsValidator {
    pub fn new() -> Self {
        BitsValidator
    }
}

impl BlockValidator for BitsValidator {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        if block.bits() != previous.bits() {
            return Err(ValidationError::NotEqualBits {
                expected: previous.bits(),
                found: block.bits(),
            });
        }
        Ok(())
    }
}
