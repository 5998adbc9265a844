use tracing::debug;

use super::{helpers::BitcoinCashHelper, time_delta, BlockValidator, ValidationError};
use crate::{
    blockdata::block::Block,
    chain::BlockChainAccessor,
    consensus::Params,
    pow::{CompactTarget, Target},
};

/// Median-time-past gap that triggers an emergency adjustment.
const EMERGENCY_GAP: i64 = 12 * 60 * 60;

/// Depth of the median-time-past comparison.
const LOOKBACK: u32 = 6;

/// Bitcoin Cash Emergency Difficulty Adjustment.
///
/// When the median time past has advanced twelve hours or more over the last
/// six blocks, the target eases by a quarter. Otherwise the bits stay as they
/// were.
#[derive(Clone, Copy)]
pub struct EdaValidator<'a> {
    helper: BitcoinCashHelper<'a>,
    max_target_bits: CompactTarget,
    trusted_until: u32,
    activation_height: u32,
}

impl<'a> EdaValidator<'a> {
    /// The rule starts once the previous block is six above the checkpoint,
    /// so the six-block lookback never leaves trusted history.
    pub fn new(accessor: &'a dyn BlockChainAccessor, params: &Params, checkpoint_height: u32) -> Self {
        EdaValidator {
            helper: BitcoinCashHelper::new(accessor),
            max_target_bits: params.max_target_bits,
            trusted_until: checkpoint_height.saturating_add(LOOKBACK),
            activation_height: params
                .eda_activation_height
                .map_or(0, |height| height.saturating_add(1)),
        }
    }

    /// Applies the rule only to blocks above `height`.
    pub fn activated_after(mut self, height: u32) -> Self {
        self.activation_height = height.saturating_add(1);
        self
    }

    fn expected_bits(&self, previous: &Block) -> Result<CompactTarget, ValidationError> {
        let cursor = self.helper.previous(previous, LOOKBACK)?;
        let gap = time_delta(
            self.helper.median_time_past(previous),
            self.helper.median_time_past(&cursor),
        );
        if gap < EMERGENCY_GAP {
            return Ok(previous.bits());
        }

        let target = Target::from_compact(previous.bits())?.as_u256();
        let eased = Target::new(target.saturating_add(target >> 2)).to_compact();
        debug!(height = previous.height().saturating_add(1), gap, %eased, "emergency difficulty adjustment");
        Ok(eased.min(self.max_target_bits))
    }
}

impl BlockValidator for EdaValidator<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        let expected = if previous.bits() == self.max_target_bits {
            self.max_target_bits
        } else {
            self.expected_bits(previous)?
        };

        if expected != block.bits() {
            return Err(ValidationError::NotEqualBits {
                expected,
                found: block.bits(),
            });
        }
        Ok(())
    }

    fn is_block_validatable(&self, block: &Block, previous: &Block) -> bool {
        previous.height() >= self.trusted_until && block.height() >= self.activation_height
    }
}
