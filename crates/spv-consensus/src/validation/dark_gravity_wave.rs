use primitive_types::{U256, U512};
use tracing::{debug, trace};

use super::{clamp_timespan, helpers::BlockHelper, time_delta, BlockValidator, ValidationError};
use crate::{
    blockdata::block::Block,
    chain::BlockChainAccessor,
    consensus::Params,
    pow::{CompactTarget, Target},
};

/// Dash DarkGravityWave v3, a per-block retarget over the last
/// `retarget_interval` blocks.
#[derive(Clone, Copy)]
pub struct DarkGravityWaveValidator<'a> {
    helper: BlockHelper<'a>,
    max_target_bits: CompactTarget,
    past_blocks: u32,
    target_timespan: u32,
    trusted_until: u32,
    activation_height: u32,
}

impl<'a> DarkGravityWaveValidator<'a> {
    pub fn new(accessor: &'a dyn BlockChainAccessor, params: &Params, checkpoint_height: u32) -> Self {
        DarkGravityWaveValidator {
            helper: BlockHelper::new(accessor),
            max_target_bits: params.max_target_bits,
            past_blocks: params.retarget_interval,
            target_timespan: params.pow_target_timespan(),
            trusted_until: checkpoint_height.saturating_add(params.retarget_interval),
            activation_height: params.dgw_activation_height.unwrap_or_default(),
        }
    }

    /// Applies the rule from `height` on.
    pub fn activated_at(mut self, height: u32) -> Self {
        self.activation_height = height;
        self
    }

    /// Computes the bits the block following `previous` must carry.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoPreviousBlock`] on the first gap in the walk back.
    pub fn expected_bits(&self, previous: &Block) -> Result<CompactTarget, ValidationError> {
        let mut cursor = previous.clone();
        let mut average = U512::from(previous.target()?.as_u256());

        // Each step weighs the running average by the number of blocks in it
        for count in 2..=self.past_blocks {
            cursor = self.helper.previous(&cursor, 1)?;
            let target = U512::from(cursor.target()?.as_u256());
            let count = U512::from(count);
            average = average
                .saturating_mul(count)
                .saturating_add(target)
                .checked_div(count.saturating_add(U512::one()))
                .unwrap_or_default();
        }
        trace!(oldest = cursor.height(), "dark gravity wave window");

        let timespan = clamp_timespan(
            time_delta(previous.timestamp(), cursor.timestamp()),
            self.target_timespan / 3,
            self.target_timespan.saturating_mul(3),
        );

        let average = U256::try_from(average).map_or(Target::MAX, Target::new);
        let expected = average
            .scale(timespan, u64::from(self.target_timespan))
            .to_compact()
            .min(self.max_target_bits);
        debug!(
            height = previous.height().saturating_add(1),
            timespan,
            %expected,
            "dark gravity wave retarget"
        );
        Ok(expected)
    }
}

impl BlockValidator for DarkGravityWaveValidator<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        let expected = self.expected_bits(previous)?;
        if expected != block.bits() {
            return Err(ValidationError::NotDifficultyTransitionEqualBits {
                expected,
                found: block.bits(),
            });
        }
        Ok(())
    }

    fn is_block_validatable(&self, block: &Block, _previous: &Block) -> bool {
        block.height() >= self.trusted_until.max(self.activation_height)
    }
}

/// Dash testnet relief for stalled chains.
///
/// Applies once a block comes more than four spacings after its parent. After
/// two full retarget timespans the target resets to the network maximum,
/// before that it eases tenfold.
#[derive(Debug, Clone, Copy)]
pub struct DarkGravityWaveTestNetValidator {
    max_target_bits: CompactTarget,
    target_spacing: u32,
    target_timespan: u32,
}

impl DarkGravityWaveTestNetValidator {
    pub fn new(params: &Params) -> Self {
        DarkGravityWaveTestNetValidator {
            max_target_bits: params.max_target_bits,
            target_spacing: params.pow_target_spacing,
            target_timespan: params.pow_target_timespan(),
        }
    }

    fn gap(block: &Block, previous: &Block) -> i64 {
        time_delta(block.timestamp(), previous.timestamp())
    }
}

impl BlockValidator for DarkGravityWaveTestNetValidator {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        let expected = if Self::gap(block, previous) > i64::from(self.target_timespan) * 2 {
            self.max_target_bits
        } else {
            Target::from_compact(previous.bits())?
                .scale(10, 1)
                .to_compact()
                .min(self.max_target_bits)
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
        Self::gap(block, previous) > i64::from(self.target_spacing) * 4
    }
}
