use primitive_types::{U256, U512};
use tracing::debug;

use super::{clamp_timespan, helpers::BlockHelper, time_delta, BlockValidator, ValidationError};
use crate::{
    blockdata::block::Block,
    chain::BlockChainAccessor,
    consensus::Params,
    pow::{CompactTarget, Target},
};

/// Number of blocks the cw-144 algorithm averages over.
pub const DAA_HEIGHT_INTERVAL: u32 = 144;

/// Ancestors fetched before the previous block: the averaging interval plus
/// room for the first median-of-three.
const WINDOW_ANCESTORS: u32 = DAA_HEIGHT_INTERVAL + 2;

/// Bitcoin Cash cw-144 difficulty adjustment, run on every block.
///
/// The target follows the work done over the last 144 blocks divided by the
/// time it took, with both window ends anchored on a median-of-three block to
/// blunt timestamp games.
#[derive(Clone, Copy)]
pub struct DaaValidator<'a> {
    helper: BlockHelper<'a>,
    max_target: Target,
    target_spacing: u32,
    trusted_until: u32,
    activation_height: u32,
}

impl<'a> DaaValidator<'a> {
    pub fn new(accessor: &'a dyn BlockChainAccessor, params: &Params, checkpoint_height: u32) -> Self {
        DaaValidator {
            helper: BlockHelper::new(accessor),
            max_target: params.max_target(),
            target_spacing: params.pow_target_spacing,
            trusted_until: checkpoint_height.saturating_add(WINDOW_ANCESTORS),
            activation_height: params.daa_activation_height.unwrap_or_default(),
        }
    }

    /// Applies the rule once the previous block is at `height` or above.
    pub fn activated_at(mut self, height: u32) -> Self {
        self.activation_height = height;
        self
    }

    /// Computes the bits the block following `previous` must carry.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoPreviousBlock`] when fewer than 146 ancestors of
    /// `previous` are stored.
    pub fn expected_bits(&self, previous: &Block) -> Result<CompactTarget, ValidationError> {
        let mut window = self.helper.previous_window(previous, WINDOW_ANCESTORS)?;
        window.push(previous.clone());

        let missing = || ValidationError::NoPreviousBlock {
            height: previous.height().saturating_sub(WINDOW_ANCESTORS),
        };
        let first_index = window.get(..3).and_then(suitable_block).ok_or_else(missing)?;
        let last_start = window.len().saturating_sub(3);
        let last_index = window
            .get(last_start..)
            .and_then(suitable_block)
            .map(|index| last_start + index)
            .ok_or_else(missing)?;
        let (Some(first), Some(last)) = (window.get(first_index), window.get(last_index)) else {
            return Err(missing());
        };

        let timespan = clamp_timespan(
            time_delta(last.timestamp(), first.timestamp()),
            DAA_HEIGHT_INTERVAL / 2 * self.target_spacing,
            2 * DAA_HEIGHT_INTERVAL * self.target_spacing,
        );

        let mut work = U512::zero();
        for block in window.get(first_index + 1..=last_index).unwrap_or_default() {
            work = work.saturating_add(U512::from(block.target()?.to_work().as_u256()));
        }

        let projected = work
            .saturating_mul(U512::from(self.target_spacing))
            .checked_div(U512::from(timespan))
            .unwrap_or_default();
        let target = (U512::one() << 256)
            .checked_div(projected)
            .map(|quotient| quotient.saturating_sub(U512::one()))
            .and_then(|target| U256::try_from(target).ok())
            .map_or(self.max_target, Target::new)
            .min(self.max_target);

        let expected = target.to_compact();
        debug!(
            height = previous.height().saturating_add(1),
            first = first.height(),
            last = last.height(),
            timespan,
            %expected,
            "cw-144 retarget"
        );
        Ok(expected)
    }
}

/// Index of the median-by-timestamp block among three consecutive blocks.
///
/// Equal timestamps resolve to the block with the lowest height.
fn suitable_block(candidates: &[Block]) -> Option<usize> {
    let mut timestamps: Vec<u32> = candidates.iter().map(Block::timestamp).collect();
    if timestamps.len() != 3 {
        return None;
    }
    timestamps.sort_unstable();
    let median = timestamps.get(1)?;
    candidates.iter().position(|block| block.timestamp() == *median)
}

impl BlockValidator for DaaValidator<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        let expected = self.expected_bits(previous)?;
        if expected != block.bits() {
            return Err(ValidationError::NotEqualBits {
                expected,
                found: block.bits(),
            });
        }
        Ok(())
    }

    fn is_block_validatable(&self, _block: &Block, previous: &Block) -> bool {
        previous.height() >= self.trusted_until.max(self.activation_height)
    }
}
