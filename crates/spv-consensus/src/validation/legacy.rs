use tracing::{debug, trace};

use super::{clamp_timespan, helpers::BlockHelper, time_delta, BlockValidator, ValidationError};
use crate::{
    blockdata::block::Block,
    chain::BlockChainAccessor,
    consensus::Params,
    pow::{CompactTarget, Target},
};

/// Bitcoin's two-week retarget, applied on every `retarget_interval` boundary.
#[derive(Clone, Copy)]
pub struct LegacyDifficultyAdjustmentValidator<'a> {
    helper: BlockHelper<'a>,
    max_target_bits: CompactTarget,
    height_interval: u32,
    target_timespan: u32,
}

impl<'a> LegacyDifficultyAdjustmentValidator<'a> {
    pub fn new(accessor: &'a dyn BlockChainAccessor, params: &Params) -> Self {
        LegacyDifficultyAdjustmentValidator {
            helper: BlockHelper::new(accessor),
            max_target_bits: params.max_target_bits,
            height_interval: params.retarget_interval,
            target_timespan: params.pow_target_timespan(),
        }
    }

    /// Computes the bits a retarget block following `previous` must carry.
    ///
    /// # Errors
    ///
    /// [`ValidationError::NoPreviousBlock`] when the first block of the period
    /// is not stored.
    pub fn expected_bits(&self, previous: &Block) -> Result<CompactTarget, ValidationError> {
        let first = self
            .helper
            .previous(previous, self.height_interval.saturating_sub(1))?;

        let timespan = clamp_timespan(
            time_delta(previous.timestamp(), first.timestamp()),
            self.target_timespan / 4,
            self.target_timespan.saturating_mul(4),
        );

        let target = Target::from_compact(previous.bits())?;
        let retarget = target
            .scale(timespan, u64::from(self.target_timespan))
            .to_compact();

        // Raw compact comparison, as the network has always done it
        let expected = retarget.min(self.max_target_bits);
        debug!(
            height = previous.height().saturating_add(1),
            timespan,
            %expected,
            "legacy retarget"
        );
        Ok(expected)
    }
}

impl BlockValidator for LegacyDifficultyAdjustmentValidator<'_> {
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
        self.height_interval != 0 && block.height() % self.height_interval == 0
    }
}

/// Testnet minimum-difficulty rule.
///
/// A block arriving within two target spacings of its parent must carry the
/// bits of the last block that was not mined at minimum difficulty. Slower
/// blocks are not constrained here.
#[derive(Clone, Copy)]
pub struct LegacyTestNetDifficultyValidator<'a> {
    helper: BlockHelper<'a>,
    max_target_bits: CompactTarget,
    height_interval: u32,
    target_spacing: u32,
    activation_time: u32,
}

impl<'a> LegacyTestNetDifficultyValidator<'a> {
    pub fn new(accessor: &'a dyn BlockChainAccessor, params: &Params) -> Self {
        LegacyTestNetDifficultyValidator {
            helper: BlockHelper::new(accessor),
            max_target_bits: params.max_target_bits,
            height_interval: params.retarget_interval,
            target_spacing: params.pow_target_spacing,
            activation_time: params.min_difficulty_activation_time.unwrap_or_default(),
        }
    }

    fn is_retarget_height(&self, height: u32) -> bool {
        self.height_interval == 0 || height % self.height_interval == 0
    }
}

impl BlockValidator for LegacyTestNetDifficultyValidator<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        let gap = time_delta(block.timestamp(), previous.timestamp());
        let window = i64::from(self.target_spacing).saturating_mul(2);
        if !(0..=window).contains(&gap) {
            trace!(height = block.height(), gap, "slow testnet block, bits unconstrained");
            return Ok(());
        }

        let mut cursor = previous.clone();
        while !self.is_retarget_height(cursor.height()) && cursor.bits() == self.max_target_bits {
            cursor = self.helper.previous(&cursor, 1)?;
        }

        if cursor.bits() != block.bits() {
            return Err(ValidationError::NotEqualBits {
                expected: cursor.bits(),
                found: block.bits(),
            });
        }
        Ok(())
    }

    fn is_block_validatable(&self, _block: &Block, previous: &Block) -> bool {
        previous.timestamp() > self.activation_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        chain::MemoryChain,
        test_utils::{child, ChainBuilder},
    };

    const PERIOD_START: u32 = 40_320;
    const BOUNDARY: u32 = 42_336;
    const START_TIME: u32 = 1_300_000_000;

    /// One full retarget period starting at `start_height`. Only the first and
    /// last timestamps matter to the rule; the rest are spread evenly.
    fn period_at(start_height: u32, bits: u32, first_time: u32, last_time: u32) -> (Block, MemoryChain) {
        let span = u64::from(last_time - first_time);
        let timestamps: Vec<u32> = (0..2016u64)
            .map(|i| first_time + u32::try_from(span * i / 2015).unwrap())
            .collect();
        let builder = ChainBuilder::new(start_height, bits).timestamps(&timestamps);
        let blocks = builder.blocks();
        let previous = blocks.last().unwrap().clone();
        (previous, blocks.into_iter().collect())
    }

    /// One full retarget period whose last block is `timespan` seconds after
    /// its first.
    fn period(bits: u32, timespan: u32) -> (Block, MemoryChain) {
        period_at(PERIOD_START, bits, START_TIME, START_TIME + timespan)
    }

    #[test]
    fn test_bitcoin_mainnet_retargets() {
        // Heights, bits and timestamps of real mainnet period boundaries:
        // (first block height, bits, first block time, last block time, next bits)
        let periods = [
            (0, 0x1d00ffff, 1_231_006_505, 1_233_061_996, 0x1d00ffff),
            (30_240, 0x1d00ffff, 1_261_130_161, 1_262_152_739, 0x1d00d86a),
            (66_528, 0x1c05a3f4, 1_279_008_237, 1_279_297_671, 0x1c0168fd),
        ];

        for (start_height, bits, first_time, last_time, next_bits) in periods {
            let (previous, chain) = period_at(start_height, bits, first_time, last_time);
            let validator = LegacyDifficultyAdjustmentValidator::new(&chain, &Params::BITCOIN_MAINNET);

            let block = child(&previous, last_time + 600, next_bits);
            assert_eq!(block.height(), start_height + 2016);
            assert!(validator.is_block_validatable(&block, &previous));
            assert_eq!(validator.validate(&block, &previous), Ok(()), "retarget at {}", block.height());
        }
    }

    #[test]
    fn test_retarget_matches_computed_bits() {
        let (previous, chain) = period(0x1c654657, 800_000);
        assert_eq!(previous.height(), BOUNDARY - 1);
        let validator = LegacyDifficultyAdjustmentValidator::new(&chain, &Params::BITCOIN_MAINNET);

        let block = child(&previous, previous.timestamp() + 600, 0x1c42fb0c);
        assert!(validator.is_block_validatable(&block, &previous));
        assert_eq!(validator.validate(&block, &previous), Ok(()));

        let wrong = child(&previous, previous.timestamp() + 600, 0x1c654657);
        assert_eq!(
            validator.validate(&wrong, &previous),
            Err(ValidationError::NotDifficultyTransitionEqualBits {
                expected: CompactTarget::new(0x1c42fb0c),
                found: CompactTarget::new(0x1c654657),
            })
        );
    }

    #[test]
    fn test_retarget_clamps_timespan() {
        let (previous, chain) = period(0x1c654657, 100_000);
        let validator = LegacyDifficultyAdjustmentValidator::new(&chain, &Params::BITCOIN_MAINNET);
        assert_eq!(
            validator.expected_bits(&previous),
            Ok(CompactTarget::new(0x1c195195))
        );
    }

    #[test]
    fn test_retarget_never_exceeds_max_target() {
        let (previous, chain) = period(0x1d00ffff, 5 * 1_209_600);
        let validator = LegacyDifficultyAdjustmentValidator::new(&chain, &Params::BITCOIN_MAINNET);
        assert_eq!(
            validator.expected_bits(&previous),
            Ok(CompactTarget::new(0x1d00ffff))
        );
    }

    #[test]
    fn test_retarget_without_period_start_fails() {
        let builder = ChainBuilder::new(BOUNDARY - 10, 0x1c654657).spaced(10, START_TIME, 600);
        let chain = builder.build();
        let previous = builder.blocks().pop().unwrap();
        let validator = LegacyDifficultyAdjustmentValidator::new(&chain, &Params::BITCOIN_MAINNET);

        let block = child(&previous, previous.timestamp() + 600, 0x1c654657);
        assert_eq!(
            validator.validate(&block, &previous),
            Err(ValidationError::NoPreviousBlock {
                height: PERIOD_START
            })
        );
    }

    #[test]
    fn test_retarget_only_on_boundaries() {
        let builder = ChainBuilder::new(BOUNDARY - 2, 0x1c654657).spaced(2, START_TIME, 600);
        let chain = builder.build();
        let blocks = builder.blocks();
        let validator = LegacyDifficultyAdjustmentValidator::new(&chain, &Params::BITCOIN_MAINNET);

        assert!(!validator.is_block_validatable(&blocks[1], &blocks[0]));
        let boundary = child(&blocks[1], START_TIME + 1200, 0x1c654657);
        assert!(validator.is_block_validatable(&boundary, &blocks[1]));
    }

    const TESTNET_TIME: u32 = 1_400_000_000;
    const REAL_BITS: u32 = 0x1c0fffff;
    const MIN_BITS: u32 = 0x1d00ffff;

    fn testnet_run(start_height: u32, bits: &[u32]) -> (Block, MemoryChain) {
        let count = u32::try_from(bits.len()).unwrap();
        let builder = ChainBuilder::new(start_height, MIN_BITS)
            .spaced(count, TESTNET_TIME, 1_500)
            .all_bits(bits);
        let blocks = builder.blocks();
        let previous = blocks.last().unwrap().clone();
        (previous, blocks.into_iter().collect())
    }

    #[test]
    fn test_testnet_fast_block_inherits_last_real_bits() {
        let (previous, chain) = testnet_run(20_160, &[REAL_BITS, MIN_BITS, MIN_BITS]);
        let validator = LegacyTestNetDifficultyValidator::new(&chain, &Params::BITCOIN_TESTNET);

        let block = child(&previous, previous.timestamp() + 300, REAL_BITS);
        assert!(validator.is_block_validatable(&block, &previous));
        assert_eq!(validator.validate(&block, &previous), Ok(()));

        let easy = child(&previous, previous.timestamp() + 300, MIN_BITS);
        assert_eq!(
            validator.validate(&easy, &previous),
            Err(ValidationError::NotEqualBits {
                expected: CompactTarget::new(REAL_BITS),
                found: CompactTarget::new(MIN_BITS),
            })
        );
    }

    #[test]
    fn test_testnet_walk_stops_at_retarget_height() {
        let (previous, chain) = testnet_run(20_160, &[MIN_BITS, MIN_BITS, MIN_BITS]);
        let validator = LegacyTestNetDifficultyValidator::new(&chain, &Params::BITCOIN_TESTNET);

        let block = child(&previous, previous.timestamp() + 1_200, MIN_BITS);
        assert_eq!(validator.validate(&block, &previous), Ok(()));
    }

    #[test]
    fn test_testnet_slow_block_is_unconstrained() {
        let (previous, chain) = testnet_run(20_160, &[REAL_BITS, MIN_BITS]);
        let validator = LegacyTestNetDifficultyValidator::new(&chain, &Params::BITCOIN_TESTNET);

        let slow = child(&previous, previous.timestamp() + 1_201, 0x1b00ffff);
        assert_eq!(validator.validate(&slow, &previous), Ok(()));

        let backwards = child(&previous, previous.timestamp() - 1, 0x1b00ffff);
        assert_eq!(validator.validate(&backwards, &previous), Ok(()));
    }

    #[test]
    fn test_testnet_walk_needs_history() {
        let (previous, chain) = testnet_run(20_161, &[MIN_BITS, MIN_BITS]);
        let validator = LegacyTestNetDifficultyValidator::new(&chain, &Params::BITCOIN_TESTNET);

        let block = child(&previous, previous.timestamp() + 600, MIN_BITS);
        assert_eq!(
            validator.validate(&block, &previous),
            Err(ValidationError::NoPreviousBlock { height: 20_160 })
        );
    }

    #[test]
    fn test_testnet_rule_waits_for_activation() {
        let builder = ChainBuilder::new(100, MIN_BITS).spaced(1, 1_329_264_000, 600);
        let chain = builder.build();
        let previous = builder.blocks().pop().unwrap();
        let validator = LegacyTestNetDifficultyValidator::new(&chain, &Params::BITCOIN_TESTNET);

        let block = child(&previous, previous.timestamp() + 600, MIN_BITS);
        assert!(!validator.is_block_validatable(&block, &previous));
    }
}
