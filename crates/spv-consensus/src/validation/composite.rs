use tracing::{debug, warn};

use super::{
    BitsValidator, BlockValidator, DaaValidator, DarkGravityWaveTestNetValidator,
    DarkGravityWaveValidator, EdaValidator, LegacyDifficultyAdjustmentValidator,
    LegacyTestNetDifficultyValidator, ProofOfWorkValidator, ValidationError,
};
use crate::blockdata::block::Block;

/// The difficulty rules a [`BlockValidatorChain`] can select from.
#[derive(Clone, Copy)]
pub enum ChainedValidator<'a> {
    Bits(BitsValidator),
    LegacyDifficultyAdjustment(LegacyDifficultyAdjustmentValidator<'a>),
    LegacyTestNet(LegacyTestNetDifficultyValidator<'a>),
    Eda(EdaValidator<'a>),
    Daa(DaaValidator<'a>),
    DarkGravityWave(DarkGravityWaveValidator<'a>),
    DarkGravityWaveTestNet(DarkGravityWaveTestNetValidator),
}

impl ChainedValidator<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            ChainedValidator::Bits(_) => "bits",
            ChainedValidator::LegacyDifficultyAdjustment(_) => "legacy-difficulty-adjustment",
            ChainedValidator::LegacyTestNet(_) => "legacy-testnet",
            ChainedValidator::Eda(_) => "eda",
            ChainedValidator::Daa(_) => "daa",
            ChainedValidator::DarkGravityWave(_) => "dark-gravity-wave",
            ChainedValidator::DarkGravityWaveTestNet(_) => "dark-gravity-wave-testnet",
        }
    }

    fn as_validator(&self) -> &dyn BlockValidator {
        match self {
            ChainedValidator::Bits(validator) => validator,
            ChainedValidator::LegacyDifficultyAdjustment(validator) => validator,
            ChainedValidator::LegacyTestNet(validator) => validator,
            ChainedValidator::Eda(validator) => validator,
            ChainedValidator::Daa(validator) => validator,
            ChainedValidator::DarkGravityWave(validator) => validator,
            ChainedValidator::DarkGravityWaveTestNet(validator) => validator,
        }
    }
}

impl BlockValidator for ChainedValidator<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        self.as_validator().validate(block, previous)
    }

    fn is_block_validatable(&self, block: &Block, previous: &Block) -> bool {
        self.as_validator().is_block_validatable(block, previous)
    }
}

impl From<BitsValidator> for ChainedValidator<'_> {
    fn from(validator: BitsValidator) -> Self {
        ChainedValidator::Bits(validator)
    }
}

impl<'a> From<LegacyDifficultyAdjustmentValidator<'a>> for ChainedValidator<'a> {
    fn from(validator: LegacyDifficultyAdjustmentValidator<'a>) -> Self {
        ChainedValidator::LegacyDifficultyAdjustment(validator)
    }
}

impl<'a> From<LegacyTestNetDifficultyValidator<'a>> for ChainedValidator<'a> {
    fn from(validator: LegacyTestNetDifficultyValidator<'a>) -> Self {
        ChainedValidator::LegacyTestNet(validator)
    }
}

impl<'a> From<EdaValidator<'a>> for ChainedValidator<'a> {
    fn from(validator: EdaValidator<'a>) -> Self {
        ChainedValidator::Eda(validator)
    }
}

impl<'a> From<DaaValidator<'a>> for ChainedValidator<'a> {
    fn from(validator: DaaValidator<'a>) -> Self {
        ChainedValidator::Daa(validator)
    }
}

impl<'a> From<DarkGravityWaveValidator<'a>> for ChainedValidator<'a> {
    fn from(validator: DarkGravityWaveValidator<'a>) -> Self {
        ChainedValidator::DarkGravityWave(validator)
    }
}

impl From<DarkGravityWaveTestNetValidator> for ChainedValidator<'_> {
    fn from(validator: DarkGravityWaveTestNetValidator) -> Self {
        ChainedValidator::DarkGravityWaveTestNet(validator)
    }
}

/// Runs the first of its validators that applies to the block.
///
/// Register the most specific rule first. A block no rule applies to passes.
#[derive(Clone, Default)]
pub struct BlockValidatorChain<'a> {
    validators: Vec<ChainedValidator<'a>>,
}

impl<'a> BlockValidatorChain<'a> {
    pub fn new(validators: Vec<ChainedValidator<'a>>) -> Self {
        BlockValidatorChain { validators }
    }

    pub fn validators(&self) -> &[ChainedValidator<'a>] {
        &self.validators
    }

    /// The validator that would run for `block`, if any.
    pub fn select(&self, block: &Block, previous: &Block) -> Option<&ChainedValidator<'a>> {
        self.validators
            .iter()
            .find(|validator| validator.is_block_validatable(block, previous))
    }
}

impl BlockValidator for BlockValidatorChain<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        let Some(validator) = self.select(block, previous) else {
            debug!(height = block.height(), "no difficulty rule applies");
            return Ok(());
        };
        debug!(height = block.height(), validator = validator.name(), "validating bits");
        validator.validate(block, previous)
    }
}

/// Members of a [`BlockValidatorSet`].
#[derive(Clone)]
pub enum SetValidator<'a> {
    ProofOfWork(ProofOfWorkValidator),
    Chain(BlockValidatorChain<'a>),
}

impl SetValidator<'_> {
    fn as_validator(&self) -> &dyn BlockValidator {
        match self {
            SetValidator::ProofOfWork(validator) => validator,
            SetValidator::Chain(validator) => validator,
        }
    }
}

impl From<ProofOfWorkValidator> for SetValidator<'_> {
    fn from(validator: ProofOfWorkValidator) -> Self {
        SetValidator::ProofOfWork(validator)
    }
}

impl<'a> From<BlockValidatorChain<'a>> for SetValidator<'a> {
    fn from(validator: BlockValidatorChain<'a>) -> Self {
        SetValidator::Chain(validator)
    }
}

/// Runs every validator in order and stops at the first failure.
#[derive(Clone, Default)]
pub struct BlockValidatorSet<'a> {
    validators: Vec<SetValidator<'a>>,
}

impl<'a> BlockValidatorSet<'a> {
    pub fn new(validators: Vec<SetValidator<'a>>) -> Self {
        BlockValidatorSet { validators }
    }

    pub fn validators(&self) -> &[SetValidator<'a>] {
        &self.validators
    }
}

impl BlockValidator for BlockValidatorSet<'_> {
    fn validate(&self, block: &Block, previous: &Block) -> Result<(), ValidationError> {
        for validator in &self.validators {
            validator
                .as_validator()
                .validate(block, previous)
                .inspect_err(|error| {
                    warn!(height = block.height(), hash = %block.hash(), %error, "block rejected");
                })?;
        }
        Ok(())
    }
}
