//! Per-network validator wiring.

use tracing::debug;

use super::{
    BitsValidator, BlockValidatorChain, BlockValidatorSet, ChainedValidator, DaaValidator,
    DarkGravityWaveTestNetValidator, DarkGravityWaveValidator, EdaValidator,
    LegacyDifficultyAdjustmentValidator, LegacyTestNetDifficultyValidator, ProofOfWorkValidator,
    ValidationError,
};
use crate::{
    blockdata::block::BlockHash,
    chain::BlockChainAccessor,
    consensus::Params,
    network::Network,
};

/// Builds the full header check for `params.network`: proof of work, then the
/// difficulty rule that applies at the block's height.
///
/// The checkpoint is given by hash; its height is read from the stored block.
///
/// # Errors
///
/// [`ValidationError::NoCheckpointBlock`] when `checkpoint` is not stored.
pub fn validator_set<'a>(
    params: &Params,
    checkpoint: &BlockHash,
    accessor: &'a dyn BlockChainAccessor,
) -> Result<BlockValidatorSet<'a>, ValidationError> {
    let checkpoint_block = accessor
        .block(checkpoint)
        .ok_or(ValidationError::NoCheckpointBlock { hash: *checkpoint })?;
    let checkpoint_height = checkpoint_block.height();

    let chain = difficulty_chain(params, checkpoint_height, accessor);
    debug!(
        network = %params.network,
        checkpoint_height,
        rules = ?chain.validators().iter().map(ChainedValidator::name).collect::<Vec<_>>(),
        "validator set ready"
    );

    Ok(BlockValidatorSet::new(vec![
        ProofOfWorkValidator::new().into(),
        chain.into(),
    ]))
}

fn difficulty_chain<'a>(
    params: &Params,
    checkpoint_height: u32,
    accessor: &'a dyn BlockChainAccessor,
) -> BlockValidatorChain<'a> {
    let legacy = || ChainedValidator::from(LegacyDifficultyAdjustmentValidator::new(accessor, params));
    let testnet = || ChainedValidator::from(LegacyTestNetDifficultyValidator::new(accessor, params));
    let eda = || ChainedValidator::from(EdaValidator::new(accessor, params, checkpoint_height));
    let daa = || ChainedValidator::from(DaaValidator::new(accessor, params, checkpoint_height));
    let bits = || ChainedValidator::from(BitsValidator::new());
    let dgw = || ChainedValidator::from(DarkGravityWaveValidator::new(accessor, params, checkpoint_height));

    let validators: Vec<ChainedValidator<'a>> = match params.network {
        Network::BitcoinMainnet => vec![legacy(), bits()],
        Network::BitcoinTestnet => vec![legacy(), testnet(), bits()],
        Network::BitcoinCashMainnet => vec![daa(), legacy(), eda(), bits()],
        Network::BitcoinCashTestnet => vec![daa(), legacy(), testnet(), eda(), bits()],
        Network::DashMainnet => vec![dgw()],
        Network::DashTestnet => vec![DarkGravityWaveTestNetValidator::new(params).into(), dgw()],
    };
    BlockValidatorChain::new(validators)
}
