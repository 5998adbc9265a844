//! Block header validation for multi-chain SPV wallets.
//!
//! This library checks incoming Bitcoin, Bitcoin Cash and Dash block headers
//! against the chain rules a light client can verify on its own: the compact
//! target encoding, proof of work, and each network's difficulty retarget
//! algorithm. Block history is read through the
//! [`BlockChainAccessor`](chain::BlockChainAccessor) trait, so any header
//! store can back the validators.

#![cfg_attr(test, allow(clippy::arithmetic_side_effects))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::cast_sign_loss))]
#![cfg_attr(test, allow(clippy::indexing_slicing))]
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::cast_possible_truncation))]

/// Block headers and blocks with chain position.
pub mod blockdata;
/// Read access to stored block history.
pub mod chain;
/// Consensus parameters.
pub mod consensus;
/// Supported networks.
pub mod network;
/// Proof of Work related functionality.
pub mod pow;
/// Utility functions and types.
pub mod util;
/// Header validation rules and their composition.
pub mod validation;

#[cfg(test)]
mod test_utils;

pub use blockdata::block::{Block, BlockHash, BlockHeader};
pub use chain::{BlockChainAccessor, MemoryChain};
pub use consensus::{Checkpoint, Params};
pub use network::Network;
pub use pow::{CompactTarget, Target, Work};
pub use validation::{validator_set, BlockValidator, ValidationError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
