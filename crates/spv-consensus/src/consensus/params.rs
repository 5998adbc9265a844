use serde::{Deserialize, Serialize};

use crate::{
    blockdata::block::BlockHash,
    network::Network,
    pow::{CompactTarget, Target},
    util::blockhash_from_display,
};

/// A trusted block below which header history is not verified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Height the checkpoint block is stored at. Validation reads the height
    /// back from the stored block, not from here.
    pub height: u32,
    /// Checkpoint block hash.
    pub hash: BlockHash,
}

/// Consensus parameters for different networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Network for which these parameters are defined.
    pub network: Network,
    /// Display-order hash of the genesis block, the default checkpoint.
    pub genesis_hash: &'static str,
    /// Compact form of the easiest target the network accepts.
    pub max_target_bits: CompactTarget,
    /// Expected amount of time to mine one block, in seconds.
    pub pow_target_spacing: u32,
    /// Number of blocks between retargets (the window length for
    /// DarkGravityWave).
    pub retarget_interval: u32,
    /// Once the previous block is newer than this timestamp the testnet
    /// minimum-difficulty rule applies.
    pub min_difficulty_activation_time: Option<u32>,
    /// Height of the last block before the Emergency Difficulty Adjustment
    /// took effect.
    pub eda_activation_height: Option<u32>,
    /// Height of the previous block from which the cw-144 difficulty
    /// adjustment algorithm applies.
    pub daa_activation_height: Option<u32>,
    /// First block height retargeted with DarkGravityWave.
    pub dgw_activation_height: Option<u32>,
}

impl Params {
    /// Consensus parameters for Bitcoin mainnet.
    pub const BITCOIN_MAINNET: Self = Self {
        network: Network::BitcoinMainnet,
        genesis_hash: "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        max_target_bits: CompactTarget::new(0x1d00ffff),
        pow_target_spacing: 10 * 60, // 10 minutes
        retarget_interval: 2016,     // two weeks of blocks
        min_difficulty_activation_time: None,
        eda_activation_height: None,
        daa_activation_height: None,
        dgw_activation_height: None,
    };
    /// Consensus parameters for Bitcoin testnet3.
    pub const BITCOIN_TESTNET: Self = Self {
        network: Network::BitcoinTestnet,
        genesis_hash: "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943",
        max_target_bits: CompactTarget::new(0x1d00ffff),
        pow_target_spacing: 10 * 60,
        retarget_interval: 2016,
        min_difficulty_activation_time: Some(1_329_264_000), // 2012-02-15
        eda_activation_height: None,
        daa_activation_height: None,
        dgw_activation_height: None,
    };
    /// Consensus parameters for Bitcoin Cash mainnet.
    pub const BITCOIN_CASH_MAINNET: Self = Self {
        network: Network::BitcoinCashMainnet,
        genesis_hash: "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f",
        max_target_bits: CompactTarget::new(0x1d00ffff),
        pow_target_spacing: 10 * 60,
        retarget_interval: 2016,
        min_difficulty_activation_time: None,
        eda_activation_height: Some(478_558), // UAHF
        daa_activation_height: Some(504_031), // November 2017 upgrade
        dgw_activation_height: None,
    };
    /// Consensus parameters for Bitcoin Cash testnet.
    pub const BITCOIN_CASH_TESTNET: Self = Self {
        network: Network::BitcoinCashTestnet,
        genesis_hash: "000000000933ea01ad0ee984209779baaec3ced90fa3f408719526f8d77f4943",
        max_target_bits: CompactTarget::new(0x1d00ffff),
        pow_target_spacing: 10 * 60,
        retarget_interval: 2016,
        min_difficulty_activation_time: Some(1_329_264_000),
        eda_activation_height: Some(1_155_875),
        daa_activation_height: Some(1_188_697),
        dgw_activation_height: None,
    };
    /// Consensus parameters for Dash mainnet.
    pub const DASH_MAINNET: Self = Self {
        network: Network::DashMainnet,
        genesis_hash: "00000ffd590b1485b3caadc19b22e6379c733355108f107a430458cdf3407ab6",
        max_target_bits: CompactTarget::new(0x1e0fffff),
        pow_target_spacing: 150, // 2.5 minutes
        retarget_interval: 24,   // DarkGravityWave window
        min_difficulty_activation_time: None,
        eda_activation_height: None,
        daa_activation_height: None,
        dgw_activation_height: Some(34_140),
    };
    /// Consensus parameters for Dash testnet.
    pub const DASH_TESTNET: Self = Self {
        network: Network::DashTestnet,
        genesis_hash: "00000bafbc94add76cb75e2ec92894837288a481e5c005f6563d91623bf8bc2c",
        max_target_bits: CompactTarget::new(0x1e0fffff),
        pow_target_spacing: 150,
        retarget_interval: 24,
        min_difficulty_activation_time: None,
        eda_activation_height: None,
        daa_activation_height: None,
        dgw_activation_height: Some(4_002),
    };

    /// Returns the parameters of `network`.
    pub const fn for_network(network: Network) -> Self {
        match network {
            Network::BitcoinMainnet => Self::BITCOIN_MAINNET,
            Network::BitcoinTestnet => Self::BITCOIN_TESTNET,
            Network::BitcoinCashMainnet => Self::BITCOIN_CASH_MAINNET,
            Network::BitcoinCashTestnet => Self::BITCOIN_CASH_TESTNET,
            Network::DashMainnet => Self::DASH_MAINNET,
            Network::DashTestnet => Self::DASH_TESTNET,
        }
    }

    /// Expected duration of one retarget interval, in seconds.
    #[allow(clippy::arithmetic_side_effects, reason = "Constants are small")]
    pub const fn pow_target_timespan(&self) -> u32 {
        self.pow_target_spacing * self.retarget_interval
    }

    /// The easiest target the network accepts.
    pub fn max_target(&self) -> Target {
        Target::from_compact(self.max_target_bits).unwrap_or(Target::ZERO)
    }

    /// The genesis block as a checkpoint at height zero.
    pub fn genesis_checkpoint(&self) -> Result<Checkpoint, hex::FromHexError> {
        Ok(Checkpoint {
            height: 0,
            hash: blockhash_from_display(self.genesis_hash)?,
        })
    }
}

impl From<Network> for Params {
    fn from(network: Network) -> Self {
        Params::for_network(network)
    }
}
