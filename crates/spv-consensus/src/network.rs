use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum NetworkError {
    #[error("Invalid network: {0}")]
    InvalidNetwork(String),
}

/// Networks whose header chains can be validated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    /// Bitcoin mainnet.
    BitcoinMainnet,
    /// Bitcoin testnet3.
    BitcoinTestnet,
    /// Bitcoin Cash mainnet.
    BitcoinCashMainnet,
    /// Bitcoin Cash testnet.
    BitcoinCashTestnet,
    /// Dash mainnet.
    DashMainnet,
    /// Dash testnet.
    DashTestnet,
}

impl Network {
    pub const ALL: [Network; 6] = [
        Network::BitcoinMainnet,
        Network::BitcoinTestnet,
        Network::BitcoinCashMainnet,
        Network::BitcoinCashTestnet,
        Network::DashMainnet,
        Network::DashTestnet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::BitcoinMainnet => "bitcoin-mainnet",
            Network::BitcoinTestnet => "bitcoin-testnet",
            Network::BitcoinCashMainnet => "bitcoin-cash-mainnet",
            Network::BitcoinCashTestnet => "bitcoin-cash-testnet",
            Network::DashMainnet => "dash-mainnet",
            Network::DashTestnet => "dash-testnet",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|network| network.as_str() == s)
            .ok_or_else(|| NetworkError::InvalidNetwork(s.to_owned()))
    }
}
