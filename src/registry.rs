use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Error;

/// Contract types the harness knows how to deploy and bind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContractKind {
    /// Chainlink-style price feed mock
    MockV3Aggregator,
    /// Stable token mock
    MockDai,
    /// Wrapped native token mock
    MockWeth,
    /// Reward token issued by the farm
    DappToken,
    /// The staking contract
    TokenFarm,
}

impl ContractKind {
    /// Contract name as it appears in build artifacts
    pub fn artifact_name(&self) -> &'static str {
        match self {
            ContractKind::MockV3Aggregator => "MockV3Aggregator",
            ContractKind::MockDai => "MockDAI",
            ContractKind::MockWeth => "MockWETH",
            ContractKind::DappToken => "DappToken",
            ContractKind::TokenFarm => "TokenFarm",
        }
    }

    /// Whether this kind only exists as a local stand-in
    pub fn is_mock(&self) -> bool {
        matches!(
            self,
            ContractKind::MockV3Aggregator | ContractKind::MockDai | ContractKind::MockWeth
        )
    }
}

impl fmt::Display for ContractKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.artifact_name())
    }
}

/// Logical contract name -> mock type
pub const CONTRACT_TO_MOCK: [(&str, ContractKind); 4] = [
    ("eth_usd_price_feed", ContractKind::MockV3Aggregator),
    ("dai_usd_price_feed", ContractKind::MockV3Aggregator),
    ("fau_token", ContractKind::MockDai),
    ("weth_token", ContractKind::MockWeth),
];

/// Look up the mock type for a logical contract name
pub fn mock_kind(name: &str) -> Result<ContractKind, Error> {
    CONTRACT_TO_MOCK
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, kind)| *kind)
        .ok_or_else(|| Error::UnknownContract(name.to_string()))
}

/// All registered logical names
pub fn registered_names() -> impl Iterator<Item = &'static str> {
    CONTRACT_TO_MOCK.iter().map(|(name, _)| *name)
}
