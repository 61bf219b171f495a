//! The chain seam: contract deployment, transactions and read-only calls.

pub mod dev;
pub mod offline;
pub mod rpc;

use alloy::primitives::{Address, Bytes, B256, I256};
use alloy::sol_types::SolConstructor;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::abi;
use crate::error::Error;
use crate::registry::ContractKind;
use crate::wallet::Account;

pub use dev::DevChain;
pub use offline::OfflineChain;
pub use rpc::RpcChain;

/// Outcome of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    pub transaction_hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Option<Address>,
    /// Set for contract creations
    pub contract_address: Option<Address>,
    pub status: bool,
}

/// A contract creation with its constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constructor {
    MockV3Aggregator { decimals: u8, initial_answer: I256 },
    MockDai,
    MockWeth,
    DappToken,
    TokenFarm { dapp_token: Address },
}

impl Constructor {
    pub fn kind(&self) -> ContractKind {
        match self {
            Constructor::MockV3Aggregator { .. } => ContractKind::MockV3Aggregator,
            Constructor::MockDai => ContractKind::MockDai,
            Constructor::MockWeth => ContractKind::MockWeth,
            Constructor::DappToken => ContractKind::DappToken,
            Constructor::TokenFarm { .. } => ContractKind::TokenFarm,
        }
    }

    /// ABI-encoded constructor arguments, appended to the creation bytecode
    pub fn encode_args(&self) -> Vec<u8> {
        match self {
            Constructor::MockV3Aggregator {
                decimals,
                initial_answer,
            } => abi::MockV3Aggregator::constructorCall {
                _decimals: *decimals,
                _initialAnswer: *initial_answer,
            }
            .abi_encode(),
            Constructor::TokenFarm { dapp_token } => abi::TokenFarm::constructorCall {
                _dappTokenAddress: *dapp_token,
            }
            .abi_encode(),
            Constructor::MockDai | Constructor::MockWeth | Constructor::DappToken => Vec::new(),
        }
    }
}

/// Chain access used by the harness.
///
/// Every method returns once the chain reports the outcome; reverted
/// transactions surface as [`Error::Reverted`].
#[async_trait]
pub trait Chain: Send + Sync {
    /// Chain id of the connected network
    fn chain_id(&self) -> u64;

    /// Deploy a contract from `from`; the receipt carries the new address
    async fn deploy(&self, from: &Account, constructor: &Constructor) -> Result<TxReceipt, Error>;

    /// Submit a state-changing call and wait until it is mined
    async fn send_transaction(
        &self,
        from: &Account,
        to: Address,
        data: Bytes,
    ) -> Result<TxReceipt, Error>;

    /// Execute a call without changing state and return its output
    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes, Error>;

    /// Current head block number
    async fn block_number(&self) -> Result<u64, Error>;

    /// Wait until `receipt` has at least `confirmations` confirmations
    async fn wait_for_confirmations(
        &self,
        receipt: &TxReceipt,
        confirmations: u64,
    ) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argumentless_constructors_encode_nothing() {
        assert!(Constructor::MockDai.encode_args().is_empty());
        assert!(Constructor::DappToken.encode_args().is_empty());
    }

    #[test]
    fn price_feed_constructor_encodes_two_words() {
        let args = Constructor::MockV3Aggregator {
            decimals: 18,
            initial_answer: I256::try_from(2000i64).unwrap(),
        }
        .encode_args();
        assert_eq!(args.len(), 64);
        assert_eq!(args[31], 18);
    }
}
