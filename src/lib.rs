pub mod abi;
pub mod account;
pub mod chain;
pub mod config;
pub mod contracts;
pub mod deploy;
pub mod deployments;
pub mod error;
pub mod funding;
pub mod network;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod wallet;

pub use account::{AccountQuery, AccountResolver};
pub use chain::{Chain, Constructor, DevChain, OfflineChain, RpcChain, TxReceipt};
pub use config::HarnessConfig;
pub use contracts::{ContractHandle, PriceFeed, Token, TokenFarm};
pub use deploy::deploy_token_farm_and_dapp_token;
pub use deployments::DeploymentHistory;
pub use error::Error;
pub use funding::fund_with_token;
pub use network::{is_local_network, Network};
pub use registry::ContractKind;
pub use resolver::{ContractResolver, MockParams};
pub use session::{Session, SessionOptions};
pub use wallet::Account;

// Re-export the primitive types that appear in the public API
pub use alloy::primitives::{Address, I256, U256};
