use alloy::primitives::{Address, I256, U256};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::account::{AccountQuery, AccountResolver};
use crate::chain::{Chain, Constructor};
use crate::config::HarnessConfig;
use crate::contracts::ContractHandle;
use crate::deployments::DeploymentHistory;
use crate::error::Error;
use crate::network::Network;
use crate::registry::{self, ContractKind};
use crate::wallet::Account;

/// Decimals of the mock price feed
pub const DECIMALS: u8 = 18;

/// Initial answer of the mock price feed: 2000 with 18 decimals
pub const INITIAL_PRICE_FEED_VALUE: u128 = 2_000 * 10u128.pow(18);

/// Parameters of a mock deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockParams {
    pub decimals: u8,
    pub initial_value: I256,
}

impl Default for MockParams {
    fn default() -> Self {
        Self {
            decimals: DECIMALS,
            initial_value: I256::from_raw(U256::from(INITIAL_PRICE_FEED_VALUE)),
        }
    }
}

/// Turns logical contract names into bound contracts.
///
/// On local networks names resolve to the latest mock of their type, deployed
/// on demand; elsewhere they resolve to the address configured for the active
/// network and nothing is ever deployed.
pub struct ContractResolver {
    network: Network,
    config: Arc<HarnessConfig>,
    chain: Arc<dyn Chain>,
    accounts: Arc<AccountResolver>,
    history: DeploymentHistory,
    provisioning: Mutex<()>,
}

impl ContractResolver {
    pub fn new(
        network: Network,
        config: Arc<HarnessConfig>,
        chain: Arc<dyn Chain>,
        accounts: Arc<AccountResolver>,
        history: DeploymentHistory,
    ) -> Self {
        Self {
            network,
            config,
            chain,
            accounts,
            history,
            provisioning: Mutex::new(()),
        }
    }

    pub fn history(&self) -> &DeploymentHistory {
        &self.history
    }

    /// Resolve `name` to a contract handle
    pub async fn resolve(&self, name: &str) -> Result<ContractHandle, Error> {
        let kind = registry::mock_kind(name)?;

        if self.network.is_local() {
            self.ensure_mocks(kind).await?;
            let address = self.history.latest(kind).ok_or_else(|| {
                Error::Other(format!("no {} deployed after provisioning", kind))
            })?;
            tracing::debug!("Resolved {} to local {} at {}", name, kind, address);
            return Ok(ContractHandle::new(kind, address));
        }

        let address = self.configured_address(name)?;
        tracing::debug!(
            "Resolved {} to configured {} at {} on {}",
            name,
            kind,
            address,
            self.network
        );
        Ok(ContractHandle::new(kind, address))
    }

    /// Provision the mock set once if `kind` has no instance yet
    async fn ensure_mocks(&self, kind: ContractKind) -> Result<(), Error> {
        if self.history.contains(kind) {
            return Ok(());
        }
        let _guard = self.provisioning.lock().await;
        if !self.history.contains(kind) {
            self.deploy_mocks(MockParams::default()).await?;
        }
        Ok(())
    }

    fn configured_address(&self, name: &str) -> Result<Address, Error> {
        let raw = self
            .config
            .contract_address(self.network.name(), name)
            .ok_or_else(|| Error::AddressNotConfigured {
                network: self.network.name().to_string(),
                name: name.to_string(),
            })?;
        raw.trim().parse::<Address>().map_err(|e| Error::InvalidAddress {
            name: name.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        })
    }

    /// Deploy a contract and record it in the session history
    pub async fn deploy(&self, from: &Account, constructor: Constructor) -> Result<Address, Error> {
        let kind = constructor.kind();
        let receipt = self.chain.deploy(from, &constructor).await?;
        let address = receipt.contract_address.ok_or_else(|| {
            Error::Transaction(format!(
                "deployment of {} in {} returned no address",
                kind, receipt.transaction_hash
            ))
        })?;
        self.history.record(kind, address);
        Ok(address)
    }

    /// Deploy the full mock set: price feed, stable token, wrapped token.
    ///
    /// A failed deployment aborts the rest; earlier mocks stay deployed.
    pub async fn deploy_mocks(&self, params: MockParams) -> Result<(), Error> {
        let account = self.accounts.resolve(&AccountQuery::default())?;
        tracing::info!("Deploying mocks for {}", self.network);

        tracing::info!("Deploying Mock Price Feed...");
        let price_feed = self
            .deploy(
                &account,
                Constructor::MockV3Aggregator {
                    decimals: params.decimals,
                    initial_answer: params.initial_value,
                },
            )
            .await?;
        tracing::info!("Deployed Mock Price Feed at {}", price_feed);

        tracing::info!("Deploying Mock DAI");
        let dai = self.deploy(&account, Constructor::MockDai).await?;
        tracing::info!("Deployed Mock DAI at {}", dai);

        tracing::info!("Deploying Mock WETH");
        let weth = self.deploy(&account, Constructor::MockWeth).await?;
        tracing::info!("Deployed Mock WETH at {}", weth);

        Ok(())
    }
}
