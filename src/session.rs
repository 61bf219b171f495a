use alloy::primitives::Address;
use std::path::PathBuf;
use std::sync::Arc;

use crate::account::{AccountQuery, AccountResolver};
use crate::chain::rpc::DEFAULT_ARTIFACTS_DIR;
use crate::chain::{Chain, DevChain, OfflineChain, RpcChain};
use crate::config::HarnessConfig;
use crate::contracts::{ContractHandle, PriceFeed, Token, TokenFarm};
use crate::deployments::DeploymentHistory;
use crate::error::Error;
use crate::network::Network;
use crate::resolver::{ContractResolver, MockParams};
use crate::wallet::Account;

/// Everything a script or test needs for one run against one network
pub struct Session {
    network: Network,
    config: Arc<HarnessConfig>,
    chain: Arc<dyn Chain>,
    accounts: Arc<AccountResolver>,
    resolver: ContractResolver,
}

/// Options applied when a session is built
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub keystore_dir: Option<PathBuf>,
    pub keystore_password: Option<String>,
    pub artifacts_dir: Option<PathBuf>,
}

impl Session {
    /// Connect to `network`.
    ///
    /// Local networks without a configured `host` run on an in-process
    /// [`DevChain`]; every other network is reached over JSON-RPC.
    pub async fn connect(
        network: Network,
        config: HarnessConfig,
        options: SessionOptions,
    ) -> Result<Self, Error> {
        let host = config.host(network.name());
        let chain: Arc<dyn Chain> = match host {
            None if network.is_local() => {
                tracing::info!("Launching development chain for {}", network);
                Arc::new(DevChain::new(config.dev_chain.chain_id))
            }
            None => {
                return Err(Error::MissingConfigKey(format!(
                    "networks.{}.host",
                    network.name()
                )))
            }
            Some(host) => {
                let chain_id = config.network(network.name()).and_then(|n| n.chain_id);
                let artifacts_dir = options
                    .artifacts_dir
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACTS_DIR));
                Arc::new(RpcChain::connect(&host, chain_id, artifacts_dir).await?)
            }
        };
        Self::with_chain(network, config, chain, options)
    }

    /// A session for configuration lookups only.
    ///
    /// Live networks get an [`OfflineChain`], so no `host` is needed and no
    /// request is made; local networks still need a chain to deploy mocks on
    /// and are connected as usual.
    pub async fn for_lookup(
        network: Network,
        config: HarnessConfig,
        options: SessionOptions,
    ) -> Result<Self, Error> {
        if network.is_local() {
            return Self::connect(network, config, options).await;
        }
        Self::with_chain(network, config, Arc::new(OfflineChain), options)
    }

    /// Build a session on an existing chain connection
    pub fn with_chain(
        network: Network,
        config: HarnessConfig,
        chain: Arc<dyn Chain>,
        options: SessionOptions,
    ) -> Result<Self, Error> {
        let config = Arc::new(config);

        let mut accounts = AccountResolver::new(network.clone(), config.clone())?;
        if let Some(dir) = options.keystore_dir {
            accounts = accounts.with_keystore_dir(dir);
        }
        if let Some(password) = options.keystore_password {
            accounts = accounts.with_keystore_password(password);
        }
        let accounts = Arc::new(accounts);

        let resolver = ContractResolver::new(
            network.clone(),
            config.clone(),
            chain.clone(),
            accounts.clone(),
            DeploymentHistory::new(),
        );

        Ok(Self {
            network,
            config,
            chain,
            accounts,
            resolver,
        })
    }

    /// A fresh `development` session on a new in-process chain
    pub fn development(config: HarnessConfig) -> Result<Self, Error> {
        let chain = Arc::new(DevChain::new(config.dev_chain.chain_id));
        Self::with_chain(
            Network::new("development"),
            config,
            chain,
            SessionOptions::default(),
        )
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn chain(&self) -> Arc<dyn Chain> {
        self.chain.clone()
    }

    pub fn accounts(&self) -> &AccountResolver {
        &self.accounts
    }

    pub fn resolver(&self) -> &ContractResolver {
        &self.resolver
    }

    pub fn history(&self) -> &DeploymentHistory {
        self.resolver.history()
    }

    /// Resolve the signing account, see [`AccountResolver::resolve`]
    pub fn resolve_account(&self, query: &AccountQuery) -> Result<Account, Error> {
        self.accounts.resolve(query)
    }

    /// The default account for this network
    pub fn default_account(&self) -> Result<Account, Error> {
        self.resolve_account(&AccountQuery::default())
    }

    /// Resolve a logical contract name, see [`ContractResolver::resolve`]
    pub async fn resolve_contract(&self, name: &str) -> Result<ContractHandle, Error> {
        self.resolver.resolve(name).await
    }

    /// Deploy the mock set with the given parameters
    pub async fn deploy_mocks(&self, params: MockParams) -> Result<(), Error> {
        self.resolver.deploy_mocks(params).await
    }

    pub fn token(&self, address: Address) -> Token {
        Token::new(address, self.chain.clone())
    }

    pub fn price_feed(&self, address: Address) -> PriceFeed {
        PriceFeed::new(address, self.chain.clone())
    }

    pub fn token_farm(&self, address: Address) -> TokenFarm {
        TokenFarm::new(address, self.chain.clone())
    }
}
