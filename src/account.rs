use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::HarnessConfig;
use crate::error::Error;
use crate::network::Network;
use crate::wallet::storage::{validate_id, Keystore};
use crate::wallet::{Account, AccountSource};

/// Environment variable holding the keystore password
pub const KEYSTORE_PASSWORD_ENV: &str = "FARM_KEYSTORE_PASSWORD";

/// Optional hints for account resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountQuery {
    /// Local test account index
    pub index: Option<usize>,
    /// Keystore identifier
    pub stored_id: Option<String>,
}

impl AccountQuery {
    pub fn index(index: usize) -> Self {
        Self {
            index: Some(index),
            stored_id: None,
        }
    }

    pub fn stored(id: impl Into<String>) -> Self {
        Self {
            index: None,
            stored_id: Some(id.into()),
        }
    }
}

/// One way of obtaining an account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Local test account at the requested index
    ByIndex,
    /// First local test account, on local networks
    LocalDefault,
    /// Keystore entry with the requested id
    Stored,
    /// Private key from `wallets.from_key`
    ConfigKey,
}

/// Strategies in priority order; the first one that resolves wins
pub const RESOLUTION_ORDER: [Strategy; 4] = [
    Strategy::ByIndex,
    Strategy::LocalDefault,
    Strategy::Stored,
    Strategy::ConfigKey,
];

/// Result of trying one strategy
#[derive(Debug)]
pub enum Resolution {
    Resolved(Account),
    /// The strategy's precondition did not hold
    Skipped,
}

/// Picks the signing account for the active network
pub struct AccountResolver {
    network: Network,
    config: Arc<HarnessConfig>,
    local_accounts: Vec<Account>,
    keystore_dir: Option<PathBuf>,
    keystore_password: Option<String>,
}

impl AccountResolver {
    /// Build a resolver, deriving the local test accounts from the dev mnemonic
    pub fn new(network: Network, config: Arc<HarnessConfig>) -> Result<Self, Error> {
        let local_accounts =
            Account::derive_many(&config.dev_chain.mnemonic, config.dev_chain.accounts)?;
        Ok(Self {
            network,
            config,
            local_accounts,
            keystore_dir: None,
            keystore_password: None,
        })
    }

    /// Use a keystore directory other than the default
    pub fn with_keystore_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.keystore_dir = Some(dir.into());
        self
    }

    /// Use this password instead of `FARM_KEYSTORE_PASSWORD`
    pub fn with_keystore_password(mut self, password: impl Into<String>) -> Self {
        self.keystore_password = Some(password.into());
        self
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// The local test accounts, in index order
    pub fn local_accounts(&self) -> &[Account] {
        &self.local_accounts
    }

    pub fn keystore(&self) -> Result<Keystore, Error> {
        match &self.keystore_dir {
            Some(dir) => Keystore::with_directory(dir),
            None => Keystore::new(),
        }
    }

    /// Resolve an account, trying each strategy of [`RESOLUTION_ORDER`] in turn.
    ///
    /// A strategy whose precondition holds either resolves or fails; its error
    /// is returned as is and later strategies are not tried.
    pub fn resolve(&self, query: &AccountQuery) -> Result<Account, Error> {
        for strategy in RESOLUTION_ORDER {
            if let Resolution::Resolved(account) = self.attempt(strategy, query)? {
                tracing::debug!(
                    "Resolved account {} via {:?} on {}",
                    account.address(),
                    strategy,
                    self.network
                );
                return Ok(account);
            }
        }
        Err(Error::MissingConfigKey("wallets.from_key".to_string()))
    }

    /// Try a single strategy
    pub fn attempt(&self, strategy: Strategy, query: &AccountQuery) -> Result<Resolution, Error> {
        match strategy {
            Strategy::ByIndex => match query.index {
                Some(index) => self.local(index).map(Resolution::Resolved),
                None => Ok(Resolution::Skipped),
            },
            Strategy::LocalDefault => {
                if self.network.is_local() {
                    self.local(0).map(Resolution::Resolved)
                } else {
                    Ok(Resolution::Skipped)
                }
            }
            Strategy::Stored => match &query.stored_id {
                Some(id) => self.stored(id).map(Resolution::Resolved),
                None => Ok(Resolution::Skipped),
            },
            Strategy::ConfigKey => {
                let key = self.config.from_key()?;
                Account::from_private_key(&key, AccountSource::ConfigKey).map(Resolution::Resolved)
            }
        }
    }

    fn local(&self, index: usize) -> Result<Account, Error> {
        self.local_accounts
            .get(index)
            .cloned()
            .ok_or(Error::AccountIndexOutOfRange {
                index,
                available: self.local_accounts.len(),
            })
    }

    /// Look up a keystore entry without creating the keystore directory
    fn stored(&self, id: &str) -> Result<Account, Error> {
        validate_id(id)?;
        let dir = match &self.keystore_dir {
            Some(dir) => dir.clone(),
            None => Keystore::default_directory()?,
        };
        let keystore = match Keystore::existing(dir) {
            Some(keystore) if keystore.contains(id) => keystore,
            _ => return Err(Error::CredentialNotFound(id.to_string())),
        };
        let password = match &self.keystore_password {
            Some(password) => password.clone(),
            None => env::var(KEYSTORE_PASSWORD_ENV).map_err(|_| {
                Error::Wallet(format!(
                    "No password for stored account '{}': set {}",
                    id, KEYSTORE_PASSWORD_ENV
                ))
            })?,
        };
        keystore.load(id, &password)
    }
}
