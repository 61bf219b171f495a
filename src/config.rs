use config::{Config as ConfigLoader, Environment, File};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::Error;

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_NAME: &str = "brownie-config";

/// Environment variable overriding the config file location
pub const CONFIG_ENV_VAR: &str = "FARM_CONFIG";

/// Well-known development mnemonic shared by hardhat, anvil and ganache
pub const DEFAULT_DEV_MNEMONIC: &str = "test test test test test test test test test test test junk";

/// Per-network settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkSection {
    /// JSON-RPC endpoint for live networks
    #[serde(default)]
    pub host: Option<String>,
    /// Chain id expected at `host`
    #[serde(default)]
    pub chain_id: Option<u64>,
    /// Whether deployments should be source-verified (informational)
    #[serde(default)]
    pub verify: bool,
    /// Logical contract name -> address, plus any other free-form keys
    #[serde(flatten)]
    pub entries: HashMap<String, serde_json::Value>,
}

impl NetworkSection {
    /// Raw configured value for a logical contract name
    pub fn address_of(&self, name: &str) -> Option<&serde_json::Value> {
        self.entries.get(name)
    }
}

/// The `networks` table: a default network name plus one section per network
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworksConfig {
    #[serde(default)]
    pub default: Option<String>,
    #[serde(flatten)]
    pub sections: HashMap<String, NetworkSection>,
}

/// Wallet settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalletsConfig {
    /// Hex private key, usually `${PRIVATE_KEY}`
    #[serde(default)]
    pub from_key: Option<String>,
}

/// Settings for the in-process development chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DevChainConfig {
    /// Mnemonic the local test accounts are derived from
    #[serde(default = "default_mnemonic")]
    pub mnemonic: String,
    /// Number of local test accounts
    #[serde(default = "default_account_count")]
    pub accounts: usize,
    /// Chain id reported by the development chain
    #[serde(default = "default_dev_chain_id")]
    pub chain_id: u64,
}

fn default_mnemonic() -> String {
    DEFAULT_DEV_MNEMONIC.to_string()
}

fn default_account_count() -> usize {
    10
}

fn default_dev_chain_id() -> u64 {
    1337
}

impl Default for DevChainConfig {
    fn default() -> Self {
        Self {
            mnemonic: default_mnemonic(),
            accounts: default_account_count(),
            chain_id: default_dev_chain_id(),
        }
    }
}

/// Complete harness configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub networks: NetworksConfig,
    #[serde(default)]
    pub wallets: WalletsConfig,
    #[serde(default)]
    pub dev_chain: DevChainConfig,
    /// `.env` file loaded before `${VAR}` references are expanded
    #[serde(default)]
    pub dotenv: Option<PathBuf>,
}

impl HarnessConfig {
    /// Load configuration from a file, layered with `FARM__`-prefixed
    /// environment variables (`FARM__WALLETS__FROM_KEY=...`).
    ///
    /// The `.env` file named by the `dotenv` key is resolved relative to the
    /// config file and loaded into the process environment.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let settings = ConfigLoader::builder()
            .add_source(File::with_name(&path.to_string_lossy()))
            .add_source(Environment::with_prefix("FARM").separator("__"))
            .build()?;

        let config: HarnessConfig = settings.try_deserialize()?;

        if let Some(dotenv_path) = &config.dotenv {
            let dotenv_path = match path.parent() {
                Some(parent) if dotenv_path.is_relative() => parent.join(dotenv_path),
                _ => dotenv_path.clone(),
            };
            if dotenv_path.exists() {
                dotenv::from_path(&dotenv_path).map_err(|e| {
                    Error::Config(format!(
                        "Failed to load {}: {}",
                        dotenv_path.display(),
                        e
                    ))
                })?;
            } else {
                tracing::debug!("dotenv file {} not found, skipping", dotenv_path.display());
            }
        }

        Ok(config)
    }

    /// Load from `FARM_CONFIG` or `brownie-config.*` in the working directory,
    /// falling back to defaults when no file exists.
    pub fn load_default() -> Result<Self, Error> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::load(path);
        }
        for ext in ["yaml", "yml", "toml", "json"] {
            let candidate = PathBuf::from(format!("{}.{}", DEFAULT_CONFIG_NAME, ext));
            if candidate.exists() {
                return Self::load(candidate);
            }
        }
        tracing::debug!("no {} file found, using defaults", DEFAULT_CONFIG_NAME);
        Ok(Self::default())
    }

    /// Settings for one network
    pub fn network(&self, name: &str) -> Option<&NetworkSection> {
        self.networks.sections.get(name)
    }

    /// Configured default network
    pub fn default_network(&self) -> Option<&str> {
        self.networks.default.as_deref()
    }

    /// Configured address string for `name` on `network`, env-expanded
    pub fn contract_address(&self, network: &str, name: &str) -> Option<String> {
        let value = self.network(network)?.address_of(name)?;
        let raw = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Null => return None,
            other => other.to_string(),
        };
        let expanded = expand_env(&raw);
        if expanded.trim().is_empty() {
            None
        } else {
            Some(expanded)
        }
    }

    /// RPC endpoint for `network`, env-expanded
    pub fn host(&self, network: &str) -> Option<String> {
        self.network(network)?
            .host
            .as_deref()
            .map(expand_env)
            .filter(|h| !h.trim().is_empty())
    }

    /// The wallet private key, env-expanded.
    ///
    /// An absent key, or one whose `${VAR}` reference expands to nothing, is
    /// reported as `MissingConfigKey("wallets.from_key")`.
    pub fn from_key(&self) -> Result<String, Error> {
        let raw = self
            .wallets
            .from_key
            .as_deref()
            .ok_or_else(|| Error::MissingConfigKey("wallets.from_key".to_string()))?;
        let expanded = expand_env(raw);
        if expanded.trim().is_empty() {
            return Err(Error::MissingConfigKey("wallets.from_key".to_string()));
        }
        Ok(expanded.trim().to_string())
    }
}

fn env_reference() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern is valid")
    })
}

/// Replace `${VAR}` references with values from the process environment.
/// Unset variables expand to the empty string.
pub fn expand_env(value: &str) -> String {
    env_reference()
        .replace_all(value, |caps: &regex::Captures<'_>| {
            env::var(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}
