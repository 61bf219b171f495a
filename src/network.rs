use std::fmt;

/// Networks that run on a disposable chain where mocks are deployed on demand
pub const LOCAL_BLOCKCHAIN_ENVIRONMENTS: [&str; 6] = [
    "hardhat",
    "development",
    "ganache",
    "mainnet-fork",
    "binance-fork",
    "matic-fork",
];

/// Network used when neither the CLI, the environment nor the config names one
pub const DEFAULT_NETWORK: &str = "development";

/// Environment variable consulted for the active network name
pub const NETWORK_ENV_VAR: &str = "FARM_NETWORK";

/// The active network of a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Network {
    name: String,
}

impl Network {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this network is local/ephemeral.
    ///
    /// Membership in [`LOCAL_BLOCKCHAIN_ENVIRONMENTS`] is the only signal used to
    /// choose between deploying mocks and binding to configured addresses.
    pub fn is_local(&self) -> bool {
        is_local_network(&self.name)
    }

    /// Pick the active network: explicit choice, then `FARM_NETWORK`, then the
    /// configured default.
    pub fn select(explicit: Option<&str>, configured_default: Option<&str>) -> Self {
        if let Some(name) = explicit {
            return Self::new(name);
        }
        if let Ok(name) = std::env::var(NETWORK_ENV_VAR) {
            if !name.trim().is_empty() {
                return Self::new(name.trim());
            }
        }
        Self::new(configured_default.unwrap_or(DEFAULT_NETWORK))
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Check a network name against the recognized local set
pub fn is_local_network(name: &str) -> bool {
    LOCAL_BLOCKCHAIN_ENVIRONMENTS.contains(&name)
}
