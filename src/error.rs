use thiserror::Error;

/// Harness error type
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded or is malformed
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required configuration key is absent or empty
    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),

    /// Logical contract name is not in the contract registry
    #[error("Unknown contract '{0}': no registry entry")]
    UnknownContract(String),

    /// No address configured for a contract on a live network
    #[error("Address not configured for '{name}' on network '{network}'")]
    AddressNotConfigured { network: String, name: String },

    /// Configured address failed to parse
    #[error("Invalid address '{value}' for '{name}': {reason}")]
    InvalidAddress {
        name: String,
        value: String,
        reason: String,
    },

    /// Requested stored credential does not exist
    #[error("Credential '{0}' not found")]
    CredentialNotFound(String),

    /// Requested local test account index does not exist
    #[error("Account index {index} out of range ({available} accounts available)")]
    AccountIndexOutOfRange { index: usize, available: usize },

    /// Wallet or keystore error
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Contract execution reverted (includes authorization failures)
    #[error("Execution reverted: {reason}")]
    Reverted { reason: String },

    /// Transaction could not be submitted or confirmed
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// RPC transport error
    #[error("RPC error: {0}")]
    Rpc(String),

    /// ABI encoding or decoding error
    #[error("ABI error: {0}")]
    Abi(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Build a revert error from any displayable reason
    pub fn reverted(reason: impl Into<String>) -> Self {
        Error::Reverted {
            reason: reason.into(),
        }
    }

    /// Whether this error is a contract-level revert
    pub fn is_revert(&self) -> bool {
        matches!(self, Error::Reverted { .. })
    }
}

impl From<alloy::sol_types::Error> for Error {
    fn from(e: alloy::sol_types::Error) -> Self {
        Error::Abi(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}
