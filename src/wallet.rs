pub mod storage;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use bip32::DerivationPath;
use bip39::Mnemonic;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// HD Path prefix for Ethereum accounts (BIP-44, coin type 60)
const HD_PATH_PREFIX: &str = "m/44'/60'/0'/0/";

/// Where an account came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountSource {
    /// Local test account at this index
    Local(usize),
    /// Keystore entry with this id
    Stored(String),
    /// Private key from `wallets.from_key`
    ConfigKey,
}

/// A signing account
#[derive(Clone)]
pub struct Account {
    signer: PrivateKeySigner,
    source: AccountSource,
}

/// Account info that can be serialized safely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountInfo {
    /// The account address (checksummed)
    pub address: String,
    /// How the account was obtained
    pub source: AccountSource,
}

impl Account {
    /// Derive the account at `index` from a mnemonic
    pub fn from_mnemonic(mnemonic: &str, index: usize) -> Result<Self, Error> {
        let seed = mnemonic_seed(mnemonic)?;
        Self::from_seed(&seed, index)
    }

    /// Derive the first `count` accounts of a mnemonic
    pub fn derive_many(mnemonic: &str, count: usize) -> Result<Vec<Self>, Error> {
        let seed = mnemonic_seed(mnemonic)?;
        (0..count)
            .map(|index| Self::from_seed(&seed, index))
            .collect()
    }

    fn from_seed(seed: &[u8], index: usize) -> Result<Self, Error> {
        let path = format!("{}{}", HD_PATH_PREFIX, index);
        let path = DerivationPath::from_str(&path)
            .map_err(|e| Error::Wallet(format!("Invalid derivation path: {}", e)))?;

        let derived_key = bip32::XPrv::derive_from_path(seed, &path)
            .map_err(|e| Error::Wallet(format!("Key derivation error: {}", e)))?;

        let signer = PrivateKeySigner::from_slice(&derived_key.to_bytes())
            .map_err(|e| Error::Wallet(format!("Failed to create signer: {}", e)))?;

        Ok(Self {
            signer,
            source: AccountSource::Local(index),
        })
    }

    /// Create an account from a hex private key (with or without `0x`)
    pub fn from_private_key(key: &str, source: AccountSource) -> Result<Self, Error> {
        let key = key.trim();
        let key = key.strip_prefix("0x").unwrap_or(key);
        let bytes =
            hex::decode(key).map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;
        let signer = PrivateKeySigner::from_slice(&bytes)
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;
        Ok(Self { signer, source })
    }

    /// The account address
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Access to the underlying signer
    pub fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }

    /// How this account was resolved
    pub fn source(&self) -> &AccountSource {
        &self.source
    }

    /// Hex-encoded private key, used when persisting to the keystore
    pub fn private_key_hex(&self) -> String {
        hex::encode(self.signer.to_bytes())
    }

    /// Get account info
    pub fn info(&self) -> AccountInfo {
        AccountInfo {
            address: self.address().to_checksum(None),
            source: self.source.clone(),
        }
    }
}

fn mnemonic_seed(mnemonic: &str) -> Result<[u8; 64], Error> {
    let mnemonic = Mnemonic::from_str(mnemonic)
        .map_err(|e| Error::Wallet(format!("Invalid mnemonic: {}", e)))?;
    Ok(mnemonic.to_seed(""))
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("address", &self.address())
            .field("source", &self.source)
            .finish()
    }
}

impl PartialEq for Account {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl PartialEq<Address> for Account {
    fn eq(&self, other: &Address) -> bool {
        self.address() == *other
    }
}
