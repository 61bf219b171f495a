use aes_gcm::aead::{generic_array::GenericArray, Aead, OsRng};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use argon2::{
    password_hash::{rand_core::RngCore, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::wallet::{Account, AccountSource};

/// File extension of keystore entries
const ACCOUNT_EXTENSION: &str = "account";

/// Encrypted account data stored on disk
#[derive(Serialize, Deserialize)]
struct EncryptedAccountData {
    /// Argon2 hash parameters and salt
    password_hash: String,
    /// Salt for the encryption key derivation
    kdf_salt: String,
    /// Encrypted private key (AES-256-GCM)
    encrypted_key: Vec<u8>,
    /// Nonce used for encryption
    nonce: Vec<u8>,
    /// Account metadata
    metadata: AccountMetadata,
}

/// Account metadata for display purposes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMetadata {
    pub id: String,
    pub address: String,
    pub created_at: String,
    pub last_accessed: Option<String>,
}

/// Encrypted on-disk account store keyed by identifier
pub struct Keystore {
    /// Directory where accounts are stored
    storage_dir: PathBuf,
}

impl Keystore {
    /// Open the keystore in the default directory, creating it if needed
    pub fn new() -> Result<Self, Error> {
        Self::with_directory(Self::default_directory()?)
    }

    /// Open a keystore rooted at `storage_dir`, creating it if needed
    pub fn with_directory(storage_dir: impl Into<PathBuf>) -> Result<Self, Error> {
        let storage_dir = storage_dir.into();
        if !storage_dir.exists() {
            fs::create_dir_all(&storage_dir)
                .map_err(|e| Error::Wallet(format!("Failed to create keystore directory: {}", e)))?;
        }
        Ok(Self { storage_dir })
    }

    /// Default keystore directory (~/.token_farm_harness/accounts/)
    pub fn default_directory() -> Result<PathBuf, Error> {
        let home_dir = dirs::home_dir()
            .ok_or_else(|| Error::Wallet("Could not determine home directory".to_string()))?;

        Ok(home_dir.join(".token_farm_harness").join("accounts"))
    }

    pub fn directory(&self) -> &Path {
        &self.storage_dir
    }

    /// Open the keystore at `storage_dir` only if the directory already exists
    pub fn existing(storage_dir: impl Into<PathBuf>) -> Option<Self> {
        let storage_dir = storage_dir.into();
        storage_dir.is_dir().then_some(Self { storage_dir })
    }

    fn entry_path(&self, id: &str) -> Result<PathBuf, Error> {
        validate_id(id)?;
        Ok(self.storage_dir.join(format!("{}.{}", id, ACCOUNT_EXTENSION)))
    }

    /// Whether an entry with this id exists
    pub fn contains(&self, id: &str) -> bool {
        self.entry_path(id).is_ok_and(|path| path.exists())
    }

    /// List metadata of all stored accounts
    pub fn list(&self) -> Result<Vec<AccountMetadata>, Error> {
        let mut accounts = Vec::new();

        let entries = fs::read_dir(&self.storage_dir)
            .map_err(|e| Error::Wallet(format!("Failed to read keystore directory: {}", e)))?;

        for entry in entries {
            let entry = entry
                .map_err(|e| Error::Wallet(format!("Failed to read directory entry: {}", e)))?;

            if entry.path().extension().is_some_and(|ext| ext == ACCOUNT_EXTENSION) {
                if let Ok(data) = self.read_entry(&entry.path()) {
                    accounts.push(data.metadata);
                }
            }
        }

        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(accounts)
    }

    /// Encrypt and persist an account under `id`
    pub fn save(&self, id: &str, account: &Account, password: &str) -> Result<(), Error> {
        validate_id(id)?;
        if self.contains(id) {
            return Err(Error::Wallet(format!("Account '{}' already exists", id)));
        }
        validate_password(password)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Wallet(format!("Failed to hash password: {}", e)))?
            .to_string();

        let kdf_salt = SaltString::generate(&mut OsRng).as_str().to_string();
        let key = derive_key(password, &kdf_salt)?;
        let cipher = Aes256Gcm::new(&key);
        let mut nonce_bytes = [0u8; 12];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let encrypted_key = cipher
            .encrypt(nonce, account.private_key_hex().as_bytes())
            .map_err(|e| Error::Wallet(format!("Failed to encrypt private key: {}", e)))?;

        let data = EncryptedAccountData {
            password_hash,
            kdf_salt,
            encrypted_key,
            nonce: nonce_bytes.to_vec(),
            metadata: AccountMetadata {
                id: id.to_string(),
                address: account.address().to_checksum(None),
                created_at: chrono::Utc::now().to_rfc3339(),
                last_accessed: None,
            },
        };

        self.write_entry(&self.entry_path(id)?, &data)
    }

    /// Load and decrypt the account stored under `id`.
    ///
    /// A missing entry is reported as `CredentialNotFound`.
    pub fn load(&self, id: &str, password: &str) -> Result<Account, Error> {
        let path = self.entry_path(id)?;
        if !path.exists() {
            return Err(Error::CredentialNotFound(id.to_string()));
        }

        let mut data = self.read_entry(&path)?;

        let parsed_hash = PasswordHash::new(&data.password_hash)
            .map_err(|e| Error::Wallet(format!("Failed to parse password hash: {}", e)))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .map_err(|_| Error::Wallet("Invalid password".to_string()))?;

        let key = derive_key(password, &data.kdf_salt)?;
        let cipher = Aes256Gcm::new(&key);
        let nonce = Nonce::from_slice(&data.nonce);
        let decrypted = cipher
            .decrypt(nonce, data.encrypted_key.as_ref())
            .map_err(|e| Error::Wallet(format!("Failed to decrypt private key: {}", e)))?;
        let private_key = String::from_utf8(decrypted)
            .map_err(|e| Error::Wallet(format!("Invalid private key data: {}", e)))?;

        let account = Account::from_private_key(&private_key, AccountSource::Stored(id.to_string()))?;

        data.metadata.last_accessed = Some(chrono::Utc::now().to_rfc3339());
        self.write_entry(&path, &data)?;

        Ok(account)
    }

    /// Delete a stored account
    pub fn delete(&self, id: &str) -> Result<(), Error> {
        let path = self.entry_path(id)?;
        if !path.exists() {
            return Err(Error::CredentialNotFound(id.to_string()));
        }
        fs::remove_file(&path)
            .map_err(|e| Error::Wallet(format!("Failed to delete account file: {}", e)))
    }

    fn read_entry(&self, path: &Path) -> Result<EncryptedAccountData, Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Wallet(format!("Failed to read account file: {}", e)))?;
        serde_json::from_str(&content)
            .map_err(|e| Error::Wallet(format!("Failed to parse account file: {}", e)))
    }

    fn write_entry(&self, path: &Path, data: &EncryptedAccountData) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| Error::Wallet(format!("Failed to serialize account data: {}", e)))?;
        fs::write(path, json)
            .map_err(|e| Error::Wallet(format!("Failed to write account file: {}", e)))
    }
}

/// Derive the AES-256 key from the password with Argon2
fn derive_key(
    password: &str,
    salt: &str,
) -> Result<GenericArray<u8, aes_gcm::aes::cipher::typenum::U32>, Error> {
    let mut key_bytes = [0u8; 32];
    Argon2::default()
        .hash_password_into(password.as_bytes(), salt.as_bytes(), &mut key_bytes)
        .map_err(|e| Error::Wallet(format!("Failed to derive encryption key: {}", e)))?;
    Ok(*GenericArray::from_slice(&key_bytes))
}

/// Account ids name a file inside the keystore directory; anything that could
/// leave it is rejected
pub fn validate_id(id: &str) -> Result<(), Error> {
    if id.is_empty() || id == "." || id.contains("..") || id.contains(['/', '\\']) {
        return Err(Error::Wallet(format!("Invalid account id '{}'", id)));
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), Error> {
    if password.len() < 12 {
        return Err(Error::Wallet(
            "Password must be at least 12 characters long".to_string(),
        ));
    }

    let checks = [
        (password.chars().any(|c| c.is_uppercase()), "an uppercase letter"),
        (password.chars().any(|c| c.is_lowercase()), "a lowercase letter"),
        (password.chars().any(|c| c.is_ascii_digit()), "a number"),
        (password.chars().any(|c| !c.is_alphanumeric()), "a symbol"),
    ];
    for (ok, what) in checks {
        if !ok {
            return Err(Error::Wallet(format!(
                "Password must contain at least {}",
                what
            )));
        }
    }

    Ok(())
}
