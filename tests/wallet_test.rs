mod utils;

use tempfile::TempDir;
use token_farm_harness::config::DEFAULT_DEV_MNEMONIC;
use token_farm_harness::wallet::storage::{validate_id, validate_password, Keystore};
use token_farm_harness::wallet::{Account, AccountSource};
use token_farm_harness::Error;
use utils::test_utils::{address, init_test_env, DEV_ACCOUNT_0, DEV_ACCOUNT_1};

const PASSWORD: &str = "Correct-Horse-42";
const DEV_KEY_0: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[test]
fn test_account_from_mnemonic() {
    init_test_env();

    let first = Account::from_mnemonic(DEFAULT_DEV_MNEMONIC, 0).unwrap();
    let second = Account::from_mnemonic(DEFAULT_DEV_MNEMONIC, 1).unwrap();

    assert_eq!(first.address(), address(DEV_ACCOUNT_0));
    assert_eq!(second.address(), address(DEV_ACCOUNT_1));
    assert_eq!(first.private_key_hex(), DEV_KEY_0);
    assert_eq!(first.info().address, DEV_ACCOUNT_0);
}

#[test]
fn test_derive_many_matches_single_derivation() {
    let accounts = Account::derive_many(DEFAULT_DEV_MNEMONIC, 3).unwrap();

    assert_eq!(accounts.len(), 3);
    assert_eq!(accounts[1], Account::from_mnemonic(DEFAULT_DEV_MNEMONIC, 1).unwrap());
    assert_eq!(accounts[2].source(), &AccountSource::Local(2));
}

#[test]
fn test_account_from_private_key() {
    let with_prefix =
        Account::from_private_key(&format!("0x{}", DEV_KEY_0), AccountSource::ConfigKey).unwrap();
    let without_prefix = Account::from_private_key(DEV_KEY_0, AccountSource::ConfigKey).unwrap();

    assert_eq!(with_prefix.address(), address(DEV_ACCOUNT_0));
    assert_eq!(with_prefix, without_prefix);
    assert!(Account::from_private_key("0xnothex", AccountSource::ConfigKey).is_err());
    assert!(Account::from_mnemonic("not a mnemonic", 0).is_err());
}

#[test]
fn test_keystore_round_trip() {
    init_test_env();

    let dir = TempDir::new().unwrap();
    let keystore = Keystore::with_directory(dir.path()).unwrap();
    let account = Account::from_private_key(DEV_KEY_0, AccountSource::ConfigKey).unwrap();

    keystore.save("deployer", &account, PASSWORD).unwrap();
    assert!(keystore.contains("deployer"));

    let loaded = keystore.load("deployer", PASSWORD).unwrap();
    assert_eq!(loaded.address(), account.address());
    assert_eq!(loaded.source(), &AccountSource::Stored("deployer".to_string()));

    let listed = keystore.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, "deployer");
    assert_eq!(listed[0].address, DEV_ACCOUNT_0);
    assert!(listed[0].last_accessed.is_some());
}

#[test]
fn test_keystore_wrong_password() {
    let dir = TempDir::new().unwrap();
    let keystore = Keystore::with_directory(dir.path()).unwrap();
    let account = Account::from_private_key(DEV_KEY_0, AccountSource::ConfigKey).unwrap();
    keystore.save("deployer", &account, PASSWORD).unwrap();

    assert!(matches!(
        keystore.load("deployer", "Wrong-Horse-4242"),
        Err(Error::Wallet(_))
    ));
}

#[test]
fn test_keystore_missing_entry() {
    let dir = TempDir::new().unwrap();
    let keystore = Keystore::with_directory(dir.path()).unwrap();

    match keystore.load("ghost", PASSWORD) {
        Err(Error::CredentialNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected CredentialNotFound, got {:?}", other),
    }
    assert!(matches!(
        keystore.delete("ghost"),
        Err(Error::CredentialNotFound(_))
    ));
}

#[test]
fn test_keystore_rejects_duplicates_and_deletes() {
    let dir = TempDir::new().unwrap();
    let keystore = Keystore::with_directory(dir.path()).unwrap();
    let account = Account::from_private_key(DEV_KEY_0, AccountSource::ConfigKey).unwrap();

    keystore.save("deployer", &account, PASSWORD).unwrap();
    assert!(keystore.save("deployer", &account, PASSWORD).is_err());

    keystore.delete("deployer").unwrap();
    assert!(!keystore.contains("deployer"));
    assert!(keystore.list().unwrap().is_empty());
}

#[test]
fn test_password_validation() {
    assert!(validate_password(PASSWORD).is_ok());
    assert!(validate_password("Short-1").is_err());
    assert!(validate_password("alllowercase-123").is_err());
    assert!(validate_password("ALLUPPERCASE-123").is_err());
    assert!(validate_password("NoDigitsHere-abc").is_err());
    assert!(validate_password("NoSymbols12345").is_err());

    let dir = TempDir::new().unwrap();
    let keystore = Keystore::with_directory(dir.path()).unwrap();
    let account = Account::from_private_key(DEV_KEY_0, AccountSource::ConfigKey).unwrap();
    assert!(keystore.save("weak", &account, "weak").is_err());
    assert!(!keystore.contains("weak"));
}

#[test]
fn test_account_id_validation() {
    assert!(validate_id("deployer").is_ok());
    assert!(validate_id("kovan-deployer_2").is_ok());
    for id in ["", ".", "..", "../x", "a/b", "a\\b", "/etc/passwd", "x/../y"] {
        assert!(
            matches!(validate_id(id), Err(Error::Wallet(_))),
            "id {:?} should be rejected",
            id
        );
    }
}

#[test]
fn test_keystore_stays_inside_its_directory() {
    let root = TempDir::new().unwrap();
    let keystore = Keystore::with_directory(root.path().join("keys")).unwrap();
    let account = Account::from_private_key(DEV_KEY_0, AccountSource::ConfigKey).unwrap();

    assert!(matches!(
        keystore.save("../escape", &account, PASSWORD),
        Err(Error::Wallet(_))
    ));
    assert!(std::fs::read_dir(root.path())
        .unwrap()
        .all(|entry| entry.unwrap().file_name() == "keys"));

    assert!(matches!(
        keystore.load("../escape", PASSWORD),
        Err(Error::Wallet(_))
    ));
    assert!(matches!(keystore.delete("a/b"), Err(Error::Wallet(_))));
    assert!(!keystore.contains("../escape"));
}

#[test]
fn test_existing_keystore_requires_directory() {
    let root = TempDir::new().unwrap();
    let missing = root.path().join("absent");

    assert!(Keystore::existing(&missing).is_none());
    assert!(!missing.exists());
    assert!(Keystore::existing(root.path()).is_some());
}
