mod utils;

use std::sync::Arc;
use tempfile::TempDir;
use token_farm_harness::account::{AccountQuery, AccountResolver, Resolution, Strategy};
use token_farm_harness::config::WalletsConfig;
use token_farm_harness::network::LOCAL_BLOCKCHAIN_ENVIRONMENTS;
use token_farm_harness::wallet::storage::Keystore;
use token_farm_harness::wallet::{Account, AccountSource};
use token_farm_harness::{Error, HarnessConfig, Network, SessionOptions};
use utils::test_utils::{
    address, dev_session, init_test_env, live_session, load_fixture_config, DEV_ACCOUNT_0,
    DEV_ACCOUNT_1,
};

const PASSWORD: &str = "Correct-Horse-42";

fn resolver(network: &str, config: HarnessConfig) -> AccountResolver {
    init_test_env();
    AccountResolver::new(Network::new(network), Arc::new(config)).expect("Failed to build resolver")
}

fn keystore_with(id: &str, account: &Account) -> TempDir {
    let dir = TempDir::new().unwrap();
    Keystore::with_directory(dir.path())
        .unwrap()
        .save(id, account, PASSWORD)
        .unwrap();
    dir
}

#[test]
fn test_index_selects_local_account() {
    let session = dev_session();

    let account = session.resolve_account(&AccountQuery::index(1)).unwrap();
    assert_eq!(account.address(), address(DEV_ACCOUNT_1));
    assert_eq!(account.source(), &AccountSource::Local(1));
}

#[test]
fn test_local_network_defaults_to_first_account() {
    let session = dev_session();

    let account = session.default_account().unwrap();
    assert_eq!(account.address(), address(DEV_ACCOUNT_0));
}

#[test]
fn test_index_zero_counts_as_given_on_live_network() {
    let resolver = resolver("kovan", HarnessConfig::default());

    let account = resolver.resolve(&AccountQuery::index(0)).unwrap();
    assert_eq!(account.address(), address(DEV_ACCOUNT_0));
}

#[test]
fn test_index_out_of_range() {
    let resolver = resolver("development", HarnessConfig::default());

    match resolver.resolve(&AccountQuery::index(10)) {
        Err(Error::AccountIndexOutOfRange { index, available }) => {
            assert_eq!(index, 10);
            assert_eq!(available, 10);
        }
        other => panic!("expected AccountIndexOutOfRange, got {:?}", other),
    }
}

#[test]
fn test_local_network_ignores_stored_id() {
    let resolver = resolver("hardhat", HarnessConfig::default());

    let account = resolver
        .resolve(&AccountQuery::stored("does-not-exist"))
        .unwrap();
    assert_eq!(account.address(), address(DEV_ACCOUNT_0));
}

#[test]
fn test_index_takes_priority_over_stored_id() {
    let resolver = resolver("kovan", HarnessConfig::default());

    let query = AccountQuery {
        index: Some(1),
        stored_id: Some("does-not-exist".to_string()),
    };
    let account = resolver.resolve(&query).unwrap();
    assert_eq!(account.address(), address(DEV_ACCOUNT_1));
}

#[test]
fn test_stored_account_on_live_network() {
    let stored = Account::from_private_key(
        "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
        AccountSource::ConfigKey,
    )
    .unwrap();
    let dir = keystore_with("deployer", &stored);

    let resolver = resolver("kovan", HarnessConfig::default())
        .with_keystore_dir(dir.path())
        .with_keystore_password(PASSWORD);

    let account = resolver.resolve(&AccountQuery::stored("deployer")).unwrap();
    assert_eq!(account.address(), stored.address());
    assert_eq!(account.source(), &AccountSource::Stored("deployer".to_string()));
}

#[test]
fn test_missing_stored_account() {
    let dir = TempDir::new().unwrap();
    let resolver = resolver("kovan", load_fixture_config())
        .with_keystore_dir(dir.path())
        .with_keystore_password(PASSWORD);

    match resolver.resolve(&AccountQuery::stored("ghost")) {
        Err(Error::CredentialNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected CredentialNotFound, got {:?}", other),
    }
}

#[test]
fn test_live_network_falls_back_to_config_key() {
    let (session, _chain) = live_session("kovan", SessionOptions::default());

    let account = session.default_account().unwrap();
    assert_eq!(account.address(), address(DEV_ACCOUNT_1));
    assert_eq!(account.source(), &AccountSource::ConfigKey);
}

#[test]
fn test_live_network_without_config_key() {
    let resolver = resolver("kovan", HarnessConfig::default());

    match resolver.resolve(&AccountQuery::default()) {
        Err(Error::MissingConfigKey(key)) => assert_eq!(key, "wallets.from_key"),
        other => panic!("expected MissingConfigKey, got {:?}", other),
    }
}

#[test]
fn test_config_key_expanding_to_nothing() {
    let config = HarnessConfig {
        wallets: WalletsConfig {
            from_key: Some("${FARM_TEST_KEY_THAT_IS_NEVER_SET}".to_string()),
        },
        ..HarnessConfig::default()
    };
    let resolver = resolver("mainnet", config);

    assert!(matches!(
        resolver.resolve(&AccountQuery::default()),
        Err(Error::MissingConfigKey(_))
    ));
}

#[test]
fn test_strategies_skip_when_preconditions_fail() {
    let resolver = resolver("kovan", HarnessConfig::default());
    let query = AccountQuery::default();

    assert!(matches!(
        resolver.attempt(Strategy::ByIndex, &query).unwrap(),
        Resolution::Skipped
    ));
    assert!(matches!(
        resolver.attempt(Strategy::LocalDefault, &query).unwrap(),
        Resolution::Skipped
    ));
    assert!(matches!(
        resolver.attempt(Strategy::Stored, &query).unwrap(),
        Resolution::Skipped
    ));
}

#[test]
fn test_every_local_network_has_a_stable_default_account() {
    for name in LOCAL_BLOCKCHAIN_ENVIRONMENTS {
        let resolver = resolver(name, HarnessConfig::default());
        let first = resolver.resolve(&AccountQuery::default()).unwrap();
        let again = resolver.resolve(&AccountQuery::default()).unwrap();
        assert_eq!(first.address(), address(DEV_ACCOUNT_0), "network {}", name);
        assert_eq!(first, again, "network {}", name);
    }
}

#[test]
fn test_stored_lookup_does_not_create_keystore_directory() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");
    let resolver = resolver("kovan", load_fixture_config())
        .with_keystore_dir(&missing)
        .with_keystore_password(PASSWORD);

    match resolver.resolve(&AccountQuery::stored("ghost")) {
        Err(Error::CredentialNotFound(id)) => assert_eq!(id, "ghost"),
        other => panic!("expected CredentialNotFound, got {:?}", other),
    }
    assert!(!missing.exists());
}

#[test]
fn test_stored_id_cannot_leave_keystore() {
    let stored = Account::from_private_key(
        "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a",
        AccountSource::ConfigKey,
    )
    .unwrap();
    // An entry one level above the keystore directory
    let root = keystore_with("outside", &stored);
    let keys = root.path().join("keys");
    std::fs::create_dir(&keys).unwrap();

    let resolver = resolver("kovan", load_fixture_config())
        .with_keystore_dir(&keys)
        .with_keystore_password(PASSWORD);

    assert!(matches!(
        resolver.resolve(&AccountQuery::stored("../outside")),
        Err(Error::Wallet(_))
    ));
}
