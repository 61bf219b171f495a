mod utils;

use std::fs;
use tempfile::TempDir;
use token_farm_harness::{HarnessConfig, Network};
use utils::test_utils::{init_test_env, load_fixture_config};

#[test]
fn test_fixture_config_loading() {
    init_test_env();

    let config = load_fixture_config();

    assert_eq!(config.default_network(), Some("development"));
    let kovan = config.network("kovan").expect("kovan section missing");
    assert_eq!(kovan.chain_id, Some(42));
    assert!(kovan.verify);
    assert!(!config.network("development").unwrap().verify);
    assert!(config.network("ropsten").is_none());
}

#[test]
fn test_contract_addresses_per_network() {
    init_test_env();

    let config = load_fixture_config();

    assert_eq!(
        config.contract_address("kovan", "weth_token").as_deref(),
        Some("0xd0A1E359811322d97991E03f863a0C30C2cF029C")
    );
    assert_eq!(config.contract_address("rinkeby", "fau_token"), None);
    assert_eq!(config.contract_address("development", "fau_token"), None);
    assert_eq!(config.contract_address("ropsten", "fau_token"), None);
}

#[test]
fn test_from_key_expanded_from_dotenv() {
    init_test_env();

    let config = load_fixture_config();

    assert_eq!(
        config.from_key().unwrap(),
        "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d"
    );
}

#[test]
fn test_host_expansion() {
    init_test_env();

    let config = load_fixture_config();

    let host = config.host("kovan").expect("kovan host missing");
    assert!(host.starts_with("https://kovan.infura.io/v3/"));
    assert!(!host.contains("${"));
    assert_eq!(config.host("development"), None);
}

#[test]
fn test_toml_config_with_dev_chain_settings() {
    init_test_env();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("farm.toml");
    fs::write(
        &path,
        r#"
[networks]
default = "mainnet-fork"

[networks.mainnet-fork]
eth_usd_price_feed = "0x5f4eC3Df9cbd43714FE2740f5E3616155c5b8419"

[dev_chain]
accounts = 3
chain_id = 31337
"#,
    )
    .unwrap();

    let config = HarnessConfig::load(&path).unwrap();

    assert_eq!(config.default_network(), Some("mainnet-fork"));
    assert_eq!(config.dev_chain.accounts, 3);
    assert_eq!(config.dev_chain.chain_id, 31337);
    assert_eq!(
        config.dev_chain.mnemonic,
        token_farm_harness::config::DEFAULT_DEV_MNEMONIC
    );
    assert!(config
        .contract_address("mainnet-fork", "eth_usd_price_feed")
        .is_some());
}

#[test]
fn test_missing_config_file() {
    init_test_env();

    let dir = TempDir::new().unwrap();
    assert!(HarnessConfig::load(dir.path().join("absent.yaml")).is_err());
}

#[test]
fn test_network_selection() {
    init_test_env();

    let explicit = Network::select(Some("kovan"), Some("development"));
    assert_eq!(explicit.name(), "kovan");
    assert!(!explicit.is_local());

    let local = Network::new("ganache");
    assert!(local.is_local());
    assert!(!Network::new("mainnet").is_local());
}
