//! Command line entry point for the token farm harness.
//!
//! On local networks every invocation runs against a fresh in-process chain,
//! so deployments only live for the duration of the command.

use alloy::primitives::{Address, I256, U256};
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use token_farm_harness::account::{AccountQuery, KEYSTORE_PASSWORD_ENV};
use token_farm_harness::deploy::deploy_token_farm_and_dapp_token;
use token_farm_harness::funding::fund_with_token;
use token_farm_harness::registry;
use token_farm_harness::resolver::MockParams;
use token_farm_harness::wallet::storage::{validate_password, Keystore};
use token_farm_harness::wallet::{Account, AccountSource};
use token_farm_harness::{HarnessConfig, Network, Session, SessionOptions};

#[derive(Parser)]
#[command(name = "farm-harness")]
#[command(about = "Deploy and drive the token farm contracts", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Network to use (defaults to FARM_NETWORK, then networks.default)
    #[arg(short, long, global = true)]
    network: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keystore directory (defaults to ~/.token_farm_harness/accounts)
    #[arg(long, global = true)]
    keystore: Option<PathBuf>,

    /// Directory with compiled contract artifacts
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Show the account that would sign transactions
    Account {
        /// Local test account index
        #[arg(long)]
        index: Option<usize>,
        /// Stored account id
        #[arg(long)]
        id: Option<String>,
    },

    /// Resolve a logical contract name to an address
    Resolve {
        /// Logical name, e.g. fau_token or eth_usd_price_feed
        name: Option<String>,
        /// Resolve every registered name
        #[arg(long)]
        all: bool,
    },

    /// Deploy the mock price feed and tokens
    DeployMocks {
        #[arg(long, default_value_t = 18)]
        decimals: u8,
        /// Initial price feed answer, in feed units
        #[arg(long)]
        initial_value: Option<String>,
    },

    /// Deploy DappToken and TokenFarm and register the allowed tokens
    Deploy,

    /// Transfer a token to an address
    Fund {
        /// Recipient address
        target: String,
        /// Logical name of the token to send
        #[arg(long)]
        token: Option<String>,
        /// Amount in wei
        #[arg(long)]
        amount: Option<String>,
        /// Local test account index to send from
        #[arg(long)]
        index: Option<usize>,
        /// Stored account id to send from
        #[arg(long)]
        id: Option<String>,
    },

    /// Encrypt a private key into the keystore
    StoreAccount {
        /// Identifier to store the account under
        id: String,
        /// Hex private key; defaults to wallets.from_key
        #[arg(long, env = "FARM_IMPORT_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_level.into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match &cli.config {
        Some(path) => HarnessConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => HarnessConfig::load_default().context("loading config")?,
    };

    if let Commands::StoreAccount { id, private_key } = &cli.command {
        return store_account(&cli, &config, id, private_key.as_deref());
    }

    let network = Network::select(cli.network.as_deref(), config.default_network());
    let options = SessionOptions {
        keystore_dir: cli.keystore.clone(),
        keystore_password: None,
        artifacts_dir: cli.artifacts.clone(),
    };
    // Live-network lookups read config only and never need a node
    let session = match cli.command {
        Commands::Resolve { .. } => Session::for_lookup(network, config, options).await,
        _ => Session::connect(network, config, options).await,
    }
    .context("connecting")?;

    match cli.command {
        Commands::Account { index, id } => {
            let account = session.resolve_account(&AccountQuery {
                index,
                stored_id: id,
            })?;
            println!("{}", serde_json::to_string_pretty(&account.info())?);
        }
        Commands::Resolve { name, all } => {
            let names: Vec<String> = match (name, all) {
                (_, true) => registry::registered_names().map(String::from).collect(),
                (Some(name), false) => vec![name],
                (None, false) => bail!("give a contract name or --all"),
            };
            for name in names {
                let handle = session.resolve_contract(&name).await?;
                println!("{}: {}", name, handle);
            }
        }
        Commands::DeployMocks {
            decimals,
            initial_value,
        } => {
            let mut params = MockParams {
                decimals,
                ..MockParams::default()
            };
            if let Some(value) = initial_value {
                params.initial_value = value
                    .parse::<I256>()
                    .with_context(|| format!("invalid initial value '{}'", value))?;
            }
            session.deploy_mocks(params).await?;
            println!("Mocks Deployed!");
        }
        Commands::Deploy => {
            let (token_farm, dapp_token) = deploy_token_farm_and_dapp_token(&session).await?;
            println!("TokenFarm: {}", token_farm.address());
            println!("DappToken: {}", dapp_token.address());
        }
        Commands::Fund {
            target,
            token,
            amount,
            index,
            id,
        } => {
            let target: Address = target
                .parse()
                .with_context(|| format!("invalid target address '{}'", target))?;
            let account = session.resolve_account(&AccountQuery {
                index,
                stored_id: id,
            })?;
            let token = match token {
                Some(name) => {
                    let handle = session.resolve_contract(&name).await?;
                    Some(session.token(handle.address))
                }
                None => None,
            };
            let amount = amount
                .map(|a| a.parse::<U256>())
                .transpose()
                .context("invalid amount")?;
            let receipt =
                fund_with_token(&session, target, Some(&account), token.as_ref(), amount).await?;
            println!("{}", serde_json::to_string_pretty(&receipt)?);
        }
        Commands::StoreAccount { .. } => unreachable!("handled before connecting"),
    }

    Ok(())
}

fn store_account(
    cli: &Cli,
    config: &HarnessConfig,
    id: &str,
    private_key: Option<&str>,
) -> Result<()> {
    let key = match private_key {
        Some(key) => key.to_string(),
        None => config.from_key()?,
    };
    let account = Account::from_private_key(&key, AccountSource::Stored(id.to_string()))?;

    let password = std::env::var(KEYSTORE_PASSWORD_ENV)
        .with_context(|| format!("set {} to encrypt the account", KEYSTORE_PASSWORD_ENV))?;
    validate_password(&password)?;

    let keystore = match &cli.keystore {
        Some(dir) => Keystore::with_directory(dir)?,
        None => Keystore::new()?,
    };
    keystore.save(id, &account, &password)?;
    println!(
        "Stored {} as '{}' in {}",
        account.address(),
        id,
        keystore.directory().display()
    );
    Ok(())
}
