use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::transports::http::reqwest::Url;
use async_trait::async_trait;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{Chain, Constructor, TxReceipt};
use crate::error::Error;
use crate::wallet::Account;

/// Directory holding compiled contract artifacts
pub const DEFAULT_ARTIFACTS_DIR: &str = "build/contracts";

/// Compiled contract artifact; only the creation bytecode is used
#[derive(Debug, Deserialize)]
struct Artifact {
    bytecode: String,
}

/// Chain reached over Ethereum JSON-RPC, signing locally
pub struct RpcChain {
    url: Url,
    chain_id: u64,
    artifacts_dir: PathBuf,
    poll_interval: Duration,
}

impl RpcChain {
    /// Connect to `host`, checking the chain id when one is expected
    pub async fn connect(
        host: &str,
        expected_chain_id: Option<u64>,
        artifacts_dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        let url: Url = host
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC url '{}': {}", host, e)))?;

        let provider = ProviderBuilder::new().on_http(url.clone());
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get chain id: {}", e)))?;

        if let Some(expected) = expected_chain_id {
            if expected != chain_id {
                return Err(Error::Config(format!(
                    "Chain id mismatch at {}: expected {}, got {}",
                    host, expected, chain_id
                )));
            }
        }

        tracing::info!("Connected to {} (chain id {})", host, chain_id);

        Ok(Self {
            url,
            chain_id,
            artifacts_dir: artifacts_dir.into(),
            poll_interval: Duration::from_secs(2),
        })
    }

    /// Change how often confirmations are polled
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Creation bytecode with ABI-encoded constructor arguments appended
    fn creation_code(&self, constructor: &Constructor) -> Result<Vec<u8>, Error> {
        let name = constructor.kind().artifact_name();
        let mut code = load_bytecode(&self.artifacts_dir, name)?;
        code.extend_from_slice(&constructor.encode_args());
        Ok(code)
    }

    async fn submit(&self, from: &Account, tx: TransactionRequest) -> Result<TxReceipt, Error> {
        let wallet = EthereumWallet::from(from.signer().clone());
        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.url.clone());

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify(e.to_string()))?;
        tracing::debug!("Submitted transaction {}", pending.tx_hash());

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| Error::Transaction(e.to_string()))?;

        to_receipt(&receipt)
    }
}

fn to_receipt(receipt: &TransactionReceipt) -> Result<TxReceipt, Error> {
    if !receipt.status() {
        return Err(Error::reverted(format!(
            "transaction {} reverted",
            receipt.transaction_hash
        )));
    }
    Ok(TxReceipt {
        transaction_hash: receipt.transaction_hash,
        block_number: receipt.block_number.unwrap_or_default(),
        from: receipt.from,
        to: receipt.to,
        contract_address: receipt.contract_address,
        status: true,
    })
}

/// Node errors mentioning a revert are contract failures, the rest transport
fn classify(message: String) -> Error {
    if message.contains("revert") {
        Error::Reverted { reason: message }
    } else {
        Error::Rpc(message)
    }
}

/// Read the creation bytecode of `name` from `<dir>/<name>.json`
pub fn load_bytecode(dir: &Path, name: &str) -> Result<Vec<u8>, Error> {
    let path = dir.join(format!("{}.json", name));
    let content = fs::read_to_string(&path).map_err(|e| {
        Error::Config(format!(
            "Failed to read build artifact {}: {}",
            path.display(),
            e
        ))
    })?;
    let artifact: Artifact = serde_json::from_str(&content)?;
    let hex_code = artifact.bytecode.trim();
    let hex_code = hex_code.strip_prefix("0x").unwrap_or(hex_code);
    if hex_code.is_empty() {
        return Err(Error::Config(format!(
            "Build artifact {} has no bytecode",
            path.display()
        )));
    }
    hex::decode(hex_code)
        .map_err(|e| Error::Config(format!("Invalid bytecode in {}: {}", path.display(), e)))
}

#[async_trait]
impl Chain for RpcChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn deploy(&self, from: &Account, constructor: &Constructor) -> Result<TxReceipt, Error> {
        let code = self.creation_code(constructor)?;
        let tx = TransactionRequest::default()
            .with_from(from.address())
            .with_deploy_code(code);
        let receipt = self.submit(from, tx).await?;
        if receipt.contract_address.is_none() {
            return Err(Error::Transaction(format!(
                "deployment {} produced no contract address",
                receipt.transaction_hash
            )));
        }
        Ok(receipt)
    }

    async fn send_transaction(
        &self,
        from: &Account,
        to: Address,
        data: Bytes,
    ) -> Result<TxReceipt, Error> {
        let tx = TransactionRequest::default()
            .with_from(from.address())
            .with_to(to)
            .with_input(data);
        self.submit(from, tx).await
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes, Error> {
        let provider = ProviderBuilder::new().on_http(self.url.clone());
        let mut tx = TransactionRequest::default().with_to(to).with_input(data);
        if let Some(from) = from {
            tx = tx.with_from(from);
        }
        provider
            .call(&tx)
            .await
            .map_err(|e| classify(e.to_string()))
    }

    async fn block_number(&self) -> Result<u64, Error> {
        let provider = ProviderBuilder::new().on_http(self.url.clone());
        provider
            .get_block_number()
            .await
            .map_err(|e| Error::Rpc(format!("Failed to get block number: {}", e)))
    }

    async fn wait_for_confirmations(
        &self,
        receipt: &TxReceipt,
        confirmations: u64,
    ) -> Result<(), Error> {
        let target = receipt.block_number + confirmations.saturating_sub(1);
        loop {
            if self.block_number().await? >= target {
                return Ok(());
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
