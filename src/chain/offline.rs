use alloy::primitives::{Address, Bytes};
use async_trait::async_trait;

use super::{Chain, Constructor, TxReceipt};
use crate::error::Error;
use crate::wallet::Account;

/// Stand-in for a live network when only configuration is read.
///
/// Every chain request fails with [`Error::Rpc`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineChain;

fn offline<T>() -> Result<T, Error> {
    Err(Error::Rpc(
        "not connected: this session only reads configuration".to_string(),
    ))
}

#[async_trait]
impl Chain for OfflineChain {
    fn chain_id(&self) -> u64 {
        0
    }

    async fn deploy(&self, _from: &Account, _constructor: &Constructor) -> Result<TxReceipt, Error> {
        offline()
    }

    async fn send_transaction(
        &self,
        _from: &Account,
        _to: Address,
        _data: Bytes,
    ) -> Result<TxReceipt, Error> {
        offline()
    }

    async fn call(&self, _from: Option<Address>, _to: Address, _data: Bytes) -> Result<Bytes, Error> {
        offline()
    }

    async fn block_number(&self) -> Result<u64, Error> {
        offline()
    }

    async fn wait_for_confirmations(
        &self,
        _receipt: &TxReceipt,
        _confirmations: u64,
    ) -> Result<(), Error> {
        offline()
    }
}
