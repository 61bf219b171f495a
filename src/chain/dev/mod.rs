//! In-process development chain.
//!
//! Hosts native implementations of the farm contracts and dispatches
//! ABI-encoded calldata to them. One block is mined per transaction and a
//! reverted transaction leaves no trace.

mod farm;
mod price_feed;
mod token;

use alloy::primitives::{keccak256, Address, Bytes, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{Chain, Constructor, TxReceipt};
use crate::error::Error;
use crate::wallet::Account;

pub use farm::Farm;
pub use price_feed::MockAggregator;
pub use token::Erc20;

/// Supply minted to the deployer of `DappToken`
pub const DAPP_TOKEN_SUPPLY: u128 = 1_000_000 * 10u128.pow(18);

/// Supply minted to the deployer of each mock token
pub const MOCK_TOKEN_SUPPLY: u128 = 1_000_000 * 10u128.pow(18);

/// Timestamp of the genesis block
const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

#[derive(Debug, Clone)]
pub enum DevContract {
    PriceFeed(MockAggregator),
    Token(Erc20),
    Farm(Farm),
}

pub(crate) type Contracts = HashMap<Address, DevContract>;

pub(crate) fn token_mut(contracts: &mut Contracts, address: Address) -> Result<&mut Erc20, Error> {
    match contracts.get_mut(&address) {
        Some(DevContract::Token(token)) => Ok(token),
        _ => Err(Error::reverted(format!("{} is not a token contract", address))),
    }
}

pub(crate) fn price_feed_ref(contracts: &Contracts, address: Address) -> Result<&MockAggregator, Error> {
    match contracts.get(&address) {
        Some(DevContract::PriceFeed(feed)) => Ok(feed),
        _ => Err(Error::reverted(format!("{} is not a price feed", address))),
    }
}

#[derive(Debug, Clone)]
struct DevState {
    block_number: u64,
    timestamp: u64,
    tx_count: u64,
    nonces: HashMap<Address, u64>,
    contracts: Contracts,
}

impl DevState {
    fn next_nonce(&mut self, sender: Address) -> u64 {
        let nonce = self.nonces.entry(sender).or_default();
        let current = *nonce;
        *nonce += 1;
        current
    }

    fn mine(&mut self) {
        self.block_number += 1;
        self.timestamp += 1;
    }

    fn receipt(
        &mut self,
        from: Address,
        to: Option<Address>,
        contract_address: Option<Address>,
        data: &[u8],
    ) -> TxReceipt {
        self.tx_count += 1;
        let mut preimage = Vec::with_capacity(8 + 40 + data.len());
        preimage.extend_from_slice(&self.tx_count.to_be_bytes());
        preimage.extend_from_slice(from.as_slice());
        preimage.extend_from_slice(to.unwrap_or_default().as_slice());
        preimage.extend_from_slice(data);
        TxReceipt {
            transaction_hash: keccak256(&preimage),
            block_number: self.block_number,
            from,
            to,
            contract_address,
            status: true,
        }
    }

    /// Run calldata against the contract at `to`
    fn dispatch(&mut self, sender: Address, to: Address, data: &[u8]) -> Result<Vec<u8>, Error> {
        let timestamp = self.timestamp;
        let mut target = self
            .contracts
            .remove(&to)
            .ok_or_else(|| Error::reverted(format!("no contract at {}", to)))?;

        let result = match &mut target {
            DevContract::PriceFeed(feed) => feed.execute(data, timestamp),
            DevContract::Token(token) => token.execute(sender, data),
            DevContract::Farm(farm) => farm.execute(&mut self.contracts, to, sender, data),
        };

        self.contracts.insert(to, target);
        result
    }
}

/// Ephemeral chain backing the recognized local networks
pub struct DevChain {
    chain_id: u64,
    state: Mutex<DevState>,
}

impl DevChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(DevState {
                block_number: 0,
                timestamp: GENESIS_TIMESTAMP,
                tx_count: 0,
                nonces: HashMap::new(),
                contracts: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DevState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Apply `f` atomically: any error restores the state as it was before
    fn transact<T>(&self, f: impl FnOnce(&mut DevState) -> Result<T, Error>) -> Result<T, Error> {
        let mut state = self.lock();
        let snapshot = state.clone();
        match f(&mut state) {
            Ok(value) => Ok(value),
            Err(e) => {
                *state = snapshot;
                Err(e)
            }
        }
    }

    /// Number of contracts deployed on this chain
    pub fn contract_count(&self) -> usize {
        self.lock().contracts.len()
    }

    /// Whether a contract lives at `address`
    pub fn has_contract(&self, address: Address) -> bool {
        self.lock().contracts.contains_key(&address)
    }

    /// Mine `count` empty blocks
    pub fn mine(&self, count: u64) {
        let mut state = self.lock();
        for _ in 0..count {
            state.mine();
        }
    }
}

impl Default for DevChain {
    fn default() -> Self {
        Self::new(1337)
    }
}

fn instantiate(constructor: &Constructor, deployer: Address, timestamp: u64) -> Result<DevContract, Error> {
    let contract = match constructor {
        Constructor::MockV3Aggregator {
            decimals,
            initial_answer,
        } => DevContract::PriceFeed(MockAggregator::new(*decimals, *initial_answer, timestamp)),
        Constructor::MockDai => {
            let mut token = Erc20::new("Mock DAI", "DAI");
            token.mint(deployer, U256::from(MOCK_TOKEN_SUPPLY))?;
            DevContract::Token(token)
        }
        Constructor::MockWeth => {
            let mut token = Erc20::new("Mock WETH", "WETH");
            token.mint(deployer, U256::from(MOCK_TOKEN_SUPPLY))?;
            DevContract::Token(token)
        }
        Constructor::DappToken => {
            let mut token = Erc20::new("Dapp Token", "DAPP");
            token.mint(deployer, U256::from(DAPP_TOKEN_SUPPLY))?;
            DevContract::Token(token)
        }
        Constructor::TokenFarm { dapp_token } => DevContract::Farm(Farm::new(deployer, *dapp_token)),
    };
    Ok(contract)
}

#[async_trait]
impl Chain for DevChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn deploy(&self, from: &Account, constructor: &Constructor) -> Result<TxReceipt, Error> {
        let deployer = from.address();
        self.transact(|state| {
            let nonce = state.next_nonce(deployer);
            let address = deployer.create(nonce);
            state.mine();
            let contract = instantiate(constructor, deployer, state.timestamp)?;
            state.contracts.insert(address, contract);
            Ok(state.receipt(deployer, None, Some(address), &constructor.encode_args()))
        })
    }

    async fn send_transaction(
        &self,
        from: &Account,
        to: Address,
        data: Bytes,
    ) -> Result<TxReceipt, Error> {
        let sender = from.address();
        self.transact(|state| {
            state.next_nonce(sender);
            state.mine();
            state.dispatch(sender, to, &data)?;
            Ok(state.receipt(sender, Some(to), None, &data))
        })
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes, Error> {
        // Calls run against a scratch copy; nothing they change persists
        let mut scratch = self.lock().clone();
        let output = scratch.dispatch(from.unwrap_or_default(), to, &data)?;
        Ok(Bytes::from(output))
    }

    async fn block_number(&self) -> Result<u64, Error> {
        Ok(self.lock().block_number)
    }

    async fn wait_for_confirmations(
        &self,
        receipt: &TxReceipt,
        confirmations: u64,
    ) -> Result<(), Error> {
        let mut state = self.lock();
        while state.block_number + 1 < receipt.block_number + confirmations {
            state.mine();
        }
        Ok(())
    }
}
