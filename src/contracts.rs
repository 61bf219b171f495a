//! Typed bindings over the chain seam.
//!
//! A binding is an address plus the ABI of its contract type; nothing checks
//! that the code at the address actually implements that ABI.

use alloy::primitives::{Address, I256, U256};
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::abi::{AggregatorV3Interface, IERC20, ITokenFarm};
use crate::chain::{Chain, TxReceipt};
use crate::error::Error;
use crate::registry::ContractKind;
use crate::wallet::Account;

/// A contract type bound to an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractHandle {
    pub kind: ContractKind,
    pub address: Address,
}

impl ContractHandle {
    pub fn new(kind: ContractKind, address: Address) -> Self {
        Self { kind, address }
    }
}

impl fmt::Display for ContractHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.kind, self.address)
    }
}

async fn read<C: SolCall + Send + Sync>(
    chain: &dyn Chain,
    from: Option<Address>,
    to: Address,
    call: C,
) -> Result<C::Return, Error> {
    let output = chain.call(from, to, call.abi_encode().into()).await?;
    Ok(C::abi_decode_returns(&output, true)?)
}

async fn write<C: SolCall + Send + Sync>(
    chain: &dyn Chain,
    from: &Account,
    to: Address,
    call: C,
) -> Result<TxReceipt, Error> {
    chain
        .send_transaction(from, to, call.abi_encode().into())
        .await
}

/// Price feed binding (`AggregatorV3Interface`)
#[derive(Clone)]
pub struct PriceFeed {
    address: Address,
    chain: Arc<dyn Chain>,
}

impl PriceFeed {
    pub fn new(address: Address, chain: Arc<dyn Chain>) -> Self {
        Self { address, chain }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn decimals(&self) -> Result<u8, Error> {
        let ret = read(
            self.chain.as_ref(),
            None,
            self.address,
            AggregatorV3Interface::decimalsCall {},
        )
        .await?;
        Ok(ret._0)
    }

    /// Latest reported answer
    pub async fn latest_answer(&self) -> Result<I256, Error> {
        let ret = read(
            self.chain.as_ref(),
            None,
            self.address,
            AggregatorV3Interface::latestRoundDataCall {},
        )
        .await?;
        Ok(ret.answer)
    }

    pub async fn update_answer(&self, from: &Account, answer: I256) -> Result<TxReceipt, Error> {
        write(
            self.chain.as_ref(),
            from,
            self.address,
            AggregatorV3Interface::updateAnswerCall { _answer: answer },
        )
        .await
    }
}

/// ERC-20 token binding
#[derive(Clone)]
pub struct Token {
    address: Address,
    chain: Arc<dyn Chain>,
}

impl Token {
    pub fn new(address: Address, chain: Arc<dyn Chain>) -> Self {
        Self { address, chain }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub async fn name(&self) -> Result<String, Error> {
        let ret = read(self.chain.as_ref(), None, self.address, IERC20::nameCall {}).await?;
        Ok(ret._0)
    }

    pub async fn symbol(&self) -> Result<String, Error> {
        let ret = read(self.chain.as_ref(), None, self.address, IERC20::symbolCall {}).await?;
        Ok(ret._0)
    }

    pub async fn total_supply(&self) -> Result<U256, Error> {
        let ret = read(
            self.chain.as_ref(),
            None,
            self.address,
            IERC20::totalSupplyCall {},
        )
        .await?;
        Ok(ret._0)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, Error> {
        let ret = read(
            self.chain.as_ref(),
            None,
            self.address,
            IERC20::balanceOfCall { account },
        )
        .await?;
        Ok(ret._0)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, Error> {
        let ret = read(
            self.chain.as_ref(),
            None,
            self.address,
            IERC20::allowanceCall { owner, spender },
        )
        .await?;
        Ok(ret._0)
    }

    pub async fn transfer(
        &self,
        from: &Account,
        to: Address,
        amount: U256,
    ) -> Result<TxReceipt, Error> {
        write(
            self.chain.as_ref(),
            from,
            self.address,
            IERC20::transferCall { to, amount },
        )
        .await
    }

    pub async fn approve(
        &self,
        from: &Account,
        spender: Address,
        amount: U256,
    ) -> Result<TxReceipt, Error> {
        write(
            self.chain.as_ref(),
            from,
            self.address,
            IERC20::approveCall { spender, amount },
        )
        .await
    }
}

/// `TokenFarm` binding
#[derive(Clone)]
pub struct TokenFarm {
    address: Address,
    chain: Arc<dyn Chain>,
}

impl TokenFarm {
    pub fn new(address: Address, chain: Arc<dyn Chain>) -> Self {
        Self { address, chain }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    async fn read<C: SolCall + Send + Sync>(&self, call: C) -> Result<C::Return, Error> {
        read(self.chain.as_ref(), None, self.address, call).await
    }

    async fn write<C: SolCall + Send + Sync>(
        &self,
        from: &Account,
        call: C,
    ) -> Result<TxReceipt, Error> {
        write(self.chain.as_ref(), from, self.address, call).await
    }

    pub async fn owner(&self) -> Result<Address, Error> {
        Ok(self.read(ITokenFarm::ownerCall {}).await?._0)
    }

    pub async fn set_price_feed_contract(
        &self,
        from: &Account,
        token: Address,
        price_feed: Address,
    ) -> Result<TxReceipt, Error> {
        self.write(
            from,
            ITokenFarm::setPriceFeedContractCall {
                _token: token,
                _priceFeed: price_feed,
            },
        )
        .await
    }

    pub async fn token_price_feed_mapping(&self, token: Address) -> Result<Address, Error> {
        Ok(self
            .read(ITokenFarm::tokenPriceFeedMappingCall { _token: token })
            .await?
            ._0)
    }

    pub async fn add_allowed_tokens(&self, from: &Account, token: Address) -> Result<TxReceipt, Error> {
        self.write(from, ITokenFarm::addAllowedTokensCall { _token: token })
            .await
    }

    pub async fn allowed_tokens(&self, index: usize) -> Result<Address, Error> {
        Ok(self
            .read(ITokenFarm::allowedTokensCall {
                index: U256::from(index),
            })
            .await?
            ._0)
    }

    pub async fn token_is_allowed(&self, token: Address) -> Result<bool, Error> {
        Ok(self
            .read(ITokenFarm::tokenIsAllowedCall { _token: token })
            .await?
            ._0)
    }

    pub async fn stake_tokens(
        &self,
        from: &Account,
        amount: U256,
        token: Address,
    ) -> Result<TxReceipt, Error> {
        self.write(
            from,
            ITokenFarm::stakeTokensCall {
                _amount: amount,
                _token: token,
            },
        )
        .await
    }

    pub async fn unstake_tokens(&self, from: &Account, token: Address) -> Result<TxReceipt, Error> {
        self.write(from, ITokenFarm::unstakeTokensCall { _token: token })
            .await
    }

    pub async fn issue_tokens(&self, from: &Account) -> Result<TxReceipt, Error> {
        self.write(from, ITokenFarm::issueTokensCall {}).await
    }

    /// Staker at `index`; reverts past the end of the list
    pub async fn stakers(&self, index: usize) -> Result<Address, Error> {
        Ok(self
            .read(ITokenFarm::stakersCall {
                index: U256::from(index),
            })
            .await?
            ._0)
    }

    pub async fn staking_balance(&self, token: Address, user: Address) -> Result<U256, Error> {
        Ok(self
            .read(ITokenFarm::stakingBalanceCall {
                _token: token,
                _user: user,
            })
            .await?
            ._0)
    }

    pub async fn unique_tokens_staked(&self, user: Address) -> Result<U256, Error> {
        Ok(self
            .read(ITokenFarm::uniqueTokensStakedCall { _user: user })
            .await?
            ._0)
    }

    pub async fn get_user_total_value(&self, user: Address) -> Result<U256, Error> {
        Ok(self
            .read(ITokenFarm::getUserTotalValueCall { _user: user })
            .await?
            ._0)
    }

    pub async fn get_user_single_token_value(
        &self,
        user: Address,
        token: Address,
    ) -> Result<U256, Error> {
        Ok(self
            .read(ITokenFarm::getUserSingleTokenValueCall {
                _user: user,
                _token: token,
            })
            .await?
            ._0)
    }

    /// Latest price of `token` and the decimals it is quoted in
    pub async fn get_token_value(&self, token: Address) -> Result<(U256, U256), Error> {
        let ret = self
            .read(ITokenFarm::getTokenValueCall { _token: token })
            .await?;
        Ok((ret._0, ret._1))
    }
}
