use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolInterface};
use std::collections::HashMap;

use super::{price_feed_ref, token_mut, Contracts};
use crate::abi::ITokenFarm::{self, ITokenFarmCalls};
use crate::error::Error;

const NOT_OWNER: &str = "Ownable: caller is not the owner";

/// `TokenFarm` state
#[derive(Debug, Clone)]
pub struct Farm {
    owner: Address,
    dapp_token: Address,
    allowed_tokens: Vec<Address>,
    stakers: Vec<Address>,
    /// (token, user) -> staked amount
    staking_balance: HashMap<(Address, Address), U256>,
    unique_tokens_staked: HashMap<Address, U256>,
    price_feeds: HashMap<Address, Address>,
}

impl Farm {
    pub fn new(owner: Address, dapp_token: Address) -> Self {
        Self {
            owner,
            dapp_token,
            allowed_tokens: Vec::new(),
            stakers: Vec::new(),
            staking_balance: HashMap::new(),
            unique_tokens_staked: HashMap::new(),
            price_feeds: HashMap::new(),
        }
    }

    fn only_owner(&self, sender: Address) -> Result<(), Error> {
        if sender != self.owner {
            return Err(Error::reverted(NOT_OWNER));
        }
        Ok(())
    }

    fn staked(&self, token: Address, user: Address) -> U256 {
        self.staking_balance
            .get(&(token, user))
            .copied()
            .unwrap_or_default()
    }

    fn unique(&self, user: Address) -> U256 {
        self.unique_tokens_staked
            .get(&user)
            .copied()
            .unwrap_or_default()
    }

    fn token_is_allowed(&self, token: Address) -> bool {
        self.allowed_tokens.contains(&token)
    }

    /// Latest price of `token` and the decimals of its feed
    fn token_value(&self, contracts: &Contracts, token: Address) -> Result<(U256, U256), Error> {
        let feed_address = self.price_feeds.get(&token).copied().unwrap_or_default();
        let feed = price_feed_ref(contracts, feed_address)?;
        Ok((
            feed.latest_answer().into_raw(),
            U256::from(feed.decimals()),
        ))
    }

    fn user_single_token_value(
        &self,
        contracts: &Contracts,
        user: Address,
        token: Address,
    ) -> Result<U256, Error> {
        if self.unique(user).is_zero() {
            return Ok(U256::ZERO);
        }
        let (price, decimals) = self.token_value(contracts, token)?;
        let scale = U256::from(10u64)
            .checked_pow(decimals)
            .ok_or_else(|| Error::reverted("arithmetic overflow"))?;
        self.staked(token, user)
            .checked_mul(price)
            .map(|v| v / scale)
            .ok_or_else(|| Error::reverted("arithmetic overflow"))
    }

    fn user_total_value(&self, contracts: &Contracts, user: Address) -> Result<U256, Error> {
        if self.unique(user).is_zero() {
            return Err(Error::reverted("No tokens staked!"));
        }
        let mut total = U256::ZERO;
        for token in &self.allowed_tokens {
            total = total
                .checked_add(self.user_single_token_value(contracts, user, *token)?)
                .ok_or_else(|| Error::reverted("arithmetic overflow"))?;
        }
        Ok(total)
    }

    fn stake(
        &mut self,
        contracts: &mut Contracts,
        this: Address,
        sender: Address,
        amount: U256,
        token: Address,
    ) -> Result<(), Error> {
        if amount.is_zero() {
            return Err(Error::reverted("Amount must be more than 0"));
        }
        if !self.token_is_allowed(token) {
            return Err(Error::reverted("Token is currently not allowed"));
        }
        token_mut(contracts, token)?.transfer_from(this, sender, this, amount)?;

        if self.staked(token, sender).is_zero() {
            *self.unique_tokens_staked.entry(sender).or_default() += U256::from(1u64);
        }
        *self.staking_balance.entry((token, sender)).or_default() += amount;
        if self.unique(sender) == U256::from(1u64) && !self.stakers.contains(&sender) {
            self.stakers.push(sender);
        }
        Ok(())
    }

    fn unstake(
        &mut self,
        contracts: &mut Contracts,
        this: Address,
        sender: Address,
        token: Address,
    ) -> Result<(), Error> {
        let balance = self.staked(token, sender);
        if balance.is_zero() {
            return Err(Error::reverted("Staking balance cannot be 0"));
        }
        token_mut(contracts, token)?.transfer(this, sender, balance)?;
        self.staking_balance.insert((token, sender), U256::ZERO);

        let remaining = self.unique(sender) - U256::from(1u64);
        self.unique_tokens_staked.insert(sender, remaining);
        if remaining.is_zero() {
            if let Some(pos) = self.stakers.iter().position(|s| *s == sender) {
                self.stakers.swap_remove(pos);
            }
        }
        Ok(())
    }

    fn issue(&self, contracts: &mut Contracts, this: Address, sender: Address) -> Result<(), Error> {
        self.only_owner(sender)?;
        for recipient in &self.stakers {
            let value = self.user_total_value(contracts, *recipient)?;
            token_mut(contracts, self.dapp_token)?.transfer(this, *recipient, value)?;
        }
        Ok(())
    }

    /// Dispatch ABI-encoded calldata sent by `sender` to the farm at `this`
    pub fn execute(
        &mut self,
        contracts: &mut Contracts,
        this: Address,
        sender: Address,
        data: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let call = ITokenFarmCalls::abi_decode(data, true)?;
        let output = match call {
            ITokenFarmCalls::owner(_) => ITokenFarm::ownerCall::abi_encode_returns(&(self.owner,)),
            ITokenFarmCalls::transferOwnership(c) => {
                self.only_owner(sender)?;
                if c.newOwner == Address::ZERO {
                    return Err(Error::reverted("Ownable: new owner is the zero address"));
                }
                self.owner = c.newOwner;
                Vec::new()
            }
            ITokenFarmCalls::dappToken(_) => {
                ITokenFarm::dappTokenCall::abi_encode_returns(&(self.dapp_token,))
            }
            ITokenFarmCalls::setPriceFeedContract(c) => {
                self.only_owner(sender)?;
                self.price_feeds.insert(c._token, c._priceFeed);
                Vec::new()
            }
            ITokenFarmCalls::tokenPriceFeedMapping(c) => {
                let feed = self.price_feeds.get(&c._token).copied().unwrap_or_default();
                ITokenFarm::tokenPriceFeedMappingCall::abi_encode_returns(&(feed,))
            }
            ITokenFarmCalls::addAllowedTokens(c) => {
                self.only_owner(sender)?;
                self.allowed_tokens.push(c._token);
                Vec::new()
            }
            ITokenFarmCalls::allowedTokens(c) => {
                let token = index(&self.allowed_tokens, c.index)?;
                ITokenFarm::allowedTokensCall::abi_encode_returns(&(token,))
            }
            ITokenFarmCalls::tokenIsAllowed(c) => {
                ITokenFarm::tokenIsAllowedCall::abi_encode_returns(&(self.token_is_allowed(c._token),))
            }
            ITokenFarmCalls::stakeTokens(c) => {
                self.stake(contracts, this, sender, c._amount, c._token)?;
                Vec::new()
            }
            ITokenFarmCalls::unstakeTokens(c) => {
                self.unstake(contracts, this, sender, c._token)?;
                Vec::new()
            }
            ITokenFarmCalls::issueTokens(_) => {
                self.issue(contracts, this, sender)?;
                Vec::new()
            }
            ITokenFarmCalls::stakers(c) => {
                let staker = index(&self.stakers, c.index)?;
                ITokenFarm::stakersCall::abi_encode_returns(&(staker,))
            }
            ITokenFarmCalls::stakingBalance(c) => {
                ITokenFarm::stakingBalanceCall::abi_encode_returns(&(self.staked(c._token, c._user),))
            }
            ITokenFarmCalls::uniqueTokensStaked(c) => {
                ITokenFarm::uniqueTokensStakedCall::abi_encode_returns(&(self.unique(c._user),))
            }
            ITokenFarmCalls::getUserTotalValue(c) => {
                let value = self.user_total_value(contracts, c._user)?;
                ITokenFarm::getUserTotalValueCall::abi_encode_returns(&(value,))
            }
            ITokenFarmCalls::getUserSingleTokenValue(c) => {
                let value = self.user_single_token_value(contracts, c._user, c._token)?;
                ITokenFarm::getUserSingleTokenValueCall::abi_encode_returns(&(value,))
            }
            ITokenFarmCalls::getTokenValue(c) => {
                let (price, decimals) = self.token_value(contracts, c._token)?;
                ITokenFarm::getTokenValueCall::abi_encode_returns(&(price, decimals))
            }
        };
        Ok(output)
    }
}

/// Public array getter: reverts past the end
fn index(items: &[Address], i: U256) -> Result<Address, Error> {
    usize::try_from(i)
        .ok()
        .and_then(|i| items.get(i).copied())
        .ok_or_else(|| Error::reverted("Index out of range"))
}
