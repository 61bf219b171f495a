use alloy::primitives::{Address, U256};
use alloy::sol_types::{SolCall, SolInterface};
use std::collections::HashMap;

use crate::abi::IERC20::{self, IERC20Calls};
use crate::error::Error;

/// ERC-20 state with OpenZeppelin semantics
#[derive(Debug, Clone)]
pub struct Erc20 {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
}

impl Erc20 {
    pub fn new(name: &str, symbol: &str) -> Self {
        Self {
            name: name.to_string(),
            symbol: symbol.to_string(),
            decimals: 18,
            total_supply: U256::ZERO,
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<(), Error> {
        if to == Address::ZERO {
            return Err(Error::reverted("ERC20: mint to the zero address"));
        }
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or_else(|| Error::reverted("arithmetic overflow"))?;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn balance_of(&self, owner: Address) -> U256 {
        self.balances.get(&owner).copied().unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Error> {
        if from == Address::ZERO {
            return Err(Error::reverted("ERC20: transfer from the zero address"));
        }
        if to == Address::ZERO {
            return Err(Error::reverted("ERC20: transfer to the zero address"));
        }
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(Error::reverted("ERC20: transfer amount exceeds balance"));
        }
        self.balances.insert(from, from_balance - amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub fn approve(&mut self, owner: Address, spender: Address, amount: U256) -> Result<(), Error> {
        if spender == Address::ZERO {
            return Err(Error::reverted("ERC20: approve to the zero address"));
        }
        self.allowances.insert((owner, spender), amount);
        Ok(())
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), Error> {
        let current = self.allowance(from, spender);
        if current != U256::MAX {
            if current < amount {
                return Err(Error::reverted("ERC20: insufficient allowance"));
            }
            self.allowances.insert((from, spender), current - amount);
        }
        self.transfer(from, to, amount)
    }

    /// Dispatch ABI-encoded calldata sent by `sender`
    pub fn execute(&mut self, sender: Address, data: &[u8]) -> Result<Vec<u8>, Error> {
        let call = IERC20Calls::abi_decode(data, true)?;
        let output = match call {
            IERC20Calls::name(_) => IERC20::nameCall::abi_encode_returns(&(self.name.clone(),)),
            IERC20Calls::symbol(_) => {
                IERC20::symbolCall::abi_encode_returns(&(self.symbol.clone(),))
            }
            IERC20Calls::decimals(_) => IERC20::decimalsCall::abi_encode_returns(&(self.decimals,)),
            IERC20Calls::totalSupply(_) => {
                IERC20::totalSupplyCall::abi_encode_returns(&(self.total_supply,))
            }
            IERC20Calls::balanceOf(c) => {
                IERC20::balanceOfCall::abi_encode_returns(&(self.balance_of(c.account),))
            }
            IERC20Calls::allowance(c) => IERC20::allowanceCall::abi_encode_returns(&(
                self.allowance(c.owner, c.spender),
            )),
            IERC20Calls::transfer(c) => {
                self.transfer(sender, c.to, c.amount)?;
                IERC20::transferCall::abi_encode_returns(&(true,))
            }
            IERC20Calls::approve(c) => {
                self.approve(sender, c.spender, c.amount)?;
                IERC20::approveCall::abi_encode_returns(&(true,))
            }
            IERC20Calls::transferFrom(c) => {
                self.transfer_from(sender, c.from, c.to, c.amount)?;
                IERC20::transferFromCall::abi_encode_returns(&(true,))
            }
        };
        Ok(output)
    }
}
