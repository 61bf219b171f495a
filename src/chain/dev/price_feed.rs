use alloy::primitives::{I256, U256};
use alloy::sol_types::{SolCall, SolInterface};

use crate::abi::AggregatorV3Interface::{self, AggregatorV3InterfaceCalls};
use crate::error::Error;

/// `MockV3Aggregator` state: a single settable answer
#[derive(Debug, Clone)]
pub struct MockAggregator {
    decimals: u8,
    latest_answer: I256,
    latest_round: u64,
    updated_at: u64,
}

impl MockAggregator {
    pub fn new(decimals: u8, initial_answer: I256, timestamp: u64) -> Self {
        let mut feed = Self {
            decimals,
            latest_answer: I256::ZERO,
            latest_round: 0,
            updated_at: 0,
        };
        feed.update_answer(initial_answer, timestamp);
        feed
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn latest_answer(&self) -> I256 {
        self.latest_answer
    }

    pub fn update_answer(&mut self, answer: I256, timestamp: u64) {
        self.latest_answer = answer;
        self.updated_at = timestamp;
        self.latest_round += 1;
    }

    pub fn execute(&mut self, data: &[u8], timestamp: u64) -> Result<Vec<u8>, Error> {
        let call = AggregatorV3InterfaceCalls::abi_decode(data, true)?;
        let output = match call {
            AggregatorV3InterfaceCalls::decimals(_) => {
                AggregatorV3Interface::decimalsCall::abi_encode_returns(&(self.decimals,))
            }
            AggregatorV3InterfaceCalls::description(_) => {
                AggregatorV3Interface::descriptionCall::abi_encode_returns(&(
                    "v0.6/tests/MockV3Aggregator.sol".to_string(),
                ))
            }
            AggregatorV3InterfaceCalls::version(_) => {
                AggregatorV3Interface::versionCall::abi_encode_returns(&(U256::ZERO,))
            }
            AggregatorV3InterfaceCalls::latestRoundData(_) => {
                let round = U256::from(self.latest_round);
                let updated = U256::from(self.updated_at);
                AggregatorV3Interface::latestRoundDataCall::abi_encode_returns(&(
                    round,
                    self.latest_answer,
                    updated,
                    updated,
                    round,
                ))
            }
            AggregatorV3InterfaceCalls::updateAnswer(c) => {
                self.update_answer(c._answer, timestamp);
                Vec::new()
            }
        };
        Ok(output)
    }
}
