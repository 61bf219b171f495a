use alloy::primitives::{Address, Bytes, U256};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use token_farm_harness::chain::{Chain, Constructor, DevChain, TxReceipt};
use token_farm_harness::wallet::Account;
use token_farm_harness::{ContractKind, Error, HarnessConfig, Network, Session, SessionOptions};

#[cfg(test)]
#[allow(dead_code)]
pub mod test_utils {
    use super::*;

    /// Fixture configuration with a local, a fully configured and a partially
    /// configured live network
    pub const FIXTURE_CONFIG: &str = "config/brownie-config.yaml";

    /// Amount staked by the token farm scenarios: one whole token
    pub const AMOUNT_STAKED: u128 = 10u128.pow(18);

    /// Address of the first hardhat development account
    pub const DEV_ACCOUNT_0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    /// Address of the second hardhat development account
    pub const DEV_ACCOUNT_1: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    /// Initialize test logging; safe to call from every test
    pub fn init_test_env() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Load the fixture configuration (and its `.env` file)
    pub fn load_fixture_config() -> HarnessConfig {
        HarnessConfig::load(FIXTURE_CONFIG).expect("Failed to load fixture config")
    }

    pub fn address(value: &str) -> Address {
        value.parse().expect("Invalid test address")
    }

    /// A `development` session on its own in-process chain
    pub fn dev_session() -> Session {
        init_test_env();
        Session::development(HarnessConfig::default()).expect("Failed to create dev session")
    }

    /// A `development` session that also hands back its chain for inspection
    pub fn dev_session_with_chain() -> (Session, Arc<DevChain>) {
        init_test_env();
        let chain = Arc::new(DevChain::default());
        let session = Session::with_chain(
            Network::new("development"),
            HarnessConfig::default(),
            chain.clone(),
            SessionOptions::default(),
        )
        .expect("Failed to create dev session");
        (session, chain)
    }

    /// A session on a live network from the fixture config whose chain only
    /// records that it was used
    pub fn live_session(network: &str, options: SessionOptions) -> (Session, Arc<RecordingChain>) {
        init_test_env();
        let chain = Arc::new(RecordingChain::default());
        let session = Session::with_chain(
            Network::new(network),
            load_fixture_config(),
            chain.clone(),
            options,
        )
        .expect("Failed to create live session");
        (session, chain)
    }

    /// Local test account at `index` of the session
    pub fn local_account(session: &Session, index: usize) -> Account {
        session.accounts().local_accounts()[index].clone()
    }

    /// Chain that fails every request and counts how many it received
    #[derive(Default)]
    pub struct RecordingChain {
        requests: AtomicUsize,
    }

    impl RecordingChain {
        pub fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn record<T>(&self) -> Result<T, Error> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Err(Error::Rpc("recording chain does not execute requests".to_string()))
        }
    }

    #[async_trait]
    impl Chain for RecordingChain {
        fn chain_id(&self) -> u64 {
            42
        }

        async fn deploy(&self, _from: &Account, _constructor: &Constructor) -> Result<TxReceipt, Error> {
            self.record()
        }

        async fn send_transaction(
            &self,
            _from: &Account,
            _to: Address,
            _data: Bytes,
        ) -> Result<TxReceipt, Error> {
            self.record()
        }

        async fn call(&self, _from: Option<Address>, _to: Address, _data: Bytes) -> Result<Bytes, Error> {
            self.record()
        }

        async fn block_number(&self) -> Result<u64, Error> {
            self.record()
        }

        async fn wait_for_confirmations(
            &self,
            _receipt: &TxReceipt,
            _confirmations: u64,
        ) -> Result<(), Error> {
            self.record()
        }
    }

    /// Development chain whose first deployment of `fail_kind` reverts
    pub struct FailingDeployChain {
        inner: Arc<DevChain>,
        fail_kind: ContractKind,
        failed: AtomicBool,
    }

    impl FailingDeployChain {
        pub fn new(fail_kind: ContractKind) -> Self {
            Self {
                inner: Arc::new(DevChain::default()),
                fail_kind,
                failed: AtomicBool::new(false),
            }
        }

        pub fn inner(&self) -> &DevChain {
            &self.inner
        }
    }

    #[async_trait]
    impl Chain for FailingDeployChain {
        fn chain_id(&self) -> u64 {
            self.inner.chain_id()
        }

        async fn deploy(&self, from: &Account, constructor: &Constructor) -> Result<TxReceipt, Error> {
            if constructor.kind() == self.fail_kind && !self.failed.swap(true, Ordering::SeqCst) {
                return Err(Error::reverted("boom"));
            }
            self.inner.deploy(from, constructor).await
        }

        async fn send_transaction(
            &self,
            from: &Account,
            to: Address,
            data: Bytes,
        ) -> Result<TxReceipt, Error> {
            self.inner.send_transaction(from, to, data).await
        }

        async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes, Error> {
            self.inner.call(from, to, data).await
        }

        async fn block_number(&self) -> Result<u64, Error> {
            self.inner.block_number().await
        }

        async fn wait_for_confirmations(
            &self,
            receipt: &TxReceipt,
            confirmations: u64,
        ) -> Result<(), Error> {
            self.inner.wait_for_confirmations(receipt, confirmations).await
        }
    }

    /// A `development` session whose first deployment of `fail_kind` reverts
    pub fn failing_deploy_session(fail_kind: ContractKind) -> (Session, Arc<FailingDeployChain>) {
        init_test_env();
        let chain = Arc::new(FailingDeployChain::new(fail_kind));
        let session = Session::with_chain(
            Network::new("development"),
            HarnessConfig::default(),
            chain.clone(),
            SessionOptions::default(),
        )
        .expect("Failed to create dev session");
        (session, chain)
    }

    pub fn amount_staked() -> U256 {
        U256::from(AMOUNT_STAKED)
    }

    /// Assert that `result` is a revert carrying `reason`
    pub fn assert_reverted<T: std::fmt::Debug>(result: Result<T, Error>, reason: &str) {
        match result {
            Err(Error::Reverted { reason: actual }) => assert!(
                actual.contains(reason),
                "expected revert '{}', got '{}'",
                reason,
                actual
            ),
            other => panic!("expected revert '{}', got {:?}", reason, other),
        }
    }
}
