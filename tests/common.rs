/// Common test utilities for wallet core integration tests
///
/// Provides a temp-dir backed wallet manager, a scriptable mock chain
/// client, and a hardware-backed test keyring.
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use vnda_wallet_core::chain::{ChainClient, ChainTxStatus, TokenMetadata};
use vnda_wallet_core::error::WalletError;
use vnda_wallet_core::keys::TronAddress;
use vnda_wallet_core::storage::vault::DeviceKeyring;
use vnda_wallet_core::storage::Storage;
use vnda_wallet_core::tron::SignedTransfer;
use vnda_wallet_core::wallet::PassphraseVerifier;
use vnda_wallet_core::{WalletConfig, WalletManager};

pub const TEST_PASSPHRASE: &str = "unit-test-passphrase";

/// Keyring stand-in for the platform keystore.
pub struct TestKeyring {
    pub hardware: bool,
}

impl DeviceKeyring for TestKeyring {
    fn hardware_backed(&self) -> bool {
        self.hardware
    }

    fn data_key(&self) -> Result<[u8; 32], WalletError> {
        Ok([0xa5u8; 32])
    }
}

/// Scriptable in-process chain client.
#[derive(Default)]
pub struct MockChainClient {
    pub native_balances: Mutex<HashMap<String, u64>>,
    pub token_balances: Mutex<HashMap<(String, String), u64>>,
    pub metadata: Mutex<HashMap<String, TokenMetadata>>,
    /// Contracts whose balance lookups fail with a network error.
    pub failing_contracts: Mutex<HashSet<String>>,
    /// Fail native balance lookups when set.
    pub fail_native: Mutex<bool>,
    /// Delay native balance lookups, to hold a refresh in flight.
    pub native_delay: Mutex<Option<std::time::Duration>>,
    /// Fail this many broadcasts with a network error before succeeding.
    pub broadcast_network_failures: AtomicU32,
    /// When set, a failed broadcast still registers the tx as Pending
    /// (the response was lost, not the transaction).
    pub accept_despite_error: Mutex<bool>,
    /// Reject every broadcast with a permanent (non-network) error.
    pub reject_broadcasts: Mutex<bool>,
    pub broadcast_count: AtomicU32,
    pub statuses: Mutex<HashMap<String, ChainTxStatus>>,
}

impl MockChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_native_balance(&self, address: &str, balance: u64) {
        self.native_balances
            .lock()
            .unwrap()
            .insert(address.to_string(), balance);
    }

    pub fn set_token(&self, contract: &str, symbol: &str, decimals: u8) {
        self.metadata.lock().unwrap().insert(
            contract.to_string(),
            TokenMetadata {
                name: format!("{} Token", symbol),
                symbol: symbol.to_string(),
                decimals,
            },
        );
    }

    pub fn set_token_balance(&self, address: &str, contract: &str, balance: u64) {
        self.token_balances
            .lock()
            .unwrap()
            .insert((address.to_string(), contract.to_string()), balance);
    }

    pub fn set_status(&self, txid: &str, status: ChainTxStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(txid.to_string(), status);
    }

    fn broadcast(&self, signed: &SignedTransfer) -> Result<String, WalletError> {
        self.broadcast_count.fetch_add(1, Ordering::SeqCst);

        if *self.reject_broadcasts.lock().unwrap() {
            return Err(WalletError::Internal("broadcast rejected by node".to_string()));
        }

        let remaining = self.broadcast_network_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.broadcast_network_failures
                .store(remaining - 1, Ordering::SeqCst);
            if *self.accept_despite_error.lock().unwrap() {
                // The transaction made it in even though the reply was lost.
                self.set_status(&signed.txid, ChainTxStatus::Pending);
            }
            return Err(WalletError::Network("connection reset".to_string()));
        }

        self.set_status(&signed.txid, ChainTxStatus::Pending);
        Ok(signed.txid.clone())
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_native_balance(&self, address: &TronAddress) -> Result<u64, WalletError> {
        let delay = *self.native_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.fail_native.lock().unwrap() {
            return Err(WalletError::Network("node unavailable".to_string()));
        }
        Ok(self
            .native_balances
            .lock()
            .unwrap()
            .get(&address.to_string())
            .copied()
            .unwrap_or(0))
    }

    async fn get_token_balance(
        &self,
        address: &TronAddress,
        contract: &TronAddress,
    ) -> Result<u64, WalletError> {
        if self
            .failing_contracts
            .lock()
            .unwrap()
            .contains(&contract.to_string())
        {
            return Err(WalletError::Network("contract call failed".to_string()));
        }
        Ok(self
            .token_balances
            .lock()
            .unwrap()
            .get(&(address.to_string(), contract.to_string()))
            .copied()
            .unwrap_or(0))
    }

    async fn get_token_metadata(
        &self,
        contract: &TronAddress,
    ) -> Result<TokenMetadata, WalletError> {
        self.metadata
            .lock()
            .unwrap()
            .get(&contract.to_string())
            .cloned()
            .ok_or_else(|| WalletError::Network(format!("no such contract: {}", contract)))
    }

    async fn broadcast_native_transfer(
        &self,
        signed: &SignedTransfer,
    ) -> Result<String, WalletError> {
        self.broadcast(signed)
    }

    async fn broadcast_token_transfer(
        &self,
        signed: &SignedTransfer,
    ) -> Result<String, WalletError> {
        self.broadcast(signed)
    }

    async fn get_transaction_status(&self, txid: &str) -> Result<ChainTxStatus, WalletError> {
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .get(txid)
            .copied()
            .unwrap_or(ChainTxStatus::Unknown))
    }
}

/// Test environment with automatic cleanup.
pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub manager: WalletManager,
    pub chain: Arc<MockChainClient>,
    pub verifier: Arc<PassphraseVerifier>,
}

impl TestEnvironment {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(WalletConfig::default())
    }

    pub fn with_config(mut config: WalletConfig) -> anyhow::Result<Self> {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init()
            .ok();

        let temp_dir = TempDir::new()?;
        config.wallet_dir = temp_dir.path().to_path_buf();

        let storage = Storage::new(temp_dir.path().to_path_buf());
        let chain = Arc::new(MockChainClient::new());
        let verifier = Arc::new(PassphraseVerifier::new(TEST_PASSPHRASE)?);

        let manager = WalletManager::new_with_chain(
            config,
            storage,
            chain.clone(),
            Arc::new(TestKeyring { hardware: true }),
            verifier.clone(),
        );

        Ok(Self {
            temp_dir,
            manager,
            chain,
            verifier,
        })
    }
}
