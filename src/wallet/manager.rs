use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

/// Wallet Manager - Orchestration Layer
///
/// The single wallet session for a running app instance. Explicitly
/// constructed and torn down; all UI-facing operations go through here,
/// delegating to the specialized operation modules.
use crate::chain::{ChainClient, GridClient};
use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::keys::TronAddress;
use crate::storage::models::{TrackedToken, WalletState};
use crate::storage::vault::{CredentialStore, DeviceKeyring};
use crate::storage::Storage;
use crate::tron::{
    build_transfer, sign_transfer, submit_transfer, wait_for_confirmation, PendingTransaction,
    TransferStatus,
};
use crate::wallet::auth::{AuthProof, AuthVerifier};
use crate::wallet::types::{WalletInfo, WalletSummary};
use crate::wallet::{balance_ops, wallet_ops};

pub struct WalletManager {
    pub config: WalletConfig,
    storage: Storage,
    vault: CredentialStore,
    chain: Arc<dyn ChainClient>,
    verifier: Arc<dyn AuthVerifier>,
    /// Serializes every read-modify-write of `state.json` (refreshes and
    /// token list edits). A token added while a refresh is in flight must
    /// queue behind it, or the refresh's snapshot would overwrite it.
    state_lock: Mutex<()>,
    /// Single-writer guard for vault save/delete.
    store_lock: Mutex<()>,
}

impl WalletManager {
    /// Production constructor: TronGrid-style chain client from config.
    pub fn new(
        config: WalletConfig,
        keyring: Arc<dyn DeviceKeyring>,
        verifier: Arc<dyn AuthVerifier>,
    ) -> Self {
        let chain = Arc::new(GridClient::new(config.node_url.clone()));
        let storage = Storage::new(config.wallet_dir.clone());
        Self::new_with_chain(config, storage, chain, keyring, verifier)
    }

    /// Constructor with injected storage and chain client (for testing).
    pub fn new_with_chain(
        config: WalletConfig,
        storage: Storage,
        chain: Arc<dyn ChainClient>,
        keyring: Arc<dyn DeviceKeyring>,
        verifier: Arc<dyn AuthVerifier>,
    ) -> Self {
        let vault = CredentialStore::new(storage.clone(), keyring);
        Self {
            config,
            storage,
            vault,
            chain,
            verifier,
            state_lock: Mutex::new(()),
            store_lock: Mutex::new(()),
        }
    }

    // ============================================================================
    // Wallet lifecycle (delegates to wallet_ops)
    // ============================================================================

    pub async fn create_wallet(&self, name: &str) -> Result<WalletInfo, WalletError> {
        let _guard = self.store_lock.lock().await;
        wallet_ops::create_wallet(&self.storage, &self.vault, &self.config, name)
    }

    pub async fn import_wallet(&self, name: &str, phrase: &str) -> Result<WalletInfo, WalletError> {
        let _guard = self.store_lock.lock().await;
        wallet_ops::import_wallet(&self.storage, &self.vault, &self.config, name, phrase)
    }

    pub fn list_wallets(&self) -> Result<Vec<WalletSummary>, WalletError> {
        wallet_ops::list_wallets(&self.storage)
    }

    /// Cached state for UI hydration; never touches the vault.
    pub fn wallet_view(&self, name: &str) -> Result<WalletState, WalletError> {
        if !self.storage.wallet_exists(name) {
            return Err(WalletError::WalletNotFound(name.to_string()));
        }
        Ok(self.storage.load_state(name)?)
    }

    pub async fn delete_wallet(&self, name: &str) -> Result<(), WalletError> {
        let _guard = self.store_lock.lock().await;
        wallet_ops::delete_wallet(&self.storage, &self.vault, name)
    }

    pub fn reveal_mnemonic(
        &self,
        name: &str,
        proof: &AuthProof,
    ) -> Result<Zeroizing<String>, WalletError> {
        wallet_ops::reveal_mnemonic(
            &self.storage,
            &self.vault,
            self.verifier.as_ref(),
            self.config.auth_window,
            name,
            proof,
        )
    }

    // ============================================================================
    // Balances & tokens (delegates to balance_ops)
    // ============================================================================

    pub async fn refresh_balances(&self, name: &str) -> Result<WalletState, WalletError> {
        let _guard = self.state_lock.lock().await;
        balance_ops::refresh_balances(&self.storage, self.chain.as_ref(), name).await
    }

    pub async fn add_token(&self, name: &str, contract: &str) -> Result<TrackedToken, WalletError> {
        let _guard = self.state_lock.lock().await;
        balance_ops::add_token(&self.storage, self.chain.as_ref(), name, contract).await
    }

    pub async fn remove_token(&self, name: &str, contract: &str) -> Result<(), WalletError> {
        let _guard = self.state_lock.lock().await;
        balance_ops::remove_token(&self.storage, name, contract)
    }

    // ============================================================================
    // Transfers
    // ============================================================================

    /// Validate and build a transfer against the cached wallet state.
    pub fn build_transfer(
        &self,
        name: &str,
        recipient: &str,
        amount: &str,
        token: Option<&str>,
    ) -> Result<PendingTransaction, WalletError> {
        let state = self.wallet_view(name)?;
        build_transfer(&state, recipient, amount, token)
    }

    /// Sign and broadcast a built transfer.
    ///
    /// On success the transfer is `Submitted` with its txid set. A node
    /// rejection is terminal; if retries exhaust without the outcome
    /// being verifiable the transfer stays signed and the status is
    /// reported unknown.
    pub async fn send_transfer(
        &self,
        name: &str,
        pending: &mut PendingTransaction,
    ) -> Result<String, WalletError> {
        let state = self.wallet_view(name)?;
        let owner = TronAddress::from_str(&state.address)
            .map_err(|e| WalletError::Internal(format!("stored address: {}", e)))?;

        let signed = sign_transfer(pending, &owner, &self.vault, name)?;
        submit_transfer(self.chain.as_ref(), pending, &signed).await
    }

    /// Wait for a submitted transfer to confirm, up to the configured
    /// timeout. On timeout the status is reported unknown, never failed.
    pub async fn wait_for_confirmation(
        &self,
        pending: &mut PendingTransaction,
    ) -> Result<TransferStatus, WalletError> {
        wait_for_confirmation(self.chain.as_ref(), pending, self.config.confirm_timeout).await
    }
}
