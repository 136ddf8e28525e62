/// Balance and token list operations
///
/// Refresh policy: balances are cached, the chain is authoritative, and
/// a failed fetch keeps the cached value flagged stale rather than
/// zeroing it.
use chrono::Utc;
use std::str::FromStr;

use crate::chain::ChainClient;
use crate::error::WalletError;
use crate::keys::TronAddress;
use crate::storage::models::{TrackedToken, WalletState};
use crate::storage::Storage;

/// Refresh the native balance and every tracked token.
///
/// Token queries run concurrently; one token's failure never blocks the
/// others. Callers must hold the session's state lock so refreshes and
/// token list edits cannot interleave partial updates.
pub async fn refresh_balances(
    storage: &Storage,
    chain: &dyn ChainClient,
    name: &str,
) -> Result<WalletState, WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }

    let mut state = storage.load_state(name)?;
    let address = TronAddress::from_str(&state.address)
        .map_err(|e| WalletError::Internal(format!("stored address: {}", e)))?;

    match chain.get_native_balance(&address).await {
        Ok(balance) => {
            state.balance = balance;
            state.balance_stale = false;
        }
        Err(e) => {
            log::warn!("Native balance refresh failed for '{}': {}", name, e);
            state.balance_stale = true;
        }
    }

    let lookups = state.tokens.iter().map(|token| {
        let contract = TronAddress::from_str(&token.contract);
        async move {
            match contract {
                Ok(contract) => chain.get_token_balance(&address, &contract).await,
                Err(e) => Err(e),
            }
        }
    });
    let results = futures::future::join_all(lookups).await;

    for (token, result) in state.tokens.iter_mut().zip(results) {
        match result {
            Ok(balance) => {
                token.balance = balance;
                token.stale = false;
            }
            Err(e) => {
                log::warn!("Balance refresh failed for token {}: {}", token.contract, e);
                token.stale = true;
            }
        }
    }

    state.last_refreshed = Some(Utc::now());
    storage.save_state(name, &state)?;

    Ok(state)
}

/// Start tracking a TRC20 token.
///
/// Metadata comes from the contract; a contract that fails the lookup is
/// rejected as invalid, and a contract already in the list is rejected
/// as a duplicate without touching the list.
pub async fn add_token(
    storage: &Storage,
    chain: &dyn ChainClient,
    name: &str,
    contract: &str,
) -> Result<TrackedToken, WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }

    let contract_address = TronAddress::from_base58(contract)
        .map_err(|_| WalletError::InvalidToken(contract.to_string()))?;

    let mut state = storage.load_state(name)?;
    if state.find_token(contract).is_some() {
        return Err(WalletError::DuplicateToken(contract.to_string()));
    }

    let metadata = chain
        .get_token_metadata(&contract_address)
        .await
        .map_err(|e| WalletError::InvalidToken(format!("{}: {}", contract, e)))?;

    // Initial balance is best-effort; refresh will catch up.
    let address = TronAddress::from_str(&state.address)
        .map_err(|e| WalletError::Internal(format!("stored address: {}", e)))?;
    let (balance, stale) = match chain.get_token_balance(&address, &contract_address).await {
        Ok(balance) => (balance, false),
        Err(e) => {
            log::warn!("Initial balance fetch failed for {}: {}", contract, e);
            (0, true)
        }
    };

    let token = TrackedToken {
        contract: contract.to_string(),
        symbol: metadata.symbol,
        name: metadata.name,
        decimals: metadata.decimals,
        balance,
        stale,
    };

    state.tokens.push(token.clone());
    storage.save_state(name, &state)?;

    log::info!("Tracking token {} ({}) for '{}'", token.symbol, contract, name);
    Ok(token)
}

/// Stop tracking a token. The cached balance is discarded; on-chain
/// holdings are unaffected.
pub fn remove_token(storage: &Storage, name: &str, contract: &str) -> Result<(), WalletError> {
    if !storage.wallet_exists(name) {
        return Err(WalletError::WalletNotFound(name.to_string()));
    }

    let mut state = storage.load_state(name)?;
    let before = state.tokens.len();
    state.tokens.retain(|t| t.contract != contract);
    if state.tokens.len() == before {
        return Err(WalletError::InvalidToken(format!("not tracked: {}", contract)));
    }
    storage.save_state(name, &state)?;
    Ok(())
}
