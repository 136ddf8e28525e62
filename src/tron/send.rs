use backoff::future::retry;
use backoff::ExponentialBackoff;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::chain::{ChainClient, ChainTxStatus};
use crate::error::WalletError;
use crate::tron::transaction::{PendingTransaction, SignedTransfer, TransferStatus};

/// How often confirmation polling queries the node.
const CONFIRM_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Broadcast a signed transfer, retrying transient network failures
/// with bounded exponential backoff.
///
/// A signed transfer must never be blindly resubmitted: an earlier
/// broadcast may have reached the network even though the response was
/// lost. Every retry therefore first queries the transaction status and
/// only rebroadcasts when the node has never seen the txid.
pub async fn submit_transfer(
    chain: &dyn ChainClient,
    pending: &mut PendingTransaction,
    signed: &SignedTransfer,
) -> Result<String, WalletError> {
    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(500),
        max_interval: Duration::from_secs(4),
        max_elapsed_time: Some(Duration::from_secs(20)),
        ..Default::default()
    };
    submit_with_policy(chain, pending, signed, policy).await
}

async fn submit_with_policy(
    chain: &dyn ChainClient,
    pending: &mut PendingTransaction,
    signed: &SignedTransfer,
    policy: ExponentialBackoff,
) -> Result<String, WalletError> {
    if pending.status != TransferStatus::Signed {
        return Err(WalletError::Internal(format!(
            "cannot submit transfer in state {:?}",
            pending.status
        )));
    }

    let broadcast_attempted = AtomicBool::new(false);

    let result = retry(policy, || async {
        // Query-before-retry: if a previous attempt may have gone out,
        // check whether the network already accepted it.
        if broadcast_attempted.load(Ordering::SeqCst) {
            match chain.get_transaction_status(&signed.txid).await {
                Ok(ChainTxStatus::Pending) | Ok(ChainTxStatus::Confirmed) => {
                    log::info!("Transfer {} already accepted, not rebroadcasting", signed.txid);
                    return Ok(signed.txid.clone());
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Status check before retry failed: {}", e);
                    return Err(backoff::Error::transient(e));
                }
            }
        }

        broadcast_attempted.store(true, Ordering::SeqCst);

        let broadcast = match signed.token {
            Some(_) => chain.broadcast_token_transfer(signed).await,
            None => chain.broadcast_native_transfer(signed).await,
        };

        match broadcast {
            Ok(txid) => Ok(txid),
            Err(e @ WalletError::Network(_)) => {
                log::warn!("Broadcast failed, will retry: {}", e);
                Err(backoff::Error::transient(e))
            }
            Err(e) => Err(backoff::Error::permanent(e)),
        }
    })
    .await;

    match result {
        Ok(txid) => {
            pending.advance(TransferStatus::Submitted)?;
            log::info!("Transfer {} submitted as {}", pending.id, txid);
            Ok(txid)
        }
        // A broadcast may have reached the network even though every
        // status check failed; the outcome is unknown, not failed, and
        // the transfer stays signed so submission can be retried.
        Err(WalletError::Network(_)) if broadcast_attempted.load(Ordering::SeqCst) => {
            log::warn!(
                "Transfer {} outcome unknown after retries, check {}",
                pending.id,
                signed.txid
            );
            Err(WalletError::UnknownTransactionStatus(signed.txid.clone()))
        }
        Err(e) => {
            pending.advance(TransferStatus::Failed)?;
            Err(e)
        }
    }
}

/// Wait for a submitted transfer to reach a terminal chain state.
///
/// A broadcast transaction cannot be canceled; on timeout the status is
/// genuinely unknown and the caller is told so ("check explorer") rather
/// than the transfer being silently marked failed.
pub async fn wait_for_confirmation(
    chain: &dyn ChainClient,
    pending: &mut PendingTransaction,
    timeout: Duration,
) -> Result<TransferStatus, WalletError> {
    if pending.status != TransferStatus::Submitted {
        return Err(WalletError::Internal(format!(
            "cannot await confirmation in state {:?}",
            pending.status
        )));
    }
    let txid = pending
        .txid
        .clone()
        .ok_or_else(|| WalletError::Internal("submitted transfer without txid".to_string()))?;

    let start = Instant::now();
    loop {
        match chain.get_transaction_status(&txid).await {
            Ok(ChainTxStatus::Confirmed) => {
                pending.advance(TransferStatus::Confirmed)?;
                log::info!("Transfer {} confirmed", txid);
                return Ok(TransferStatus::Confirmed);
            }
            Ok(ChainTxStatus::Failed) => {
                pending.advance(TransferStatus::Failed)?;
                log::warn!("Transfer {} failed on chain", txid);
                return Ok(TransferStatus::Failed);
            }
            Ok(_) => {}
            // Polling errors are tolerated until the timeout.
            Err(e) => log::warn!("Confirmation poll failed: {}", e),
        }

        if start.elapsed() >= timeout {
            return Err(WalletError::UnknownTransactionStatus(txid));
        }
        tokio::time::sleep(CONFIRM_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TokenMetadata;
    use crate::keys::TronAddress;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::AtomicU32;
    use uuid::Uuid;

    const RECIPIENT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

    /// Chain stub whose broadcasts and status checks always fail the
    /// configured way.
    struct FlakyChain {
        broadcasts: AtomicU32,
        permanent: bool,
    }

    impl FlakyChain {
        fn new(permanent: bool) -> Self {
            Self {
                broadcasts: AtomicU32::new(0),
                permanent,
            }
        }
    }

    #[async_trait]
    impl ChainClient for FlakyChain {
        async fn get_native_balance(&self, _address: &TronAddress) -> Result<u64, WalletError> {
            Ok(0)
        }

        async fn get_token_balance(
            &self,
            _address: &TronAddress,
            _contract: &TronAddress,
        ) -> Result<u64, WalletError> {
            Ok(0)
        }

        async fn get_token_metadata(
            &self,
            _contract: &TronAddress,
        ) -> Result<TokenMetadata, WalletError> {
            Err(WalletError::Network("down".to_string()))
        }

        async fn broadcast_native_transfer(
            &self,
            _signed: &SignedTransfer,
        ) -> Result<String, WalletError> {
            self.broadcasts.fetch_add(1, Ordering::SeqCst);
            if self.permanent {
                Err(WalletError::Internal("rejected".to_string()))
            } else {
                Err(WalletError::Network("timed out".to_string()))
            }
        }

        async fn broadcast_token_transfer(
            &self,
            signed: &SignedTransfer,
        ) -> Result<String, WalletError> {
            self.broadcast_native_transfer(signed).await
        }

        async fn get_transaction_status(&self, _txid: &str) -> Result<ChainTxStatus, WalletError> {
            Err(WalletError::Network("timed out".to_string()))
        }
    }

    fn signed_pending() -> (PendingTransaction, SignedTransfer) {
        let txid = "ab".repeat(32);
        let mut pending = PendingTransaction {
            id: Uuid::new_v4(),
            recipient: TronAddress::from_base58(RECIPIENT).unwrap(),
            amount: 1_000_000,
            token: None,
            status: TransferStatus::Built,
            txid: None,
            created_at: Utc::now(),
        };
        pending.advance(TransferStatus::Signed).unwrap();
        pending.txid = Some(txid.clone());

        let signed = SignedTransfer {
            txid,
            raw: vec![0u8; 16],
            signature: "00".repeat(64),
            token: None,
        };
        (pending, signed)
    }

    fn short_policy() -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(5),
            max_interval: Duration::from_millis(10),
            max_elapsed_time: Some(Duration::from_millis(50)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_exhausted_network_retries_report_unknown_outcome() {
        let chain = FlakyChain::new(false);
        let (mut pending, signed) = signed_pending();

        let err = submit_with_policy(&chain, &mut pending, &signed, short_policy())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::UnknownTransactionStatus(ref t) if *t == signed.txid));

        // A broadcast may be on chain; the transfer must not read as
        // failed, and stays signed so submission can be retried.
        assert_eq!(pending.status, TransferStatus::Signed);
        assert!(chain.broadcasts.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_permanent_rejection_is_failed_without_retry() {
        let chain = FlakyChain::new(true);
        let (mut pending, signed) = signed_pending();

        let err = submit_with_policy(&chain, &mut pending, &signed, short_policy())
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::Internal(_)));
        assert_eq!(pending.status, TransferStatus::Failed);
        assert_eq!(chain.broadcasts.load(Ordering::SeqCst), 1);
    }
}
