use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TRX_DECIMALS;
use crate::error::WalletError;
use crate::keys::TronAddress;
use crate::storage::models::WalletState;
use crate::tron::amount::parse_amount;

/// Transfer lifecycle. Transitions are strictly forward; `Confirmed`
/// and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    Built,
    Signed,
    Submitted,
    Confirmed,
    Failed,
}

/// An attempted transfer, from build time until it reaches a terminal
/// state. Never exposed to the UI in a partial state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PendingTransaction {
    pub id: Uuid,
    pub recipient: TronAddress,
    /// Base units (sun for native transfers, token units otherwise).
    pub amount: u64,
    /// `None` = native TRX, `Some` = TRC20 contract.
    pub token: Option<TronAddress>,
    pub status: TransferStatus,
    /// Known from signing time (sha256 of the raw payload).
    pub txid: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl PendingTransaction {
    /// Move the transfer forward one step. Backward or repeated
    /// transitions indicate a caller bug and are rejected.
    pub(crate) fn advance(&mut self, next: TransferStatus) -> Result<(), WalletError> {
        let allowed = matches!(
            (self.status, next),
            (TransferStatus::Built, TransferStatus::Signed)
                | (TransferStatus::Signed, TransferStatus::Submitted)
                | (TransferStatus::Submitted, TransferStatus::Confirmed)
                | (TransferStatus::Signed, TransferStatus::Failed)
                | (TransferStatus::Submitted, TransferStatus::Failed)
        );
        if !allowed {
            return Err(WalletError::Internal(format!(
                "invalid transfer transition: {:?} -> {:?}",
                self.status, next
            )));
        }
        self.status = next;
        Ok(())
    }
}

/// The canonical payload that gets hashed and signed.
///
/// Addresses are carried in hex (version byte included), the form TRON
/// nodes accept in raw transactions.
#[derive(Serialize, Deserialize)]
pub(crate) struct RawTransfer {
    pub owner: String,
    pub to: String,
    pub amount: u64,
    pub contract: Option<String>,
    pub timestamp: i64,
    pub expiration: i64,
}

impl RawTransfer {
    pub fn new(owner: &TronAddress, pending: &PendingTransaction) -> Self {
        let now = Utc::now();
        Self {
            owner: owner.to_hex(),
            to: pending.recipient.to_hex(),
            amount: pending.amount,
            contract: pending.token.as_ref().map(|c| c.to_hex()),
            timestamp: now.timestamp_millis(),
            expiration: (now + Duration::seconds(60)).timestamp_millis(),
        }
    }
}

/// A signed transfer ready for broadcast.
///
/// The txid is sha256 over the raw payload, so it is known before the
/// network ever sees the transaction; submission uses it to check
/// whether a broadcast was accepted before retrying.
#[derive(Clone, Debug)]
pub struct SignedTransfer {
    pub txid: String,
    pub raw: Vec<u8>,
    /// Compact ECDSA signature, hex.
    pub signature: String,
    pub token: Option<TronAddress>,
}

/// Validate and build a transfer from user input.
///
/// - `recipient` must be a well-formed TRON address (`InvalidRecipient`).
/// - `token`, when given, must already be tracked so its decimals are
///   known (`InvalidToken`).
/// - `amount` is parsed against the token's precision and soft-checked
///   against the cached balance (`InvalidAmount`); the chain is the
///   final arbiter.
pub fn build_transfer(
    state: &WalletState,
    recipient: &str,
    amount: &str,
    token: Option<&str>,
) -> Result<PendingTransaction, WalletError> {
    let recipient = TronAddress::from_base58(recipient)?;

    let (token_address, decimals, available) = match token {
        None => (None, TRX_DECIMALS, state.balance),
        Some(contract) => {
            let tracked = state
                .find_token(contract)
                .ok_or_else(|| WalletError::InvalidToken(format!("not tracked: {}", contract)))?;
            let address = TronAddress::from_base58(contract)
                .map_err(|_| WalletError::InvalidToken(contract.to_string()))?;
            (Some(address), tracked.decimals, tracked.balance)
        }
    };

    let amount = parse_amount(amount, decimals)?;
    if amount > available {
        return Err(WalletError::InvalidAmount(format!(
            "amount {} exceeds available balance {}",
            amount, available
        )));
    }

    log::debug!(
        "Built transfer of {} base units to {} (token: {:?})",
        amount,
        recipient,
        token_address
    );

    Ok(PendingTransaction {
        id: Uuid::new_v4(),
        recipient,
        amount,
        token: token_address,
        status: TransferStatus::Built,
        txid: None,
        created_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::TrackedToken;

    const RECIPIENT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

    fn state_with_balance(balance: u64) -> WalletState {
        let mut state = WalletState::new("TOwnerAddressPlaceholder".to_string());
        state.balance = balance;
        state
    }

    #[test]
    fn test_build_native_transfer() {
        let state = state_with_balance(100_000_000);
        let tx = build_transfer(&state, RECIPIENT, "10", None).unwrap();
        assert_eq!(tx.status, TransferStatus::Built);
        assert_eq!(tx.amount, 10_000_000);
        assert!(tx.token.is_none());
        assert!(tx.txid.is_none());
    }

    #[test]
    fn test_build_rejects_bad_recipient() {
        let state = state_with_balance(100_000_000);
        assert!(matches!(
            build_transfer(&state, "not-an-address", "10", None),
            Err(WalletError::InvalidRecipient(_))
        ));
    }

    #[test]
    fn test_build_rejects_untracked_token() {
        let state = state_with_balance(100_000_000);
        assert!(matches!(
            build_transfer(&state, RECIPIENT, "10", Some(RECIPIENT)),
            Err(WalletError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_build_uses_token_decimals() {
        let mut state = state_with_balance(0);
        state.tokens.push(TrackedToken {
            contract: RECIPIENT.to_string(),
            symbol: "USDT".to_string(),
            name: "Tether USD".to_string(),
            decimals: 6,
            balance: 50_000_000,
            stale: false,
        });

        let tx = build_transfer(&state, RECIPIENT, "10", Some(RECIPIENT)).unwrap();
        assert_eq!(tx.amount, 10_000_000);
        assert!(tx.token.is_some());

        // Excess precision for the token's 6 decimals.
        assert!(matches!(
            build_transfer(&state, RECIPIENT, "1.0000001", Some(RECIPIENT)),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_build_soft_checks_balance() {
        let state = state_with_balance(5_000_000);
        assert!(matches!(
            build_transfer(&state, RECIPIENT, "10", None),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_pending_transaction_serde_round_trip() {
        let state = state_with_balance(100_000_000);
        let tx = build_transfer(&state, RECIPIENT, "10", None).unwrap();

        let json = serde_json::to_string(&tx).unwrap();
        let back: PendingTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id, tx.id);
        assert_eq!(back.recipient, tx.recipient);
        assert_eq!(back.status, TransferStatus::Built);
    }

    #[test]
    fn test_status_machine_is_forward_only() {
        let state = state_with_balance(100_000_000);
        let mut tx = build_transfer(&state, RECIPIENT, "10", None).unwrap();

        tx.advance(TransferStatus::Signed).unwrap();
        tx.advance(TransferStatus::Submitted).unwrap();
        tx.advance(TransferStatus::Confirmed).unwrap();

        // Terminal states are immutable.
        assert!(tx.advance(TransferStatus::Failed).is_err());
        assert!(tx.advance(TransferStatus::Built).is_err());
    }

    #[test]
    fn test_cannot_skip_signing() {
        let state = state_with_balance(100_000_000);
        let mut tx = build_transfer(&state, RECIPIENT, "10", None).unwrap();
        assert!(tx.advance(TransferStatus::Submitted).is_err());
        assert_eq!(tx.status, TransferStatus::Built);
    }
}
