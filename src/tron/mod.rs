/// Transfer building, signing, and submission
///
/// - `amount.rs` - decimal amount parsing against token precision
/// - `transaction.rs` - the transfer state machine (built -> signed ->
///   submitted -> confirmed | failed)
/// - `signer.rs` - transient key loading and ECDSA signing
/// - `send.rs` - broadcast with query-before-retry backoff
pub mod amount;
pub mod send;
pub mod signer;
pub mod transaction;

pub use amount::parse_amount;
pub use send::{submit_transfer, wait_for_confirmation};
pub use signer::sign_transfer;
pub use transaction::{build_transfer, PendingTransaction, SignedTransfer, TransferStatus};
