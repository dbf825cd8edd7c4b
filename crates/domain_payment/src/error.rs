//! Payment domain errors

use core_kernel::{BatchId, MoneyError};
use thiserror::Error;

/// Errors produced by payment operations
#[derive(Debug, Error, PartialEq)]
pub enum PaymentError {
    /// Invalid status transition attempted
    #[error("Invalid reimbursement transition from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    /// The acting user is not allowed to perform this operation
    #[error("Actor '{actor}' is not permitted to {action}")]
    ActorNotPermitted { actor: String, action: String },

    /// A reimbursement must cover at least one batch
    #[error("A reimbursement must reference at least one batch")]
    NoBatchesCovered,

    /// Payment records only exist for closed batches
    #[error("Batch {batch_id} is not closed")]
    BatchNotClosed { batch_id: BatchId },

    /// Reimbursement amounts must be positive
    #[error("Reimbursement amount must be positive, got {amount}")]
    NonPositiveAmount { amount: String },

    /// A reimbursement needs a stated purpose
    #[error("A reimbursement requires a stated purpose")]
    MissingPurpose,

    /// Disputes must say what is disputed
    #[error("A disputed reimbursement requires a stated reason")]
    MissingDisputeReason,

    /// Each closed batch gets exactly one ledger entry
    #[error("Ledger already carries an entry for batch {batch_id}")]
    DuplicateLedgerEntry { batch_id: BatchId },

    /// Disbursement confirmed against a batch the ledger never saw
    #[error("No ledger entry recorded for batch {batch_id}")]
    NoLedgerEntry { batch_id: BatchId },

    /// A ledger entry settles exactly once
    #[error("Batch {batch_id} has already been disbursed")]
    AlreadyDisbursed { batch_id: BatchId },

    /// Currency mismatch between ledger and amount
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Error bubbled up from a money operation
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

/// Result type for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;
