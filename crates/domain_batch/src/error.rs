//! Batch domain errors
//!
//! This module defines all error types that can occur within the
//! batch submission and review workflow.

use core_kernel::ClaimId;
use domain_claims::ClaimError;
use thiserror::Error;

/// Errors that can occur in the batch domain
#[derive(Debug, Error)]
pub enum BatchError {
    /// Invalid status transition attempted
    #[error("Invalid batch transition from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    /// Batch submission requires at least one claim
    #[error("Batch cannot be submitted without claims")]
    EmptyBatch,

    /// The acting user is not allowed to perform this operation
    #[error("Actor '{actor}' is not permitted to {action}")]
    ActorNotPermitted { actor: String, action: String },

    /// Claim does not belong to this batch
    #[error("Claim {claim_id} not found in this batch")]
    ClaimNotFound { claim_id: ClaimId },

    /// Review completion requires every claim to carry a decision
    #[error("Review incomplete: {pending} claim(s) still pending a decision")]
    ReviewIncomplete { pending: usize },

    /// Batch rejection requires a stated reason
    #[error("A rejected review outcome requires a reason")]
    MissingReviewReason,

    /// Currency mismatch between batch and claim
    #[error("Currency mismatch: expected {expected}, got {actual}")]
    CurrencyMismatch { expected: String, actual: String },

    /// Closure advice must state why the amount is being paid
    #[error("Batch closure requires a payment justification")]
    MissingJustification,

    /// Closure advice must carry the signing official
    #[error("Batch closure requires a signature")]
    MissingSignature,

    /// Closure advice cannot pay a negative amount
    #[error("Paid amount cannot be negative, got {amount}")]
    NegativePaidAmount { amount: String },

    /// Disbursement confirmed with no claims awaiting payment
    #[error("No claims awaiting payment on this batch")]
    NothingToDisburse,

    /// Error bubbled up from a claim operation
    #[error(transparent)]
    Claim(#[from] ClaimError),
}

/// Result type for batch operations
pub type BatchResult<T> = Result<T, BatchError>;
