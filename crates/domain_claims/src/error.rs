//! Claims domain errors

use core_kernel::{ClaimItemId, MoneyError};
use thiserror::Error;

use crate::review::Decision;

/// Errors produced by claim operations
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Invalid status transition from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Discharge form rejected: {}", errors.join("; "))]
    DischargeRejected { errors: Vec<String> },

    #[error("Decision '{decision:?}' requires an approved cost of care")]
    MissingApprovedCost { decision: Decision },

    #[error("Approved cost of care cannot be negative, got {amount}")]
    NegativeApprovedCost { amount: String },

    #[error("A rejected claim requires a rejection reason")]
    MissingRejectionReason,

    #[error("A rejected claim cannot carry a non-zero approved cost")]
    ApprovedCostNotCleared,

    #[error(
        "Decision '{decision:?}' implies status '{derived}' but '{declared}' was supplied"
    )]
    DecisionStatusMismatch {
        decision: Decision,
        declared: String,
        derived: String,
    },

    #[error("Claim item {item_id} not found on this claim")]
    ItemNotFound { item_id: ClaimItemId },

    #[error("Claim items cannot be modified while status is '{status}'")]
    ItemsLocked { status: String },

    #[error("Rejected item {item_id} requires a rejection reason")]
    MissingItemRejectionReason { item_id: ClaimItemId },

    #[error("Item {item_id}: approved quantity {approved} exceeds claimed quantity {claimed}")]
    ItemQuantityExceedsClaimed {
        item_id: ClaimItemId,
        claimed: u32,
        approved: u32,
    },

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

/// Result type for claim operations
pub type ClaimResult<T> = Result<T, ClaimError>;
