//! TPA review outcomes and the joint decision/status validation
//!
//! The portal never derives a claim's status from its decision silently.
//! `ClaimReview::resolve` is the single place where (decision, approved
//! cost, rejection reason) are validated together into a combined
//! outcome; every review path goes through it, so an inconsistent pair
//! like rejected-with-cost cannot enter the system through review. The
//! audit engine still checks stored rows for the same inconsistency in
//! case data arrived through migration or direct edits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, Money};

use crate::claim::ClaimStatus;
use crate::error::ClaimError;

/// The TPA's adjudication outcome for a claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Pending,
    Approved,
    Rejected,
    PartiallyApproved,
}

impl Decision {
    /// The claim status this decision lands on, if it is final
    pub fn target_status(&self) -> Option<ClaimStatus> {
        match self {
            Decision::Approved | Decision::PartiallyApproved => Some(ClaimStatus::Verified),
            Decision::Rejected => Some(ClaimStatus::NotVerified),
            Decision::Pending => None,
        }
    }
}

/// A fully validated review outcome
///
/// Constructed only through [`ClaimReview::resolve`], which guarantees
/// the decision, status, approved cost, and rejection reason are
/// mutually consistent before anything is written to a claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimReview {
    decision: Decision,
    status: Option<ClaimStatus>,
    approved_cost: Option<Money>,
    rejection_reason: Option<String>,
    remarks: Option<String>,
    reviewed_by: String,
    reviewed_at: DateTime<Utc>,
}

impl ClaimReview {
    /// Jointly validates a review into a combined outcome
    ///
    /// Rules:
    /// - `approved`/`partially_approved` require an approved cost; the
    ///   target status is `verified`.
    /// - `rejected` requires a rejection reason and no surviving approved
    ///   cost (a zero amount is tolerated and normalised away); the
    ///   target status is `not_verified`.
    /// - `pending` records remarks only and leaves the status alone.
    /// - A caller-declared status that disagrees with the one the
    ///   decision implies is rejected rather than coerced.
    ///
    /// # Errors
    ///
    /// Returns a [`ClaimError`] describing the first inconsistency found.
    pub fn resolve(
        decision: Decision,
        declared_status: Option<ClaimStatus>,
        approved_cost: Option<Money>,
        rejection_reason: Option<String>,
        remarks: Option<String>,
        reviewer: &Actor,
    ) -> Result<Self, ClaimError> {
        let rejection_reason = rejection_reason.filter(|r| !r.trim().is_empty());

        let (status, approved_cost, rejection_reason) = match decision {
            Decision::Approved | Decision::PartiallyApproved => {
                let cost = approved_cost.ok_or(ClaimError::MissingApprovedCost { decision })?;
                if cost.is_negative() {
                    return Err(ClaimError::NegativeApprovedCost {
                        amount: cost.to_string(),
                    });
                }
                (Some(ClaimStatus::Verified), Some(cost), None)
            }
            Decision::Rejected => {
                let reason = rejection_reason.ok_or(ClaimError::MissingRejectionReason)?;
                if approved_cost.is_some_and(|c| !c.is_zero()) {
                    return Err(ClaimError::ApprovedCostNotCleared);
                }
                (Some(ClaimStatus::NotVerified), None, Some(reason))
            }
            Decision::Pending => (None, None, rejection_reason),
        };

        if let (Some(declared), Some(derived)) = (declared_status, status) {
            if declared != derived {
                return Err(ClaimError::DecisionStatusMismatch {
                    decision,
                    declared: declared.as_str().to_string(),
                    derived: derived.as_str().to_string(),
                });
            }
        }
        // Declaring a final status alongside a pending decision is the
        // same coercion in the other direction.
        if decision == Decision::Pending {
            if let Some(declared) = declared_status {
                return Err(ClaimError::DecisionStatusMismatch {
                    decision,
                    declared: declared.as_str().to_string(),
                    derived: "awaiting_verification".to_string(),
                });
            }
        }

        Ok(Self {
            decision,
            status,
            approved_cost,
            rejection_reason,
            remarks,
            reviewed_by: reviewer.id().to_string(),
            reviewed_at: Utc::now(),
        })
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    /// The status this review moves the claim to, if any
    pub fn status(&self) -> Option<ClaimStatus> {
        self.status
    }

    pub fn approved_cost(&self) -> Option<Money> {
        self.approved_cost
    }

    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    pub fn remarks(&self) -> Option<&str> {
        self.remarks.as_deref()
    }

    pub fn reviewed_by(&self) -> &str {
        &self.reviewed_by
    }

    pub fn reviewed_at(&self) -> DateTime<Utc> {
        self.reviewed_at
    }
}
