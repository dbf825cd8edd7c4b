//! Domain events for the batch aggregate
//!
//! Events capture every significant move a batch makes. They feed the
//! audit trail and drive downstream notifications after closure.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ClaimId, FacilityId, TpaId};
use domain_claims::Decision;

/// Domain events emitted by the Batch aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BatchEvent {
    /// Batch created in draft for a facility and period
    BatchCreated {
        batch_id: BatchId,
        facility_id: FacilityId,
        batch_number: String,
        timestamp: DateTime<Utc>,
    },

    /// Batch opened for claim capture
    BatchOpened {
        batch_id: BatchId,
        timestamp: DateTime<Utc>,
    },

    /// A discharge form was captured as a claim
    ClaimCaptured {
        batch_id: BatchId,
        claim_id: ClaimId,
        total_cost: Decimal,
        currency: String,
        timestamp: DateTime<Utc>,
    },

    /// Batch submitted for verification
    BatchSubmitted {
        batch_id: BatchId,
        claim_count: usize,
        total_value: Decimal,
        currency: String,
        timestamp: DateTime<Utc>,
    },

    /// A TPA picked the batch up for review
    ReviewStarted {
        batch_id: BatchId,
        tpa_id: TpaId,
        timestamp: DateTime<Utc>,
    },

    /// A claim in the batch received a decision
    ClaimReviewed {
        batch_id: BatchId,
        claim_id: ClaimId,
        decision: Decision,
        timestamp: DateTime<Utc>,
    },

    /// Review finished with a batch-level outcome
    ReviewCompleted {
        batch_id: BatchId,
        approved: bool,
        remarks: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// Batch closed and verified claims scheduled for payment
    BatchClosed {
        batch_id: BatchId,
        amount_to_pay: Decimal,
        currency: String,
        timestamp: DateTime<Utc>,
    },

    /// Disbursement for the closed batch was confirmed
    DisbursementConfirmed {
        batch_id: BatchId,
        paid_amount: Decimal,
        currency: String,
        timestamp: DateTime<Utc>,
    },
}

impl BatchEvent {
    /// Returns the batch ID associated with this event
    pub fn batch_id(&self) -> BatchId {
        match self {
            BatchEvent::BatchCreated { batch_id, .. } => *batch_id,
            BatchEvent::BatchOpened { batch_id, .. } => *batch_id,
            BatchEvent::ClaimCaptured { batch_id, .. } => *batch_id,
            BatchEvent::BatchSubmitted { batch_id, .. } => *batch_id,
            BatchEvent::ReviewStarted { batch_id, .. } => *batch_id,
            BatchEvent::ClaimReviewed { batch_id, .. } => *batch_id,
            BatchEvent::ReviewCompleted { batch_id, .. } => *batch_id,
            BatchEvent::BatchClosed { batch_id, .. } => *batch_id,
            BatchEvent::DisbursementConfirmed { batch_id, .. } => *batch_id,
        }
    }

    /// Returns the timestamp of this event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            BatchEvent::BatchCreated { timestamp, .. } => *timestamp,
            BatchEvent::BatchOpened { timestamp, .. } => *timestamp,
            BatchEvent::ClaimCaptured { timestamp, .. } => *timestamp,
            BatchEvent::BatchSubmitted { timestamp, .. } => *timestamp,
            BatchEvent::ReviewStarted { timestamp, .. } => *timestamp,
            BatchEvent::ClaimReviewed { timestamp, .. } => *timestamp,
            BatchEvent::ReviewCompleted { timestamp, .. } => *timestamp,
            BatchEvent::BatchClosed { timestamp, .. } => *timestamp,
            BatchEvent::DisbursementConfirmed { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            BatchEvent::BatchCreated { .. } => "BatchCreated",
            BatchEvent::BatchOpened { .. } => "BatchOpened",
            BatchEvent::ClaimCaptured { .. } => "ClaimCaptured",
            BatchEvent::BatchSubmitted { .. } => "BatchSubmitted",
            BatchEvent::ReviewStarted { .. } => "ReviewStarted",
            BatchEvent::ClaimReviewed { .. } => "ClaimReviewed",
            BatchEvent::ReviewCompleted { .. } => "ReviewCompleted",
            BatchEvent::BatchClosed { .. } => "BatchClosed",
            BatchEvent::DisbursementConfirmed { .. } => "DisbursementConfirmed",
        }
    }
}
