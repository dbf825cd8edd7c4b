//! Payment summaries
//!
//! One record per closed batch capturing what was paid, for how many
//! beneficiaries, on what date, and over whose signature. The summary
//! is written once from the closure advice and never amended, so the
//! payment trail survives later edits to the batch.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BatchId, FacilityId, Money, PaymentSummaryId};
use domain_batch::{Batch, BatchStatus, PaymentAdvice};

use crate::error::{PaymentError, PaymentResult};

/// Immutable record of the payment side of a batch closure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSummary {
    pub id: PaymentSummaryId,
    pub batch_id: BatchId,
    pub batch_number: String,
    pub facility_id: FacilityId,
    /// Amount committed by the closure advice
    pub paid_amount: Money,
    /// Number of beneficiaries the payment covers
    pub beneficiaries_paid: u32,
    /// Date the payment is valued
    pub payment_date: NaiveDate,
    /// Stated reason for paying this amount
    pub justification: String,
    /// Name of the signing official
    pub signature: String,
    /// Identity of the actor who closed the batch
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
}

impl PaymentSummary {
    /// Records the payment details of a batch closure
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::BatchNotClosed` when the batch has not
    /// reached closure and `PaymentError::CurrencyMismatch` when the
    /// advice amount does not match the batch currency.
    pub fn record(
        batch: &Batch,
        advice: &PaymentAdvice,
        submitted_by: &Actor,
    ) -> PaymentResult<Self> {
        if batch.status() != BatchStatus::Closed {
            return Err(PaymentError::BatchNotClosed {
                batch_id: batch.id(),
            });
        }
        if advice.paid_amount.currency() != batch.currency() {
            return Err(PaymentError::CurrencyMismatch {
                expected: batch.currency().to_string(),
                actual: advice.paid_amount.currency().to_string(),
            });
        }

        Ok(Self {
            id: PaymentSummaryId::new(),
            batch_id: batch.id(),
            batch_number: batch.batch_number().to_string(),
            facility_id: batch.facility_id(),
            paid_amount: advice.paid_amount,
            beneficiaries_paid: advice.beneficiaries_paid,
            payment_date: advice.payment_date,
            justification: advice.justification.clone(),
            signature: advice.signature.clone(),
            submitted_by: submitted_by.id().to_string(),
            created_at: Utc::now(),
        })
    }
}
