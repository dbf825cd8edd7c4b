//! Batch DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{BatchId, Currency, FacilityId, TpaId};
use domain_batch::{Batch, BatchStatus, ClosureReport};

use super::claims::ClaimResponse;

#[derive(Debug, Deserialize)]
pub struct CreateBatchRequest {
    pub facility_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// Defaults to the scheme currency when omitted
    pub currency: Option<Currency>,
}

#[derive(Debug, Deserialize)]
pub struct BeginReviewRequest {
    pub tpa_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CompleteReviewRequest {
    /// `approved` or `rejected`
    pub outcome: String,
    /// Optional remarks on an approved outcome
    pub remarks: Option<String>,
    /// Required reason on a rejected outcome
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CloseBatchRequest {
    pub review_summary: Option<String>,
    pub paid_amount: Decimal,
    pub beneficiaries_paid: u32,
    pub payment_date: NaiveDate,
    pub justification: String,
    pub signature: String,
    pub forwarding_letter: Option<DocumentUpload>,
}

/// Metadata of a document already uploaded out of band
#[derive(Debug, Deserialize)]
pub struct DocumentUpload {
    pub file_name: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub id: BatchId,
    pub batch_number: String,
    pub facility_id: FacilityId,
    pub tpa_id: Option<TpaId>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub status: BatchStatus,
    pub currency: Currency,
    pub claim_count: usize,
    pub total_claimed: Decimal,
    pub total_approved: Decimal,
    pub approved_amount: Option<Decimal>,
    pub paid_amount: Option<Decimal>,
    pub review_remarks: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Batch> for BatchResponse {
    fn from(batch: &Batch) -> Self {
        Self {
            id: batch.id(),
            batch_number: batch.batch_number().to_string(),
            facility_id: batch.facility_id(),
            tpa_id: batch.tpa_id(),
            period_start: batch.period().start,
            period_end: batch.period().end,
            status: batch.status(),
            currency: batch.currency(),
            claim_count: batch.claim_count(),
            total_claimed: batch.total_claimed().amount(),
            total_approved: batch.total_approved().amount(),
            approved_amount: batch.approved_amount().map(|m| m.amount()),
            paid_amount: batch.paid_amount().map(|m| m.amount()),
            review_remarks: batch.review_remarks().map(str::to_string),
            submitted_at: batch.submitted_at(),
            closed_at: batch.closed_at(),
            version: batch.version(),
            created_at: batch.created_at(),
            updated_at: batch.updated_at(),
        }
    }
}

/// Batch with its claims, for the single-batch read side
#[derive(Debug, Serialize)]
pub struct BatchDetailResponse {
    #[serde(flatten)]
    pub batch: BatchResponse,
    pub claims: Vec<ClaimResponse>,
}

impl From<&Batch> for BatchDetailResponse {
    fn from(batch: &Batch) -> Self {
        Self {
            batch: BatchResponse::from(batch),
            claims: batch.claims().iter().map(ClaimResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClosureResponse {
    pub batch_id: BatchId,
    pub batch_number: String,
    pub status: BatchStatus,
    pub claim_count: usize,
    pub approved_count: usize,
    pub partially_approved_count: usize,
    pub rejected_count: usize,
    pub pending_count: usize,
    pub total_claimed: Decimal,
    pub total_approved: Decimal,
    pub amount_to_pay: Decimal,
    pub notifications_sent: usize,
    pub notifications_failed: usize,
    pub closed_at: DateTime<Utc>,
}

impl From<&ClosureReport> for ClosureResponse {
    fn from(report: &ClosureReport) -> Self {
        Self {
            batch_id: report.batch_id,
            batch_number: report.batch_number.clone(),
            status: BatchStatus::Closed,
            claim_count: report.claim_count,
            approved_count: report.approved_count,
            partially_approved_count: report.partially_approved_count,
            rejected_count: report.rejected_count,
            pending_count: report.pending_count,
            total_claimed: report.total_claimed.amount(),
            total_approved: report.total_approved.amount(),
            amount_to_pay: report.amount_to_pay.amount(),
            notifications_sent: report.notifications_sent,
            notifications_failed: report.notifications_failed,
            closed_at: report.closed_at,
        }
    }
}
