//! Payment DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{
    BatchId, Currency, DocumentId, DocumentRef, FacilityId, PaymentSummaryId, ReimbursementId,
    TpaId,
};
use domain_payment::{
    DisbursementLedger, LedgerEntry, PaymentResult, PaymentSummary, Reimbursement,
    ReimbursementStatus,
};

#[derive(Debug, Deserialize)]
pub struct CreateReimbursementRequest {
    pub tpa_id: Uuid,
    pub batch_ids: Vec<Uuid>,
    pub amount: Decimal,
    pub purpose: String,
}

#[derive(Debug, Deserialize)]
pub struct AdvanceReimbursementRequest {
    /// `process`, `complete`, `dispute`, or `cancel`
    pub action: String,
    /// Dispute reason or cancellation note
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AttachDocumentRequest {
    pub file_name: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: DocumentId,
    pub file_name: String,
    pub label: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl From<&DocumentRef> for DocumentResponse {
    fn from(document: &DocumentRef) -> Self {
        Self {
            id: document.id,
            file_name: document.file_name.clone(),
            label: document.label.clone(),
            uploaded_by: document.uploaded_by.clone(),
            uploaded_at: document.uploaded_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReimbursementResponse {
    pub id: ReimbursementId,
    pub reference: String,
    pub tpa_id: TpaId,
    pub batch_ids: Vec<BatchId>,
    pub amount: Decimal,
    pub currency: Currency,
    pub purpose: String,
    pub status: ReimbursementStatus,
    pub status_note: Option<String>,
    pub documents: Vec<DocumentResponse>,
    pub created_by: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Reimbursement> for ReimbursementResponse {
    fn from(reimbursement: &Reimbursement) -> Self {
        Self {
            id: reimbursement.id(),
            reference: reimbursement.reference().to_string(),
            tpa_id: reimbursement.tpa_id(),
            batch_ids: reimbursement.batch_ids().to_vec(),
            amount: reimbursement.amount().amount(),
            currency: reimbursement.amount().currency(),
            purpose: reimbursement.purpose().to_string(),
            status: reimbursement.status(),
            status_note: reimbursement.status_note().map(str::to_string),
            documents: reimbursement
                .documents()
                .iter()
                .map(DocumentResponse::from)
                .collect(),
            created_by: reimbursement.created_by().to_string(),
            processed_at: reimbursement.processed_at(),
            completed_at: reimbursement.completed_at(),
            created_at: reimbursement.created_at(),
            updated_at: reimbursement.updated_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentSummaryResponse {
    pub id: PaymentSummaryId,
    pub batch_id: BatchId,
    pub batch_number: String,
    pub facility_id: FacilityId,
    pub paid_amount: Decimal,
    pub beneficiaries_paid: u32,
    pub payment_date: NaiveDate,
    pub justification: String,
    pub signature: String,
    pub submitted_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<&PaymentSummary> for PaymentSummaryResponse {
    fn from(summary: &PaymentSummary) -> Self {
        Self {
            id: summary.id,
            batch_id: summary.batch_id,
            batch_number: summary.batch_number.clone(),
            facility_id: summary.facility_id,
            paid_amount: summary.paid_amount.amount(),
            beneficiaries_paid: summary.beneficiaries_paid,
            payment_date: summary.payment_date,
            justification: summary.justification.clone(),
            signature: summary.signature.clone(),
            submitted_by: summary.submitted_by.clone(),
            created_at: summary.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerEntryResponse {
    pub batch_id: BatchId,
    pub batch_number: String,
    pub facility_id: FacilityId,
    pub approved_total: Decimal,
    pub paid_total: Decimal,
    pub disbursed_total: Option<Decimal>,
    pub variance: Decimal,
    pub settled: bool,
    pub recorded_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl LedgerEntryResponse {
    fn try_from_entry(entry: &LedgerEntry) -> PaymentResult<Self> {
        Ok(Self {
            batch_id: entry.batch_id,
            batch_number: entry.batch_number.clone(),
            facility_id: entry.facility_id,
            approved_total: entry.approved_total.amount(),
            paid_total: entry.paid_total.amount(),
            disbursed_total: entry.disbursed_total.as_ref().map(|m| m.amount()),
            variance: entry.variance()?.amount(),
            settled: entry.is_settled(),
            recorded_at: entry.recorded_at,
            confirmed_at: entry.confirmed_at,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct LedgerResponse {
    pub currency: Currency,
    pub entries: Vec<LedgerEntryResponse>,
    pub total_approved: Decimal,
    pub total_paid: Decimal,
    pub total_disbursed: Decimal,
    pub portfolio_variance: Decimal,
}

impl LedgerResponse {
    /// Builds the read-side view of the ledger with its running totals
    pub fn try_from_ledger(ledger: &DisbursementLedger) -> PaymentResult<Self> {
        let entries = ledger
            .entries()
            .iter()
            .map(LedgerEntryResponse::try_from_entry)
            .collect::<PaymentResult<Vec<_>>>()?;
        Ok(Self {
            currency: ledger.currency(),
            entries,
            total_approved: ledger.total_approved()?.amount(),
            total_paid: ledger.total_paid()?.amount(),
            total_disbursed: ledger.total_disbursed()?.amount(),
            portfolio_variance: ledger.portfolio_variance()?.amount(),
        })
    }
}
