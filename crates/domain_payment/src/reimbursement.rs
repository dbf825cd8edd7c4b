//! Reimbursement aggregate root
//!
//! A reimbursement records scheme money released to a TPA against one
//! or more closed batches. It carries its own lifecycle so that the
//! scheme can follow the transfer from creation through processing to
//! completion, or park it as disputed or cancelled when the transfer
//! goes wrong.
//!
//! # Invariants
//!
//! - Every covered batch must already be closed when the reimbursement
//!   is created
//! - The amount must be strictly positive
//! - Status only moves forward; processing can never be skipped on the
//!   way to completion
//! - Disputed and cancelled are terminal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{Actor, BatchId, DocumentRef, Money, ReimbursementId, TpaId};
use domain_batch::{Batch, BatchStatus};

use crate::error::{PaymentError, PaymentResult};

/// Position of a reimbursement in the payout workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReimbursementStatus {
    /// Created, transfer not yet initiated
    Pending,
    /// Transfer initiated, awaiting settlement
    Processed,
    /// Transfer settled and acknowledged
    Completed,
    /// TPA contested the amount or coverage
    Disputed,
    /// Withdrawn before settlement
    Cancelled,
}

impl ReimbursementStatus {
    /// Returns the snake_case wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            ReimbursementStatus::Pending => "pending",
            ReimbursementStatus::Processed => "processed",
            ReimbursementStatus::Completed => "completed",
            ReimbursementStatus::Disputed => "disputed",
            ReimbursementStatus::Cancelled => "cancelled",
        }
    }

    /// Whether the reimbursement can still move to another status
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReimbursementStatus::Completed
                | ReimbursementStatus::Disputed
                | ReimbursementStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ReimbursementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The Reimbursement aggregate root
///
/// # State Machine
///
/// - Pending -> Processed (via mark_processed)
/// - Processed -> Completed (via mark_completed)
/// - Pending | Processed -> Disputed (via dispute)
/// - Pending | Processed -> Cancelled (via cancel)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reimbursement {
    /// Unique reimbursement identifier
    id: ReimbursementId,
    /// Human-readable reference code quoted on the transfer
    reference: String,
    /// TPA the money is released to
    tpa_id: TpaId,
    /// Closed batches the payout covers
    batch_ids: Vec<BatchId>,
    /// Amount released
    amount: Money,
    /// Stated purpose of the payout
    purpose: String,
    /// Current workflow status
    status: ReimbursementStatus,
    /// Dispute reason or cancellation note, if any
    status_note: Option<String>,
    /// Supporting documents, such as transfer receipts
    documents: Vec<DocumentRef>,
    /// Admin who created the reimbursement
    created_by: String,
    processed_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    /// Version for optimistic concurrency
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Reimbursement {
    /// Creates a pending reimbursement covering a set of closed batches
    ///
    /// # Arguments
    ///
    /// * `tpa_id` - The TPA receiving the payout
    /// * `batches` - Batches the payout covers, all must be closed
    /// * `amount` - Amount released, must be positive
    /// * `purpose` - Stated purpose of the payout
    /// * `created_by` - The acting user, must be an admin
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ActorNotPermitted` for non-admin actors,
    /// `PaymentError::NoBatchesCovered` when the batch list is empty,
    /// `PaymentError::BatchNotClosed` when any covered batch has not
    /// reached closure, and `PaymentError::NonPositiveAmount` or
    /// `PaymentError::MissingPurpose` for bad inputs.
    pub fn create(
        tpa_id: TpaId,
        batches: &[&Batch],
        amount: Money,
        purpose: impl Into<String>,
        created_by: &Actor,
    ) -> PaymentResult<Self> {
        if !created_by.is_admin() {
            return Err(PaymentError::ActorNotPermitted {
                actor: created_by.to_string(),
                action: "create a reimbursement".to_string(),
            });
        }
        if batches.is_empty() {
            return Err(PaymentError::NoBatchesCovered);
        }
        for batch in batches {
            if batch.status() != BatchStatus::Closed {
                return Err(PaymentError::BatchNotClosed {
                    batch_id: batch.id(),
                });
            }
        }
        if !amount.is_positive() {
            return Err(PaymentError::NonPositiveAmount {
                amount: amount.to_string(),
            });
        }
        let purpose = purpose.into();
        if purpose.trim().is_empty() {
            return Err(PaymentError::MissingPurpose);
        }

        let now = Utc::now();
        let id = ReimbursementId::new();
        let reference = generate_reference();
        tracing::info!(
            reimbursement_id = %id,
            reference = %reference,
            tpa_id = %tpa_id,
            amount = %amount,
            batches = batches.len(),
            "reimbursement created"
        );

        Ok(Self {
            id,
            reference,
            tpa_id,
            batch_ids: batches.iter().map(|b| b.id()).collect(),
            amount,
            purpose,
            status: ReimbursementStatus::Pending,
            status_note: None,
            documents: Vec::new(),
            created_by: created_by.id().to_string(),
            processed_at: None,
            completed_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> ReimbursementId {
        self.id
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn tpa_id(&self) -> TpaId {
        self.tpa_id
    }

    pub fn batch_ids(&self) -> &[BatchId] {
        &self.batch_ids
    }

    /// Whether the payout covers the given batch
    pub fn covers(&self, batch_id: BatchId) -> bool {
        self.batch_ids.contains(&batch_id)
    }

    pub fn amount(&self) -> Money {
        self.amount
    }

    pub fn purpose(&self) -> &str {
        &self.purpose
    }

    pub fn status(&self) -> ReimbursementStatus {
        self.status
    }

    pub fn status_note(&self) -> Option<&str> {
        self.status_note.as_deref()
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn processed_at(&self) -> Option<DateTime<Utc>> {
        self.processed_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Marks the transfer as initiated
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ActorNotPermitted` for non-admin actors
    /// and `PaymentError::InvalidStatusTransition` unless the
    /// reimbursement is pending.
    pub fn mark_processed(&mut self, actor: &Actor) -> PaymentResult<()> {
        self.ensure_admin(actor, "mark a reimbursement as processed")?;
        self.update_status(ReimbursementStatus::Processed)?;
        self.processed_at = Some(Utc::now());
        tracing::info!(reimbursement_id = %self.id, "reimbursement processed");
        Ok(())
    }

    /// Marks the transfer as settled
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ActorNotPermitted` for non-admin actors
    /// and `PaymentError::InvalidStatusTransition` unless the
    /// reimbursement has been processed first.
    pub fn mark_completed(&mut self, actor: &Actor) -> PaymentResult<()> {
        self.ensure_admin(actor, "complete a reimbursement")?;
        self.update_status(ReimbursementStatus::Completed)?;
        self.completed_at = Some(Utc::now());
        tracing::info!(reimbursement_id = %self.id, amount = %self.amount, "reimbursement completed");
        Ok(())
    }

    /// Parks the reimbursement as disputed with the TPA's reason
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::MissingDisputeReason` when the reason is
    /// blank, plus the usual permission and transition errors.
    pub fn dispute(&mut self, reason: impl Into<String>, actor: &Actor) -> PaymentResult<()> {
        self.ensure_admin(actor, "dispute a reimbursement")?;
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(PaymentError::MissingDisputeReason);
        }
        self.update_status(ReimbursementStatus::Disputed)?;
        self.status_note = Some(reason);
        tracing::warn!(reimbursement_id = %self.id, "reimbursement disputed");
        Ok(())
    }

    /// Withdraws the reimbursement before settlement
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ActorNotPermitted` for non-admin actors
    /// and `PaymentError::InvalidStatusTransition` once the
    /// reimbursement reached a terminal status.
    pub fn cancel(&mut self, note: Option<String>, actor: &Actor) -> PaymentResult<()> {
        self.ensure_admin(actor, "cancel a reimbursement")?;
        self.update_status(ReimbursementStatus::Cancelled)?;
        self.status_note = note.filter(|n| !n.trim().is_empty());
        tracing::info!(reimbursement_id = %self.id, "reimbursement cancelled");
        Ok(())
    }

    /// Attaches a supporting document, such as a transfer receipt
    ///
    /// Documents are append-only and never change the workflow status.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::ActorNotPermitted` unless the actor is an
    /// admin or represents the receiving TPA.
    pub fn attach_document(
        &mut self,
        document: DocumentRef,
        actor: &Actor,
    ) -> PaymentResult<&DocumentRef> {
        if !actor.is_admin() && !actor.represents_tpa(self.tpa_id) {
            return Err(PaymentError::ActorNotPermitted {
                actor: actor.to_string(),
                action: "attach a document to this reimbursement".to_string(),
            });
        }
        self.documents.push(document);
        self.touch();
        Ok(self.documents.last().unwrap())
    }

    fn ensure_admin(&self, actor: &Actor, action: &str) -> PaymentResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(PaymentError::ActorNotPermitted {
                actor: actor.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn can_transition_to(&self, new_status: ReimbursementStatus) -> bool {
        matches!(
            (self.status, new_status),
            (ReimbursementStatus::Pending, ReimbursementStatus::Processed)
                | (ReimbursementStatus::Processed, ReimbursementStatus::Completed)
                | (ReimbursementStatus::Pending, ReimbursementStatus::Disputed)
                | (ReimbursementStatus::Processed, ReimbursementStatus::Disputed)
                | (ReimbursementStatus::Pending, ReimbursementStatus::Cancelled)
                | (ReimbursementStatus::Processed, ReimbursementStatus::Cancelled)
        )
    }

    fn update_status(&mut self, new_status: ReimbursementStatus) -> PaymentResult<()> {
        if !self.can_transition_to(new_status) {
            return Err(PaymentError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }
        self.status = new_status;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
        self.version += 1;
    }
}

/// Generates a unique reimbursement reference
///
/// Format: RMB-{YEAR}{MONTH}-{SEQUENCE}
fn generate_reference() -> String {
    let now = Utc::now();
    format!(
        "RMB-{}{:02}-{:06}",
        now.format("%Y"),
        now.format("%m"),
        rand_sequence()
    )
}

/// Generates a pseudo-random sequence for reimbursement references
fn rand_sequence() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (duration.as_nanos() % 1_000_000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_kernel::{Currency, DateRange, FacilityId};
    use domain_batch::PaymentAdvice;
    use domain_claims::{CareType, CostBreakdown, DischargeForm};
    use rust_decimal_macros::dec;

    fn admin() -> Actor {
        Actor::admin("scheme-officer-1")
    }

    fn test_form() -> DischargeForm {
        DischargeForm {
            beneficiary_id: "NHIS-30001".to_string(),
            beneficiary_name: "Chidi Okafor".to_string(),
            hospital_number: "GH/ABK/2024/220".to_string(),
            nin: None,
            phone: None,
            primary_diagnosis: "Malaria".to_string(),
            secondary_diagnosis: None,
            treatment_description: "ACT course".to_string(),
            care_type: CareType::Outpatient,
            admission_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            treatment_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            discharge_date: NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
            costs: CostBreakdown::new(dec!(25000), dec!(0), dec!(0), dec!(0), Currency::NGN),
        }
    }

    fn closed_batch() -> Batch {
        let facility_id = FacilityId::new();
        let facility = Actor::facility("desk-officer-1", facility_id);
        let period = DateRange::week_containing(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        let mut batch = Batch::create(facility_id, period, Currency::NGN, &facility).unwrap();
        batch.add_claim(test_form(), &facility).unwrap();
        batch.open(&facility).unwrap();
        batch.submit(&facility).unwrap();
        let advice = PaymentAdvice {
            review_summary: None,
            paid_amount: Money::ngn(dec!(25000)),
            beneficiaries_paid: 1,
            payment_date: NaiveDate::from_ymd_opt(2024, 7, 20).unwrap(),
            justification: "Paid per approved tariff".to_string(),
            signature: "Dr. A. Bello".to_string(),
            forwarding_letter: None,
        };
        batch.close(advice, &admin()).unwrap();
        batch
    }

    fn test_reimbursement() -> Reimbursement {
        let batch = closed_batch();
        Reimbursement::create(
            TpaId::new(),
            &[&batch],
            Money::ngn(dec!(25000)),
            "July settlement",
            &admin(),
        )
        .unwrap()
    }

    #[test]
    fn test_create_starts_pending() {
        let batch = closed_batch();
        let tpa_id = TpaId::new();
        let reimbursement = Reimbursement::create(
            tpa_id,
            &[&batch],
            Money::ngn(dec!(25000)),
            "July settlement",
            &admin(),
        )
        .unwrap();

        assert_eq!(reimbursement.status(), ReimbursementStatus::Pending);
        assert_eq!(reimbursement.tpa_id(), tpa_id);
        assert!(reimbursement.reference().starts_with("RMB-"));
        assert!(reimbursement.covers(batch.id()));
        assert_eq!(reimbursement.created_by(), "scheme-officer-1");
    }

    #[test]
    fn test_create_requires_admin() {
        let batch = closed_batch();
        let tpa_id = TpaId::new();
        let tpa_actor = Actor::tpa("reviewer-1", tpa_id);
        let result = Reimbursement::create(
            tpa_id,
            &[&batch],
            Money::ngn(dec!(25000)),
            "July settlement",
            &tpa_actor,
        );
        assert!(matches!(
            result,
            Err(PaymentError::ActorNotPermitted { .. })
        ));
    }

    #[test]
    fn test_create_rejects_empty_coverage() {
        let result = Reimbursement::create(
            TpaId::new(),
            &[],
            Money::ngn(dec!(25000)),
            "July settlement",
            &admin(),
        );
        assert!(matches!(result, Err(PaymentError::NoBatchesCovered)));
    }

    #[test]
    fn test_create_rejects_open_batch() {
        let facility_id = FacilityId::new();
        let facility = Actor::facility("desk-officer-1", facility_id);
        let period = DateRange::week_containing(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        let open_batch = Batch::create(facility_id, period, Currency::NGN, &facility).unwrap();

        let result = Reimbursement::create(
            TpaId::new(),
            &[&open_batch],
            Money::ngn(dec!(25000)),
            "July settlement",
            &admin(),
        );
        assert!(matches!(
            result,
            Err(PaymentError::BatchNotClosed { batch_id }) if batch_id == open_batch.id()
        ));
    }

    #[test]
    fn test_create_rejects_zero_amount() {
        let batch = closed_batch();
        let result = Reimbursement::create(
            TpaId::new(),
            &[&batch],
            Money::zero(Currency::NGN),
            "July settlement",
            &admin(),
        );
        assert!(matches!(result, Err(PaymentError::NonPositiveAmount { .. })));
    }

    #[test]
    fn test_create_rejects_blank_purpose() {
        let batch = closed_batch();
        let result = Reimbursement::create(
            TpaId::new(),
            &[&batch],
            Money::ngn(dec!(25000)),
            "   ",
            &admin(),
        );
        assert!(matches!(result, Err(PaymentError::MissingPurpose)));
    }

    #[test]
    fn test_full_lifecycle_pending_processed_completed() {
        let mut reimbursement = test_reimbursement();
        let actor = admin();

        reimbursement.mark_processed(&actor).unwrap();
        assert_eq!(reimbursement.status(), ReimbursementStatus::Processed);
        assert!(reimbursement.processed_at().is_some());

        reimbursement.mark_completed(&actor).unwrap();
        assert_eq!(reimbursement.status(), ReimbursementStatus::Completed);
        assert!(reimbursement.completed_at().is_some());
        assert!(reimbursement.status().is_terminal());
    }

    #[test]
    fn test_completion_cannot_skip_processing() {
        let mut reimbursement = test_reimbursement();
        let result = reimbursement.mark_completed(&admin());
        assert_eq!(
            result,
            Err(PaymentError::InvalidStatusTransition {
                from: "pending".to_string(),
                to: "completed".to_string(),
            })
        );
        assert_eq!(reimbursement.status(), ReimbursementStatus::Pending);
    }

    #[test]
    fn test_dispute_requires_reason() {
        let mut reimbursement = test_reimbursement();
        let actor = admin();

        assert!(matches!(
            reimbursement.dispute("  ", &actor),
            Err(PaymentError::MissingDisputeReason)
        ));

        reimbursement.mark_processed(&actor).unwrap();
        reimbursement
            .dispute("Amount short of the agreed settlement", &actor)
            .unwrap();
        assert_eq!(reimbursement.status(), ReimbursementStatus::Disputed);
        assert_eq!(
            reimbursement.status_note(),
            Some("Amount short of the agreed settlement")
        );
    }

    #[test]
    fn test_cancel_before_settlement() {
        let mut reimbursement = test_reimbursement();
        reimbursement
            .cancel(Some("Duplicate of RMB-202407-000101".to_string()), &admin())
            .unwrap();
        assert_eq!(reimbursement.status(), ReimbursementStatus::Cancelled);
        assert_eq!(
            reimbursement.status_note(),
            Some("Duplicate of RMB-202407-000101")
        );
    }

    #[test]
    fn test_terminal_status_rejects_further_moves() {
        let mut reimbursement = test_reimbursement();
        let actor = admin();
        reimbursement.mark_processed(&actor).unwrap();
        reimbursement.mark_completed(&actor).unwrap();

        assert!(matches!(
            reimbursement.dispute("Too late", &actor),
            Err(PaymentError::InvalidStatusTransition { .. })
        ));
        assert!(matches!(
            reimbursement.cancel(None, &actor),
            Err(PaymentError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_attach_document_keeps_status() {
        let mut reimbursement = test_reimbursement();
        let tpa_actor = Actor::tpa("reviewer-1", reimbursement.tpa_id());
        let receipt =
            DocumentRef::new("transfer-receipt.pdf", "Transfer receipt", "reviewer-1").unwrap();

        let attached = reimbursement.attach_document(receipt, &tpa_actor).unwrap();
        assert_eq!(attached.label, "Transfer receipt");
        assert_eq!(reimbursement.documents().len(), 1);
        assert_eq!(reimbursement.status(), ReimbursementStatus::Pending);

        let stranger = Actor::tpa("outsider", TpaId::new());
        let other =
            DocumentRef::new("second-receipt.pdf", "Second receipt", "outsider").unwrap();
        assert!(matches!(
            reimbursement.attach_document(other, &stranger),
            Err(PaymentError::ActorNotPermitted { .. })
        ));
    }
}
