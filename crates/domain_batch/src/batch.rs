//! Batch aggregate root
//!
//! A batch is the consistency boundary for claim submission: it owns the
//! claims a facility captures for a period and walks them through TPA
//! review to closure and payment. All claim mutations after intake go
//! through the batch so that actor permissions and workflow state are
//! checked in one place.
//!
//! # Invariants
//!
//! - Claims are only added while the batch is in draft or open
//! - A batch cannot be submitted empty
//! - Review outcomes require every claim to carry a decision
//! - Closure schedules exactly the verified claims for payment

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{
    Actor, BatchId, ClaimId, ClaimItemId, Currency, DateRange, DocumentRef, FacilityId, Money,
    TpaId,
};
use domain_claims::{
    Claim, ClaimItem, ClaimReview, ClaimStatus, Decision, DischargeForm, ItemCategory, ItemReview,
};

use crate::error::{BatchError, BatchResult};
use crate::events::BatchEvent;

/// Position of a batch in the submission workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Created, not yet accepting review
    Draft,
    /// Accepting claim capture
    Open,
    /// Sent to the TPA, awaiting pickup
    Submitted,
    /// A TPA is actively reviewing claims
    UnderReview,
    /// Review finished, batch accepted
    Approved,
    /// Review finished, batch sent back
    Rejected,
    /// Payment scheduled, batch finished
    Closed,
}

impl BatchStatus {
    /// Returns the snake_case wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Draft => "draft",
            BatchStatus::Open => "open",
            BatchStatus::Submitted => "submitted",
            BatchStatus::UnderReview => "under_review",
            BatchStatus::Approved => "approved",
            BatchStatus::Rejected => "rejected",
            BatchStatus::Closed => "closed",
        }
    }

    /// Whether claims may still be captured into the batch
    pub fn accepts_claims(&self) -> bool {
        matches!(self, BatchStatus::Draft | BatchStatus::Open)
    }
}

impl std::fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Batch-level outcome of a completed review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReviewOutcome {
    Approved { remarks: Option<String> },
    Rejected { reason: String },
}

/// Payment details the closer supplies when closing a batch
///
/// The paid amount becomes the batch's approved amount at closure; the
/// remaining fields back the payment-summary record kept alongside the
/// batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAdvice {
    /// Narrative summary of the review backing the closure
    pub review_summary: Option<String>,
    /// Amount the scheme will pay for the batch
    pub paid_amount: Money,
    /// Number of beneficiaries the payment covers
    pub beneficiaries_paid: u32,
    /// Date the payment is valued
    pub payment_date: NaiveDate,
    /// Stated reason for paying this amount
    pub justification: String,
    /// Name of the signing official
    pub signature: String,
    /// Forwarding letter accompanying the closure, if any
    pub forwarding_letter: Option<DocumentRef>,
}

/// The Batch aggregate root
///
/// # State Machine
///
/// - Draft -> Open (via open)
/// - Open -> Submitted (via submit)
/// - Submitted -> UnderReview (via begin_review)
/// - UnderReview -> Approved | Rejected (via complete_review)
/// - Submitted | Approved | Rejected -> Closed (via close)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Batch {
    /// Unique batch identifier
    id: BatchId,
    /// Human-readable batch number
    batch_number: String,
    /// Facility the batch belongs to
    facility_id: FacilityId,
    /// TPA assigned at review pickup
    tpa_id: Option<TpaId>,
    /// Service period the batch covers
    period: DateRange,
    /// Current workflow status
    status: BatchStatus,
    /// Batch currency, every claim must match
    currency: Currency,
    /// Claims owned by this batch
    claims: Vec<Claim>,
    /// Documents attached to the batch, such as a forwarding letter
    documents: Vec<DocumentRef>,
    /// Remarks or rejection reason from the completed review
    review_remarks: Option<String>,
    /// Total approved at closure
    approved_amount: Option<Money>,
    /// Amount recorded for payment at closure
    paid_amount: Option<Money>,
    submitted_at: Option<DateTime<Utc>>,
    reviewed_at: Option<DateTime<Utc>>,
    closed_at: Option<DateTime<Utc>>,
    /// Domain events to be published
    #[serde(skip)]
    events: Vec<BatchEvent>,
    /// Version for optimistic concurrency
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Batch {
    /// Creates a new draft batch for a facility and period
    ///
    /// # Arguments
    ///
    /// * `facility_id` - The owning facility
    /// * `period` - The service period the batch covers
    /// * `currency` - Currency all claims in the batch must use
    /// * `created_by` - The acting user, must represent the facility
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ActorNotPermitted` when the actor neither
    /// represents the facility nor is an admin.
    pub fn create(
        facility_id: FacilityId,
        period: DateRange,
        currency: Currency,
        created_by: &Actor,
    ) -> BatchResult<Self> {
        if !created_by.represents_facility(facility_id) && !created_by.is_admin() {
            return Err(BatchError::ActorNotPermitted {
                actor: created_by.to_string(),
                action: "create a batch for this facility".to_string(),
            });
        }

        let now = Utc::now();
        let id = BatchId::new();
        let batch_number = generate_batch_number();
        tracing::info!(batch_id = %id, batch_number = %batch_number, "batch created");

        Ok(Self {
            id,
            batch_number: batch_number.clone(),
            facility_id,
            tpa_id: None,
            period,
            status: BatchStatus::Draft,
            currency,
            claims: Vec::new(),
            documents: Vec::new(),
            review_remarks: None,
            approved_amount: None,
            paid_amount: None,
            submitted_at: None,
            reviewed_at: None,
            closed_at: None,
            events: vec![BatchEvent::BatchCreated {
                batch_id: id,
                facility_id,
                batch_number,
                timestamp: now,
            }],
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn id(&self) -> BatchId {
        self.id
    }

    pub fn batch_number(&self) -> &str {
        &self.batch_number
    }

    pub fn facility_id(&self) -> FacilityId {
        self.facility_id
    }

    pub fn tpa_id(&self) -> Option<TpaId> {
        self.tpa_id
    }

    pub fn period(&self) -> DateRange {
        self.period
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    /// Looks up a claim owned by this batch
    pub fn claim(&self, claim_id: ClaimId) -> Option<&Claim> {
        self.claims.iter().find(|c| c.id == claim_id)
    }

    pub fn claim_count(&self) -> usize {
        self.claims.len()
    }

    pub fn documents(&self) -> &[DocumentRef] {
        &self.documents
    }

    pub fn review_remarks(&self) -> Option<&str> {
        self.review_remarks.as_deref()
    }

    pub fn approved_amount(&self) -> Option<Money> {
        self.approved_amount
    }

    pub fn paid_amount(&self) -> Option<Money> {
        self.paid_amount
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_at
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

    /// Sum of claimed cost of care across all claims
    pub fn total_claimed(&self) -> Money {
        self.claims
            .iter()
            .fold(Money::zero(self.currency), |acc, claim| {
                acc + claim.total_cost_of_care()
            })
    }

    /// Sum of approved cost of care across reviewed claims
    pub fn total_approved(&self) -> Money {
        self.claims
            .iter()
            .filter_map(|claim| claim.approved_cost_of_care)
            .fold(Money::zero(self.currency), |acc, cost| acc + cost)
    }

    /// Returns accumulated domain events and clears them
    pub fn take_events(&mut self) -> Vec<BatchEvent> {
        std::mem::take(&mut self.events)
    }

    /// Opens the batch for claim capture
    ///
    /// # Errors
    ///
    /// Returns an error unless the batch is in `Draft` and the actor
    /// represents the owning facility.
    pub fn open(&mut self, actor: &Actor) -> BatchResult<()> {
        self.ensure_facility_actor(actor, "open the batch")?;
        self.update_status(BatchStatus::Open)?;
        self.events.push(BatchEvent::BatchOpened {
            batch_id: self.id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Captures a discharge form as a claim in this batch
    ///
    /// # Errors
    ///
    /// Returns `BatchError::InvalidStatusTransition` once the batch no
    /// longer accepts claims, `BatchError::CurrencyMismatch` when the
    /// form is priced in another currency, or the form's own validation
    /// errors.
    pub fn add_claim(&mut self, form: DischargeForm, actor: &Actor) -> BatchResult<&Claim> {
        self.ensure_facility_actor(actor, "add claims to the batch")?;
        if !self.status.accepts_claims() {
            return Err(BatchError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: "claim capture".to_string(),
            });
        }
        if form.costs.currency() != self.currency {
            return Err(BatchError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: form.costs.currency().to_string(),
            });
        }

        let claim = Claim::from_discharge(self.id, self.facility_id, form)?;
        self.events.push(BatchEvent::ClaimCaptured {
            batch_id: self.id,
            claim_id: claim.id,
            total_cost: claim.total_cost_of_care().amount(),
            currency: self.currency.to_string(),
            timestamp: Utc::now(),
        });
        self.claims.push(claim);
        self.touch();
        Ok(self.claims.last().unwrap())
    }

    /// Attaches a line item to a claim still open for capture
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ClaimNotFound` for an unknown claim,
    /// `BatchError::InvalidStatusTransition` once the batch no longer
    /// accepts claims, a currency mismatch when the line is priced in
    /// another currency, or the claim's own item errors.
    pub fn add_claim_item(
        &mut self,
        claim_id: ClaimId,
        category: ItemCategory,
        description: impl Into<String>,
        quantity: u32,
        unit_cost: Money,
        standard_cost: Option<Money>,
        actor: &Actor,
    ) -> BatchResult<&ClaimItem> {
        self.ensure_facility_actor(actor, "add claim items")?;
        if !self.status.accepts_claims() {
            return Err(BatchError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: "item capture".to_string(),
            });
        }
        if unit_cost.currency() != self.currency {
            return Err(BatchError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: unit_cost.currency().to_string(),
            });
        }

        let index = self
            .claims
            .iter()
            .position(|c| c.id == claim_id)
            .ok_or(BatchError::ClaimNotFound { claim_id })?;
        self.claims[index].add_item(category, description, quantity, unit_cost, standard_cost)?;
        self.touch();
        Ok(self.claims[index].items.last().unwrap())
    }

    /// Submits the batch for verification
    ///
    /// Every claim moves to `awaiting_verification` together with the
    /// batch.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::EmptyBatch` when no claims were captured, or
    /// `BatchError::InvalidStatusTransition` unless the batch is `Open`.
    pub fn submit(&mut self, actor: &Actor) -> BatchResult<()> {
        self.ensure_facility_actor(actor, "submit the batch")?;
        if self.claims.is_empty() {
            return Err(BatchError::EmptyBatch);
        }
        self.update_status(BatchStatus::Submitted)?;

        for claim in &mut self.claims {
            claim.mark_awaiting_verification()?;
        }
        let now = Utc::now();
        self.submitted_at = Some(now);
        self.events.push(BatchEvent::BatchSubmitted {
            batch_id: self.id,
            claim_count: self.claims.len(),
            total_value: self.total_claimed().amount(),
            currency: self.currency.to_string(),
            timestamp: now,
        });
        tracing::info!(
            batch_id = %self.id,
            claim_count = self.claims.len(),
            "batch submitted for verification"
        );
        Ok(())
    }

    /// Assigns a TPA and starts the review
    ///
    /// # Errors
    ///
    /// Returns an error unless the batch is `Submitted` and the actor is
    /// the named TPA or an admin.
    pub fn begin_review(&mut self, tpa_id: TpaId, actor: &Actor) -> BatchResult<()> {
        if !actor.represents_tpa(tpa_id) && !actor.is_admin() {
            return Err(BatchError::ActorNotPermitted {
                actor: actor.to_string(),
                action: "begin review for this TPA".to_string(),
            });
        }
        self.update_status(BatchStatus::UnderReview)?;
        self.tpa_id = Some(tpa_id);
        self.events.push(BatchEvent::ReviewStarted {
            batch_id: self.id,
            tpa_id,
            timestamp: self.updated_at,
        });
        Ok(())
    }

    /// Applies a reviewer's decision to one claim in the batch
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ClaimNotFound` for an unknown claim, a
    /// currency mismatch when the approved cost is priced in another
    /// currency, or the claim's own transition errors.
    pub fn review_claim(
        &mut self,
        claim_id: ClaimId,
        review: ClaimReview,
        actor: &Actor,
    ) -> BatchResult<()> {
        self.ensure_reviewer(actor, "review claims")?;
        if self.status != BatchStatus::UnderReview {
            return Err(BatchError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: "claim review".to_string(),
            });
        }
        if let Some(cost) = review.approved_cost() {
            if cost.currency() != self.currency {
                return Err(BatchError::CurrencyMismatch {
                    expected: self.currency.to_string(),
                    actual: cost.currency().to_string(),
                });
            }
        }

        let decision = review.decision();
        let claim = self
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or(BatchError::ClaimNotFound { claim_id })?;
        claim.apply_review(review)?;
        self.events.push(BatchEvent::ClaimReviewed {
            batch_id: self.id,
            claim_id,
            decision,
            timestamp: Utc::now(),
        });
        self.touch();
        Ok(())
    }

    /// Applies an item-level review to a claim in the batch
    pub fn review_claim_item(
        &mut self,
        claim_id: ClaimId,
        item_id: ClaimItemId,
        review: ItemReview,
        actor: &Actor,
    ) -> BatchResult<()> {
        self.ensure_reviewer(actor, "review claim items")?;
        if self.status != BatchStatus::UnderReview {
            return Err(BatchError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: "item review".to_string(),
            });
        }
        let claim = self
            .claims
            .iter_mut()
            .find(|c| c.id == claim_id)
            .ok_or(BatchError::ClaimNotFound { claim_id })?;
        claim.review_item(item_id, review)?;
        self.touch();
        Ok(())
    }

    /// Records the batch-level outcome of a finished review
    ///
    /// An approved outcome requires every claim to carry a decision; a
    /// rejected outcome requires a stated reason.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ReviewIncomplete` when claims are still
    /// pending, or `BatchError::MissingReviewReason` for an unreasoned
    /// rejection.
    pub fn complete_review(&mut self, outcome: ReviewOutcome, actor: &Actor) -> BatchResult<()> {
        self.ensure_reviewer(actor, "complete the review")?;

        let (new_status, approved, remarks) = match outcome {
            ReviewOutcome::Approved { remarks } => {
                let pending = self
                    .claims
                    .iter()
                    .filter(|c| c.decision == Decision::Pending)
                    .count();
                if pending > 0 {
                    return Err(BatchError::ReviewIncomplete { pending });
                }
                (BatchStatus::Approved, true, remarks)
            }
            ReviewOutcome::Rejected { reason } => {
                if reason.trim().is_empty() {
                    return Err(BatchError::MissingReviewReason);
                }
                (BatchStatus::Rejected, false, Some(reason))
            }
        };

        self.update_status(new_status)?;
        let now = Utc::now();
        self.reviewed_at = Some(now);
        self.review_remarks = remarks.clone();
        self.events.push(BatchEvent::ReviewCompleted {
            batch_id: self.id,
            approved,
            remarks,
            timestamp: now,
        });
        Ok(())
    }

    /// Closes the batch against a payment advice
    ///
    /// The advice's paid amount becomes both the approved and the paid
    /// amount of the batch, and every claim in `verified` moves to
    /// `verified_awaiting_payment`. Closure is legal from `Submitted`
    /// (the TPA's autonomous path), `Approved` or `Rejected`; a draft or
    /// open batch cannot be closed, and a closed batch cannot be closed
    /// again.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::ActorNotPermitted` unless the actor is the
    /// reviewing TPA or an admin, `BatchError::MissingJustification` /
    /// `BatchError::MissingSignature` for an incomplete advice, or
    /// `BatchError::InvalidStatusTransition` from an illegal status. On
    /// error nothing is mutated.
    pub fn close(&mut self, advice: PaymentAdvice, actor: &Actor) -> BatchResult<()> {
        self.ensure_reviewer(actor, "close the batch")?;
        if advice.justification.trim().is_empty() {
            return Err(BatchError::MissingJustification);
        }
        if advice.signature.trim().is_empty() {
            return Err(BatchError::MissingSignature);
        }
        if advice.paid_amount.currency() != self.currency {
            return Err(BatchError::CurrencyMismatch {
                expected: self.currency.to_string(),
                actual: advice.paid_amount.currency().to_string(),
            });
        }
        if advice.paid_amount.is_negative() {
            return Err(BatchError::NegativePaidAmount {
                amount: advice.paid_amount.to_string(),
            });
        }
        self.update_status(BatchStatus::Closed)?;

        for claim in &mut self.claims {
            if claim.status == ClaimStatus::Verified {
                claim.mark_awaiting_payment()?;
            }
        }

        let paid = advice.paid_amount;
        if self.review_remarks.is_none() {
            self.review_remarks = advice.review_summary;
        }
        if let Some(letter) = advice.forwarding_letter {
            self.documents.push(letter);
        }

        let now = Utc::now();
        self.approved_amount = Some(paid);
        self.paid_amount = Some(paid);
        self.closed_at = Some(now);
        self.events.push(BatchEvent::BatchClosed {
            batch_id: self.id,
            amount_to_pay: paid.amount(),
            currency: self.currency.to_string(),
            timestamp: now,
        });
        tracing::info!(
            batch_id = %self.id,
            amount = %paid,
            "batch closed, payment scheduled"
        );
        Ok(())
    }

    /// Confirms that the scheduled disbursement was made
    ///
    /// Claims awaiting payment move to `verified_paid`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::NothingToDisburse` when no claim is awaiting
    /// payment, or `BatchError::InvalidStatusTransition` before closure.
    pub fn confirm_disbursement(&mut self, actor: &Actor) -> BatchResult<()> {
        self.ensure_admin(actor, "confirm disbursement")?;
        if self.status != BatchStatus::Closed {
            return Err(BatchError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: "disbursement".to_string(),
            });
        }
        if !self
            .claims
            .iter()
            .any(|c| c.status == ClaimStatus::VerifiedAwaitingPayment)
        {
            return Err(BatchError::NothingToDisburse);
        }

        for claim in &mut self.claims {
            if claim.status == ClaimStatus::VerifiedAwaitingPayment {
                claim.confirm_paid()?;
            }
        }
        let now = Utc::now();
        let paid = self.paid_amount.unwrap_or_else(|| Money::zero(self.currency));
        self.events.push(BatchEvent::DisbursementConfirmed {
            batch_id: self.id,
            paid_amount: paid.amount(),
            currency: self.currency.to_string(),
            timestamp: now,
        });
        self.touch();
        Ok(())
    }

    fn ensure_facility_actor(&self, actor: &Actor, action: &str) -> BatchResult<()> {
        if actor.represents_facility(self.facility_id) || actor.is_admin() {
            Ok(())
        } else {
            Err(BatchError::ActorNotPermitted {
                actor: actor.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn ensure_reviewer(&self, actor: &Actor, action: &str) -> BatchResult<()> {
        let assigned = match self.tpa_id {
            Some(tpa_id) => actor.represents_tpa(tpa_id),
            // Pickup has not happened yet, any TPA actor may act
            None => matches!(actor.role(), core_kernel::ActorRole::Tpa { .. }),
        };
        if assigned || actor.is_admin() {
            Ok(())
        } else {
            Err(BatchError::ActorNotPermitted {
                actor: actor.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn ensure_admin(&self, actor: &Actor, action: &str) -> BatchResult<()> {
        if actor.is_admin() {
            Ok(())
        } else {
            Err(BatchError::ActorNotPermitted {
                actor: actor.to_string(),
                action: action.to_string(),
            })
        }
    }

    fn can_transition_to(&self, new_status: BatchStatus) -> bool {
        matches!(
            (self.status, new_status),
            (BatchStatus::Draft, BatchStatus::Open)
                | (BatchStatus::Open, BatchStatus::Submitted)
                | (BatchStatus::Submitted, BatchStatus::UnderReview)
                | (BatchStatus::UnderReview, BatchStatus::Approved)
                | (BatchStatus::UnderReview, BatchStatus::Rejected)
                | (BatchStatus::Submitted, BatchStatus::Closed)
                | (BatchStatus::Approved, BatchStatus::Closed)
                | (BatchStatus::Rejected, BatchStatus::Closed)
        )
    }

    fn update_status(&mut self, new_status: BatchStatus) -> BatchResult<()> {
        if !self.can_transition_to(new_status) {
            return Err(BatchError::InvalidStatusTransition {
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

/// Generates a unique batch number
///
/// Format: BTH-{YEAR}{MONTH}-{SEQUENCE}
fn generate_batch_number() -> String {
    let now = Utc::now();
    format!(
        "BTH-{}{:02}-{:06}",
        now.format("%Y"),
        now.format("%m"),
        rand_sequence()
    )
}

/// Generates a pseudo-random sequence for batch numbers
fn rand_sequence() -> u32 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    (duration.as_nanos() % 1_000_000) as u32
}
