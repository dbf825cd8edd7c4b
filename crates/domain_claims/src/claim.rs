//! Claim entity and its verification lifecycle
//!
//! A claim is created from a facility's discharge form, travels inside a
//! batch through TPA review, and ends either paid or not verified. Status
//! changes go through `update_status` so that illegal jumps are impossible
//! no matter which operation attempts them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ClaimId, ClaimItemId, FacilityId, Money};

use crate::costs::CostBreakdown;
use crate::error::{ClaimError, ClaimResult};
use crate::item::{ClaimItem, ItemCategory, ItemReview, ItemReviewStatus};
use crate::review::{ClaimReview, Decision};
use crate::validation::{ClaimValidator, DischargeForm};

/// Position of a claim in the verification lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimStatus {
    /// Captured from a discharge form, not yet sent for review
    Submitted,
    /// Batch has been submitted, review pending
    AwaitingVerification,
    /// Reviewer approved the claim in full or in part
    Verified,
    /// Reviewer rejected the claim
    NotVerified,
    /// Batch closed, payment scheduled
    VerifiedAwaitingPayment,
    /// Disbursement confirmed
    VerifiedPaid,
}

impl ClaimStatus {
    /// Returns the snake_case wire name of this status
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Submitted => "submitted",
            ClaimStatus::AwaitingVerification => "awaiting_verification",
            ClaimStatus::Verified => "verified",
            ClaimStatus::NotVerified => "not_verified",
            ClaimStatus::VerifiedAwaitingPayment => "verified_awaiting_payment",
            ClaimStatus::VerifiedPaid => "verified_paid",
        }
    }

    /// Whether a reviewer may still change this claim's outcome
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            ClaimStatus::AwaitingVerification | ClaimStatus::Verified | ClaimStatus::NotVerified
        )
    }

    /// Whether this status is past the point of further review
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            ClaimStatus::VerifiedAwaitingPayment | ClaimStatus::VerifiedPaid
        )
    }
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether the encounter was an admission or an outpatient visit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareType {
    Inpatient,
    Outpatient,
}

/// The enrollee a claim was raised for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beneficiary {
    /// Scheme enrollment number
    pub beneficiary_id: String,
    pub name: String,
    /// National identification number, when captured
    pub nin: Option<String>,
    pub phone: Option<String>,
    /// Facility-issued folder number
    pub hospital_number: String,
}

/// A single cost-of-care claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub batch_id: BatchId,
    pub facility_id: FacilityId,
    pub beneficiary: Beneficiary,
    pub primary_diagnosis: String,
    pub secondary_diagnosis: Option<String>,
    pub treatment_description: String,
    pub care_type: CareType,
    pub admission_date: NaiveDate,
    pub treatment_date: NaiveDate,
    pub discharge_date: NaiveDate,
    /// Claimed costs by category, recomputed from items when items exist
    pub costs: CostBreakdown,
    /// Cost the reviewer agreed to pay, set during review
    pub approved_cost_of_care: Option<Money>,
    pub status: ClaimStatus,
    pub decision: Decision,
    pub rejection_reason: Option<String>,
    pub tpa_remarks: Option<String>,
    pub items: Vec<ClaimItem>,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a claim from a validated discharge form
    ///
    /// # Arguments
    ///
    /// * `batch_id` - The batch the claim is captured into
    /// * `facility_id` - The submitting facility
    /// * `form` - The discharge form as entered by the facility
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::DischargeRejected` with all field-level
    /// messages when the form fails validation. Warnings do not block
    /// creation.
    pub fn from_discharge(
        batch_id: BatchId,
        facility_id: FacilityId,
        form: DischargeForm,
    ) -> ClaimResult<Self> {
        let validation = ClaimValidator::validate(&form);
        if !validation.is_valid {
            return Err(ClaimError::DischargeRejected {
                errors: validation.errors,
            });
        }
        for warning in &validation.warnings {
            tracing::debug!(warning = %warning, "discharge form accepted with warning");
        }

        let now = Utc::now();
        Ok(Self {
            id: ClaimId::new(),
            batch_id,
            facility_id,
            beneficiary: Beneficiary {
                beneficiary_id: form.beneficiary_id,
                name: form.beneficiary_name,
                nin: form.nin,
                phone: form.phone,
                hospital_number: form.hospital_number,
            },
            primary_diagnosis: form.primary_diagnosis,
            secondary_diagnosis: form.secondary_diagnosis,
            treatment_description: form.treatment_description,
            care_type: form.care_type,
            admission_date: form.admission_date,
            treatment_date: form.treatment_date,
            discharge_date: form.discharge_date,
            costs: form.costs,
            approved_cost_of_care: None,
            status: ClaimStatus::Submitted,
            decision: Decision::Pending,
            rejection_reason: None,
            tpa_remarks: None,
            items: Vec::new(),
            submitted_at: now,
            created_at: now,
            updated_at: now,
        })
    }

    /// Total claimed cost of care across all categories
    pub fn total_cost_of_care(&self) -> Money {
        self.costs.total()
    }

    /// Length of stay in whole days, negative when dates are inverted
    pub fn stay_duration_days(&self) -> i64 {
        (self.discharge_date - self.admission_date).num_days()
    }

    /// Moves the claim into review when its batch is submitted
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidStatusTransition` unless the claim is
    /// currently `Submitted`.
    pub fn mark_awaiting_verification(&mut self) -> ClaimResult<()> {
        self.update_status(ClaimStatus::AwaitingVerification)
    }

    /// Applies a reviewer's resolved decision to this claim
    ///
    /// A claim may be re-reviewed while its batch is still under review;
    /// the new decision replaces the old one. A `Pending` review touches
    /// only the remarks.
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidStatusTransition` when the claim has
    /// already moved past review.
    pub fn apply_review(&mut self, review: ClaimReview) -> ClaimResult<()> {
        if !self.status.is_reviewable() {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: review
                    .status()
                    .map(|s| s.as_str())
                    .unwrap_or("awaiting_verification")
                    .to_string(),
            });
        }

        if let Some(remarks) = review.remarks() {
            self.tpa_remarks = Some(remarks.to_string());
        }
        if review.decision() == Decision::Pending {
            self.updated_at = Utc::now();
            return Ok(());
        }

        self.decision = review.decision();
        self.approved_cost_of_care = review.approved_cost();
        self.rejection_reason = review.rejection_reason().map(|r| r.to_string());
        if let Some(status) = review.status() {
            self.status = status;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Schedules the claim for payment when its batch closes
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidStatusTransition` unless the claim is
    /// `Verified`.
    pub fn mark_awaiting_payment(&mut self) -> ClaimResult<()> {
        self.update_status(ClaimStatus::VerifiedAwaitingPayment)
    }

    /// Records that the disbursement covering this claim was confirmed
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::InvalidStatusTransition` unless the claim is
    /// `VerifiedAwaitingPayment`.
    pub fn confirm_paid(&mut self) -> ClaimResult<()> {
        self.update_status(ClaimStatus::VerifiedPaid)
    }

    /// Attaches a line item and recomputes the cost breakdown from items
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::ItemsLocked` once the claim has entered or
    /// finished review.
    pub fn add_item(
        &mut self,
        category: ItemCategory,
        description: impl Into<String>,
        quantity: u32,
        unit_cost: Money,
        standard_cost: Option<Money>,
    ) -> ClaimResult<&ClaimItem> {
        if self.status != ClaimStatus::Submitted {
            return Err(ClaimError::ItemsLocked {
                status: self.status.as_str().to_string(),
            });
        }

        let mut item = ClaimItem::new(self.id, category, description, quantity, unit_cost);
        if let Some(standard) = standard_cost {
            item = item.with_standard_cost(standard);
        }
        self.items.push(item);
        self.recompute_costs_from_items();
        self.updated_at = Utc::now();
        Ok(self.items.last().unwrap())
    }

    /// Applies an item-level review and refreshes the approved rollup
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::ItemNotFound` for an unknown item,
    /// `ClaimError::InvalidStatusTransition` when the claim is no longer
    /// reviewable, or the item's own validation errors.
    pub fn review_item(&mut self, item_id: ClaimItemId, review: ItemReview) -> ClaimResult<()> {
        if !self.status.is_reviewable() {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: "item_review".to_string(),
            });
        }
        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(ClaimError::ItemNotFound { item_id })?;
        item.apply_review(review)?;

        if let Some(rollup) = self.approved_rollup() {
            self.approved_cost_of_care = Some(rollup);
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sum of approved line totals, `None` until at least one item has
    /// been reviewed
    pub fn approved_rollup(&self) -> Option<Money> {
        if self
            .items
            .iter()
            .all(|i| i.review_status == ItemReviewStatus::Pending)
        {
            return None;
        }
        let mut total = Money::zero(self.costs.currency());
        for item in &self.items {
            if let Some(line) = item.approved_line_total() {
                total = total.checked_add(&line).ok()?;
            }
        }
        Some(total)
    }

    fn recompute_costs_from_items(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let currency = self.costs.currency();
        let mut investigation = Money::zero(currency);
        let mut procedure = Money::zero(currency);
        let mut medication = Money::zero(currency);
        let mut other_services = Money::zero(currency);
        for item in &self.items {
            let line = item.line_total();
            match item.category {
                ItemCategory::Investigation => investigation = investigation + line,
                ItemCategory::Procedure => procedure = procedure + line,
                ItemCategory::Medication => medication = medication + line,
                ItemCategory::OtherService => other_services = other_services + line,
            }
        }
        self.costs = CostBreakdown {
            investigation,
            procedure,
            medication,
            other_services,
        };
    }

    fn can_transition_to(&self, new_status: ClaimStatus) -> bool {
        matches!(
            (self.status, new_status),
            (ClaimStatus::Submitted, ClaimStatus::AwaitingVerification)
                | (ClaimStatus::AwaitingVerification, ClaimStatus::Verified)
                | (ClaimStatus::AwaitingVerification, ClaimStatus::NotVerified)
                | (ClaimStatus::Verified, ClaimStatus::VerifiedAwaitingPayment)
                | (ClaimStatus::VerifiedAwaitingPayment, ClaimStatus::VerifiedPaid)
        )
    }

    fn update_status(&mut self, new_status: ClaimStatus) -> ClaimResult<()> {
        if !self.can_transition_to(new_status) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.as_str().to_string(),
                to: new_status.as_str().to_string(),
            });
        }
        self.status = new_status;
        self.updated_at = Utc::now();
        Ok(())
    }
}
