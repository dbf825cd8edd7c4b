//! Claim line items
//!
//! Items give a claim sub-line granularity: each investigation,
//! procedure, medication, or other service is one quantity × unit-cost
//! line with its own review status. Line-level approvals roll up into
//! the claim's approved cost.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ClaimItemId, Money};

use crate::error::ClaimError;

/// Which itemized cost field a line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Investigation,
    Procedure,
    Medication,
    OtherService,
}

/// Review state of a single line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemReviewStatus {
    Pending,
    Approved,
    Rejected,
    NeedsClarification,
}

/// The TPA's verdict on one line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReview {
    pub status: ItemReviewStatus,
    /// Quantity the TPA allows, when different from the claimed one
    pub approved_quantity: Option<u32>,
    /// Unit cost the TPA allows, when different from the claimed one
    pub approved_unit_cost: Option<Money>,
    pub rejection_reason: Option<String>,
}

/// One service line within a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimItem {
    pub id: ClaimItemId,
    pub claim_id: ClaimId,
    pub category: ItemCategory,
    pub description: String,
    pub quantity: u32,
    pub unit_cost: Money,
    pub review_status: ItemReviewStatus,
    pub approved_quantity: Option<u32>,
    pub approved_unit_cost: Option<Money>,
    pub rejection_reason: Option<String>,
    /// NHIA standard tariff for this service, when one exists
    pub standard_cost: Option<Money>,
}

impl ClaimItem {
    pub fn new(
        claim_id: ClaimId,
        category: ItemCategory,
        description: impl Into<String>,
        quantity: u32,
        unit_cost: Money,
    ) -> Self {
        Self {
            id: ClaimItemId::new(),
            claim_id,
            category,
            description: description.into(),
            quantity,
            unit_cost,
            review_status: ItemReviewStatus::Pending,
            approved_quantity: None,
            approved_unit_cost: None,
            rejection_reason: None,
            standard_cost: None,
        }
    }

    /// Attaches the NHIA standard tariff for variance comparison
    pub fn with_standard_cost(mut self, standard_cost: Money) -> Self {
        self.standard_cost = Some(standard_cost);
        self
    }

    /// Claimed line total: quantity × unit cost
    pub fn line_total(&self) -> Money {
        self.unit_cost.multiply(Decimal::from(self.quantity))
    }

    /// Approved line total, for rollup into the claim's approved cost
    ///
    /// Only approved lines contribute. An approval without adjusted
    /// quantity or unit cost rolls up at the claimed figures.
    pub fn approved_line_total(&self) -> Option<Money> {
        if self.review_status != ItemReviewStatus::Approved {
            return None;
        }
        let quantity = self.approved_quantity.unwrap_or(self.quantity);
        let unit_cost = self.approved_unit_cost.unwrap_or(self.unit_cost);
        Some(unit_cost.multiply(Decimal::from(quantity)))
    }

    /// Percent deviation of the claimed unit cost from the standard
    /// tariff, when a tariff is attached
    pub fn variance_from_standard(&self) -> Option<Decimal> {
        let standard = self.standard_cost?;
        self.unit_cost.percent_deviation_from(&standard).ok()
    }

    /// Applies a TPA review to this line
    ///
    /// # Errors
    ///
    /// - rejecting without a reason
    /// - approving more units than were claimed
    /// - a negative approved unit cost
    pub fn apply_review(&mut self, review: ItemReview) -> Result<(), ClaimError> {
        let reason = review.rejection_reason.filter(|r| !r.trim().is_empty());

        match review.status {
            ItemReviewStatus::Rejected => {
                if reason.is_none() {
                    return Err(ClaimError::MissingItemRejectionReason { item_id: self.id });
                }
            }
            ItemReviewStatus::Approved => {
                if let Some(quantity) = review.approved_quantity {
                    if quantity > self.quantity {
                        return Err(ClaimError::ItemQuantityExceedsClaimed {
                            item_id: self.id,
                            claimed: self.quantity,
                            approved: quantity,
                        });
                    }
                }
                if let Some(unit_cost) = review.approved_unit_cost {
                    if unit_cost.is_negative() {
                        return Err(ClaimError::NegativeApprovedCost {
                            amount: unit_cost.to_string(),
                        });
                    }
                }
            }
            ItemReviewStatus::Pending | ItemReviewStatus::NeedsClarification => {}
        }

        self.review_status = review.status;
        self.approved_quantity = review.approved_quantity;
        self.approved_unit_cost = review.approved_unit_cost;
        self.rejection_reason = reason;
        Ok(())
    }
}
