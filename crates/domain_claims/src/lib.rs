//! # Domain: Claims
//!
//! Cost-of-care claims as facilities submit them and TPAs review them.
//! This crate owns the claim lifecycle state machine, discharge-form
//! validation, line items with their own review loop, and the decision
//! model that keeps status, decision and approved cost consistent with
//! each other.

pub mod claim;
pub mod costs;
pub mod error;
pub mod item;
pub mod review;
pub mod validation;

pub use claim::{Beneficiary, CareType, Claim, ClaimStatus};
pub use costs::CostBreakdown;
pub use error::{ClaimError, ClaimResult};
pub use item::{ClaimItem, ItemCategory, ItemReview, ItemReviewStatus};
pub use review::{ClaimReview, Decision};
pub use validation::{ClaimValidator, DischargeForm, ValidationResult};
