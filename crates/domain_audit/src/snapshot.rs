//! Claim snapshots for auditing
//!
//! The audit engine reads a flat projection of each claim rather than
//! the full aggregate, so a scan can run over claims from one batch,
//! many batches, or a reporting extract without caring where they came
//! from.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, ClaimId, FacilityId, Money};
use domain_claims::{CareType, Claim, Decision};

/// Flat, read-only view of a claim as the audit engine sees it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimSnapshot {
    pub claim_id: ClaimId,
    pub batch_id: BatchId,
    pub facility_id: FacilityId,
    pub beneficiary_id: String,
    pub beneficiary_name: String,
    pub nin: Option<String>,
    pub phone: Option<String>,
    pub primary_diagnosis: String,
    pub treatment_description: String,
    pub care_type: CareType,
    pub admission_date: NaiveDate,
    pub treatment_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub total_cost: Money,
    pub approved_cost: Option<Money>,
    pub decision: Decision,
    pub submitted_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimSnapshot {
    fn from(claim: &Claim) -> Self {
        Self {
            claim_id: claim.id,
            batch_id: claim.batch_id,
            facility_id: claim.facility_id,
            beneficiary_id: claim.beneficiary.beneficiary_id.clone(),
            beneficiary_name: claim.beneficiary.name.clone(),
            nin: claim.beneficiary.nin.clone(),
            phone: claim.beneficiary.phone.clone(),
            primary_diagnosis: claim.primary_diagnosis.clone(),
            treatment_description: claim.treatment_description.clone(),
            care_type: claim.care_type,
            admission_date: claim.admission_date,
            treatment_date: claim.treatment_date,
            discharge_date: claim.discharge_date,
            total_cost: claim.total_cost_of_care(),
            approved_cost: claim.approved_cost_of_care,
            decision: claim.decision,
            submitted_at: claim.submitted_at,
        }
    }
}

impl ClaimSnapshot {
    /// Length of stay in whole days, negative when dates are inverted
    pub fn stay_duration_days(&self) -> i64 {
        (self.discharge_date - self.admission_date).num_days()
    }
}
