//! Claim DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{ClaimId, ClaimItemId, Currency, Money};
use domain_claims::{
    CareType, Claim, ClaimItem, ClaimStatus, CostBreakdown, Decision, DischargeForm, ItemCategory,
    ItemReviewStatus,
};

/// A discharge form as captured at the facility desk
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    #[validate(length(min = 1, message = "beneficiary_id cannot be blank"))]
    pub beneficiary_id: String,
    #[validate(length(min = 1, message = "beneficiary_name cannot be blank"))]
    pub beneficiary_name: String,
    #[validate(length(min = 1, message = "hospital_number cannot be blank"))]
    pub hospital_number: String,
    pub nin: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "primary_diagnosis cannot be blank"))]
    pub primary_diagnosis: String,
    pub secondary_diagnosis: Option<String>,
    #[validate(length(min = 1, message = "treatment_description cannot be blank"))]
    pub treatment_description: String,
    pub care_type: CareType,
    pub admission_date: NaiveDate,
    pub treatment_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub costs: CostsRequest,
}

#[derive(Debug, Deserialize)]
pub struct CostsRequest {
    pub investigation: Decimal,
    pub procedure: Decimal,
    pub medication: Decimal,
    pub other_services: Decimal,
}

impl CreateClaimRequest {
    /// Converts the request into a discharge form priced in the batch's
    /// currency
    pub fn into_discharge_form(self, currency: Currency) -> DischargeForm {
        DischargeForm {
            beneficiary_id: self.beneficiary_id,
            beneficiary_name: self.beneficiary_name,
            hospital_number: self.hospital_number,
            nin: self.nin,
            phone: self.phone,
            primary_diagnosis: self.primary_diagnosis,
            secondary_diagnosis: self.secondary_diagnosis,
            treatment_description: self.treatment_description,
            care_type: self.care_type,
            admission_date: self.admission_date,
            treatment_date: self.treatment_date,
            discharge_date: self.discharge_date,
            costs: CostBreakdown::new(
                self.costs.investigation,
                self.costs.procedure,
                self.costs.medication,
                self.costs.other_services,
                currency,
            ),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub category: ItemCategory,
    #[validate(length(min = 1, message = "description cannot be blank"))]
    pub description: String,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: u32,
    pub unit_cost: Decimal,
    pub standard_cost: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewClaimRequest {
    pub decision: Decision,
    /// Status the reviewer believes the decision implies, checked
    /// against the derived one
    pub declared_status: Option<ClaimStatus>,
    pub approved_cost: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewItemRequest {
    pub status: ItemReviewStatus,
    pub approved_quantity: Option<u32>,
    pub approved_unit_cost: Option<Decimal>,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub id: ClaimId,
    pub beneficiary_id: String,
    pub beneficiary_name: String,
    pub hospital_number: String,
    pub nin: Option<String>,
    pub phone: Option<String>,
    pub primary_diagnosis: String,
    pub secondary_diagnosis: Option<String>,
    pub treatment_description: String,
    pub care_type: CareType,
    pub admission_date: NaiveDate,
    pub treatment_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub status: ClaimStatus,
    pub decision: Decision,
    pub total_cost: Decimal,
    pub approved_cost: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub tpa_remarks: Option<String>,
    pub items: Vec<ClaimItemResponse>,
}

impl From<&Claim> for ClaimResponse {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id,
            beneficiary_id: claim.beneficiary.beneficiary_id.clone(),
            beneficiary_name: claim.beneficiary.name.clone(),
            hospital_number: claim.beneficiary.hospital_number.clone(),
            nin: claim.beneficiary.nin.clone(),
            phone: claim.beneficiary.phone.clone(),
            primary_diagnosis: claim.primary_diagnosis.clone(),
            secondary_diagnosis: claim.secondary_diagnosis.clone(),
            treatment_description: claim.treatment_description.clone(),
            care_type: claim.care_type,
            admission_date: claim.admission_date,
            treatment_date: claim.treatment_date,
            discharge_date: claim.discharge_date,
            status: claim.status,
            decision: claim.decision,
            total_cost: claim.total_cost_of_care().amount(),
            approved_cost: claim.approved_cost_of_care.as_ref().map(Money::amount),
            rejection_reason: claim.rejection_reason.clone(),
            tpa_remarks: claim.tpa_remarks.clone(),
            items: claim.items.iter().map(ClaimItemResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimItemResponse {
    pub id: ClaimItemId,
    pub category: ItemCategory,
    pub description: String,
    pub quantity: u32,
    pub unit_cost: Decimal,
    pub line_total: Decimal,
    pub review_status: ItemReviewStatus,
    pub approved_quantity: Option<u32>,
    pub approved_unit_cost: Option<Decimal>,
    pub approved_line_total: Option<Decimal>,
    pub rejection_reason: Option<String>,
    pub standard_cost: Option<Decimal>,
}

impl From<&ClaimItem> for ClaimItemResponse {
    fn from(item: &ClaimItem) -> Self {
        Self {
            id: item.id,
            category: item.category,
            description: item.description.clone(),
            quantity: item.quantity,
            unit_cost: item.unit_cost.amount(),
            line_total: item.line_total().amount(),
            review_status: item.review_status,
            approved_quantity: item.approved_quantity,
            approved_unit_cost: item.approved_unit_cost.as_ref().map(Money::amount),
            approved_line_total: item.approved_line_total().map(|m| m.amount()),
            rejection_reason: item.rejection_reason.clone(),
            standard_cost: item.standard_cost.as_ref().map(Money::amount),
        }
    }
}
