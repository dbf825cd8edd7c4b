//! Discharge-form validation
//!
//! Validation runs synchronously before a claim is created: a form that
//! fails produces field-level errors and nothing is written. Date
//! ordering and zero-cost oddities are warnings rather than errors;
//! historical submissions contain such rows, and flagging them belongs
//! to the audit engine, not intake.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::claim::CareType;
use crate::costs::CostBreakdown;

/// Result of discharge-form validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the form is acceptable
    pub is_valid: bool,
    /// Field-level errors that block intake
    pub errors: Vec<String>,
    /// Non-fatal issues worth a reviewer's attention
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// A facility's discharge submission, before it becomes a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DischargeForm {
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
    pub costs: CostBreakdown,
}

/// Validator for discharge forms
pub struct ClaimValidator;

impl ClaimValidator {
    /// Validates a discharge form
    ///
    /// # Returns
    ///
    /// A `ValidationResult`; errors block claim creation, warnings do
    /// not.
    pub fn validate(form: &DischargeForm) -> ValidationResult {
        let mut result = ValidationResult::ok();

        Self::validate_identity(form, &mut result);
        Self::validate_clinical(form, &mut result);
        Self::validate_costs(form, &mut result);
        Self::validate_dates(form, &mut result);

        result
    }

    fn validate_identity(form: &DischargeForm, result: &mut ValidationResult) {
        if form.beneficiary_id.trim().is_empty() {
            result.add_error("beneficiary_id: beneficiary ID is required");
        }
        if form.beneficiary_name.trim().is_empty() {
            result.add_error("beneficiary_name: beneficiary name is required");
        }
        if form.hospital_number.trim().is_empty() {
            result.add_error("hospital_number: hospital number is required");
        }
        if let Some(nin) = &form.nin {
            if nin.len() != 11 || !nin.chars().all(|c| c.is_ascii_digit()) {
                result.add_warning(format!("nin: '{}' is not an 11-digit NIN", nin));
            }
        }
        if let Some(phone) = &form.phone {
            let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
            if digits < 10 {
                result.add_warning(format!("phone: '{}' looks incomplete", phone));
            }
        }
    }

    fn validate_clinical(form: &DischargeForm, result: &mut ValidationResult) {
        if form.primary_diagnosis.trim().is_empty() {
            result.add_error("primary_diagnosis: primary diagnosis is required");
        }
        if form.treatment_description.trim().is_empty() {
            result.add_error("treatment_description: treatment description is required");
        }
    }

    fn validate_costs(form: &DischargeForm, result: &mut ValidationResult) {
        let categories = [
            ("investigation_cost", form.costs.investigation),
            ("procedure_cost", form.costs.procedure),
            ("medication_cost", form.costs.medication),
            ("other_services_cost", form.costs.other_services),
        ];
        for (field, amount) in categories {
            if amount.is_negative() {
                result.add_error(format!("{}: cost cannot be negative", field));
            }
        }
        if form.costs.is_all_zero() && !form.treatment_description.trim().is_empty() {
            result.add_warning(
                "costs: all cost fields are zero for a described treatment".to_string(),
            );
        }
    }

    fn validate_dates(form: &DischargeForm, result: &mut ValidationResult) {
        if form.treatment_date < form.admission_date {
            result.add_warning(format!(
                "treatment_date: treatment {} precedes admission {}",
                form.treatment_date, form.admission_date
            ));
        }
        if form.discharge_date < form.admission_date {
            result.add_warning(format!(
                "discharge_date: discharge {} precedes admission {}",
                form.discharge_date, form.admission_date
            ));
        }
    }
}
