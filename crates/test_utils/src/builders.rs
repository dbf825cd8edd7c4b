//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the fields they care about; names, phones and
//! NINs default to realistic fake values so fixtures read like real
//! portal traffic.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{Actor, BatchId, ClaimId, Currency, DateRange, FacilityId, Money, TpaId};
use domain_audit::ClaimSnapshot;
use domain_batch::{Batch, PaymentAdvice, ReviewOutcome};
use domain_claims::{CareType, ClaimReview, CostBreakdown, Decision, DischargeForm};
use fake::faker::name::en::Name;
use fake::faker::number::en::NumberWithFormat;
use fake::faker::phone_number::en::PhoneNumber;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{StringFixtures, TemporalFixtures};

/// Builder for discharge forms
pub struct DischargeFormBuilder {
    beneficiary_id: String,
    beneficiary_name: String,
    hospital_number: String,
    nin: Option<String>,
    phone: Option<String>,
    primary_diagnosis: String,
    secondary_diagnosis: Option<String>,
    treatment_description: String,
    care_type: CareType,
    admission_date: NaiveDate,
    treatment_date: NaiveDate,
    discharge_date: NaiveDate,
    costs: CostBreakdown,
}

impl Default for DischargeFormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DischargeFormBuilder {
    /// Creates a builder with a realistic default encounter
    pub fn new() -> Self {
        Self {
            beneficiary_id: StringFixtures::beneficiary_id().to_string(),
            beneficiary_name: Name().fake(),
            hospital_number: StringFixtures::hospital_number().to_string(),
            nin: None,
            phone: None,
            primary_diagnosis: StringFixtures::diagnosis().to_string(),
            secondary_diagnosis: None,
            treatment_description: StringFixtures::treatment().to_string(),
            care_type: CareType::Inpatient,
            admission_date: TemporalFixtures::admission_date(),
            treatment_date: TemporalFixtures::admission_date(),
            discharge_date: TemporalFixtures::discharge_date(),
            costs: CostBreakdown::new(dec!(0), dec!(50000), dec!(0), dec!(0), Currency::NGN),
        }
    }

    /// Sets the beneficiary enrollment number
    pub fn with_beneficiary_id(mut self, id: impl Into<String>) -> Self {
        self.beneficiary_id = id.into();
        self
    }

    /// Sets the beneficiary name
    pub fn with_beneficiary_name(mut self, name: impl Into<String>) -> Self {
        self.beneficiary_name = name.into();
        self
    }

    /// Attaches a fake 11-digit NIN
    pub fn with_fake_nin(mut self) -> Self {
        self.nin = Some(NumberWithFormat("^##########").fake());
        self
    }

    /// Sets the NIN
    pub fn with_nin(mut self, nin: impl Into<String>) -> Self {
        self.nin = Some(nin.into());
        self
    }

    /// Attaches a fake phone number
    pub fn with_fake_phone(mut self) -> Self {
        self.phone = Some(PhoneNumber().fake());
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the primary diagnosis
    pub fn with_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.primary_diagnosis = diagnosis.into();
        self
    }

    /// Sets the treatment description
    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment_description = treatment.into();
        self
    }

    /// Sets the care type
    pub fn with_care_type(mut self, care_type: CareType) -> Self {
        self.care_type = care_type;
        self
    }

    /// Sets admission, treatment and discharge to one calendar date
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        self.admission_date = date;
        self.treatment_date = date;
        self.discharge_date = date;
        self
    }

    /// Sets the encounter dates individually
    pub fn with_dates(
        mut self,
        admission: NaiveDate,
        treatment: NaiveDate,
        discharge: NaiveDate,
    ) -> Self {
        self.admission_date = admission;
        self.treatment_date = treatment;
        self.discharge_date = discharge;
        self
    }

    /// Sets the procedure cost, zeroing the other components
    pub fn with_procedure_cost(mut self, amount: Decimal) -> Self {
        self.costs = CostBreakdown::new(dec!(0), amount, dec!(0), dec!(0), Currency::NGN);
        self
    }

    /// Sets the full cost breakdown
    pub fn with_costs(mut self, costs: CostBreakdown) -> Self {
        self.costs = costs;
        self
    }

    /// Builds the discharge form
    pub fn build(self) -> DischargeForm {
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
            costs: self.costs,
        }
    }
}

/// Builder for audit claim snapshots
pub struct ClaimSnapshotBuilder {
    claim_id: ClaimId,
    batch_id: BatchId,
    facility_id: FacilityId,
    beneficiary_id: String,
    beneficiary_name: String,
    nin: Option<String>,
    phone: Option<String>,
    primary_diagnosis: String,
    treatment_description: String,
    care_type: CareType,
    admission_date: NaiveDate,
    treatment_date: NaiveDate,
    discharge_date: NaiveDate,
    total_cost: Money,
    approved_cost: Option<Money>,
    decision: Decision,
    submitted_at: DateTime<Utc>,
}

impl Default for ClaimSnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimSnapshotBuilder {
    /// Creates a builder for an unremarkable submitted claim
    pub fn new() -> Self {
        Self {
            claim_id: ClaimId::new(),
            batch_id: BatchId::new(),
            facility_id: FacilityId::new(),
            beneficiary_id: StringFixtures::beneficiary_id().to_string(),
            beneficiary_name: Name().fake(),
            nin: None,
            phone: None,
            primary_diagnosis: StringFixtures::diagnosis().to_string(),
            treatment_description: StringFixtures::treatment().to_string(),
            care_type: CareType::Inpatient,
            admission_date: TemporalFixtures::admission_date(),
            treatment_date: TemporalFixtures::admission_date(),
            discharge_date: TemporalFixtures::discharge_date(),
            total_cost: Money::ngn(dec!(50000)),
            approved_cost: None,
            decision: Decision::Pending,
            submitted_at: TemporalFixtures::submitted_at(),
        }
    }

    pub fn with_claim_id(mut self, id: ClaimId) -> Self {
        self.claim_id = id;
        self
    }

    pub fn with_batch_id(mut self, id: BatchId) -> Self {
        self.batch_id = id;
        self
    }

    pub fn with_facility_id(mut self, id: FacilityId) -> Self {
        self.facility_id = id;
        self
    }

    pub fn with_beneficiary(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.beneficiary_id = id.into();
        self.beneficiary_name = name.into();
        self
    }

    pub fn with_nin(mut self, nin: impl Into<String>) -> Self {
        self.nin = Some(nin.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_diagnosis(mut self, diagnosis: impl Into<String>) -> Self {
        self.primary_diagnosis = diagnosis.into();
        self
    }

    pub fn with_treatment(mut self, treatment: impl Into<String>) -> Self {
        self.treatment_description = treatment.into();
        self
    }

    pub fn with_care_type(mut self, care_type: CareType) -> Self {
        self.care_type = care_type;
        self
    }

    /// Sets admission and treatment to the date, keeping the stay length
    pub fn admitted_on(mut self, date: NaiveDate) -> Self {
        let stay = self.discharge_date - self.admission_date;
        self.admission_date = date;
        self.treatment_date = date;
        self.discharge_date = date + stay;
        self
    }

    pub fn with_dates(
        mut self,
        admission: NaiveDate,
        treatment: NaiveDate,
        discharge: NaiveDate,
    ) -> Self {
        self.admission_date = admission;
        self.treatment_date = treatment;
        self.discharge_date = discharge;
        self
    }

    pub fn with_total_cost(mut self, amount: Decimal) -> Self {
        self.total_cost = Money::ngn(amount);
        self
    }

    pub fn with_decision(mut self, decision: Decision, approved: Option<Money>) -> Self {
        self.decision = decision;
        self.approved_cost = approved;
        self
    }

    pub fn submitted_at(mut self, instant: DateTime<Utc>) -> Self {
        self.submitted_at = instant;
        self
    }

    /// Builds the snapshot
    pub fn build(self) -> ClaimSnapshot {
        ClaimSnapshot {
            claim_id: self.claim_id,
            batch_id: self.batch_id,
            facility_id: self.facility_id,
            beneficiary_id: self.beneficiary_id,
            beneficiary_name: self.beneficiary_name,
            nin: self.nin,
            phone: self.phone,
            primary_diagnosis: self.primary_diagnosis,
            treatment_description: self.treatment_description,
            care_type: self.care_type,
            admission_date: self.admission_date,
            treatment_date: self.treatment_date,
            discharge_date: self.discharge_date,
            total_cost: self.total_cost,
            approved_cost: self.approved_cost,
            decision: self.decision,
            submitted_at: self.submitted_at,
        }
    }
}

/// Workflow stage a built batch scenario should be left in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStage {
    Draft,
    Open,
    Submitted,
    UnderReview,
    Approved,
    Closed,
}

/// A batch walked to a workflow stage, with the actors that drove it
pub struct BatchScenario {
    pub batch: Batch,
    pub facility_id: FacilityId,
    pub tpa_id: TpaId,
    pub facility_actor: Actor,
    pub tpa_actor: Actor,
    pub admin: Actor,
}

/// Builder that walks a batch through the submission workflow
pub struct BatchScenarioBuilder {
    stage: BatchStage,
    claim_count: usize,
    currency: Currency,
    paid_amount: Decimal,
}

impl Default for BatchScenarioBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchScenarioBuilder {
    pub fn new() -> Self {
        Self {
            stage: BatchStage::Submitted,
            claim_count: 2,
            currency: Currency::NGN,
            paid_amount: dec!(100000),
        }
    }

    /// Sets the stage to leave the batch in
    pub fn at_stage(mut self, stage: BatchStage) -> Self {
        self.stage = stage;
        self
    }

    /// Sets how many claims to capture
    pub fn with_claims(mut self, count: usize) -> Self {
        self.claim_count = count;
        self
    }

    /// Sets the advice amount used when the stage is `Closed`
    pub fn with_paid_amount(mut self, amount: Decimal) -> Self {
        self.paid_amount = amount;
        self
    }

    /// Builds the scenario, driving the batch through the workflow
    ///
    /// Claims are approved at their claimed cost when the stage passes
    /// through review.
    pub fn build(self) -> BatchScenario {
        let facility_id = FacilityId::new();
        let tpa_id = TpaId::new();
        let facility_actor = Actor::facility("desk-officer-1", facility_id);
        let tpa_actor = Actor::tpa("reviewer-1", tpa_id);
        let admin = Actor::admin("scheme-admin");

        let period = DateRange::week_containing(TemporalFixtures::admission_date());
        let mut batch = Batch::create(facility_id, period, self.currency, &facility_actor)
            .expect("scenario batch should be creatable");

        for index in 0..self.claim_count {
            let form = DischargeFormBuilder::new()
                .with_beneficiary_id(format!("NHIS-{:05}", 20000 + index))
                .with_procedure_cost(dec!(50000))
                .build();
            batch
                .add_claim(form, &facility_actor)
                .expect("scenario claim should be addable");
        }

        if self.stage == BatchStage::Draft {
            return self.finish(batch, facility_id, tpa_id, facility_actor, tpa_actor, admin);
        }

        batch.open(&facility_actor).expect("scenario batch should open");
        if self.stage == BatchStage::Open {
            return self.finish(batch, facility_id, tpa_id, facility_actor, tpa_actor, admin);
        }

        batch.submit(&facility_actor).expect("scenario batch should submit");
        if self.stage == BatchStage::Submitted {
            return self.finish(batch, facility_id, tpa_id, facility_actor, tpa_actor, admin);
        }

        batch
            .begin_review(tpa_id, &tpa_actor)
            .expect("scenario review should start");
        if self.stage == BatchStage::UnderReview {
            return self.finish(batch, facility_id, tpa_id, facility_actor, tpa_actor, admin);
        }

        let claim_ids: Vec<ClaimId> = batch.claims().iter().map(|c| c.id).collect();
        for claim_id in claim_ids {
            let claimed = batch
                .claim(claim_id)
                .expect("scenario claim should exist")
                .total_cost_of_care();
            let review = ClaimReview::resolve(
                Decision::Approved,
                None,
                Some(claimed),
                None,
                None,
                &tpa_actor,
            )
            .expect("scenario review should resolve");
            batch
                .review_claim(claim_id, review, &tpa_actor)
                .expect("scenario claim should review");
        }
        batch
            .complete_review(ReviewOutcome::Approved { remarks: None }, &tpa_actor)
            .expect("scenario review should complete");
        if self.stage == BatchStage::Approved {
            return self.finish(batch, facility_id, tpa_id, facility_actor, tpa_actor, admin);
        }

        let advice = PaymentAdvice {
            review_summary: Some("Weekly review settled".to_string()),
            paid_amount: Money::new(self.paid_amount, self.currency),
            beneficiaries_paid: self.claim_count as u32,
            payment_date: TemporalFixtures::discharge_date(),
            justification: "Paid per approved tariff".to_string(),
            signature: "Dr. A. Bello".to_string(),
            forwarding_letter: None,
        };
        batch
            .close(advice, &tpa_actor)
            .expect("scenario batch should close");
        self.finish(batch, facility_id, tpa_id, facility_actor, tpa_actor, admin)
    }

    fn finish(
        &self,
        batch: Batch,
        facility_id: FacilityId,
        tpa_id: TpaId,
        facility_actor: Actor,
        tpa_actor: Actor,
        admin: Actor,
    ) -> BatchScenario {
        BatchScenario {
            batch,
            facility_id,
            tpa_id,
            facility_actor,
            tpa_actor,
            admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_batch::BatchStatus;

    #[test]
    fn test_form_builder_defaults_are_valid() {
        let form = DischargeFormBuilder::new().build();
        assert!(!form.beneficiary_name.is_empty());
        assert_eq!(form.primary_diagnosis, "Malaria");
        assert!(form.admission_date <= form.discharge_date);
    }

    #[test]
    fn test_form_builder_fake_identifiers() {
        let form = DischargeFormBuilder::new()
            .with_fake_nin()
            .with_fake_phone()
            .build();
        let nin = form.nin.unwrap();
        assert_eq!(nin.len(), 11);
        assert!(nin.chars().all(|c| c.is_ascii_digit()));
        assert!(form.phone.is_some());
    }

    #[test]
    fn test_snapshot_builder_keeps_stay_length_when_moved() {
        let snapshot = ClaimSnapshotBuilder::new()
            .admitted_on(NaiveDate::from_ymd_opt(2024, 8, 10).unwrap())
            .build();
        assert_eq!(snapshot.stay_duration_days(), 3);
        assert_eq!(
            snapshot.admission_date,
            NaiveDate::from_ymd_opt(2024, 8, 10).unwrap()
        );
    }

    #[test]
    fn test_batch_scenario_reaches_each_stage() {
        let submitted = BatchScenarioBuilder::new().build();
        assert_eq!(submitted.batch.status(), BatchStatus::Submitted);
        assert_eq!(submitted.batch.claim_count(), 2);

        let closed = BatchScenarioBuilder::new()
            .at_stage(BatchStage::Closed)
            .with_claims(3)
            .with_paid_amount(dec!(150000))
            .build();
        assert_eq!(closed.batch.status(), BatchStatus::Closed);
        assert_eq!(closed.batch.paid_amount(), Some(Money::ngn(dec!(150000))));
        assert_eq!(closed.batch.tpa_id(), Some(closed.tpa_id));
    }
}
