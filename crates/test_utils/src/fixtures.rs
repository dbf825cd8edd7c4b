//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for common entities across the claims portal.
//! These fixtures are consistent and predictable so unit tests can
//! assert on exact values.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{
    Actor, BatchId, ClaimId, Currency, DateRange, FacilityId, Money, TpaId,
};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Diagnoses that appear in the NHIA standard-cost reference table
pub static COMMON_DIAGNOSES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Malaria",
        "Severe Malaria",
        "Typhoid",
        "Pneumonia",
        "Caesarean Section",
        "Normal Delivery",
        "Appendectomy",
        "Hernia Repair",
    ]
});

/// Treatment descriptions paired loosely with the diagnoses above
pub static COMMON_TREATMENTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "ACT course",
        "IV artesunate",
        "Antibiotic therapy",
        "IV antibiotics",
        "Surgical delivery",
        "Assisted delivery",
        "Open appendectomy",
        "Mesh repair",
    ]
});

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Standard outpatient tariff amount
    pub fn ngn_25000() -> Money {
        Money::ngn(dec!(25000))
    }

    /// Standard inpatient tariff amount
    pub fn ngn_80000() -> Money {
        Money::ngn(dec!(80000))
    }

    /// Amount above every default diagnosis ceiling
    pub fn ngn_excessive() -> Money {
        Money::ngn(dec!(600000))
    }

    /// A zero amount in the portal currency
    pub fn ngn_zero() -> Money {
        Money::zero(Currency::NGN)
    }

    /// A foreign-currency amount for mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard service week (first week of July 2024)
    pub fn service_week() -> DateRange {
        DateRange::week_containing(Self::admission_date())
    }

    /// Standard admission date
    pub fn admission_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()
    }

    /// Standard discharge date, three days after admission
    pub fn discharge_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 4).unwrap()
    }

    /// Standard submission instant, mid-morning Lagos time
    pub fn submitted_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 5, 9, 0, 0).unwrap()
    }

    /// An instant late enough to sit on the next Lagos calendar date
    pub fn submitted_next_day() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 5, 23, 30, 0).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Deterministic batch ID
    pub fn batch_id() -> BatchId {
        BatchId::from_uuid(Uuid::parse_str("018f4e2a-0000-7000-8000-000000000001").unwrap())
    }

    /// Deterministic claim ID
    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::parse_str("018f4e2a-0000-7000-8000-000000000002").unwrap())
    }

    /// Deterministic facility ID
    pub fn facility_id() -> FacilityId {
        FacilityId::from_uuid(Uuid::parse_str("018f4e2a-0000-7000-8000-000000000003").unwrap())
    }

    /// Deterministic TPA ID
    pub fn tpa_id() -> TpaId {
        TpaId::from_uuid(Uuid::parse_str("018f4e2a-0000-7000-8000-000000000004").unwrap())
    }
}

/// Fixture for acting users
pub struct ActorFixtures;

impl ActorFixtures {
    /// Facility desk officer for the fixture facility
    pub fn facility_actor() -> Actor {
        Actor::facility("desk-officer-1", IdFixtures::facility_id())
    }

    /// TPA reviewer for the fixture TPA
    pub fn tpa_actor() -> Actor {
        Actor::tpa("reviewer-1", IdFixtures::tpa_id())
    }

    /// Scheme administrator
    pub fn admin() -> Actor {
        Actor::admin("scheme-admin")
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard beneficiary enrollment number
    pub fn beneficiary_id() -> &'static str {
        "NHIS-20001"
    }

    /// Standard hospital record number
    pub fn hospital_number() -> &'static str {
        "GH/IKD/2024/114"
    }

    /// Well-formed 11-digit NIN
    pub fn nin() -> &'static str {
        "61245370912"
    }

    /// Well-formed Nigerian mobile number
    pub fn phone() -> &'static str {
        "+2348031234567"
    }

    /// A diagnosis from the standard-cost table
    pub fn diagnosis() -> &'static str {
        COMMON_DIAGNOSES[0]
    }

    /// A treatment description matching the default diagnosis
    pub fn treatment() -> &'static str {
        COMMON_TREATMENTS[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_fixtures_are_deterministic() {
        assert_eq!(IdFixtures::batch_id(), IdFixtures::batch_id());
        assert_ne!(
            IdFixtures::batch_id().as_uuid(),
            IdFixtures::claim_id().as_uuid()
        );
    }

    #[test]
    fn test_actor_fixtures_carry_fixture_orgs() {
        assert!(ActorFixtures::facility_actor().represents_facility(IdFixtures::facility_id()));
        assert!(ActorFixtures::tpa_actor().represents_tpa(IdFixtures::tpa_id()));
        assert!(ActorFixtures::admin().is_admin());
    }

    #[test]
    fn test_service_week_covers_the_fixture_dates() {
        let week = TemporalFixtures::service_week();
        assert!(week.contains(TemporalFixtures::admission_date()));
    }
}
