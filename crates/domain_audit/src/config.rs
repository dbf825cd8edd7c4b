//! Audit engine configuration
//!
//! Thresholds are deliberately plain data so deployments can tune them
//! without code changes. Cost ceilings carry a small built-in tariff
//! table for common diagnoses; anything unlisted falls back to the
//! default ceiling.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::Timezone;

/// Built-in cost ceilings by diagnosis, in scheme currency
static DEFAULT_CEILINGS: Lazy<HashMap<&'static str, Decimal>> = Lazy::new(|| {
    HashMap::from([
        ("malaria", dec!(80000)),
        ("severe malaria", dec!(150000)),
        ("typhoid", dec!(120000)),
        ("caesarean section", dec!(350000)),
        ("appendectomy", dec!(300000)),
        ("hernia repair", dec!(250000)),
        ("normal delivery", dec!(100000)),
    ])
});

/// Ceiling applied when a diagnosis has no specific entry
const DEFAULT_COST_CEILING: Decimal = dec!(500000);

/// Tunable thresholds for the audit engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Timezone used to bucket submissions into calendar dates
    pub timezone: Timezone,
    /// Window within which a repeated beneficiary/diagnosis pair counts
    /// as a duplicate
    pub duplicate_window_days: i64,
    /// Percent deviation from the group mean that triggers a variance
    /// flag
    pub cost_variance_threshold_pct: Decimal,
    /// Longest stay an outpatient encounter may plausibly have
    pub outpatient_stay_limit_days: i64,
    /// Claims one facility may submit on a single calendar date
    pub facility_daily_claim_limit: usize,
    /// Claims one beneficiary may have for the same diagnosis
    pub beneficiary_diagnosis_claim_limit: usize,
    /// Ceiling for diagnoses without a specific override
    pub default_cost_ceiling: Decimal,
    /// Per-diagnosis ceiling overrides, keys matched case-insensitively
    pub ceiling_overrides: HashMap<String, Decimal>,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            timezone: Timezone::lagos(),
            duplicate_window_days: 30,
            cost_variance_threshold_pct: dec!(50),
            outpatient_stay_limit_days: 7,
            facility_daily_claim_limit: 10,
            beneficiary_diagnosis_claim_limit: 2,
            default_cost_ceiling: DEFAULT_COST_CEILING,
            ceiling_overrides: HashMap::new(),
        }
    }
}

impl AuditConfig {
    /// Resolves the cost ceiling for a diagnosis
    ///
    /// Overrides win over the built-in tariff table, which wins over the
    /// default ceiling.
    pub fn ceiling_for(&self, diagnosis: &str) -> Decimal {
        let key = diagnosis.trim().to_lowercase();
        if let Some(ceiling) = self.ceiling_overrides.get(&key) {
            return *ceiling;
        }
        if let Some(ceiling) = DEFAULT_CEILINGS.get(key.as_str()) {
            return *ceiling;
        }
        self.default_cost_ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_beats_builtin_table() {
        let mut config = AuditConfig::default();
        config
            .ceiling_overrides
            .insert("malaria".to_string(), dec!(95000));

        assert_eq!(config.ceiling_for("Malaria"), dec!(95000));
    }

    #[test]
    fn test_builtin_table_beats_default() {
        let config = AuditConfig::default();
        assert_eq!(config.ceiling_for("  Appendectomy "), dec!(300000));
    }

    #[test]
    fn test_unknown_diagnosis_uses_default() {
        let config = AuditConfig::default();
        assert_eq!(config.ceiling_for("rare condition"), dec!(500000));
    }
}
