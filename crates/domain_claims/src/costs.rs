//! Itemized cost fields and the authoritative total
//!
//! A claim carries four itemized cost categories. The total cost of care
//! is always their arithmetic sum; it is never stored independently and
//! can therefore never drift from the items.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money};

/// The four itemized cost categories on a discharge form
///
/// All four amounts share one currency, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub investigation: Money,
    pub procedure: Money,
    pub medication: Money,
    pub other_services: Money,
}

impl CostBreakdown {
    /// Builds a breakdown from raw decimals in one currency
    pub fn new(
        investigation: Decimal,
        procedure: Decimal,
        medication: Decimal,
        other_services: Decimal,
        currency: Currency,
    ) -> Self {
        Self {
            investigation: Money::new(investigation, currency),
            procedure: Money::new(procedure, currency),
            medication: Money::new(medication, currency),
            other_services: Money::new(other_services, currency),
        }
    }

    /// An all-zero breakdown in the given currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            investigation: Money::zero(currency),
            procedure: Money::zero(currency),
            medication: Money::zero(currency),
            other_services: Money::zero(currency),
        }
    }

    pub fn currency(&self) -> Currency {
        self.investigation.currency()
    }

    /// The derived total cost of care
    ///
    /// Authoritative for submission; the TPA-approved amount is a
    /// separate, independently entered figure.
    pub fn total(&self) -> Money {
        self.investigation + self.procedure + self.medication + self.other_services
    }

    /// True when every category is zero
    ///
    /// Syntactically valid; the audit engine decides whether it is
    /// suspicious in context.
    pub fn is_all_zero(&self) -> bool {
        self.total().is_zero()
    }
}
