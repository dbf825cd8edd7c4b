//! Core error types used across the system

use thiserror::Error;

use crate::money::MoneyError;
use crate::temporal::TemporalError;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::money::{Currency, Money};

    #[test]
    fn test_money_error_converts() {
        let ngn = Money::ngn(dec!(10));
        let usd = Money::new(dec!(10), Currency::USD);

        let err: CoreError = ngn.checked_add(&usd).unwrap_err().into();
        assert!(matches!(err, CoreError::Money(_)));
    }

    #[test]
    fn test_helper_constructors() {
        assert!(matches!(
            CoreError::validation("missing diagnosis"),
            CoreError::Validation(_)
        ));
        assert!(matches!(
            CoreError::invalid_state("draft cannot close"),
            CoreError::InvalidStateTransition(_)
        ));
        assert!(matches!(
            CoreError::not_found("batch"),
            CoreError::NotFound(_)
        ));
    }
}
