//! API error handling
//!
//! Domain errors cross the HTTP boundary through `From` impls that sort
//! them into status codes: workflow violations are conflicts, permission
//! failures are forbidden, bad input is unprocessable.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use domain_audit::AuditError;
use domain_batch::BatchError;
use domain_claims::ClaimError;
use domain_payment::PaymentError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation failed: {}", .0.join("; "))]
    ValidationDetails(Vec<String>),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None)
            }
            ApiError::Validation(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg, None)
            }
            ApiError::ValidationDetails(details) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "One or more fields failed validation".to_string(),
                Some(details),
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::InvalidStatusTransition { .. } | ClaimError::ItemsLocked { .. } => {
                ApiError::Conflict(err.to_string())
            }
            ClaimError::ItemNotFound { .. } => ApiError::NotFound(err.to_string()),
            ClaimError::DischargeRejected { errors } => ApiError::ValidationDetails(errors),
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::InvalidStatusTransition { .. }
            | BatchError::ReviewIncomplete { .. }
            | BatchError::NothingToDisburse => ApiError::Conflict(err.to_string()),
            BatchError::ActorNotPermitted { .. } => ApiError::Forbidden(err.to_string()),
            BatchError::ClaimNotFound { .. } => ApiError::NotFound(err.to_string()),
            BatchError::Claim(claim_err) => ApiError::from(claim_err),
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<AuditError> for ApiError {
    fn from(err: AuditError) -> Self {
        match err {
            AuditError::InvalidResolutionTransition { .. } => ApiError::Conflict(err.to_string()),
            AuditError::MissingResolutionNote => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidStatusTransition { .. }
            | PaymentError::BatchNotClosed { .. }
            | PaymentError::DuplicateLedgerEntry { .. }
            | PaymentError::AlreadyDisbursed { .. } => ApiError::Conflict(err.to_string()),
            PaymentError::ActorNotPermitted { .. } => ApiError::Forbidden(err.to_string()),
            PaymentError::NoLedgerEntry { .. } => ApiError::NotFound(err.to_string()),
            _ => ApiError::Validation(err.to_string()),
        }
    }
}

impl From<core_kernel::CoreError> for ApiError {
    fn from(err: core_kernel::CoreError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<core_kernel::TemporalError> for ApiError {
    fn from(err: core_kernel::TemporalError) -> Self {
        ApiError::Validation(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| match &failure.message {
                    Some(message) => format!("{field}: {message}"),
                    None => format!("{field}: invalid value"),
                })
            })
            .collect();
        details.sort();
        ApiError::ValidationDetails(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_violations_map_to_conflict() {
        let api_err = ApiError::from(BatchError::InvalidStatusTransition {
            from: "draft".to_string(),
            to: "closed".to_string(),
        });
        assert!(matches!(api_err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_permission_failures_map_to_forbidden() {
        let api_err = ApiError::from(BatchError::ActorNotPermitted {
            actor: "desk-officer-1 (facility)".to_string(),
            action: "close the batch".to_string(),
        });
        assert!(matches!(api_err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_discharge_rejection_carries_details() {
        let api_err = ApiError::from(ClaimError::DischargeRejected {
            errors: vec!["Beneficiary ID is required".to_string()],
        });
        match api_err {
            ApiError::ValidationDetails(details) => {
                assert_eq!(details, vec!["Beneficiary ID is required".to_string()]);
            }
            other => panic!("expected validation details, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_claim_errors_unwrap() {
        let api_err = ApiError::from(BatchError::Claim(ClaimError::ItemNotFound {
            item_id: core_kernel::ClaimItemId::new(),
        }));
        assert!(matches!(api_err, ApiError::NotFound(_)));
    }
}
