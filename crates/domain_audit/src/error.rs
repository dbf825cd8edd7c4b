//! Audit domain errors

use thiserror::Error;

/// Errors produced by audit operations
#[derive(Debug, Error, PartialEq)]
pub enum AuditError {
    #[error("Invalid resolution transition from '{from}' to '{to}'")]
    InvalidResolutionTransition { from: String, to: String },

    #[error("A resolution note is required to resolve a finding")]
    MissingResolutionNote,
}

/// Result type for audit operations
pub type AuditResult<T> = Result<T, AuditError>;
