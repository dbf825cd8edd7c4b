//! Test Utilities Crate
//!
//! Shared test infrastructure, fixtures, and helpers for the claims
//! portal test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data for common entities
//! - `builders`: Builder patterns for test data construction
//! - `generators`: Property-based test data generators
//! - `assertions`: Custom assertion helpers for domain types

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
