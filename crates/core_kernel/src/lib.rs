//! Core Kernel - Foundational types and utilities for the claims portal
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers
//! - Temporal helpers for batch periods and calendar bucketing
//! - Actor identity passed explicitly into every state transition
//! - Port abstractions for swappable adapters

pub mod actor;
pub mod document;
pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;
pub mod temporal;

pub use actor::{Actor, ActorRole};
pub use document::DocumentRef;
pub use error::CoreError;
pub use identifiers::{
    BatchId, ClaimId, ClaimItemId, DocumentId, ErrorLogId, FacilityId, PaymentSummaryId,
    ReimbursementId, TpaId,
};
pub use money::{Currency, Money, MoneyError};
pub use ports::{DomainPort, PortError};
pub use temporal::{DateRange, TemporalError, Timezone};
