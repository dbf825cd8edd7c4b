//! Request/Response data transfer objects

pub mod audit;
pub mod batches;
pub mod claims;
pub mod payments;
