//! Request handlers

pub mod audit;
pub mod batches;
pub mod health;
pub mod payments;
