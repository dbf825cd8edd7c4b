//! # Domain: Batches
//!
//! Weekly claim batches and the workflow that moves them from facility
//! capture through TPA review to closure and disbursement. The `Batch`
//! aggregate owns its claims and is the only way to mutate them after
//! intake; `ClosureService` layers best-effort notification fan-out on
//! top of closure.

pub mod batch;
pub mod closure;
pub mod error;
pub mod events;
pub mod notify;

pub use batch::{Batch, BatchStatus, PaymentAdvice, ReviewOutcome};
pub use closure::{ClosureReport, ClosureService};
pub use error::{BatchError, BatchResult};
pub use events::BatchEvent;
pub use notify::{Notification, NotificationSender, Recipient};
