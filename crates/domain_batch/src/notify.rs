//! Notification port for batch lifecycle events
//!
//! Closure and review outcomes are announced to the parties involved.
//! Delivery is best effort: callers log failures and move on, a batch
//! is never rolled back because a message could not be sent.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{BatchId, DomainPort, FacilityId, PortError, TpaId};

/// Who a notification is addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recipient {
    Facility { facility_id: FacilityId },
    Tpa { tpa_id: TpaId },
    SchemeAdmin,
}

/// A message about a batch, delivered out of band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub batch_id: BatchId,
    pub recipient: Recipient,
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub fn new(
        batch_id: BatchId,
        recipient: Recipient,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            batch_id,
            recipient,
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Port for delivering notifications
#[async_trait]
pub trait NotificationSender: DomainPort {
    /// Delivers one notification
    ///
    /// # Errors
    ///
    /// Returns `PortError` when the underlying channel rejects the
    /// message. Callers treat this as non-fatal.
    async fn send(&self, notification: Notification) -> Result<(), PortError>;
}

/// In-memory mock adapter for testing without a delivery channel
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Mock implementation of NotificationSender that records messages
    #[derive(Debug, Default)]
    pub struct MockNotificationSender {
        sent: Arc<RwLock<Vec<Notification>>>,
        reject: AtomicBool,
    }

    impl MockNotificationSender {
        /// Creates a mock that accepts every message
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a mock that rejects every message
        pub fn failing() -> Self {
            Self {
                sent: Arc::default(),
                reject: AtomicBool::new(true),
            }
        }

        /// Returns the messages delivered so far
        pub async fn delivered(&self) -> Vec<Notification> {
            self.sent.read().await.clone()
        }
    }

    impl DomainPort for MockNotificationSender {}

    #[async_trait]
    impl NotificationSender for MockNotificationSender {
        async fn send(&self, notification: Notification) -> Result<(), PortError> {
            if self.reject.load(Ordering::Relaxed) {
                return Err(PortError::unavailable("notification-gateway"));
            }
            self.sent.write().await.push(notification);
            Ok(())
        }
    }
}
