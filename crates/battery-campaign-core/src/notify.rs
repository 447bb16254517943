//! Push notification delivery.
//!
//! Only a dry-run backend ships with this crate; a real push provider plugs
//! in by implementing [`Notifier`].

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::DeliveryError;
use crate::lock::LockUser;

/// Content of one battery check reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub campaign_tag: String,
    pub lock_id: String,
}

impl NotificationPayload {
    /// Reminder for a lock that went longer than `threshold` without a check.
    pub fn battery_check(lock_id: &str, campaign_tag: &str, threshold: Duration) -> Self {
        let days = threshold.num_days();
        let unit = if days == 1 { "day" } else { "days" };
        Self {
            title: "Time to check your lock battery".to_string(),
            body: format!(
                "Lock {lock_id} hasn't had a battery check in over {days} {unit}. \
                 Open the app to check it now."
            ),
            campaign_tag: campaign_tag.to_string(),
            lock_id: lock_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    pub delivery_id: String,
}

/// Every delivery backend implements this trait.
pub trait Notifier {
    /// Backend identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Deliver `payload` to `user`.
    fn send(
        &self,
        user: &LockUser,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, DeliveryError>;
}

impl<T: Notifier + ?Sized> Notifier for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn send(
        &self,
        user: &LockUser,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        (**self).send(user, payload)
    }
}

/// Logs what would be sent and hands back a fresh delivery id.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunNotifier;

impl Notifier for DryRunNotifier {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn send(
        &self,
        user: &LockUser,
        payload: &NotificationPayload,
    ) -> Result<DeliveryReceipt, DeliveryError> {
        if user.push_token.trim().is_empty() {
            return Err(DeliveryError::MissingToken {
                user_id: user.user_id.clone(),
            });
        }

        let delivery_id = Uuid::new_v4().to_string();
        info!(
            user_id = %user.user_id,
            lock_id = %payload.lock_id,
            campaign_tag = %payload.campaign_tag,
            %delivery_id,
            "would send notification"
        );
        Ok(DeliveryReceipt { delivery_id })
    }
}
