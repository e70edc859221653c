use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChainId, LocationId};

pub const SUCCESS_NOTIFICATION_MS: u64 = 4000;
pub const FAILURE_NOTIFICATION_MS: u64 = 5000;
pub const CLIPBOARD_NOTIFICATION_MS: u64 = 3000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLocationRequest {
    pub chain_id: ChainId,
    pub location_id: LocationId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLocationResponse {
    pub success: bool,
    pub message: String,
    pub location_id: LocationId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A dismissible, fire-and-forget message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub duration_ms: u64,
    pub issued_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(level: NotificationLevel, message: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            level,
            message: message.into(),
            duration_ms,
            issued_at: Utc::now(),
        }
    }

    pub fn success(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(NotificationLevel::Success, message, duration_ms)
    }

    pub fn error(message: impl Into<String>, duration_ms: u64) -> Self {
        Self::new(NotificationLevel::Error, message, duration_ms)
    }

    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
