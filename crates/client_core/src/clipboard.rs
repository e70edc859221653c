//! Copy actions for application URLs and location details.

use std::sync::Arc;

use shared::{
    domain::{Application, Location},
    protocol::{Notification, CLIPBOARD_NOTIFICATION_MS},
};
use thiserror::Error;
use tracing::{error, warn};
use url::Url;

use crate::notify::Notifier;

const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("clipboard write failed: {0}")]
    WriteFailed(String),
}

pub trait ClipboardSink: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
}

pub struct ClipboardService {
    primary: Arc<dyn ClipboardSink>,
    fallback: Option<Arc<dyn ClipboardSink>>,
    notifier: Notifier,
}

impl ClipboardService {
    pub fn new(primary: Arc<dyn ClipboardSink>, notifier: Notifier) -> Self {
        Self {
            primary,
            fallback: None,
            notifier,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ClipboardSink>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    /// Copies the app URL, retrying on the fallback sink if the primary one fails.
    pub fn copy_application_url(&self, app: &Application) -> Result<(), ClipboardError> {
        let copied = match self.primary.write_text(&app.url) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(app = %app.name, error = %err, "primary clipboard failed");
                match &self.fallback {
                    Some(fallback) => fallback.write_text(&app.url),
                    None => Err(err),
                }
            }
        };

        match copied {
            Ok(()) => {
                self.notifier.notify(Notification::success(
                    format!("Copied {} URL to clipboard!", app.name),
                    CLIPBOARD_NOTIFICATION_MS,
                ));
                Ok(())
            }
            Err(err) => {
                error!(app = %app.name, error = %err, "clipboard copy failed");
                Err(err)
            }
        }
    }

    pub fn copy_location_info(&self, location: &Location) -> Result<(), ClipboardError> {
        match self.primary.write_text(&location_info_text(location)) {
            Ok(()) => {
                self.notifier.notify(Notification::success(
                    format!("Copied {} information to clipboard!", location.name),
                    CLIPBOARD_NOTIFICATION_MS,
                ));
                Ok(())
            }
            Err(err) => {
                warn!(location_id = %location.id, error = %err, "location copy failed");
                self.notifier.notify(Notification::error(
                    "Failed to copy location information",
                    CLIPBOARD_NOTIFICATION_MS,
                ));
                Err(err)
            }
        }
    }
}

pub fn location_info_text(location: &Location) -> String {
    format!(
        "{}\n{}\n{}, {} {}\n{}\n{}",
        location.name,
        location.address,
        location.city,
        location.state,
        location.postal_code,
        location.phone.as_deref().unwrap_or("No phone"),
        location.email.as_deref().unwrap_or("No email"),
    )
}

pub fn map_search_url(location: &Location) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        MAP_SEARCH_URL,
        &[("api", "1"), ("query", location.full_address().as_str())],
    )
}

#[cfg(test)]
#[path = "tests/clipboard_tests.rs"]
mod tests;
