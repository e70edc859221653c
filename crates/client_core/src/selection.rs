//! Location selection and the single-flight "add location" state machine.
//!
//! ```text
//! idle --submit--> pending(id) --resolve--> succeeded(id) | failed(id, reason)
//!   ^                                              |
//!   +-------------------- reset -------------------+
//! ```
//!
//! Rejected commands return a [`TransitionError`] and leave the state as it was.

use shared::{
    domain::{ChainId, LocationId},
    protocol::{
        AddLocationRequest, AddLocationResponse, Notification, FAILURE_NOTIFICATION_MS,
        SUCCESS_NOTIFICATION_MS,
    },
};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::{notify::Notifier, submission::LocationSubmitter};

pub const ADD_SUCCESS_NOTICE: &str = "Successfully added location to chain";
pub const ADD_ERROR_MESSAGE: &str = "Error occurred while adding location";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending(LocationId),
    Succeeded(LocationId),
    Failed {
        location_id: LocationId,
        reason: String,
    },
}

impl SubmissionState {
    pub fn pending_id(&self) -> Option<&LocationId> {
        match self {
            SubmissionState::Pending(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SubmissionState::Pending(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub selected: Option<LocationId>,
    pub submission: SubmissionState,
    pub last_added: Option<LocationId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("location {0} is already being added")]
    SubmissionInFlight(LocationId),
    #[error("the result for location {0} must be reset before continuing")]
    AwaitingReset(LocationId),
    #[error("no location is selected")]
    NothingSelected,
    #[error("no business chain is selected")]
    NoChainSelected,
    #[error("location {0} is not part of the selected chain")]
    UnknownLocation(LocationId),
    #[error("no add-location request is pending")]
    NotPending,
    #[error("response for location {received} does not match pending location {pending}")]
    MismatchedResponse {
        pending: LocationId,
        received: LocationId,
    },
}

pub struct SelectionController {
    state: watch::Sender<SelectionSnapshot>,
    /// Held across check-and-update so transitions are atomic.
    writes: Mutex<()>,
    notifier: Notifier,
}

impl SelectionController {
    pub fn new(notifier: Notifier) -> Self {
        let (state, _) = watch::channel(SelectionSnapshot::default());
        Self {
            state,
            writes: Mutex::new(()),
            notifier,
        }
    }

    pub fn select(&self, location_id: LocationId) -> Result<(), TransitionError> {
        self.transition("select", |state| {
            if let SubmissionState::Pending(pending) = &state.submission {
                return Err(TransitionError::SubmissionInFlight(pending.clone()));
            }
            state.selected = Some(location_id);
            Ok(())
        })
    }

    pub fn clear_selection(&self) -> Result<(), TransitionError> {
        self.transition("clear_selection", |state| {
            match &state.submission {
                SubmissionState::Idle => {}
                SubmissionState::Pending(id) => {
                    return Err(TransitionError::SubmissionInFlight(id.clone()))
                }
                SubmissionState::Succeeded(id)
                | SubmissionState::Failed {
                    location_id: id, ..
                } => return Err(TransitionError::AwaitingReset(id.clone())),
            }
            state.selected = None;
            Ok(())
        })
    }

    /// Moves `idle` to `pending` for the selected location.
    pub fn submit(&self) -> Result<LocationId, TransitionError> {
        self.transition("submit", |state| {
            match &state.submission {
                SubmissionState::Idle => {}
                SubmissionState::Pending(id) => {
                    return Err(TransitionError::SubmissionInFlight(id.clone()))
                }
                SubmissionState::Succeeded(id)
                | SubmissionState::Failed {
                    location_id: id, ..
                } => return Err(TransitionError::AwaitingReset(id.clone())),
            }
            let selected = state
                .selected
                .clone()
                .ok_or(TransitionError::NothingSelected)?;
            state.submission = SubmissionState::Pending(selected.clone());
            Ok(selected)
        })
    }

    /// Settles the pending submission with the submitter's response and
    /// publishes the outcome notification.
    pub(crate) fn resolve(&self, response: &AddLocationResponse) -> Result<(), TransitionError> {
        self.transition("resolve", |state| {
            let pending = state
                .submission
                .pending_id()
                .ok_or(TransitionError::NotPending)?;
            if pending != &response.location_id {
                return Err(TransitionError::MismatchedResponse {
                    pending: pending.clone(),
                    received: response.location_id.clone(),
                });
            }
            let location_id = pending.clone();
            if response.success {
                state.last_added = Some(location_id.clone());
                state.submission = SubmissionState::Succeeded(location_id);
            } else {
                state.submission = SubmissionState::Failed {
                    location_id,
                    reason: response.message.clone(),
                };
            }
            Ok(())
        })?;

        if response.success {
            info!(location_id = %response.location_id, "location added");
            self.notifier
                .notify(Notification::success(ADD_SUCCESS_NOTICE, SUCCESS_NOTIFICATION_MS));
        } else {
            warn!(
                location_id = %response.location_id,
                reason = %response.message,
                "location add failed"
            );
            self.notifier.notify(Notification::error(
                format!("Failed to add location: {}", response.message),
                FAILURE_NOTIFICATION_MS,
            ));
        }
        Ok(())
    }

    /// Settles the pending submission after the submitter itself broke.
    pub(crate) fn resolve_error(&self, err: &anyhow::Error) -> Result<(), TransitionError> {
        self.transition("resolve_error", |state| {
            let location_id = state
                .submission
                .pending_id()
                .cloned()
                .ok_or(TransitionError::NotPending)?;
            state.submission = SubmissionState::Failed {
                location_id,
                reason: ADD_ERROR_MESSAGE.to_string(),
            };
            Ok(())
        })?;

        error!(error = %err, "error adding location");
        self.notifier
            .notify(Notification::error(ADD_ERROR_MESSAGE, FAILURE_NOTIFICATION_MS));
        Ok(())
    }

    /// Settles `location_id` as failed when its round trip was dropped
    /// before the submitter answered.
    fn abandon(&self, location_id: &LocationId) {
        let settled = self.transition("abandon", |state| {
            if state.submission.pending_id() != Some(location_id) {
                return Err(TransitionError::NotPending);
            }
            state.submission = SubmissionState::Failed {
                location_id: location_id.clone(),
                reason: ADD_ERROR_MESSAGE.to_string(),
            };
            Ok(())
        });

        if settled.is_ok() {
            warn!(location_id = %location_id, "add location cancelled before a response");
            self.notifier
                .notify(Notification::error(ADD_ERROR_MESSAGE, FAILURE_NOTIFICATION_MS));
        }
    }

    /// Returns a settled submission to `idle`, keeping the selection.
    pub fn reset(&self) -> Result<(), TransitionError> {
        self.transition("reset", |state| {
            if let SubmissionState::Pending(pending) = &state.submission {
                return Err(TransitionError::SubmissionInFlight(pending.clone()));
            }
            state.submission = SubmissionState::Idle;
            Ok(())
        })
    }

    /// Drops selection, result and last-added marker together.
    pub fn reset_all(&self) -> Result<(), TransitionError> {
        self.transition("reset_all", |state| {
            if let SubmissionState::Pending(pending) = &state.submission {
                return Err(TransitionError::SubmissionInFlight(pending.clone()));
            }
            *state = SelectionSnapshot::default();
            Ok(())
        })
    }

    /// Runs one full add round trip for the selected location.
    ///
    /// A second call while one is in flight is rejected without touching the
    /// pending state. Dropping the returned future before it completes
    /// settles the submission as failed.
    pub async fn add_selected_location(
        &self,
        chain_id: &ChainId,
        submitter: &dyn LocationSubmitter,
    ) -> Result<SubmissionState, TransitionError> {
        let location_id = self.submit()?;
        let guard = PendingGuard {
            controller: self,
            location_id: location_id.clone(),
            armed: true,
        };
        let request = AddLocationRequest {
            chain_id: chain_id.clone(),
            location_id: location_id.clone(),
        };

        let outcome = submitter.add_location(request).await;
        guard.disarm();
        match outcome {
            Ok(response) if response.location_id == location_id => self.resolve(&response)?,
            Ok(response) => {
                let err = anyhow::anyhow!(
                    "submitter answered for location {} instead of {location_id}",
                    response.location_id
                );
                self.resolve_error(&err)?
            }
            Err(err) => self.resolve_error(&err)?,
        }

        Ok(self.submission())
    }

    pub fn selected(&self) -> Option<LocationId> {
        self.state.borrow().selected.clone()
    }

    pub fn is_selected(&self, location_id: &LocationId) -> bool {
        self.state.borrow().selected.as_ref() == Some(location_id)
    }

    pub fn has_selection(&self) -> bool {
        self.state.borrow().selected.is_some()
    }

    pub fn submission(&self) -> SubmissionState {
        self.state.borrow().submission.clone()
    }

    pub fn is_being_added(&self, location_id: &LocationId) -> bool {
        self.state.borrow().submission.pending_id() == Some(location_id)
    }

    pub fn is_any_being_added(&self) -> bool {
        self.state.borrow().submission.is_pending()
    }

    pub fn last_added(&self) -> Option<LocationId> {
        self.state.borrow().last_added.clone()
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.state.subscribe()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    fn transition<T>(
        &self,
        command: &'static str,
        apply: impl FnOnce(&mut SelectionSnapshot) -> Result<T, TransitionError>,
    ) -> Result<T, TransitionError> {
        let _writer = self.writes.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = self.state.borrow().clone();
        let result = apply(&mut next);
        if result.is_ok() {
            self.state.send_if_modified(move |state| {
                if *state == next {
                    return false;
                }
                *state = next;
                true
            });
        }

        match &result {
            Ok(_) => debug!(command, "selection transition applied"),
            Err(err) => warn!(command, error = %err, "selection transition rejected"),
        }
        result
    }
}

/// Armed while a submission is awaiting the submitter.
struct PendingGuard<'a> {
    controller: &'a SelectionController,
    location_id: LocationId,
    armed: bool,
}

impl PendingGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.controller.abandon(&self.location_id);
        }
    }
}

#[cfg(test)]
#[path = "tests/selection_tests.rs"]
mod tests;
