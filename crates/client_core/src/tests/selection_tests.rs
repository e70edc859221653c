use super::*;

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::anyhow;
use async_trait::async_trait;
use shared::protocol::NotificationLevel;
use tokio::sync::{oneshot, Mutex};

fn loc(id: &str) -> LocationId {
    LocationId::new(id)
}

fn chain() -> ChainId {
    ChainId::new("OBB555")
}

fn response(id: &str, success: bool, message: &str) -> AddLocationResponse {
    AddLocationResponse {
        success,
        message: message.into(),
        location_id: loc(id),
    }
}

/// Submitter that answers only when the test says so.
struct GatedSubmitter {
    gate: Mutex<Option<oneshot::Receiver<bool>>>,
    calls: AtomicUsize,
}

impl GatedSubmitter {
    fn new() -> (oneshot::Sender<bool>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                gate: Mutex::new(Some(rx)),
                calls: AtomicUsize::new(0),
            },
        )
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationSubmitter for GatedSubmitter {
    async fn add_location(
        &self,
        request: AddLocationRequest,
    ) -> anyhow::Result<AddLocationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().await.take().ok_or_else(|| anyhow!("gate used"))?;
        let success = gate.await?;
        Ok(AddLocationResponse {
            success,
            message: if success { "ok".into() } else { "rejected".into() },
            location_id: request.location_id,
        })
    }
}

struct BrokenSubmitter;

#[async_trait]
impl LocationSubmitter for BrokenSubmitter {
    async fn add_location(
        &self,
        _request: AddLocationRequest,
    ) -> anyhow::Result<AddLocationResponse> {
        Err(anyhow!("connection reset"))
    }
}

struct WrongIdSubmitter;

#[async_trait]
impl LocationSubmitter for WrongIdSubmitter {
    async fn add_location(
        &self,
        _request: AddLocationRequest,
    ) -> anyhow::Result<AddLocationResponse> {
        Ok(response("LOC999", true, "ok"))
    }
}

#[test]
fn select_replaces_prior_selection() {
    let controller = SelectionController::new(Notifier::new());
    assert!(!controller.has_selection());

    controller.select(loc("LOC001")).expect("select");
    controller.select(loc("LOC002")).expect("reselect");

    assert!(controller.is_selected(&loc("LOC002")));
    assert!(!controller.is_selected(&loc("LOC001")));
    assert_eq!(controller.submission(), SubmissionState::Idle);
}

#[test]
fn submit_requires_a_selection() {
    let controller = SelectionController::new(Notifier::new());
    assert_eq!(controller.submit(), Err(TransitionError::NothingSelected));
    assert_eq!(controller.submission(), SubmissionState::Idle);
}

#[test]
fn second_submit_while_pending_is_rejected_without_change() {
    let controller = SelectionController::new(Notifier::new());
    controller.select(loc("LOC001")).expect("select");
    assert_eq!(controller.submit(), Ok(loc("LOC001")));

    let before = controller.snapshot();
    assert_eq!(
        controller.submit(),
        Err(TransitionError::SubmissionInFlight(loc("LOC001")))
    );
    assert_eq!(
        controller.select(loc("LOC002")),
        Err(TransitionError::SubmissionInFlight(loc("LOC001")))
    );
    assert_eq!(
        controller.clear_selection(),
        Err(TransitionError::SubmissionInFlight(loc("LOC001")))
    );
    assert_eq!(
        controller.reset(),
        Err(TransitionError::SubmissionInFlight(loc("LOC001")))
    );
    assert_eq!(controller.snapshot(), before);
    assert!(controller.is_being_added(&loc("LOC001")));
    assert!(controller.is_any_being_added());
}

#[tokio::test]
async fn success_records_last_added_and_notifies() {
    let controller = SelectionController::new(Notifier::new());
    let mut notices = controller.notifier().subscribe();
    controller.select(loc("LOC001")).expect("select");
    controller.submit().expect("submit");

    controller
        .resolve(&response("LOC001", true, "Location added successfully"))
        .expect("resolve");

    assert_eq!(
        controller.submission(),
        SubmissionState::Succeeded(loc("LOC001"))
    );
    assert_eq!(controller.last_added(), Some(loc("LOC001")));

    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.level, NotificationLevel::Success);
    assert_eq!(notice.message, ADD_SUCCESS_NOTICE);
    assert_eq!(notice.duration_ms, 4000);
}

#[tokio::test]
async fn failure_keeps_selection_and_allows_retry_after_reset() {
    let controller = SelectionController::new(Notifier::new());
    let mut notices = controller.notifier().subscribe();
    controller.select(loc("LOC002")).expect("select");
    controller.submit().expect("submit");

    controller
        .resolve(&response("LOC002", false, "quota exceeded"))
        .expect("resolve");

    assert_eq!(
        controller.submission(),
        SubmissionState::Failed {
            location_id: loc("LOC002"),
            reason: "quota exceeded".into()
        }
    );
    assert_eq!(controller.last_added(), None);
    assert_eq!(controller.selected(), Some(loc("LOC002")));

    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.level, NotificationLevel::Error);
    assert_eq!(notice.message, "Failed to add location: quota exceeded");
    assert_eq!(notice.duration_ms, 5000);

    assert_eq!(
        controller.submit(),
        Err(TransitionError::AwaitingReset(loc("LOC002")))
    );
    assert_eq!(
        controller.clear_selection(),
        Err(TransitionError::AwaitingReset(loc("LOC002")))
    );

    controller.reset().expect("reset");
    assert_eq!(controller.submission(), SubmissionState::Idle);
    assert_eq!(controller.selected(), Some(loc("LOC002")));
    assert_eq!(controller.submit(), Ok(loc("LOC002")));
}

#[test]
fn resolve_requires_matching_pending_submission() {
    let controller = SelectionController::new(Notifier::new());
    assert_eq!(
        controller.resolve(&response("LOC001", true, "ok")),
        Err(TransitionError::NotPending)
    );

    controller.select(loc("LOC001")).expect("select");
    controller.submit().expect("submit");
    assert_eq!(
        controller.resolve(&response("LOC003", true, "ok")),
        Err(TransitionError::MismatchedResponse {
            pending: loc("LOC001"),
            received: loc("LOC003"),
        })
    );
    assert_eq!(controller.submission(), SubmissionState::Pending(loc("LOC001")));
}

#[test]
fn clear_selection_and_reset_all_from_idle() {
    let controller = SelectionController::new(Notifier::new());
    controller.select(loc("LOC001")).expect("select");
    controller.clear_selection().expect("clear");
    assert_eq!(controller.selected(), None);

    controller.select(loc("LOC004")).expect("select");
    controller.submit().expect("submit");
    controller
        .resolve(&response("LOC004", true, "ok"))
        .expect("resolve");
    controller.reset_all().expect("reset all");
    assert_eq!(controller.snapshot(), SelectionSnapshot::default());
}

#[test]
fn reset_from_idle_is_a_no_op() {
    let controller = SelectionController::new(Notifier::new());
    let mut updates = controller.subscribe();
    controller.reset().expect("reset");
    assert!(!updates.has_changed().expect("sender alive"));
}

#[tokio::test]
async fn concurrent_add_is_single_flight() {
    let controller = Arc::new(SelectionController::new(Notifier::new()));
    controller.select(loc("LOC001")).expect("select");
    let (release, submitter) = GatedSubmitter::new();
    let submitter = Arc::new(submitter);

    let first = {
        let controller = Arc::clone(&controller);
        let submitter = Arc::clone(&submitter);
        tokio::spawn(async move {
            controller
                .add_selected_location(&chain(), submitter.as_ref())
                .await
        })
    };
    tokio::task::yield_now().await;
    assert_eq!(controller.submission(), SubmissionState::Pending(loc("LOC001")));

    let second = controller
        .add_selected_location(&chain(), submitter.as_ref())
        .await;
    assert_eq!(
        second,
        Err(TransitionError::SubmissionInFlight(loc("LOC001")))
    );
    assert_eq!(submitter.calls(), 1);
    assert_eq!(controller.submission(), SubmissionState::Pending(loc("LOC001")));

    release.send(true).expect("release");
    let settled = first.await.expect("join").expect("add");
    assert_eq!(settled, SubmissionState::Succeeded(loc("LOC001")));
}

#[tokio::test]
async fn broken_submitter_settles_as_failure() {
    let controller = SelectionController::new(Notifier::new());
    let mut notices = controller.notifier().subscribe();
    controller.select(loc("LOC005")).expect("select");

    let settled = controller
        .add_selected_location(&ChainId::new("GFM888"), &BrokenSubmitter)
        .await
        .expect("settles");

    assert_eq!(
        settled,
        SubmissionState::Failed {
            location_id: loc("LOC005"),
            reason: ADD_ERROR_MESSAGE.into()
        }
    );
    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.message, ADD_ERROR_MESSAGE);
    assert_eq!(notice.level, NotificationLevel::Error);
}

#[tokio::test]
async fn response_for_another_location_settles_as_failure() {
    let controller = SelectionController::new(Notifier::new());
    controller.select(loc("LOC001")).expect("select");

    let settled = controller
        .add_selected_location(&chain(), &WrongIdSubmitter)
        .await
        .expect("settles");

    assert!(matches!(
        settled,
        SubmissionState::Failed { ref location_id, .. } if location_id == &loc("LOC001")
    ));
    assert_eq!(controller.last_added(), None);
}

#[tokio::test(start_paused = true)]
async fn dropped_add_settles_as_failure_and_recovers() {
    let controller = SelectionController::new(Notifier::new());
    let mut notices = controller.notifier().subscribe();
    controller.select(loc("LOC001")).expect("select");
    let (_release, submitter) = GatedSubmitter::new();

    let timed_out = tokio::time::timeout(
        std::time::Duration::from_millis(10),
        controller.add_selected_location(&chain(), &submitter),
    )
    .await;
    assert!(timed_out.is_err());

    assert_eq!(
        controller.submission(),
        SubmissionState::Failed {
            location_id: loc("LOC001"),
            reason: ADD_ERROR_MESSAGE.into()
        }
    );
    assert!(!controller.is_any_being_added());
    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.level, NotificationLevel::Error);
    assert_eq!(notice.message, ADD_ERROR_MESSAGE);

    controller.reset().expect("reset");
    assert_eq!(controller.selected(), Some(loc("LOC001")));
    assert_eq!(controller.submit(), Ok(loc("LOC001")));
}

#[tokio::test]
async fn completed_add_does_not_settle_twice() {
    let controller = SelectionController::new(Notifier::new());
    let mut notices = controller.notifier().subscribe();
    controller.select(loc("LOC001")).expect("select");
    let (release, submitter) = GatedSubmitter::new();
    release.send(true).expect("release");

    let settled = controller
        .add_selected_location(&chain(), &submitter)
        .await
        .expect("add");

    assert_eq!(settled, SubmissionState::Succeeded(loc("LOC001")));
    let notice = notices.recv().await.expect("notice");
    assert_eq!(notice.level, NotificationLevel::Success);
    assert!(notices.try_recv().is_err());
}
