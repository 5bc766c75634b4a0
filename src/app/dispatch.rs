//! Sends [`PendingAction`]s to the backend and routes responses back to the UI loop.
//!
//! Each action runs as its own task on the tokio runtime. Nothing is cancelled
//! or de-duplicated here; ordering of roster responses is handled by the
//! sequence number checked in [`AppState::apply_event`](super::AppState::apply_event).

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use super::{ApiResult, PendingAction};
use crate::api::AdminApi;
use crate::model::{Course, UserPage};

/// Backend responses, one variant per request kind.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiEvent {
    RosterLoaded { seq: u64, result: ApiResult<UserPage> },
    CatalogLoaded(ApiResult<Vec<Course>>),
    UserCreated(ApiResult<Option<String>>),
    UserEnrolled(ApiResult<Option<String>>),
    EnrollmentRemoved(ApiResult<()>),
}

pub struct Dispatcher {
    api: Arc<dyn AdminApi>,
    runtime: Handle,
    events: UnboundedSender<ApiEvent>,
}

impl Dispatcher {
    /// Create a dispatcher and the receiver the UI loop drains.
    pub fn new(api: Arc<dyn AdminApi>, runtime: Handle) -> (Self, UnboundedReceiver<ApiEvent>) {
        let (events, rx) = unbounded_channel();
        (Self { api, runtime, events }, rx)
    }

    pub fn dispatch(&self, action: PendingAction) {
        tracing::debug!(?action, "dispatching");
        let api = Arc::clone(&self.api);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let event = perform(api.as_ref(), action).await;
            if events.send(event).is_err() {
                tracing::debug!("console closed before response arrived");
            }
        });
    }

    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = PendingAction>) {
        for action in actions {
            self.dispatch(action);
        }
    }
}

/// Execute one action against the API and wrap the outcome as an event.
pub async fn perform(api: &dyn AdminApi, action: PendingAction) -> ApiEvent {
    match action {
        PendingAction::LoadRoster { seq, query } => ApiEvent::RosterLoaded {
            seq,
            result: api.list_users(&query).await,
        },
        PendingAction::LoadCatalog => ApiEvent::CatalogLoaded(api.list_courses().await),
        PendingAction::CreateUser { draft } => ApiEvent::UserCreated(api.create_user(&draft).await),
        PendingAction::EnrollUser { request } => {
            ApiEvent::UserEnrolled(api.enroll_user(&request).await)
        }
        PendingAction::RemoveEnrollment { user_id, course_id } => {
            ApiEvent::EnrollmentRemoved(api.remove_enrollment(&user_id, &course_id).await)
        }
    }
}
