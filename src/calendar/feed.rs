//! Calendar feed lifecycle
//!
//! The calendar view is fed by a live subscription to the user-event
//! collection and a one-shot fetch of the projects collection. Each source
//! delivers full snapshots into its own partition of the event store, in
//! any interleaving. The feed task owns the subscription handle for exactly
//! its own lifetime, so stopping the task always unregisters it.

use std::sync::Arc;

use tauri::{AppHandle, Emitter};
use tokio::sync::mpsc;

use crate::calendar::source::{deadlines_from_projects, events_from_docs};
use crate::db::{DocQuery, DocumentBackend, Snapshot, CALENDAR_EVENTS, PROJECTS};
use crate::error::FlowError;
use crate::state::AppState;
use crate::types::EventOrigin;

/// Event name pushed to the webview after every applied snapshot.
pub const CALENDAR_UPDATED_EVENT: &str = "calendar-updated";

/// Snapshot delivery buffer. A full buffer drops the oldest pending
/// snapshot, which is safe: every snapshot fully supersedes its predecessor.
const SNAPSHOT_CHANNEL_SIZE: usize = 64;

/// Payload emitted to the frontend on calendar changes.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarUpdate {
    pub count: usize,
}

/// Handle for a running calendar feed. Stopping aborts the subscriber task,
/// which drops the subscription handle and unregisters it from the backend.
pub struct CalendarFeed {
    task: tauri::async_runtime::JoinHandle<()>,
}

impl CalendarFeed {
    pub fn stop(self) {
        self.task.abort();
        log::info!("Calendar: feed stopped");
    }
}

/// Apply a user-event snapshot to its partition. Returns the merged total.
pub fn apply_event_snapshot(state: &AppState, snapshot: &[serde_json::Value]) -> usize {
    let events = events_from_docs(snapshot);
    state
        .events
        .replace_partition(EventOrigin::UserEvent, events);
    state.events.len()
}

/// Re-derive the project-deadline partition from a one-shot fetch.
///
/// Deadlines are deliberately not live-subscribed: they refresh on mount
/// and on explicit request, and can go stale in between.
pub async fn refresh_project_deadlines(
    state: &AppState,
    backend: &dyn DocumentBackend,
) -> Result<usize, FlowError> {
    let query = DocQuery::scoped(PROJECTS, &state.session);
    let docs = backend.fetch_once(&query).await?;
    let deadlines = deadlines_from_projects(&docs);
    Ok(state
        .events
        .replace_partition(EventOrigin::ProjectDeadline, deadlines))
}

/// Start the calendar feed for a mounted view.
///
/// Subscribes to the user-event collection, loads project deadlines once,
/// and then applies every incoming snapshot, emitting `calendar-updated`
/// to the frontend after each.
pub fn start(state: Arc<AppState>, app_handle: AppHandle) -> CalendarFeed {
    let backend = Arc::clone(&state.backend);
    let (tx, mut rx) = mpsc::channel::<Snapshot>(SNAPSHOT_CHANNEL_SIZE);
    let query = DocQuery::scoped(CALENDAR_EVENTS, &state.session);
    let subscription = backend.subscribe(&query, tx);

    let task = tauri::async_runtime::spawn(async move {
        // Held for the task's lifetime; dropped (and therefore
        // unsubscribed) when the task ends or is aborted.
        let _subscription = subscription;

        match refresh_project_deadlines(&state, backend.as_ref()).await {
            Ok(count) => {
                log::info!("Calendar: loaded {} project deadlines", count);
                let _ = app_handle.emit(
                    CALENDAR_UPDATED_EVENT,
                    CalendarUpdate {
                        count: state.events.len(),
                    },
                );
            }
            Err(e) => log::warn!("Calendar: project deadline fetch failed: {}", e),
        }

        while let Some(snapshot) = rx.recv().await {
            let count = apply_event_snapshot(&state, &snapshot);
            log::debug!("Calendar: applied event snapshot, {} merged events", count);
            let _ = app_handle.emit(CALENDAR_UPDATED_EVENT, CalendarUpdate { count });
        }

        log::info!("Calendar: event subscription closed");
    });

    CalendarFeed { task }
}
