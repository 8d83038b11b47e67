// Calendar service — the event write path.
// Only user-event documents are writable; project-deadline entries are
// derived and rejected locally before any backend call. Write failures
// surface to the caller as-is: no automatic retry, the user retries.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::db::{DocQuery, CALENDAR_EVENTS};
use crate::error::FlowError;
use crate::state::AppState;
use crate::types::{CalendarEventPatch, EventOrigin, NewCalendarEvent};

/// Create a user calendar event. Returns the new document id.
pub async fn create_event(state: &AppState, input: NewCalendarEvent) -> Result<String, FlowError> {
    if input.title.trim().is_empty() {
        return Err(FlowError::InvalidInput("event title is required".to_string()));
    }
    if input.start > input.end {
        return Err(FlowError::InvalidInput(
            "event start must not be after its end".to_string(),
        ));
    }

    let query = DocQuery::scoped(CALENDAR_EVENTS, &state.session);
    let doc = json!({
        "title": input.title.trim(),
        "type": input.event_type,
        "start": input.start.timestamp_millis(),
        "end": input.end.timestamp_millis(),
        "allDay": input.all_day,
        "location": input.location,
        "description": input.description,
        "projectName": input.project_name,
        "updatedAt": Utc::now().timestamp_millis(),
    });

    let id = state.backend.insert(&query, doc).await?;
    log::info!("Calendar: created event {}", id);
    Ok(id)
}

/// Apply a partial update to a user calendar event.
pub async fn update_event(
    state: &AppState,
    event_id: &str,
    patch: CalendarEventPatch,
) -> Result<(), FlowError> {
    ensure_writable(state, event_id)?;

    if let (Some(start), Some(end)) = (patch.start, patch.end) {
        if start > end {
            return Err(FlowError::InvalidInput(
                "event start must not be after its end".to_string(),
            ));
        }
    }

    let mut fields = Map::new();
    if let Some(title) = patch.title {
        fields.insert("title".to_string(), Value::String(title));
    }
    if let Some(event_type) = patch.event_type {
        fields.insert("type".to_string(), Value::String(event_type));
    }
    if let Some(start) = patch.start {
        fields.insert("start".to_string(), json!(start.timestamp_millis()));
    }
    if let Some(end) = patch.end {
        fields.insert("end".to_string(), json!(end.timestamp_millis()));
    }
    if let Some(all_day) = patch.all_day {
        fields.insert("allDay".to_string(), Value::Bool(all_day));
    }
    if let Some(location) = patch.location {
        fields.insert("location".to_string(), Value::String(location));
    }
    if let Some(description) = patch.description {
        fields.insert("description".to_string(), Value::String(description));
    }
    if let Some(project_name) = patch.project_name {
        fields.insert("projectName".to_string(), Value::String(project_name));
    }
    if fields.is_empty() {
        return Ok(());
    }
    fields.insert("updatedAt".to_string(), json!(Utc::now().timestamp_millis()));

    let query = DocQuery::scoped(CALENDAR_EVENTS, &state.session);
    state
        .backend
        .update(&query, event_id, Value::Object(fields))
        .await?;
    log::info!("Calendar: updated event {}", event_id);
    Ok(())
}

/// Delete a user calendar event.
pub async fn delete_event(state: &AppState, event_id: &str) -> Result<(), FlowError> {
    ensure_writable(state, event_id)?;

    let query = DocQuery::scoped(CALENDAR_EVENTS, &state.session);
    state.backend.delete(&query, event_id).await?;
    log::info!("Calendar: deleted event {}", event_id);
    Ok(())
}

/// Project-deadline entries exist only in the merged store; the underlying
/// project is edited elsewhere.
fn ensure_writable(state: &AppState, event_id: &str) -> Result<(), FlowError> {
    if state.events.origin_of(event_id) == Some(EventOrigin::ProjectDeadline) {
        return Err(FlowError::ReadOnly(event_id.to_string()));
    }
    Ok(())
}
