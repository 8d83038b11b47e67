//! Tauri command surface
//!
//! Thin IPC wrappers over state and services. Values cross to the webview
//! as camelCase JSON; failures cross as a serialized [`SurfaceError`] so
//! the frontend can show the message inline and offer a manual retry.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tauri::State;

use crate::calendar::feed;
use crate::calendar::navigation::{NavAction, NavigationState, ViewMode};
use crate::calendar::presentation::{display_for, EventDisplay};
use crate::devtools::{self, DemoSummary};
use crate::error::{FlowError, SurfaceError};
use crate::services;
use crate::services::templates::RenderedTemplate;
use crate::state::{self, AppState};
use crate::types::{
    CalendarEventPatch, Config, NewCalendarEvent, NewPerson, NewSalesTemplate, PendingSlot, Person,
    PersonPatch, SalesTemplate, SalesTemplatePatch, SelectionState, SessionContext,
};

/// Serialize an error for the webview, falling back to the bare message.
fn surface(err: FlowError) -> String {
    serde_json::to_string(&SurfaceError::from(&err)).unwrap_or_else(|_| err.to_string())
}

// =============================================================================
// Config & session
// =============================================================================

#[tauri::command]
pub fn get_config(state: State<'_, Arc<AppState>>) -> Result<Config, String> {
    Ok(state.config.read().clone())
}

#[tauri::command]
pub fn get_session(state: State<'_, Arc<AppState>>) -> Result<SessionContext, String> {
    Ok(state.session.clone())
}

#[tauri::command]
pub fn set_user_name(
    state: State<'_, Arc<AppState>>,
    user_name: Option<String>,
) -> Result<Config, String> {
    state::create_or_update_config(&state, |config| {
        config.user_name = user_name;
    })
    .map_err(surface)
}

// =============================================================================
// Calendar lifecycle
// =============================================================================

/// Mount the calendar view: initialize navigation (the viewport-width mode
/// decision happens only on the first call per mount) and start the event
/// feed if it is not already running.
#[tauri::command]
pub fn mount_calendar(
    app_handle: tauri::AppHandle,
    state: State<'_, Arc<AppState>>,
    viewport_width: f64,
) -> Result<NavigationState, String> {
    let nav = state.init_navigation(viewport_width, Utc::now().date_naive());

    let mut feed_guard = state.calendar_feed.lock();
    if feed_guard.is_none() {
        *feed_guard = Some(feed::start(Arc::clone(state.inner()), app_handle));
        log::info!("Calendar: feed started");
    }

    Ok(nav)
}

/// Tear the calendar view down: stop the feed (which unsubscribes) and
/// drop session-scoped view state.
#[tauri::command]
pub fn unmount_calendar(state: State<'_, Arc<AppState>>) -> Result<(), String> {
    if let Some(feed) = state.calendar_feed.lock().take() {
        feed.stop();
    }
    state.reset_calendar_view();
    Ok(())
}

/// Re-run the one-shot project fetch. Returns the deadline count.
#[tauri::command]
pub async fn refresh_project_deadlines(state: State<'_, Arc<AppState>>) -> Result<usize, String> {
    feed::refresh_project_deadlines(&state, state.backend.as_ref())
        .await
        .map_err(surface)
}

// =============================================================================
// Calendar read & navigation
// =============================================================================

#[tauri::command]
pub fn get_calendar_events(state: State<'_, Arc<AppState>>) -> Result<Vec<EventDisplay>, String> {
    Ok(state
        .events
        .current_events()
        .iter()
        .map(display_for)
        .collect())
}

#[tauri::command]
pub fn get_calendar_view(state: State<'_, Arc<AppState>>) -> Result<NavigationState, String> {
    state.navigation().map_err(surface)
}

#[tauri::command]
pub fn navigate_calendar(
    state: State<'_, Arc<AppState>>,
    action: NavAction,
) -> Result<NavigationState, String> {
    state
        .navigate(action, Utc::now().date_naive())
        .map_err(surface)
}

#[tauri::command]
pub fn set_calendar_view(
    state: State<'_, Arc<AppState>>,
    mode: ViewMode,
) -> Result<NavigationState, String> {
    state.set_view_mode(mode).map_err(surface)
}

// =============================================================================
// Calendar selection
// =============================================================================

#[tauri::command]
pub fn get_calendar_selection(state: State<'_, Arc<AppState>>) -> Result<SelectionState, String> {
    Ok(state.selection())
}

/// The "view" control on a rendered event. Opens the detail drawer and
/// never the create flow: the widget swallows the click before the slot
/// handler sees it, and this command enforces the same rule in state.
#[tauri::command]
pub fn select_calendar_event(
    state: State<'_, Arc<AppState>>,
    event_id: String,
) -> Result<SelectionState, String> {
    let event = state
        .events
        .find(&event_id)
        .ok_or_else(|| surface(FlowError::NotFound(event_id.clone())))?;
    Ok(state.select_event(event))
}

/// An empty-slot click: stash the pending range and open the create flow.
#[tauri::command]
pub fn select_calendar_slot(
    state: State<'_, Arc<AppState>>,
    slot: PendingSlot,
) -> Result<SelectionState, String> {
    if slot.start > slot.end {
        return Err(surface(FlowError::InvalidInput(
            "slot start must not be after its end".to_string(),
        )));
    }
    Ok(state.select_slot(slot))
}

#[tauri::command]
pub fn clear_calendar_selection(state: State<'_, Arc<AppState>>) -> Result<SelectionState, String> {
    Ok(state.clear_selection())
}

// =============================================================================
// Calendar writes
// =============================================================================

#[tauri::command]
pub async fn create_calendar_event(
    state: State<'_, Arc<AppState>>,
    input: NewCalendarEvent,
) -> Result<String, String> {
    services::calendar::create_event(&state, input)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn update_calendar_event(
    state: State<'_, Arc<AppState>>,
    event_id: String,
    patch: CalendarEventPatch,
) -> Result<(), String> {
    services::calendar::update_event(&state, &event_id, patch)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn delete_calendar_event(
    state: State<'_, Arc<AppState>>,
    event_id: String,
) -> Result<(), String> {
    services::calendar::delete_event(&state, &event_id)
        .await
        .map_err(surface)
}

// =============================================================================
// Team directory
// =============================================================================

#[tauri::command]
pub async fn get_people(state: State<'_, Arc<AppState>>) -> Result<Vec<Person>, String> {
    services::people::list_people(&state).await.map_err(surface)
}

#[tauri::command]
pub async fn search_people(
    state: State<'_, Arc<AppState>>,
    query: String,
) -> Result<Vec<Person>, String> {
    services::people::search_people(&state, &query)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn create_person(
    state: State<'_, Arc<AppState>>,
    input: NewPerson,
) -> Result<String, String> {
    services::people::create_person(&state, input)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn update_person(
    state: State<'_, Arc<AppState>>,
    person_id: String,
    patch: PersonPatch,
) -> Result<(), String> {
    services::people::update_person(&state, &person_id, patch)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn delete_person(
    state: State<'_, Arc<AppState>>,
    person_id: String,
) -> Result<(), String> {
    services::people::delete_person(&state, &person_id)
        .await
        .map_err(surface)
}

// =============================================================================
// Sales templates
// =============================================================================

#[tauri::command]
pub async fn get_sales_templates(
    state: State<'_, Arc<AppState>>,
) -> Result<Vec<SalesTemplate>, String> {
    services::templates::list_templates(&state)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn get_sales_templates_by_category(
    state: State<'_, Arc<AppState>>,
    category: String,
) -> Result<Vec<SalesTemplate>, String> {
    services::templates::list_templates_by_category(&state, &category)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn create_sales_template(
    state: State<'_, Arc<AppState>>,
    input: NewSalesTemplate,
) -> Result<String, String> {
    services::templates::create_template(&state, input)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn update_sales_template(
    state: State<'_, Arc<AppState>>,
    template_id: String,
    patch: SalesTemplatePatch,
) -> Result<(), String> {
    services::templates::update_template(&state, &template_id, patch)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn delete_sales_template(
    state: State<'_, Arc<AppState>>,
    template_id: String,
) -> Result<(), String> {
    services::templates::delete_template(&state, &template_id)
        .await
        .map_err(surface)
}

#[tauri::command]
pub async fn render_sales_template(
    state: State<'_, Arc<AppState>>,
    template_id: String,
    substitutions: HashMap<String, String>,
) -> Result<RenderedTemplate, String> {
    let templates = services::templates::list_templates(&state)
        .await
        .map_err(surface)?;
    let template = templates
        .iter()
        .find(|t| t.id == template_id)
        .ok_or_else(|| surface(FlowError::NotFound(template_id.clone())))?;
    Ok(services::templates::render_template(template, &substitutions))
}

// =============================================================================
// Onboarding
// =============================================================================

#[tauri::command]
pub async fn install_demo_data(state: State<'_, Arc<AppState>>) -> Result<DemoSummary, String> {
    devtools::install_demo_data(&state).await.map_err(surface)
}
