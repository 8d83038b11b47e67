use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use parking_lot::{Mutex, RwLock};

use crate::calendar::feed::CalendarFeed;
use crate::calendar::merge::EventStore;
use crate::calendar::navigation::{NavAction, NavigationState, ViewMode};
use crate::db::DocumentBackend;
use crate::error::FlowError;
use crate::types::{Config, Event, PendingSlot, Selection, SelectionState, SessionContext};

/// Application state managed by Tauri.
///
/// The session context is resolved by the external auth layer and injected
/// at construction, never looked up ambiently, so every piece of this state
/// is constructible in tests.
pub struct AppState {
    pub session: SessionContext,
    pub config: RwLock<Config>,
    pub backend: Arc<dyn DocumentBackend>,
    /// Unified calendar event set (user events + project deadlines).
    pub events: EventStore,
    /// `None` until the calendar view mounts; cleared again on unmount.
    navigation: Mutex<Option<NavigationState>>,
    selection: Mutex<SelectionState>,
    pub calendar_feed: Mutex<Option<CalendarFeed>>,
}

impl AppState {
    pub fn new(session: SessionContext, config: Config, backend: Arc<dyn DocumentBackend>) -> Self {
        Self {
            session,
            config: RwLock::new(config),
            backend,
            events: EventStore::new(),
            navigation: Mutex::new(None),
            selection: Mutex::new(SelectionState::default()),
            calendar_feed: Mutex::new(None),
        }
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Initialize navigation at calendar mount. The viewport-width decision
    /// happens exactly once per mount; repeated calls (resize re-renders)
    /// keep whatever mode is already active.
    pub fn init_navigation(&self, viewport_width: f64, today: NaiveDate) -> NavigationState {
        let mut guard = self.navigation.lock();
        *guard.get_or_insert_with(|| NavigationState::at_mount(viewport_width, today))
    }

    pub fn navigation(&self) -> Result<NavigationState, FlowError> {
        (*self.navigation.lock())
            .ok_or_else(|| FlowError::InvalidInput("calendar view is not mounted".to_string()))
    }

    pub fn navigate(&self, action: NavAction, today: NaiveDate) -> Result<NavigationState, FlowError> {
        let mut guard = self.navigation.lock();
        let nav = guard
            .as_mut()
            .ok_or_else(|| FlowError::InvalidInput("calendar view is not mounted".to_string()))?;
        nav.apply(action, today);
        Ok(*nav)
    }

    pub fn set_view_mode(&self, mode: ViewMode) -> Result<NavigationState, FlowError> {
        let mut guard = self.navigation.lock();
        let nav = guard
            .as_mut()
            .ok_or_else(|| FlowError::InvalidInput("calendar view is not mounted".to_string()))?;
        nav.set_view_mode(mode);
        Ok(*nav)
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Open the detail view for an event. Never opens the create flow:
    /// activating an event's "view" control must not also start
    /// create-at-slot.
    pub fn select_event(&self, event: Event) -> SelectionState {
        let mut guard = self.selection.lock();
        *guard = SelectionState {
            selection: Some(Selection::Event { event }),
            is_detail_open: true,
            is_create_open: false,
        };
        guard.clone()
    }

    /// Seed the create flow from an empty slot the user picked.
    pub fn select_slot(&self, slot: PendingSlot) -> SelectionState {
        let mut guard = self.selection.lock();
        *guard = SelectionState {
            selection: Some(Selection::Slot { slot }),
            is_detail_open: false,
            is_create_open: true,
        };
        guard.clone()
    }

    pub fn clear_selection(&self) -> SelectionState {
        let mut guard = self.selection.lock();
        *guard = SelectionState::default();
        guard.clone()
    }

    pub fn selection(&self) -> SelectionState {
        self.selection.lock().clone()
    }

    /// Component teardown: navigation and selection are session-scoped view
    /// state, reset on the next mount.
    pub fn reset_calendar_view(&self) {
        *self.navigation.lock() = None;
        *self.selection.lock() = SelectionState::default();
    }
}

// =============================================================================
// Configuration (~/.flow/config.json)
// =============================================================================

/// Get the canonical config file path (~/.flow/config.json)
pub fn config_path() -> Result<PathBuf, FlowError> {
    let home = dirs::home_dir()
        .ok_or_else(|| FlowError::Configuration("Could not find home directory".to_string()))?;
    Ok(home.join(".flow").join("config.json"))
}

/// Load configuration from disk. A missing file yields defaults (first run).
pub fn load_config() -> Result<Config, FlowError> {
    let path = config_path()?;
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| FlowError::Configuration(format!("Failed to read config: {}", e)))?;
    serde_json::from_str(&content)
        .map_err(|e| FlowError::Configuration(format!("Failed to parse config: {}", e)))
}

/// Update config in memory and on disk atomically from the caller's view.
///
/// Clones the current config, applies the mutator, writes to disk, then
/// swaps the in-memory copy.
pub fn create_or_update_config(
    state: &AppState,
    mutator: impl FnOnce(&mut Config),
) -> Result<Config, FlowError> {
    let mut guard = state.config.write();
    let mut config = guard.clone();
    mutator(&mut config);

    let path = config_path()?;
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)
                .map_err(|e| FlowError::Configuration(format!("Failed to create config dir: {}", e)))?;
        }
    }

    let content = serde_json::to_string_pretty(&config)?;
    fs::write(&path, content)
        .map_err(|e| FlowError::Configuration(format!("Failed to write config: {}", e)))?;

    *guard = config.clone();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use chrono::{TimeZone, Utc};

    fn make_state() -> AppState {
        let config = Config::default();
        let session = SessionContext::from_config(&config);
        AppState::new(session, config, Arc::new(MemoryBackend::new()))
    }

    fn make_event(id: &str) -> Event {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        Event {
            id: id.to_string(),
            title: "Test".to_string(),
            start,
            end: start,
            event_type: "meeting".to_string(),
            all_day: false,
            origin: crate::types::EventOrigin::UserEvent,
            location: None,
            description: None,
            project_name: None,
            project_id: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 15).unwrap()
    }

    #[test]
    fn test_navigation_requires_mount() {
        let state = make_state();
        assert!(state.navigation().is_err());
        assert!(state.navigate(NavAction::Next, today()).is_err());

        state.init_navigation(1280.0, today());
        assert!(state.navigation().is_ok());
    }

    #[test]
    fn test_viewport_decision_is_one_time() {
        let state = make_state();
        let first = state.init_navigation(375.0, today());
        assert_eq!(first.view_mode, ViewMode::Day);

        // A wider re-init (resize re-render) must not override the mode
        let second = state.init_navigation(1920.0, today());
        assert_eq!(second.view_mode, ViewMode::Day);
    }

    #[test]
    fn test_remount_after_reset_redecides_mode() {
        let state = make_state();
        state.init_navigation(375.0, today());
        state.reset_calendar_view();
        let nav = state.init_navigation(1920.0, today());
        assert_eq!(nav.view_mode, ViewMode::Month);
    }

    #[test]
    fn test_selecting_event_never_opens_create_flow() {
        let state = make_state();
        // User picked an empty slot first, create drawer open
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        state.select_slot(PendingSlot { start, end: start });
        assert!(state.selection().is_create_open);

        // Clicking "view" on an event replaces the selection wholesale
        let after = state.select_event(make_event("e1"));
        assert!(after.is_detail_open);
        assert!(!after.is_create_open);
        assert!(matches!(after.selection, Some(Selection::Event { .. })));
    }

    #[test]
    fn test_slot_selection_opens_create_only() {
        let state = make_state();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let after = state.select_slot(PendingSlot { start, end: start });
        assert!(after.is_create_open);
        assert!(!after.is_detail_open);
        assert!(matches!(after.selection, Some(Selection::Slot { .. })));
    }

    #[test]
    fn test_clear_selection() {
        let state = make_state();
        state.select_event(make_event("e1"));
        let cleared = state.clear_selection();
        assert!(cleared.selection.is_none());
        assert!(!cleared.is_detail_open);
        assert!(!cleared.is_create_open);
    }
}
