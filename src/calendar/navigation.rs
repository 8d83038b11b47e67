//! Calendar view navigation
//!
//! The view mode and focal date form a small long-lived state machine.
//! The transition function is pure (action, mode, focal date, and today go
//! in, the new focal date comes out) so it is unit-testable without
//! mounting any UI. A thin stateful wrapper holds the current pair.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Viewport width below which the first mount opens in day view.
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Month,
    Week,
    Day,
    Agenda,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Month => "month",
            ViewMode::Week => "week",
            ViewMode::Day => "day",
            ViewMode::Agenda => "agenda",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NavAction {
    Prev,
    Next,
    Today,
}

/// Pick the initial view mode from the viewport width at first mount.
///
/// One-time decision: later resizes never force a mode change, so a manual
/// override sticks.
pub fn initial_view_mode(viewport_width: f64) -> ViewMode {
    if viewport_width < MOBILE_BREAKPOINT_PX {
        ViewMode::Day
    } else {
        ViewMode::Month
    }
}

/// Compute the focal date after a navigation action.
///
/// TODAY returns `today` regardless of mode. PREV/NEXT step by the current
/// mode's granularity; agenda has no fixed-length period and pages by
/// month, same as month view.
pub fn navigate(action: NavAction, mode: ViewMode, focal: NaiveDate, today: NaiveDate) -> NaiveDate {
    match action {
        NavAction::Today => today,
        NavAction::Prev => step_back(mode, focal),
        NavAction::Next => step_forward(mode, focal),
    }
}

fn step_forward(mode: ViewMode, focal: NaiveDate) -> NaiveDate {
    let next = match mode {
        ViewMode::Month | ViewMode::Agenda => focal.checked_add_months(Months::new(1)),
        ViewMode::Week => focal.checked_add_days(Days::new(7)),
        ViewMode::Day => focal.checked_add_days(Days::new(1)),
    };
    next.unwrap_or(focal)
}

fn step_back(mode: ViewMode, focal: NaiveDate) -> NaiveDate {
    let prev = match mode {
        ViewMode::Month | ViewMode::Agenda => focal.checked_sub_months(Months::new(1)),
        ViewMode::Week => focal.checked_sub_days(Days::new(7)),
        ViewMode::Day => focal.checked_sub_days(Days::new(1)),
    };
    prev.unwrap_or(focal)
}

/// Current `(viewMode, focalDate)` pair. Session-scoped only: never
/// persisted, reset on reload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationState {
    pub view_mode: ViewMode,
    pub focal_date: NaiveDate,
}

impl NavigationState {
    /// State for a fresh mount: today, mode picked by viewport width.
    pub fn at_mount(viewport_width: f64, today: NaiveDate) -> Self {
        Self {
            view_mode: initial_view_mode(viewport_width),
            focal_date: today,
        }
    }

    /// Explicit view-mode selection. Focal date is unchanged.
    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    pub fn apply(&mut self, action: NavAction, today: NaiveDate) {
        self.focal_date = navigate(action, self.view_mode, self.focal_date, today);
    }
}
