//! Render hints for the generic calendar widget
//!
//! Pure mapping from an event to the style and affordances the widget
//! needs. No state, no side effects: the widget passes data in and routes
//! user interaction back out through commands.

use serde::Serialize;

use crate::types::Event;

/// Accessor keys the widget uses to read event boundaries.
pub const EVENT_START_FIELD: &str = "start";
pub const EVENT_END_FIELD: &str = "end";

/// Fixed visual treatment for one rendered event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStyle {
    pub background_color: &'static str,
    pub text_color: &'static str,
    pub border_radius: &'static str,
    pub opacity: f32,
    pub font_size: &'static str,
}

/// Map an event type to its render style.
///
/// Total over the open type string: unrecognized values take the default
/// branch, never an error.
pub fn style_for(event_type: &str) -> EventStyle {
    let background_color = match event_type {
        "meeting" => "#8b5cf6",   // purple
        "deadline" => "#ef4444",  // red
        "milestone" => "#f59e0b", // amber
        "reminder" => "#10b981",  // emerald
        "task" => "#3b82f6",      // blue
        _ => "#6b7280",           // gray
    };

    EventStyle {
        background_color,
        text_color: "#ffffff",
        border_radius: "6px",
        opacity: 0.9,
        font_size: "0.75rem",
    }
}

/// The secondary "view" click target on each rendered event.
///
/// `stop_propagation` tells the widget to swallow the click before it
/// reaches the underlying slot-selection handler: opening the detail view
/// must never simultaneously start the create-at-slot flow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewAffordance {
    pub label: &'static str,
    pub stop_propagation: bool,
}

impl Default for ViewAffordance {
    fn default() -> Self {
        Self {
            label: "View",
            stop_propagation: true,
        }
    }
}

/// One event plus everything the widget needs to render it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDisplay {
    pub event: Event,
    pub style: EventStyle,
    pub view: ViewAffordance,
}

pub fn display_for(event: &Event) -> EventDisplay {
    EventDisplay {
        style: style_for(&event.event_type),
        view: ViewAffordance::default(),
        event: event.clone(),
    }
}
