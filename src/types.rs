use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Configuration stored in ~/.flow/config.json
///
/// All fields carry serde defaults so older config files keep loading as
/// the schema grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Tenant/company the session is scoped to. The hosted auth layer
    /// normally supplies this; the default keeps first-run demo mode working.
    #[serde(default = "default_company_id")]
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// Allow demo fixtures to be installed into this company's data.
    #[serde(default = "default_demo_data")]
    pub demo_data: bool,
}

fn default_company_id() -> String {
    "local-demo".to_string()
}

fn default_demo_data() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            company_id: default_company_id(),
            user_name: None,
            demo_data: default_demo_data(),
        }
    }
}

/// Request-scoped session identity, resolved by the external auth layer.
///
/// Passed explicitly into constructors and services. Nothing in this crate
/// looks session state up ambiently, which keeps the calendar core
/// constructible in tests without any session simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub company_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl SessionContext {
    pub fn from_config(config: &Config) -> Self {
        Self {
            company_id: config.company_id.clone(),
            user_name: config.user_name.clone(),
        }
    }
}

// =============================================================================
// Calendar events
// =============================================================================

/// Provenance tag for a merged calendar entry.
///
/// `UserEvent` documents are mutable and deletable; `ProjectDeadline`
/// entries are derived from the projects collection and read-only here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventOrigin {
    #[serde(rename = "user-event")]
    UserEvent,
    #[serde(rename = "project-deadline")]
    ProjectDeadline,
}

impl EventOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventOrigin::UserEvent => "user-event",
            EventOrigin::ProjectDeadline => "project-deadline",
        }
    }
}

/// Well-known event type strings. The `type` field is an open set; anything
/// else still renders, with the default style.
pub const EVENT_TYPE_MEETING: &str = "meeting";
pub const EVENT_TYPE_DEADLINE: &str = "deadline";
pub const EVENT_TYPE_MILESTONE: &str = "milestone";
pub const EVENT_TYPE_REMINDER: &str = "reminder";
pub const EVENT_TYPE_TASK: &str = "task";

/// Canonical calendar entry, merged from user events and project deadlines.
///
/// `start <= end` always holds; `start == end` is how all-day/deadline
/// entries are represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique within the merged set. User events carry their source document
    /// id; deadlines carry a deterministic id derived from the project id.
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub all_day: bool,
    pub origin: EventOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// Back-reference to the source project (deadline entries only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

/// Input payload for creating a user calendar event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCalendarEvent {
    pub title: String,
    #[serde(rename = "type", default = "default_new_event_type")]
    pub event_type: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
}

fn default_new_event_type() -> String {
    EVENT_TYPE_MEETING.to_string()
}

/// Partial update for a user calendar event. Only `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEventPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: Option<bool>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
}

// =============================================================================
// Selection
// =============================================================================

/// A transient, user-picked empty calendar slot used to seed event creation.
///
/// Never persisted and never an `Event`. Downstream consumers must not
/// confuse the two, which is why the selection enum keeps them apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// What the user currently has selected on the calendar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Selection {
    Event { event: Event },
    Slot { slot: PendingSlot },
}

/// Detail/create drawer state driven by calendar selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Selection>,
    pub is_detail_open: bool,
    pub is_create_open: bool,
}

// =============================================================================
// Team directory
// =============================================================================

/// Team directory entry (`people` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: String,
    pub company_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_color: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_color: Option<String>,
}

// =============================================================================
// Sales templates
// =============================================================================

/// CRM outreach template (`salesTemplates` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTemplate {
    pub id: String,
    pub company_id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub subject: String,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSalesTemplate {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesTemplatePatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_wire_names() {
        let event = Event {
            id: "e1".to_string(),
            title: "Standup".to_string(),
            start: Utc::now(),
            end: Utc::now(),
            event_type: EVENT_TYPE_MEETING.to_string(),
            all_day: false,
            origin: EventOrigin::UserEvent,
            location: None,
            description: None,
            project_name: None,
            project_id: None,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "meeting");
        assert_eq!(json["origin"], "user-event");
        assert_eq!(json["allDay"], false);
        // Absent optionals stay off the wire entirely
        assert!(json.get("location").is_none());
    }

    #[test]
    fn test_config_defaults_survive_sparse_json() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.company_id, "local-demo");
        assert!(config.demo_data);
        assert!(config.user_name.is_none());
    }

    #[test]
    fn test_selection_keeps_slot_and_event_apart() {
        let slot = PendingSlot {
            start: Utc::now(),
            end: Utc::now(),
        };
        let json = serde_json::to_value(Selection::Slot { slot }).unwrap();
        assert_eq!(json["kind"], "slot");
    }
}
