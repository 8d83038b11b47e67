//! Event source normalization
//!
//! Two upstream record shapes feed the calendar: user-created event
//! documents and project documents carrying an end date. Both are
//! normalized here into the canonical [`Event`]. A record that fails to
//! parse contributes nothing and never aborts its siblings.

use serde_json::Value;

use crate::types::{Event, EventOrigin, EVENT_TYPE_DEADLINE, EVENT_TYPE_MEETING};
use crate::util::{doc_str, parse_doc_date, parse_doc_timestamp};

/// Deterministic id for a project's deadline pseudo-event, so repeated
/// derivation replaces rather than appends.
pub fn deadline_event_id(project_id: &str) -> String {
    format!("deadline-{}", project_id)
}

/// Normalize a snapshot of user-event documents.
pub fn events_from_docs(docs: &[Value]) -> Vec<Event> {
    docs.iter().filter_map(event_from_doc).collect()
}

fn event_from_doc(doc: &Value) -> Option<Event> {
    let id = doc_str(doc, "id").or_else(|| doc_str(doc, "_id"))?;
    let title = doc_str(doc, "title")?;

    let start = doc.get("start").and_then(parse_doc_timestamp);
    let end = doc.get("end").and_then(parse_doc_timestamp);
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) if s <= e => (s, e),
        _ => {
            log::debug!("Calendar: dropping event {} with unusable timestamps", id);
            return None;
        }
    };

    Some(Event {
        id,
        title,
        start,
        end,
        event_type: doc_str(doc, "type").unwrap_or_else(|| EVENT_TYPE_MEETING.to_string()),
        all_day: doc.get("allDay").and_then(Value::as_bool).unwrap_or(false),
        origin: EventOrigin::UserEvent,
        location: doc_str(doc, "location"),
        description: doc_str(doc, "description"),
        project_name: doc_str(doc, "projectName"),
        project_id: None,
    })
}

/// Derive deadline pseudo-events from a snapshot of project documents.
///
/// Projects without a usable `endDate` are skipped. Derivation is
/// idempotent: the same project always yields the same event id.
pub fn deadlines_from_projects(docs: &[Value]) -> Vec<Event> {
    docs.iter().filter_map(deadline_from_project).collect()
}

fn deadline_from_project(doc: &Value) -> Option<Event> {
    let project_id = doc_str(doc, "id").or_else(|| doc_str(doc, "_id"))?;
    let name = doc_str(doc, "name")?;

    let due = match doc.get("endDate").and_then(parse_doc_date) {
        Some(due) => due,
        None => {
            log::debug!(
                "Calendar: project {} has no parsable endDate, skipping",
                project_id
            );
            return None;
        }
    };

    Some(Event {
        id: deadline_event_id(&project_id),
        title: format!("{} Deadline", name),
        start: due,
        end: due,
        event_type: EVENT_TYPE_DEADLINE.to_string(),
        all_day: true,
        origin: EventOrigin::ProjectDeadline,
        location: None,
        description: None,
        project_name: Some(name),
        project_id: Some(project_id),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_from_millis_timestamps() {
        let docs = vec![json!({
            "id": "e1",
            "companyId": "acme",
            "title": "Pipeline review",
            "type": "meeting",
            "start": 1714557600000i64,
            "end": 1714561200000i64,
            "location": "Room 2"
        })];
        let events = events_from_docs(&docs);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "e1");
        assert_eq!(event.origin, EventOrigin::UserEvent);
        assert_eq!(event.location.as_deref(), Some("Room 2"));
        assert!(event.start < event.end);
    }

    #[test]
    fn test_event_missing_type_defaults_to_meeting() {
        let docs = vec![json!({
            "id": "e1",
            "title": "Untyped",
            "start": "2024-05-01T10:00:00Z",
            "end": "2024-05-01T11:00:00Z"
        })];
        let events = events_from_docs(&docs);
        assert_eq!(events[0].event_type, "meeting");
    }

    #[test]
    fn test_bad_record_does_not_abort_siblings() {
        let docs = vec![
            json!({"id": "bad1", "title": "No times"}),
            json!({"id": "bad2", "title": "Inverted",
                   "start": "2024-05-01T11:00:00Z", "end": "2024-05-01T10:00:00Z"}),
            json!({"title": "No id", "start": 0, "end": 0}),
            json!({"id": "good", "title": "Fine",
                   "start": "2024-05-01T10:00:00Z", "end": "2024-05-01T11:00:00Z"}),
        ];
        let events = events_from_docs(&docs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "good");
    }

    #[test]
    fn test_deadline_from_date_only_string() {
        let docs = vec![json!({"id": "proj-1", "name": "Apollo", "endDate": "2024-05-01"})];
        let events = deadlines_from_projects(&docs);
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.id, "deadline-proj-1");
        assert_eq!(event.title, "Apollo Deadline");
        assert_eq!(event.event_type, "deadline");
        assert!(event.all_day);
        assert_eq!(event.start, event.end);
        assert_eq!(event.origin, EventOrigin::ProjectDeadline);
        assert_eq!(event.project_id.as_deref(), Some("proj-1"));
    }

    #[test]
    fn test_deadline_from_native_timestamp() {
        let docs = vec![json!({"id": "proj-2", "name": "Borealis", "endDate": 1714557600000i64})];
        let events = deadlines_from_projects(&docs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start.timestamp_millis(), 1714557600000);
    }

    #[test]
    fn test_projects_without_end_date_are_skipped() {
        let docs = vec![
            json!({"id": "p1", "name": "No date"}),
            json!({"id": "p2", "name": "Bad date", "endDate": "soonish"}),
            json!({"id": "p3", "name": "Null date", "endDate": null}),
            json!({"id": "p4", "name": "Dated", "endDate": "2024-06-15"}),
        ];
        let events = deadlines_from_projects(&docs);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "deadline-p4");
    }

    #[test]
    fn test_deadline_derivation_is_idempotent() {
        let doc = json!({"id": "proj-1", "name": "Apollo", "endDate": "2024-05-01"});
        let first = deadlines_from_projects(std::slice::from_ref(&doc));
        let second = deadlines_from_projects(std::slice::from_ref(&doc));
        assert_eq!(first, second);
        assert_eq!(first[0].id, second[0].id);
    }
}
