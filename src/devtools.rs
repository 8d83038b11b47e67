//! Demo fixtures for first-run and demo mode.
//!
//! Seeds a small, realistic workspace through the document backend so the
//! live-query path is exercised exactly as real data would. Guarded by the
//! `demoData` config flag so it can never run against a real company.

use chrono::{Duration, Utc};
use serde_json::json;

use crate::db::{DocQuery, CALENDAR_EVENTS, PEOPLE, PROJECTS, SALES_TEMPLATES};
use crate::error::FlowError;
use crate::state::AppState;

/// Counts of seeded records, shown on the onboarding screen.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSummary {
    pub events: usize,
    pub projects: usize,
    pub people: usize,
    pub templates: usize,
}

/// Install the demo workspace.
pub async fn install_demo_data(state: &AppState) -> Result<DemoSummary, FlowError> {
    if !state.config.read().demo_data {
        return Err(FlowError::InvalidInput(
            "demo data is disabled for this workspace".to_string(),
        ));
    }

    let now = Utc::now();
    let today_ten = now
        .date_naive()
        .and_hms_opt(10, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now);

    let events = vec![
        json!({
            "title": "Acme pipeline review",
            "type": "meeting",
            "start": today_ten.timestamp_millis(),
            "end": (today_ten + Duration::hours(1)).timestamp_millis(),
            "location": "Zoom",
            "updatedAt": now.timestamp_millis(),
        }),
        json!({
            "title": "Send Globex proposal",
            "type": "task",
            "start": (today_ten + Duration::days(1)).timestamp_millis(),
            "end": (today_ten + Duration::days(1)).timestamp_millis(),
            "updatedAt": now.timestamp_millis(),
        }),
        json!({
            "title": "Q3 launch ready",
            "type": "milestone",
            "start": (today_ten + Duration::days(3)).timestamp_millis(),
            "end": (today_ten + Duration::days(3)).timestamp_millis(),
            "allDay": true,
            "updatedAt": now.timestamp_millis(),
        }),
    ];

    let projects = vec![
        json!({
            "id": "proj-website-refresh",
            "name": "Website Refresh",
            "endDate": (now.date_naive() + Duration::days(7)).format("%Y-%m-%d").to_string(),
        }),
        // No endDate on purpose: exploratory work, never shows on the calendar
        json!({
            "id": "proj-brand-exploration",
            "name": "Brand Exploration",
        }),
    ];

    let people = vec![
        json!({
            "id": "sarah-chen-acme-com",
            "name": "Sarah Chen",
            "role": "Account Executive",
            "email": "sarah.chen@acme.com",
            "avatarColor": "#8b5cf6",
        }),
        json!({
            "id": "marcus-reed-acme-com",
            "name": "Marcus Reed",
            "role": "Operations",
            "email": "marcus.reed@acme.com",
            "avatarColor": "#10b981",
        }),
        json!({
            "id": "priya-patel-acme-com",
            "name": "Priya Patel",
            "role": "Founder",
            "email": "priya.patel@acme.com",
            "avatarColor": "#f59e0b",
        }),
    ];

    let templates = vec![
        json!({
            "id": "cold-intro",
            "name": "Cold Intro",
            "category": "outreach",
            "subject": "Quick question, {{firstName}}",
            "body": "Hi {{firstName}},\n\nSaw {{company}} is growing — would a 15-minute chat make sense this week?",
        }),
        json!({
            "id": "renewal-nudge",
            "name": "Renewal Nudge",
            "category": "follow-up",
            "subject": "{{company}} renewal coming up",
            "body": "Hi {{firstName}},\n\nYour plan renews on {{renewalDate}}. Anything you'd like to adjust first?",
        }),
    ];

    let backend = state.backend.as_ref();
    let summary = DemoSummary {
        events: events.len(),
        projects: projects.len(),
        people: people.len(),
        templates: templates.len(),
    };

    for doc in events {
        backend
            .insert(&DocQuery::scoped(CALENDAR_EVENTS, &state.session), doc)
            .await?;
    }
    for doc in projects {
        backend
            .insert(&DocQuery::scoped(PROJECTS, &state.session), doc)
            .await?;
    }
    for doc in people {
        backend
            .insert(&DocQuery::scoped(PEOPLE, &state.session), doc)
            .await?;
    }
    for doc in templates {
        backend
            .insert(&DocQuery::scoped(SALES_TEMPLATES, &state.session), doc)
            .await?;
    }

    log::info!(
        "Demo: seeded {} events, {} projects, {} people, {} templates",
        summary.events,
        summary.projects,
        summary.people,
        summary.templates
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::feed::{apply_event_snapshot, refresh_project_deadlines};
    use crate::db::{DocumentBackend, MemoryBackend};
    use crate::types::{Config, SessionContext};
    use std::sync::Arc;

    fn make_state(demo_data: bool) -> (Arc<MemoryBackend>, AppState) {
        let backend = Arc::new(MemoryBackend::new());
        let config = Config {
            demo_data,
            ..Config::default()
        };
        let session = SessionContext::from_config(&config);
        let state = AppState::new(session, config, Arc::clone(&backend) as Arc<dyn DocumentBackend>);
        (backend, state)
    }

    #[tokio::test]
    async fn test_demo_data_feeds_the_calendar() {
        let (backend, state) = make_state(true);
        let summary = install_demo_data(&state).await.unwrap();
        assert_eq!(summary.events, 3);
        assert_eq!(summary.projects, 2);

        let events_query = DocQuery::scoped(CALENDAR_EVENTS, &state.session);
        let snapshot = backend.fetch_once(&events_query).await.unwrap();
        apply_event_snapshot(&state, &snapshot);
        refresh_project_deadlines(&state, backend.as_ref())
            .await
            .unwrap();

        // 3 user events + 1 deadline (the dated project only)
        assert_eq!(state.events.len(), 4);
    }

    #[tokio::test]
    async fn test_demo_data_respects_guard() {
        let (_backend, state) = make_state(false);
        let err = install_demo_data(&state).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidInput(_)));
    }
}
