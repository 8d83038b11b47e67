// People service — team directory CRUD and search.
// Directory entries live in the `people` collection, company-scoped.

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::db::{DocQuery, PEOPLE};
use crate::error::FlowError;
use crate::state::AppState;
use crate::types::{NewPerson, Person, PersonPatch};
use crate::util::slugify;

fn people_query(state: &AppState) -> DocQuery {
    DocQuery::scoped(PEOPLE, &state.session)
}

fn person_from_doc(doc: &Value) -> Option<Person> {
    match serde_json::from_value(doc.clone()) {
        Ok(person) => Some(person),
        Err(e) => {
            log::debug!("People: dropping malformed person record: {}", e);
            None
        }
    }
}

/// List the full team directory.
pub async fn list_people(state: &AppState) -> Result<Vec<Person>, FlowError> {
    let docs = state.backend.fetch_once(&people_query(state)).await?;
    let mut people: Vec<Person> = docs.iter().filter_map(person_from_doc).collect();
    people.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(people)
}

/// Case-insensitive directory search over name, role, and email.
pub async fn search_people(state: &AppState, query: &str) -> Result<Vec<Person>, FlowError> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return list_people(state).await;
    }

    let people = list_people(state).await?;
    Ok(people
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&needle)
                || p.role
                    .as_deref()
                    .is_some_and(|r| r.to_lowercase().contains(&needle))
                || p.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
        })
        .collect())
}

/// Create a directory entry. Returns the new person's id.
///
/// Ids derive from the email when present ("sarah.chen@acme.com" →
/// "sarah-chen-acme-com"), matching how the rest of the workspace links
/// people; entries without an email get a random id.
pub async fn create_person(state: &AppState, input: NewPerson) -> Result<String, FlowError> {
    if input.name.trim().is_empty() {
        return Err(FlowError::InvalidInput("person name is required".to_string()));
    }

    let id = match input.email.as_deref().filter(|e| e.contains('@')) {
        Some(email) => slugify(&email.to_lowercase()),
        None => uuid::Uuid::new_v4().to_string(),
    };

    let doc = json!({
        "id": id,
        "name": input.name.trim(),
        "role": input.role,
        "email": input.email,
        "phone": input.phone,
        "avatarColor": input.avatar_color,
        "updatedAt": Utc::now().to_rfc3339(),
    });

    let id = state.backend.insert(&people_query(state), doc).await?;
    log::info!("People: created {}", id);
    Ok(id)
}

/// Apply a partial update to a directory entry.
pub async fn update_person(
    state: &AppState,
    person_id: &str,
    patch: PersonPatch,
) -> Result<(), FlowError> {
    let mut fields = Map::new();
    if let Some(name) = patch.name {
        if name.trim().is_empty() {
            return Err(FlowError::InvalidInput("person name is required".to_string()));
        }
        fields.insert("name".to_string(), Value::String(name));
    }
    if let Some(role) = patch.role {
        fields.insert("role".to_string(), Value::String(role));
    }
    if let Some(email) = patch.email {
        fields.insert("email".to_string(), Value::String(email));
    }
    if let Some(phone) = patch.phone {
        fields.insert("phone".to_string(), Value::String(phone));
    }
    if let Some(color) = patch.avatar_color {
        fields.insert("avatarColor".to_string(), Value::String(color));
    }
    if fields.is_empty() {
        return Ok(());
    }
    fields.insert("updatedAt".to_string(), json!(Utc::now().to_rfc3339()));

    state
        .backend
        .update(&people_query(state), person_id, Value::Object(fields))
        .await
}

/// Remove a directory entry.
pub async fn delete_person(state: &AppState, person_id: &str) -> Result<(), FlowError> {
    state.backend.delete(&people_query(state), person_id).await?;
    log::info!("People: deleted {}", person_id);
    Ok(())
}
