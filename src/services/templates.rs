// Sales templates service — CRM outreach template CRUD and rendering.
// Templates live in the `salesTemplates` collection, company-scoped.

use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::db::{DocQuery, SALES_TEMPLATES};
use crate::error::FlowError;
use crate::state::AppState;
use crate::types::{NewSalesTemplate, SalesTemplate, SalesTemplatePatch};
use crate::util::slugify;

fn templates_query(state: &AppState) -> DocQuery {
    DocQuery::scoped(SALES_TEMPLATES, &state.session)
}

fn template_from_doc(doc: &Value) -> Option<SalesTemplate> {
    match serde_json::from_value(doc.clone()) {
        Ok(template) => Some(template),
        Err(e) => {
            log::debug!("Templates: dropping malformed template record: {}", e);
            None
        }
    }
}

/// List every template for the company.
pub async fn list_templates(state: &AppState) -> Result<Vec<SalesTemplate>, FlowError> {
    let docs = state.backend.fetch_once(&templates_query(state)).await?;
    let mut templates: Vec<SalesTemplate> = docs.iter().filter_map(template_from_doc).collect();
    templates.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    Ok(templates)
}

/// Templates in one category ("outreach", "follow-up", ...).
pub async fn list_templates_by_category(
    state: &AppState,
    category: &str,
) -> Result<Vec<SalesTemplate>, FlowError> {
    let templates = list_templates(state).await?;
    Ok(templates
        .into_iter()
        .filter(|t| {
            t.category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(category))
        })
        .collect())
}

/// Create a template. Returns the new template id.
pub async fn create_template(
    state: &AppState,
    input: NewSalesTemplate,
) -> Result<String, FlowError> {
    if input.name.trim().is_empty() {
        return Err(FlowError::InvalidInput(
            "template name is required".to_string(),
        ));
    }

    let doc = json!({
        "id": slugify(&input.name),
        "name": input.name.trim(),
        "category": input.category,
        "subject": input.subject,
        "body": input.body,
        "updatedAt": Utc::now().to_rfc3339(),
    });

    let id = state.backend.insert(&templates_query(state), doc).await?;
    log::info!("Templates: created {}", id);
    Ok(id)
}

/// Apply a partial update to a template.
pub async fn update_template(
    state: &AppState,
    template_id: &str,
    patch: SalesTemplatePatch,
) -> Result<(), FlowError> {
    let mut fields = Map::new();
    if let Some(name) = patch.name {
        fields.insert("name".to_string(), Value::String(name));
    }
    if let Some(category) = patch.category {
        fields.insert("category".to_string(), Value::String(category));
    }
    if let Some(subject) = patch.subject {
        fields.insert("subject".to_string(), Value::String(subject));
    }
    if let Some(body) = patch.body {
        fields.insert("body".to_string(), Value::String(body));
    }
    if fields.is_empty() {
        return Ok(());
    }
    fields.insert("updatedAt".to_string(), json!(Utc::now().to_rfc3339()));

    state
        .backend
        .update(&templates_query(state), template_id, Value::Object(fields))
        .await
}

/// Remove a template.
pub async fn delete_template(state: &AppState, template_id: &str) -> Result<(), FlowError> {
    state
        .backend
        .delete(&templates_query(state), template_id)
        .await?;
    log::info!("Templates: deleted {}", template_id);
    Ok(())
}

/// A template with `{{token}}` placeholders expanded.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedTemplate {
    pub subject: String,
    pub body: String,
}

/// Expand `{{token}}` placeholders in the subject and body.
///
/// Unknown tokens are left verbatim so the user can spot what still needs
/// filling in.
pub fn render_template(
    template: &SalesTemplate,
    substitutions: &HashMap<String, String>,
) -> RenderedTemplate {
    RenderedTemplate {
        subject: expand(&template.subject, substitutions),
        body: expand(&template.body, substitutions),
    }
}

fn expand(text: &str, substitutions: &HashMap<String, String>) -> String {
    let mut out = text.to_string();
    for (token, value) in substitutions {
        out = out.replace(&format!("{{{{{}}}}}", token), value);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryBackend;
    use crate::types::{Config, SessionContext};
    use std::sync::Arc;

    fn make_state() -> AppState {
        let config = Config::default();
        let session = SessionContext {
            company_id: "acme".to_string(),
            user_name: None,
        };
        AppState::new(session, config, Arc::new(MemoryBackend::new()))
    }

    fn intro_template() -> NewSalesTemplate {
        NewSalesTemplate {
            name: "Cold Intro".to_string(),
            category: Some("outreach".to_string()),
            subject: "Quick question, {{firstName}}".to_string(),
            body: "Hi {{firstName}},\n\nSaw {{company}} is growing — worth a chat?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let state = make_state();
        let id = create_template(&state, intro_template()).await.unwrap();
        assert_eq!(id, "cold-intro");

        let templates = list_templates(&state).await.unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].name, "Cold Intro");
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let state = make_state();
        create_template(&state, intro_template()).await.unwrap();
        create_template(
            &state,
            NewSalesTemplate {
                name: "Renewal Nudge".to_string(),
                category: Some("follow-up".to_string()),
                subject: "Renewal coming up".to_string(),
                body: "…".to_string(),
            },
        )
        .await
        .unwrap();

        let outreach = list_templates_by_category(&state, "Outreach").await.unwrap();
        assert_eq!(outreach.len(), 1);
        assert_eq!(outreach[0].name, "Cold Intro");
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let state = make_state();
        let id = create_template(&state, intro_template()).await.unwrap();

        update_template(
            &state,
            &id,
            SalesTemplatePatch {
                subject: Some("Intro — {{company}}".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let templates = list_templates(&state).await.unwrap();
        assert_eq!(templates[0].subject, "Intro — {{company}}");

        delete_template(&state, &id).await.unwrap();
        assert!(list_templates(&state).await.unwrap().is_empty());
    }

    #[test]
    fn test_render_expands_known_tokens_only() {
        let template = SalesTemplate {
            id: "cold-intro".to_string(),
            company_id: "acme".to_string(),
            name: "Cold Intro".to_string(),
            category: None,
            subject: "Quick question, {{firstName}}".to_string(),
            body: "Hi {{firstName}}, how is {{company}}? Re: {{unknown}}".to_string(),
            updated_at: None,
        };
        let mut subs = HashMap::new();
        subs.insert("firstName".to_string(), "Sarah".to_string());
        subs.insert("company".to_string(), "Acme".to_string());

        let rendered = render_template(&template, &subs);
        assert_eq!(rendered.subject, "Quick question, Sarah");
        assert_eq!(rendered.body, "Hi Sarah, how is Acme? Re: {{unknown}}");
    }
}
