pub mod calendar;
mod commands;
pub mod db;
mod devtools;
pub mod error;
pub mod services;
pub mod state;
pub mod types;
pub mod util;

use std::sync::Arc;

use db::{DocumentBackend, MemoryBackend};
use state::AppState;
use types::SessionContext;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let config = match state::load_config() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Config: {} — starting with defaults", e);
            types::Config::default()
        }
    };

    // Session identity comes from the hosted auth layer; in the standalone
    // build it is whatever the config names. Passed in explicitly, nothing
    // below this point looks it up ambiently.
    let session = SessionContext::from_config(&config);
    log::info!("Session: company {}", session.company_id);

    // The hosted document-database client implements DocumentBackend and
    // replaces this construction in a connected build.
    let backend: Arc<dyn DocumentBackend> = Arc::new(MemoryBackend::new());

    let app_state = Arc::new(AppState::new(session, config, backend));

    tauri::Builder::default()
        .manage(app_state)
        .invoke_handler(tauri::generate_handler![
            // Config & session
            commands::get_config,
            commands::get_session,
            commands::set_user_name,
            // Calendar lifecycle
            commands::mount_calendar,
            commands::unmount_calendar,
            commands::refresh_project_deadlines,
            // Calendar read & navigation
            commands::get_calendar_events,
            commands::get_calendar_view,
            commands::navigate_calendar,
            commands::set_calendar_view,
            // Calendar selection
            commands::get_calendar_selection,
            commands::select_calendar_event,
            commands::select_calendar_slot,
            commands::clear_calendar_selection,
            // Calendar writes
            commands::create_calendar_event,
            commands::update_calendar_event,
            commands::delete_calendar_event,
            // Team directory
            commands::get_people,
            commands::search_people,
            commands::create_person,
            commands::update_person,
            commands::delete_person,
            // Sales templates
            commands::get_sales_templates,
            commands::get_sales_templates_by_category,
            commands::create_sales_template,
            commands::update_sales_template,
            commands::delete_sales_template,
            commands::render_sales_template,
            // Onboarding
            commands::install_demo_data,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
