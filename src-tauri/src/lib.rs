pub mod analysis;
pub mod commands;
pub mod error;
pub mod models;

#[cfg(feature = "desktop")]
use commands::{
    dashboard::{clear_month, get_dashboard_summary, get_donut_data, get_timeline_data, load_history, select_month},
    settings::{get_settings, save_settings, SettingsDir},
};
#[cfg(feature = "desktop")]
use models::dashboard::DashboardState;
#[cfg(feature = "desktop")]
use std::sync::{Arc, Mutex};
#[cfg(feature = "desktop")]
use tauri::Manager;

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    tauri::Builder::default()
        .manage(Arc::new(Mutex::new(DashboardState::default())))
        .setup(|app| {
            let config_dir = app.path().app_config_dir()?;
            log::info!("Settings directory: {}", config_dir.display());
            app.manage(SettingsDir(config_dir));
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            load_history,
            get_donut_data,
            get_timeline_data,
            select_month,
            clear_month,
            get_dashboard_summary,
            get_settings,
            save_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
