//! Ward - Worklist host for the folder synchronization engine
//!
//! Runs the engine against an in-memory worklist service and logs what a
//! worklist UI would display.

use anyhow::Result;
use log::{error, info, warn};
use std::sync::Arc;
use worklist::{EngineSettings, InMemoryWorklistService};

mod handlers;
mod scenario;
mod spawner;

use spawner::TokioSpawner;

fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let settings = match EngineSettings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Invalid worklist settings, using defaults: {:#}", e);
            if let Some(path) = EngineSettings::default_settings_path() {
                warn!("Settings are read from: {}", path.display());
            }
            EngineSettings::default()
        }
    };
    info!(
        "Page size {}, auto-invalidate {:?}, search limit {}",
        settings.page_size,
        settings.auto_invalidate_interval(),
        settings.max_search_matches
    );

    let runtime = tokio::runtime::Runtime::new()?;
    let spawner = Arc::new(TokioSpawner::new(runtime.handle().clone()));

    let service = Arc::new(InMemoryWorklistService::new());
    scenario::seed_service(&service)?;

    scenario::run(settings, service, spawner)
}
