//! Sample worklists and the walkthrough run by the ward binary

use anyhow::{Context, Result};
use chrono::{Duration as ChronoDuration, Local, Utc};
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;
use worklist::{
    DragDropKind, EngineSettings, Folder, FolderBuilder, FolderClass, FolderId, FolderSystem,
    InMemoryWorklistService, ItemKind, SearchParams, SessionContext, SortKey, Spawner, WorkItem,
};

use crate::handlers::TransitionHandler;

/// How long to wait for a single fetch before giving up on the pump
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

const PATIENTS: &[&str] = &[
    "Abbott, Maria",
    "Baker, Tom",
    "Chen, Li",
    "Diaz, Rosa",
    "Evans, Paul",
    "Fischer, Anna",
    "Garcia, Luis",
    "Hughes, Kate",
];

const MODALITIES: &[&str] = &["CT", "MR", "US", "XR"];

fn procedure(index: usize) -> WorkItem {
    let scheduled = Utc::now() + ChronoDuration::minutes(15 * index as i64);
    WorkItem::new(format!("proc-{:03}", index), ItemKind::PROCEDURE)
        .with_field("patient", PATIENTS[index % PATIENTS.len()])
        .with_field("modality", MODALITIES[index % MODALITIES.len()])
        .with_field("accession", format!("ACC{:06}", 1000 + index))
        .with_field("priority", (index % 3) as i64)
        .with_field("scheduled_time", scheduled)
}

/// Fill the in-memory service with a day's worth of procedures
pub fn seed_service(service: &InMemoryWorklistService) -> Result<()> {
    service.set_worklist(FolderClass::SCHEDULED, (0..37).map(procedure).collect())?;
    service.set_worklist(FolderClass::IN_PROGRESS, (37..40).map(procedure).collect())?;
    service.set_worklist(FolderClass::COMPLETED, (40..45).map(procedure).collect())?;
    Ok(())
}

fn folder_id(id: &str) -> FolderId {
    FolderId::new(id)
}

fn build_system(
    settings: EngineSettings,
    service: Arc<InMemoryWorklistService>,
    spawner: Arc<dyn Spawner>,
) -> Result<FolderSystem> {
    let session = SessionContext::new("tech1").with_facility("Main Campus");
    let mut system = FolderSystem::new(settings, session, service.clone(), spawner);

    system.add_folder(
        FolderBuilder::new("scheduled", FolderClass::SCHEDULED, "Scheduled")
            .tooltip("Procedures waiting to start")
            .sort(vec![SortKey::ascending("scheduled_time")]),
    )?;
    system.add_folder(FolderBuilder::new("in-progress", FolderClass::IN_PROGRESS, "In Progress"))?;
    system.add_folder(
        FolderBuilder::new("completed", FolderClass::COMPLETED, "Completed")
            .sort(vec![SortKey::descending("scheduled_time")]),
    )?;
    system.add_folder(FolderBuilder::search("search", "Search Results"))?;

    system.register_drop_handler(
        FolderClass::IN_PROGRESS,
        Arc::new(TransitionHandler::start_procedure(service.clone())),
    );
    system.register_drop_handler(
        FolderClass::COMPLETED,
        Arc::new(TransitionHandler::complete_procedure(service)),
    );

    system.subscribe(|event| info!("Folder system event: {:?}", event));
    Ok(system)
}

/// Apply fetch results until no folder has a fetch in flight
fn pump(system: &mut FolderSystem) {
    while system.pending_fetches() > 0 {
        let stats = system.wait_for_completions(FETCH_TIMEOUT);
        if stats.total() == 0 {
            warn!("Timed out waiting for {} fetch(es)", system.pending_fetches());
            return;
        }
        if stats.orphaned > 0 || stats.failed > 0 {
            info!(
                "Completions: {} applied, {} failed, {} superseded",
                stats.completed, stats.failed, stats.orphaned
            );
        }
    }
}

fn log_folders(system: &FolderSystem) {
    for folder in system.folders() {
        let updated = folder
            .last_update_time()
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "never".to_string());
        info!(
            "  [{}] {} (icon {}, updated {})",
            if folder.is_open() { "open" } else { "    " },
            folder.display_text(),
            folder.icon(),
            updated
        );
    }
}

fn log_page(folder: &Folder) {
    info!(
        "{}: page {} ({} rows, previous: {}, next: {})",
        folder.text(),
        folder.page_number(),
        folder.items().len(),
        folder.has_previous(),
        folder.has_next()
    );
    for item in folder.items().iter().take(3) {
        info!(
            "    {} {} {}",
            item.id.as_str(),
            item.field("patient"),
            item.field("modality")
        );
    }
}

/// Walk through counts, paging, drag-and-drop and search
pub fn run(
    settings: EngineSettings,
    service: Arc<InMemoryWorklistService>,
    spawner: Arc<dyn Spawner>,
) -> Result<()> {
    let mut system = build_system(settings, service.clone(), spawner)?;
    let scheduled = folder_id("scheduled");
    let in_progress = folder_id("in-progress");
    let search = folder_id("search");

    info!("Refreshing folder counts");
    system.update_folders();
    pump(&mut system);
    log_folders(&system);

    info!("Opening the scheduled worklist");
    system.select_folder(&scheduled)?;
    pump(&mut system);
    let folder = system.folder(&scheduled).context("scheduled folder missing")?;
    log_page(folder);

    if folder.has_next() {
        let folder = system.folder_mut(&scheduled).context("scheduled folder missing")?;
        folder.move_next_page()?;
        folder.update();
        pump(&mut system);
        let folder = system.folder(&scheduled).context("scheduled folder missing")?;
        log_page(folder);
    }

    let dragged: Vec<WorkItem> = system
        .folder(&scheduled)
        .context("scheduled folder missing")?
        .items()
        .iter()
        .take(2)
        .cloned()
        .collect();
    if system.can_accept_drop(&in_progress, &dragged, DragDropKind::Move)? == DragDropKind::Move {
        let result = system.accept_drop(&in_progress, &dragged, DragDropKind::Move)?;
        system.drag_complete(&scheduled, &dragged, result)?;
        if result == DragDropKind::Move {
            system.invalidate_folders_of_class(&FolderClass::new(FolderClass::SCHEDULED));
            system.invalidate_folders_of_class(&FolderClass::new(FolderClass::IN_PROGRESS));
        }
    }
    system.update_folders();
    pump(&mut system);
    log_folders(&system);

    info!("Searching");
    if let Err(e) = system.execute_search(&search, SearchParams::new("c")) {
        warn!("{}", e);
    }
    if let Err(e) = system.execute_search(&search, SearchParams::new("chen").with_filter("modality", "US")) {
        warn!("{}", e);
    }
    system.select_folder(&search)?;
    pump(&mut system);
    let folder = system.folder(&search).context("search folder missing")?;
    log_page(folder);

    info!("Worklist service answered {} queries", service.query_count());
    Ok(())
}
