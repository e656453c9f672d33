use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use notesweep_core::{scheduler::SchedulerService, vault::daily_notes_provider, AppConfig, FileStore};

use super::notify;

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    let vault_dir = config.vault_dir();
    println!(
        "Cleaning notes older than {} days in {}...",
        config.cleanup.age_threshold_days,
        vault_dir.display()
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    let store = Arc::new(FileStore::new(vault_dir.clone()));
    let scheduler = SchedulerService::new(store, config, daily_notes_provider(&vault_dir))
        .with_event_sender(tx);

    let result = scheduler.clean_now().await;
    drop(scheduler);

    while let Some(event) = rx.recv().await {
        notify(&event);
    }

    match result {
        Some(Err(e)) => Err(e.into()),
        Some(Ok(_)) | None => Ok(()),
    }
}
