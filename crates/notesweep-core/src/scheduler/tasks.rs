use chrono::NaiveDateTime;

use crate::clean::{is_eligible, Pipeline};
use crate::config::CleanupConfig;
use crate::store::{DocumentEntry, DocumentStore};
use crate::{Error, Result};

/// Outcome of one cleanup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Markdown documents looked at
    pub scanned: u32,
    /// Documents old enough to be cleaned
    pub eligible: u32,
    /// Documents rewritten
    pub modified: u32,
    /// Documents skipped because reading or writing failed
    pub failed: u32,
}

/// Pick the folder to clean: the configured one, else the host default
pub fn resolve_folder_path(
    config: &CleanupConfig,
    default_folder: Option<&str>,
) -> Result<String> {
    config
        .folder
        .as_deref()
        .or(default_folder)
        .map(str::trim)
        .filter(|folder| !folder.is_empty())
        .map(str::to_string)
        .ok_or(Error::FolderNotConfigured)
}

/// Clean every eligible note in the configured folder
///
/// Fails before touching any document when no folder is configured or the
/// folder does not exist.
pub async fn clean_folder(
    store: &dyn DocumentStore,
    config: &CleanupConfig,
    default_folder: Option<&str>,
    now: NaiveDateTime,
) -> Result<CleanupReport> {
    let path = resolve_folder_path(config, default_folder)?;
    let folder = store
        .resolve_folder(&path)
        .await?
        .ok_or_else(|| Error::FolderNotFound(path.clone()))?;

    tracing::info!(
        "Cleaning notes in '{}' older than {} days",
        path,
        config.age_threshold_days
    );

    let entries = store.list_documents(&folder).await?;
    Ok(clean_documents(store, &entries, config, now).await)
}

/// Clean `entries` in order, writing back only the documents whose text changed
///
/// A read or write failure is logged and counted; the remaining documents are
/// still processed.
pub async fn clean_documents(
    store: &dyn DocumentStore,
    entries: &[DocumentEntry],
    config: &CleanupConfig,
    now: NaiveDateTime,
) -> CleanupReport {
    let pipeline = Pipeline::new(config);
    let mut report = CleanupReport::default();

    for entry in entries.iter().filter(|e| e.is_markdown()) {
        report.scanned += 1;

        if !is_eligible(&entry.name, config.age_threshold_days, now) {
            tracing::debug!("Skipping '{}': not eligible", entry.path);
            continue;
        }
        report.eligible += 1;

        match clean_document(store, &pipeline, entry).await {
            Ok(true) => {
                report.modified += 1;
                tracing::debug!("Cleaned '{}'", entry.path);
            }
            Ok(false) => {}
            Err(e) => {
                report.failed += 1;
                tracing::warn!("Failed to clean '{}': {}", entry.path, e);
            }
        }
    }

    if report.modified > 0 {
        tracing::info!("Cleaned {} of {} notes", report.modified, report.scanned);
    }

    report
}

/// Returns whether the document was rewritten
async fn clean_document(
    store: &dyn DocumentStore,
    pipeline: &Pipeline,
    entry: &DocumentEntry,
) -> Result<bool> {
    let original = store.read(entry).await?;
    let cleaned = pipeline.apply(&original);

    if cleaned == original {
        return Ok(false);
    }

    store.write(entry, &cleaned).await?;
    Ok(true)
}
