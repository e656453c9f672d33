//! Defaults taken from the host vault

use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

/// Supplies a folder to clean when none is configured
pub type DefaultFolder = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Location of the daily-notes settings inside a vault
const DAILY_NOTES_SETTINGS: &str = ".obsidian/daily-notes.json";

#[derive(Debug, Deserialize)]
struct DailyNotesSettings {
    #[serde(default)]
    folder: Option<String>,
}

/// Read the folder configured for daily notes in the vault at `vault_dir`.
///
/// Missing or unreadable settings and an empty folder all yield `None`.
pub fn daily_notes_folder(vault_dir: &Path) -> Option<String> {
    let path = vault_dir.join(DAILY_NOTES_SETTINGS);
    let content = std::fs::read_to_string(&path).ok()?;

    match serde_json::from_str::<DailyNotesSettings>(&content) {
        Ok(settings) => settings
            .folder
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty()),
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", path.display(), e);
            None
        }
    }
}

/// Provider that looks up the daily-notes folder of `vault_dir`
pub fn daily_notes_provider(vault_dir: impl AsRef<Path>) -> DefaultFolder {
    let vault_dir = vault_dir.as_ref().to_path_buf();
    Arc::new(move || daily_notes_folder(&vault_dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_settings(dir: &Path, json: &str) {
        let settings = dir.join(DAILY_NOTES_SETTINGS);
        std::fs::create_dir_all(settings.parent().unwrap()).unwrap();
        std::fs::write(settings, json).unwrap();
    }

    #[test]
    fn test_reads_folder() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(
            dir.path(),
            r#"{"folder": "Journal/Daily", "format": "YYYY-MM-DD", "template": ""}"#,
        );
        assert_eq!(daily_notes_folder(dir.path()).as_deref(), Some("Journal/Daily"));
        assert_eq!(daily_notes_provider(dir.path())().as_deref(), Some("Journal/Daily"));
    }

    #[test]
    fn test_missing_or_empty_settings() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(daily_notes_folder(dir.path()), None);

        write_settings(dir.path(), r#"{"format": "YYYY-MM-DD"}"#);
        assert_eq!(daily_notes_folder(dir.path()), None);

        write_settings(dir.path(), r#"{"folder": "  "}"#);
        assert_eq!(daily_notes_folder(dir.path()), None);
    }

    #[test]
    fn test_malformed_settings() {
        let dir = tempfile::tempdir().unwrap();
        write_settings(dir.path(), "{not json");
        assert_eq!(daily_notes_folder(dir.path()), None);
    }
}
