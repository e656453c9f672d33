use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use super::retry::io_with_retry;
use super::{DocumentEntry, DocumentStore, Folder};
use crate::{Error, Result};

/// Document store backed by a vault directory on disk
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn full_path(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

/// Folder path relative to the vault root, `/`-separated.
/// `..` is rejected so a folder can never name a path outside the vault.
fn normalize_folder(path: &str) -> Result<String> {
    let parts: Vec<&str> = path
        .trim()
        .split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != ".")
        .collect();

    if parts.contains(&"..") {
        return Err(Error::Config(format!(
            "folder must stay inside the vault, got '{}'",
            path
        )));
    }
    Ok(parts.join("/"))
}

fn map_read_error(path: &str, err: std::io::Error) -> Error {
    if err.kind() == ErrorKind::NotFound {
        Error::DocumentNotFound(path.to_string())
    } else {
        Error::Io(err)
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn resolve_folder(&self, path: &str) -> Result<Option<Folder>> {
        let relative = normalize_folder(path)?;
        let full = self.full_path(&relative);

        match tokio::fs::metadata(&full).await {
            Ok(meta) if meta.is_dir() => Ok(Some(Folder { path: relative })),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_documents(&self, folder: &Folder) -> Result<Vec<DocumentEntry>> {
        let mut dir = tokio::fs::read_dir(self.full_path(&folder.path)).await?;
        let mut entries = Vec::new();

        while let Some(item) = dir.next_entry().await? {
            if !item.file_type().await?.is_file() {
                continue;
            }
            let Some(file_name) = item.file_name().to_str().map(str::to_string) else {
                tracing::debug!("Skipping non UTF-8 file name: {:?}", item.file_name());
                continue;
            };
            let path = if folder.path.is_empty() {
                file_name
            } else {
                format!("{}/{}", folder.path, file_name)
            };
            entries.push(DocumentEntry::new(path));
        }

        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    async fn read(&self, entry: &DocumentEntry) -> Result<String> {
        let full = self.full_path(&entry.path);
        io_with_retry(|| tokio::fs::read_to_string(&full))
            .await
            .map_err(|e| map_read_error(&entry.path, e))
    }

    async fn write(&self, entry: &DocumentEntry, content: &str) -> Result<()> {
        let full = self.full_path(&entry.path);
        io_with_retry(|| tokio::fs::write(&full, content)).await?;
        Ok(())
    }
}
