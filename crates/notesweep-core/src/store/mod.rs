mod file_store;
pub mod retry;

use async_trait::async_trait;

use crate::Result;

pub use file_store::FileStore;

/// A resolved folder inside the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    /// Folder path relative to the store root, `/`-separated, empty for the root
    pub path: String,
}

/// One file listed in a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    /// Identifier used to read and write the document
    pub path: String,
    /// File name without extension; daily notes carry their date here
    pub name: String,
    /// File extension without the dot, empty when there is none
    pub extension: String,
}

impl DocumentEntry {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = path.rsplit('/').next().unwrap_or(&path);
        let (name, extension) = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => (stem.to_string(), ext.to_string()),
            _ => (file_name.to_string(), String::new()),
        };
        Self {
            path,
            name,
            extension,
        }
    }

    /// Whether this entry is a Markdown note
    pub fn is_markdown(&self) -> bool {
        self.extension.eq_ignore_ascii_case("md")
    }
}

/// Backing store holding the notes to clean
///
/// Cleanup only reads and writes documents it obtained from
/// [`DocumentStore::list_documents`].
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Resolve a folder path; `Ok(None)` when it does not exist or is not a folder
    async fn resolve_folder(&self, path: &str) -> Result<Option<Folder>>;

    /// List the files directly inside `folder`
    async fn list_documents(&self, folder: &Folder) -> Result<Vec<DocumentEntry>>;

    /// Read the full text of a document
    async fn read(&self, entry: &DocumentEntry) -> Result<String>;

    /// Replace the full text of a document
    async fn write(&self, entry: &DocumentEntry, content: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_from_path() {
        let entry = DocumentEntry::new("Daily/2024-01-05.md");
        assert_eq!(entry.name, "2024-01-05");
        assert_eq!(entry.extension, "md");
        assert!(entry.is_markdown());

        let entry = DocumentEntry::new("Daily/archive.tar.gz");
        assert_eq!(entry.name, "archive.tar");
        assert_eq!(entry.extension, "gz");
        assert!(!entry.is_markdown());
    }

    #[test]
    fn test_entry_without_extension() {
        let entry = DocumentEntry::new("README");
        assert_eq!(entry.name, "README");
        assert_eq!(entry.extension, "");

        let entry = DocumentEntry::new("Daily/.hidden");
        assert_eq!(entry.name, ".hidden");
        assert_eq!(entry.extension, "");
    }
}
