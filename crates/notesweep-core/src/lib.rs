pub mod clean;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod vault;

pub use config::{AppConfig, CleanupConfig};
pub use error::{Error, Result};
pub use store::{DocumentStore, FileStore};
