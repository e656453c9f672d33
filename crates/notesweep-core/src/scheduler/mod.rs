mod service;
pub mod tasks;

pub use service::{Clock, SchedulerEvent, SchedulerService};
pub use tasks::{clean_documents, clean_folder, resolve_folder_path, CleanupReport};
