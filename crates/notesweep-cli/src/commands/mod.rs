pub mod clean;
pub mod config;
pub mod daemon;

use notesweep_core::scheduler::SchedulerEvent;

/// Print a scheduler event as a user-facing message
pub fn notify(event: &SchedulerEvent) {
    match event {
        SchedulerEvent::FolderNotConfigured => {
            println!("Folder not configured.");
            println!("Set one with: notesweep config set folder <path>");
        }
        SchedulerEvent::FolderNotFound { path } => println!("Folder not found: {}", path),
        SchedulerEvent::Finished { report } => {
            println!(
                "Finished cleaning: {} of {} notes updated.",
                report.modified, report.eligible
            );
            if report.failed > 0 {
                println!("{} notes could not be processed, see the log for details.", report.failed);
            }
        }
        SchedulerEvent::Skipped => println!("A cleanup is already running."),
        SchedulerEvent::Error { task, message } => println!("{} failed: {}", task, message),
    }
}
