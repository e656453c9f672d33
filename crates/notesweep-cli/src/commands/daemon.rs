use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use notesweep_core::{
    scheduler::SchedulerService, vault::daily_notes_provider, AppConfig, FileStore,
};

use super::notify;

/// How long `stop` waits for a graceful exit before killing
const STOP_TIMEOUT: Duration = Duration::from_secs(5);
const STOP_POLL: Duration = Duration::from_millis(200);

/// File recording the PID of the running daemon
struct PidFile {
    path: PathBuf,
}

/// Removes the PID file when the daemon exits
struct PidGuard<'a>(&'a PidFile);

impl Drop for PidGuard<'_> {
    fn drop(&mut self) {
        self.0.remove();
    }
}

impl PidFile {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_RUNTIME_DIR/notesweep/daemon.pid`, falling back to the local data dir
    fn default_location() -> Self {
        let base = dirs::runtime_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("/tmp"));
        Self::new(base.join("notesweep").join("daemon.pid"))
    }

    fn path(&self) -> &Path {
        &self.path
    }

    /// PID of a live daemon. A file left behind by a dead process is removed.
    fn running(&self) -> Option<u32> {
        let pid: u32 = fs::read_to_string(&self.path).ok()?.trim().parse().ok()?;
        if is_alive(pid) {
            return Some(pid);
        }
        debug!("Removing stale PID file {}", self.path.display());
        self.remove();
        None
    }

    /// Record this process as the daemon
    fn claim(&self) -> Result<PidGuard<'_>> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, format!("{}\n", std::process::id()))
            .with_context(|| format!("cannot write {}", self.path.display()))?;
        Ok(PidGuard(self))
    }

    fn remove(&self) {
        let _ = fs::remove_file(&self.path);
    }
}

#[cfg(unix)]
fn send_signal(pid: u32, signal: &str) -> bool {
    std::process::Command::new("kill")
        .arg(signal)
        .arg(pid.to_string())
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

#[cfg(unix)]
fn is_alive(pid: u32) -> bool {
    send_signal(pid, "-0")
}

// Without signals the PID file is taken at its word
#[cfg(not(unix))]
fn is_alive(_pid: u32) -> bool {
    true
}

/// Resolve once Ctrl+C (or SIGTERM on unix) arrives
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = term.recv() => {}
                }
                return;
            }
            Err(e) => warn!("Cannot listen for SIGTERM: {}", e),
        }
    }

    tokio::signal::ctrl_c().await.ok();
}

/// Run the scheduler in the foreground until stopped
pub async fn start(config: Arc<AppConfig>) -> Result<()> {
    let pid_file = PidFile::default_location();
    if let Some(pid) = pid_file.running() {
        println!("Daemon is already running (PID: {})", pid);
        return Ok(());
    }
    let _guard = pid_file.claim()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal");
        let _ = shutdown_tx.send(true);
    });

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            notify(&event);
        }
    });

    let vault_dir = config.vault_dir();
    let scheduler = SchedulerService::new(
        Arc::new(FileStore::new(vault_dir.clone())),
        config.clone(),
        daily_notes_provider(&vault_dir),
    )
    .with_event_sender(event_tx);

    // SIGUSR1 asks for a cleanup now
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut trigger = signal(SignalKind::user_defined1())?;
        let scheduler = scheduler.clone();
        tokio::spawn(async move {
            while trigger.recv().await.is_some() {
                info!("Manual cleanup requested");
                let _ = scheduler.clean_now().await;
            }
        });
    }

    println!(
        "notesweep daemon running (PID: {}), stop with Ctrl+C or 'notesweep daemon stop'",
        std::process::id()
    );
    println!("  Vault: {}", vault_dir.display());
    println!("  Cleanup interval: {} seconds", config.sync.cleanup_interval_secs);
    println!("  Age threshold: {} days", config.cleanup.age_threshold_days);

    scheduler.run(shutdown_rx).await;

    println!("Daemon stopped.");
    Ok(())
}

/// Ask the daemon to exit, killing it if it does not
pub async fn stop() -> Result<()> {
    let pid_file = PidFile::default_location();
    let Some(pid) = pid_file.running() else {
        println!("Daemon is not running.");
        return Ok(());
    };

    #[cfg(unix)]
    {
        if !send_signal(pid, "-TERM") {
            anyhow::bail!("could not signal daemon (PID: {}), try: kill {}", pid, pid);
        }

        let mut waited = Duration::ZERO;
        while waited < STOP_TIMEOUT {
            tokio::time::sleep(STOP_POLL).await;
            waited += STOP_POLL;
            if !is_alive(pid) {
                println!("Daemon stopped (PID: {}).", pid);
                return Ok(());
            }
        }

        warn!("Daemon did not exit within {:?}, killing it", STOP_TIMEOUT);
        send_signal(pid, "-KILL");
        pid_file.remove();
        println!("Daemon killed (PID: {}).", pid);
    }

    #[cfg(not(unix))]
    println!("Stop the daemon manually (PID: {})", pid);

    Ok(())
}

/// Report whether a daemon is running
pub async fn status() -> Result<()> {
    let pid_file = PidFile::default_location();
    match pid_file.running() {
        Some(pid) => println!("Daemon is running (PID: {}, {})", pid, pid_file.path().display()),
        None => println!("Daemon is not running."),
    }
    Ok(())
}

/// Ask the running daemon to clean now
pub async fn trigger() -> Result<()> {
    let Some(pid) = PidFile::default_location().running() else {
        println!("Daemon is not running. Run 'notesweep clean' to clean now.");
        return Ok(());
    };

    #[cfg(unix)]
    {
        if !send_signal(pid, "-USR1") {
            anyhow::bail!("could not signal daemon (PID: {})", pid);
        }
        println!("Cleanup requested (PID: {}).", pid);
    }

    #[cfg(not(unix))]
    println!("Triggering needs signals; run 'notesweep clean' instead (PID: {})", pid);

    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_claim_records_own_pid_until_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::new(dir.path().join("run").join("daemon.pid"));
        assert_eq!(pid_file.running(), None);

        let guard = pid_file.claim().unwrap();
        assert_eq!(pid_file.running(), Some(std::process::id()));

        drop(guard);
        assert!(!pid_file.path().exists());
    }

    #[test]
    fn test_stale_pid_file_is_removed() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::new(dir.path().join("daemon.pid"));
        // Above the kernel's pid_max, so never a live process
        fs::write(pid_file.path(), "4194305\n").unwrap();

        assert_eq!(pid_file.running(), None);
        assert!(!pid_file.path().exists());
    }

    #[test]
    fn test_garbage_pid_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = PidFile::new(dir.path().join("daemon.pid"));
        fs::write(pid_file.path(), "not a pid").unwrap();

        assert_eq!(pid_file.running(), None);
    }
}
