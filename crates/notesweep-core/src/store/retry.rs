//! Retry logic for note file I/O
//!
//! Vaults often live in cloud-synced directories (iCloud, Dropbox, etc.) where
//! a file can be briefly locked or unavailable while the sync client touches
//! it. Reads and writes are retried with exponential backoff on those errors.

use std::future::Future;
use std::io::ErrorKind;
use std::time::Duration;

/// Maximum number of retry attempts for a file operation
pub const MAX_RETRIES: u32 = 4;

/// Check if an I/O error is transient and should be retried
///
/// This includes:
/// - Interrupted: the call was interrupted before completing
/// - WouldBlock: the file is locked by another process
/// - TimedOut: network-backed file systems gave up waiting
pub fn is_transient_error(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::Interrupted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}

/// Calculate exponential backoff delay for retry attempt
///
/// Base delay: 100ms, doubling each attempt
/// Delays: 100ms, 200ms, 400ms, 800ms
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_millis(100 * 2u64.pow(attempt.saturating_sub(1)))
}

/// Execute a file operation with exponential backoff retry for transient errors
pub async fn io_with_retry<F, Fut, T>(operation: F) -> std::io::Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::io::Result<T>>,
{
    let mut attempts = 0;
    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if is_transient_error(&e) && attempts < MAX_RETRIES => {
                attempts += 1;
                let delay = backoff_delay(attempts);
                tracing::debug!(
                    error = %e,
                    attempt = attempts,
                    max_retries = MAX_RETRIES,
                    delay_ms = delay.as_millis(),
                    "Transient file error, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
