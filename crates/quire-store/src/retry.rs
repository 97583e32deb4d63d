//! Bounded retry for file reads.
//!
//! Transient IO errors (interrupted syscalls, a file briefly locked by an
//! editor's atomic save, slow network mounts) are retried with exponential
//! backoff and jitter. Missing files and permission errors fail immediately.

use std::io;
use std::path::Path;
use std::time::Duration;

use rand::Rng;

/// Configuration for retry behavior on transient read errors.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial one).
    pub max_attempts: u32,
    /// Initial delay before the first retry.
    pub base_delay: Duration,
    /// Maximum delay between retries (backoff is capped here).
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(25),
            max_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Creates a config with the given attempt budget and default delays.
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based), with up to 10% jitter.
    pub fn backoff(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_ms = self.base_delay.as_millis() as u64;
        let max_ms = self.max_delay.as_millis() as u64;
        let delay_ms = base_ms
            .saturating_mul(2u64.saturating_pow(attempt - 1))
            .min(max_ms);

        let jitter_range = delay_ms / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };

        Duration::from_millis(delay_ms + jitter)
    }
}

/// Detect IO errors worth retrying.
///
/// Kept narrow: `NotFound` and `PermissionDenied` will not fix themselves
/// within a request.
pub fn is_transient_io_error(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Reads a UTF-8 file, retrying transient failures.
pub async fn read_to_string(path: &Path, config: &RetryConfig) -> io::Result<String> {
    let mut attempt = 1;
    loop {
        match tokio::fs::read_to_string(path).await {
            Ok(contents) => return Ok(contents),
            Err(e) if is_transient_io_error(&e) && attempt < config.max_attempts => {
                let delay = config.backoff(attempt);
                tracing::warn!(
                    path = %path.display(),
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Transient read error, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_and_caps() {
        let config = RetryConfig {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        };

        assert_eq!(config.backoff(0), Duration::ZERO);
        assert!(config.backoff(1) >= Duration::from_millis(100));
        assert!(config.backoff(2) >= Duration::from_millis(200));
        let capped = config.backoff(10);
        assert!(capped >= Duration::from_millis(1000));
        assert!(capped < Duration::from_millis(1100));
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient_io_error(&io::Error::from(io::ErrorKind::Interrupted)));
        assert!(is_transient_io_error(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!is_transient_io_error(&io::Error::from(io::ErrorKind::NotFound)));
        assert!(!is_transient_io_error(&io::Error::from(
            io::ErrorKind::PermissionDenied
        )));
    }

    #[test]
    fn test_with_attempts_has_floor_of_one() {
        assert_eq!(RetryConfig::with_attempts(0).max_attempts, 1);
        assert_eq!(RetryConfig::with_attempts(4).max_attempts, 4);
    }

    #[tokio::test]
    async fn test_read_missing_file_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.md");
        let err = read_to_string(&path, &RetryConfig::with_attempts(5))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("present.md");
        std::fs::write(&path, "# Present\n").unwrap();
        let contents = read_to_string(&path, &RetryConfig::default()).await.unwrap();
        assert_eq!(contents, "# Present\n");
    }
}
