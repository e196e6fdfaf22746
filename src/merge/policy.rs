//! Poll policy and cooperative cancellation

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Default number of mergeability checks per MR
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Default delay between mergeability checks
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(500);

/// Fixed-budget retry policy for mergeability polling
///
/// GitLab computes `merge_status` asynchronously after an MR is created, so
/// the first few reads may say `checking`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Maximum number of `get_merge_request` calls
    pub max_attempts: u32,
    /// Delay between two consecutive calls
    pub interval: Duration,
}

impl PollPolicy {
    /// Create a policy; `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Upper bound on time spent sleeping for one MR
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Cooperative cancellation flag, checked before each project starts
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Create a flag that is not cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; projects already in flight still finish
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
