//! Progress reporting and cooperative cancellation.
//!
//! Long-running batches report through an injected [`ProgressSink`]; the
//! sink's absence ([`NullProgress`]) must never change computed results.
//! [`CancellationToken`] is the cooperative stop flag checked between pairs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receiver for human-readable progress of a running batch.
///
/// Implementations must be cheap and non-blocking; they are called from
/// worker threads.
pub trait ProgressSink: Sync {
    /// Free-form status line.
    fn message(&self, _text: &str) {}

    /// Overall completion in `[0, 1]`.
    fn set_progress(&self, _fraction: f64) {}
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgress;

impl ProgressSink for NullProgress {}

/// Forwards progress to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn message(&self, text: &str) {
        log::info!("{text}");
    }

    fn set_progress(&self, fraction: f64) {
        log::debug!("progress: {:.0}%", fraction * 100.0);
    }
}

/// Shared flag requesting that a running batch stop.
///
/// Cloning shares the flag. Cancellation is sticky: once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
