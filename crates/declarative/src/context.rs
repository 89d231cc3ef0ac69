//! Progress reporting for plan execution
//!
//! Keeps the crate free of any particular terminal UI.

use crate::types::Outcome;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting a batch of changes
    fn on_batch_start(&mut self, count: usize);

    /// Called when a change completes
    fn on_change_complete(&mut self, label: &str, outcome: &Outcome);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_change_complete(&mut self, _label: &str, _outcome: &Outcome) {}
    fn on_batch_complete(&mut self) {}
}
