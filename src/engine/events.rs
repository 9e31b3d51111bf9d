//! Run event notification.
//!
//! The engine reports through an observer trait rather than shared state:
//! calls are synchronous, arrive in sequencing order, and fire at most once
//! per event. Default methods are no-ops so callers implement only what
//! they render.

use super::error::InstallError;
use super::types::{InstallRun, InstallStage};

/// Progress snapshot emitted at stage transitions and before each package
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub stage: InstallStage,
    pub message: String,
    /// Packages finished so far
    pub completed: usize,
    /// Packages requested in total
    pub total: usize,
}

impl ProgressUpdate {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Observer for run events
pub trait Reporter {
    fn on_progress(&mut self, _update: &ProgressUpdate) {}
    fn on_error(&mut self, _error: &InstallError) {}
    fn on_warning(&mut self, _warning: &str) {}
    fn on_complete(&mut self, _run: &InstallRun) {}
}

/// Reporter that ignores every event
#[allow(dead_code)]
pub struct NoReporter;

impl Reporter for NoReporter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_is_zero_for_empty_runs() {
        let update = ProgressUpdate {
            stage: InstallStage::Installing,
            message: String::new(),
            completed: 0,
            total: 0,
        };
        assert!((update.percent() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percent_tracks_completion() {
        let update = ProgressUpdate {
            stage: InstallStage::Installing,
            message: String::new(),
            completed: 1,
            total: 4,
        };
        assert!((update.percent() - 25.0).abs() < f64::EPSILON);
    }
}
