use tracing::{debug, info, warn};
use uuid::Uuid;

/// Terminal outcome forwarded to the progress sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

/// Collaborator notified of download progress, e.g. a notification
/// surface. Called synchronously on the worker; implementations must not
/// block.
pub trait ProgressSink: Send + Sync {
    /// A new overall ratio was published for the run.
    fn on_progress(&self, run: Uuid, ratio: f64);
    /// The run reached a terminal state.
    fn on_finished(&self, run: Uuid, outcome: Outcome);
}

/// Default sink that reports through tracing.
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_progress(&self, run: Uuid, ratio: f64) {
        debug!("Run {run}: {:.1}%", ratio * 100.0);
    }

    fn on_finished(&self, run: Uuid, outcome: Outcome) {
        match outcome {
            Outcome::Success => info!("Run {run} finished"),
            Outcome::Failure(message) => warn!("Run {run} failed: {message}"),
        }
    }
}
