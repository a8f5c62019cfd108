use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use uuid::Uuid;

use super::sink::ProgressSink;

/// Lifecycle of one orchestration run, observed as read-only snapshots.
///
/// `Finished` and `Error` are terminal; a new run starts a fresh state
/// machine.
#[derive(Debug, Clone, PartialEq)]
pub enum DownloadState {
    Idle,
    Downloading {
        total: u64,
        downloaded: u64,
        ratio: f64,
    },
    Finished,
    Error {
        message: String,
    },
}

impl DownloadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, DownloadState::Finished | DownloadState::Error { .. })
    }
}

/// Ratio is only meaningful for a non-zero total; clamped because actual
/// transfer can exceed a plan's under-reported total.
pub(crate) fn ratio_of(total: u64, downloaded: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (downloaded as f64 / total as f64).min(1.0)
    }
}

/// Aggregates byte progress and publishes monotonic `Downloading`
/// snapshots.
///
/// `completed` advances by a request's expected size once it verifies;
/// in-flight bytes come from the fetcher's chunk callback. Publication
/// goes through a max-guard, so the published `downloaded` never
/// decreases across mirror restarts or worker interleaving.
pub(crate) struct Progress {
    total: u64,
    completed: AtomicU64,
    tx: watch::Sender<DownloadState>,
    sink: Arc<dyn ProgressSink>,
    run: Uuid,
}

impl Progress {
    pub fn new(
        total: u64,
        tx: watch::Sender<DownloadState>,
        sink: Arc<dyn ProgressSink>,
        run: Uuid,
    ) -> Self {
        Self {
            total,
            completed: AtomicU64::new(0),
            tx,
            sink,
            run,
        }
    }

    /// Publish `completed + in_flight` if it advances the run.
    pub fn publish(&self, in_flight: u64) {
        let candidate = self.completed.load(Ordering::Acquire) + in_flight;
        let mut advanced = false;

        self.tx.send_modify(|state| {
            if let DownloadState::Downloading {
                total, downloaded, ratio,
            } = state
            {
                if candidate > *downloaded {
                    *downloaded = candidate;
                    *ratio = ratio_of(*total, candidate);
                    advanced = true;
                }
            }
        });

        if advanced {
            self.sink.on_progress(self.run, ratio_of(self.total, candidate));
        }
    }

    /// A request passed verification; its expected size joins the total.
    pub fn complete_request(&self, size: u64) {
        self.completed.fetch_add(size, Ordering::AcqRel);
        self.publish(0);
    }
}
