// ─── Download Orchestrator ───
// Drives a plan through the verifier and the mirrored fetcher, publishing
// lifecycle state snapshots over a watch channel.

mod sink;
mod state;

pub use sink::{LogSink, Outcome, ProgressSink};
pub use state::DownloadState;

use std::sync::Arc;

use futures_util::stream::{self, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::core::assets::{AssetIndexSource, HttpAssetIndexSource};
use crate::core::config::{DownloadSources, DownloaderConfig, GameDirs};
use crate::core::downloader::Downloader;
use crate::core::error::{PickaxeError, PickaxeResult};
use crate::core::http::build_http_client;
use crate::core::manifest::VersionManifest;
use crate::core::plan::{DownloadRequest, PlanBuilder};
use crate::core::verify::{file_digest, verify_digest};

use state::Progress;

/// Drives manifest downloads end to end. One `start` call is one run with
/// its own state machine instance; a failed run is retried only by an
/// explicit new `start`.
#[derive(Clone)]
pub struct Orchestrator {
    dirs: GameDirs,
    sources: DownloadSources,
    concurrency: usize,
    downloader: Downloader,
    index_source: Arc<dyn AssetIndexSource>,
    sink: Arc<dyn ProgressSink>,
}

/// Live handle on a running orchestration.
pub struct DownloadHandle {
    run: Uuid,
    states: watch::Receiver<DownloadState>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl DownloadHandle {
    pub fn run_id(&self) -> Uuid {
        self.run
    }

    /// Read-only stream of state snapshots.
    pub fn states(&self) -> watch::Receiver<DownloadState> {
        self.states.clone()
    }

    /// Stop issuing new fetches promptly. Completed artifacts stay on
    /// disk; the in-flight partial file is removed best-effort.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the run to end and return its terminal state.
    pub async fn wait(self) -> DownloadState {
        let _ = self.task.await;
        let state = self.states.borrow().clone();
        state
    }
}

impl Orchestrator {
    pub fn new(
        dirs: GameDirs,
        sources: DownloadSources,
        config: &DownloaderConfig,
        sink: Arc<dyn ProgressSink>,
    ) -> PickaxeResult<Self> {
        let client = build_http_client(config)?;
        Ok(Self {
            dirs,
            sources,
            concurrency: config.concurrency.max(1),
            downloader: Downloader::from_client(client.clone()),
            index_source: Arc::new(HttpAssetIndexSource::new(client)),
            sink,
        })
    }

    /// Replace the asset-index source collaborator.
    pub fn with_index_source(mut self, source: Arc<dyn AssetIndexSource>) -> Self {
        self.index_source = source;
        self
    }

    /// Start a run on a background task and hand back its live handle.
    pub fn start(&self, manifest: VersionManifest) -> DownloadHandle {
        let (tx, states) = watch::channel(DownloadState::Idle);
        let cancel = CancellationToken::new();
        let run = Uuid::new_v4();

        let worker = self.clone();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            worker.run(run, manifest, tx, token).await;
        });

        DownloadHandle {
            run,
            states,
            cancel,
            task,
        }
    }

    async fn run(
        self,
        run: Uuid,
        manifest: VersionManifest,
        tx: watch::Sender<DownloadState>,
        cancel: CancellationToken,
    ) {
        info!("Run {run}: downloading version {:?}", manifest.id);

        match self.drive(run, &manifest, &tx, &cancel).await {
            Ok(()) => {
                tx.send_replace(DownloadState::Finished);
                self.sink.on_finished(run, Outcome::Success);
            }
            Err(err) => {
                let message = err.to_string();
                tx.send_replace(DownloadState::Error {
                    message: message.clone(),
                });
                self.sink.on_finished(run, Outcome::Failure(message));
            }
        }
    }

    async fn drive(
        &self,
        run: Uuid,
        manifest: &VersionManifest,
        tx: &watch::Sender<DownloadState>,
        cancel: &CancellationToken,
    ) -> PickaxeResult<()> {
        tx.send_replace(DownloadState::Downloading {
            total: 0,
            downloaded: 0,
            ratio: 0.0,
        });
        self.sink.on_progress(run, 0.0);

        let plan = PlanBuilder::new(self.dirs.clone(), self.sources.clone())
            .build(manifest, &*self.index_source)
            .await?;

        let total = plan.total_size;
        tx.send_replace(DownloadState::Downloading {
            total,
            downloaded: 0,
            ratio: 0.0,
        });

        let progress = Arc::new(Progress::new(total, tx.clone(), self.sink.clone(), run));

        let mut results = stream::iter(plan.requests.into_iter().map(|request| {
            let progress = Arc::clone(&progress);
            let cancel = cancel.clone();
            async move { self.process_request(request, &progress, &cancel).await }
        }))
        .buffer_unordered(self.concurrency);

        // First failure wins and stops new fetches; results arriving after
        // that are discarded.
        let mut first_err: Option<PickaxeError> = None;
        while let Some(result) = results.next().await {
            if let Err(err) = result {
                if first_err.is_none() && !matches!(err, PickaxeError::Cancelled) {
                    cancel.cancel();
                    first_err = Some(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None if cancel.is_cancelled() => Err(PickaxeError::Cancelled),
            None => Ok(()),
        }
    }

    async fn process_request(
        &self,
        request: DownloadRequest,
        progress: &Progress,
        cancel: &CancellationToken,
    ) -> PickaxeResult<()> {
        if cancel.is_cancelled() {
            return Err(PickaxeError::Cancelled);
        }

        // Resumability: a previously completed download is never
        // re-fetched.
        if self.already_valid(&request).await? {
            debug!("Already valid, skipping fetch: {:?}", request.dest);
            progress.complete_request(request.size);
            return Ok(());
        }

        let fetch = async {
            let mut streamed = 0u64;
            self.downloader
                .fetch_mirrored(&request.urls, &request.dest, |n| {
                    streamed += n;
                    progress.publish(streamed);
                })
                .await
        };

        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = tokio::fs::remove_file(&request.dest).await;
                return Err(PickaxeError::Cancelled);
            }
            result = fetch => result?,
        }

        // A corrupt download is never left in place and never accepted.
        if let Some(expected) = request.sha1.as_deref() {
            let actual = file_digest(&request.dest).await?;
            let matches = actual
                .as_deref()
                .is_some_and(|a| a.eq_ignore_ascii_case(expected));
            if !matches {
                let _ = tokio::fs::remove_file(&request.dest).await;
                return Err(PickaxeError::DigestMismatch {
                    path: request.dest.clone(),
                    expected: expected.to_ascii_lowercase(),
                    actual: actual.unwrap_or_default(),
                });
            }
        }

        progress.complete_request(request.size);
        Ok(())
    }

    /// Content-addressed cache hit test over `(path, digest)`.
    async fn already_valid(&self, request: &DownloadRequest) -> PickaxeResult<bool> {
        match request.sha1.as_deref() {
            Some(_) => verify_digest(&request.dest, request.sha1.as_deref()).await,
            // No digest requested: any existing file is trusted.
            None => tokio::fs::try_exists(&request.dest)
                .await
                .map_err(|e| PickaxeError::io(&request.dest, e)),
        }
    }
}
