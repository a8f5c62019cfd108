pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::config::{DownloadSources, DownloaderConfig, GameDirs};
pub use crate::core::error::{PickaxeError, PickaxeResult};
pub use crate::core::manifest::VersionManifest;
pub use crate::core::orchestrator::{
    DownloadHandle, DownloadState, LogSink, Orchestrator, Outcome, ProgressSink,
};
pub use crate::core::plan::{DownloadPlan, DownloadRequest, PlanBuilder};

/// Initialize structured logging for a host application.
///
/// Hosts that already own a subscriber should skip this and just depend
/// on the `tracing` events the pipeline emits.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,pickaxe=debug")),
        )
        .init();
}
