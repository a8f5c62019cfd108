use std::path::Path;

use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::core::config::DownloaderConfig;
use crate::core::error::{PickaxeError, PickaxeResult};
use crate::core::http::build_http_client;

/// Streaming fetcher with transparent mirror fallback.
///
/// Each candidate URL is tried exactly once, in order. Retrying a request
/// is the orchestrator's decision, never this type's.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new(config: &DownloaderConfig) -> PickaxeResult<Self> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wrap an already-built client (shared with other collaborators).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    // ── Mirrored fetch ──────────────────────────────────

    /// Stream one artifact to `dest`, trying each URL in order.
    ///
    /// `on_chunk(bytes)` fires after every chunk write; it is the sole
    /// progress signal this type emits. A failed URL never leaves partial
    /// bytes behind for the next candidate. When every URL fails, the
    /// returned `MirrorsExhausted` wraps the last error.
    pub async fn fetch_mirrored(
        &self,
        urls: &[String],
        dest: &Path,
        mut on_chunk: impl FnMut(u64),
    ) -> PickaxeResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PickaxeError::io(parent, e))?;
        }

        let mut last_err = None;
        for url in urls {
            match self.stream_to_file(url, dest, &mut on_chunk).await {
                Ok(()) => {
                    debug!("Downloaded: {} -> {:?}", url, dest);
                    return Ok(());
                }
                Err(err) => {
                    warn!("Mirror failed for {:?}: {} ({})", dest, url, err);
                    remove_partial(dest).await;
                    last_err = Some(err);
                }
            }
        }

        Err(PickaxeError::MirrorsExhausted {
            path: dest.to_path_buf(),
            source: Box::new(
                last_err.unwrap_or_else(|| PickaxeError::Manifest("no candidate URLs".into())),
            ),
        })
    }

    /// One streamed GET attempt. Writes chunk by chunk so progress stays
    /// fine-grained for large artifacts.
    async fn stream_to_file(
        &self,
        url: &str,
        dest: &Path,
        on_chunk: &mut impl FnMut(u64),
    ) -> PickaxeResult<()> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PickaxeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Write inside a block to ensure the handle is dropped immediately
        // (Windows holds the file otherwise).
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| PickaxeError::io(dest, e))?;

            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| PickaxeError::io(dest, e))?;
                on_chunk(chunk.len() as u64);
            }

            file.flush().await.map_err(|e| PickaxeError::io(dest, e))?;
        }

        Ok(())
    }
}

/// Best-effort cleanup of a half-written destination.
async fn remove_partial(dest: &Path) {
    let _ = tokio::fs::remove_file(dest).await;
}
