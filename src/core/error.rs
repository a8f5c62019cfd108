use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the acquisition pipeline.
/// Every module returns `Result<T, PickaxeError>`.
#[derive(Debug, Error)]
pub enum PickaxeError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Download failed for {url}: HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// Every candidate URL for one artifact failed; wraps the last error.
    #[error("all mirrors exhausted for {path:?}: {source}")]
    MirrorsExhausted {
        path: PathBuf,
        #[source]
        source: Box<PickaxeError>,
    },

    // ── Integrity ───────────────────────────────────────
    #[error("SHA-1 mismatch for {path:?}: expected {expected}, got {actual}")]
    DigestMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    // ── Manifest ────────────────────────────────────────
    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Invalid Maven coordinate: {0}")]
    InvalidCoordinate(String),

    // ── JSON ────────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ── Run control ─────────────────────────────────────
    #[error("download run cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the crate.
pub type PickaxeResult<T> = Result<T, PickaxeError>;

impl PickaxeError {
    /// Wrap an `std::io::Error` with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PickaxeError::Io {
            path: path.into(),
            source,
        }
    }
}
