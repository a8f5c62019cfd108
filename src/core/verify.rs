// ─── Integrity Verifier ───
// Content-addressed cache hit test: pure over (path, digest).

use std::path::Path;

use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;

use crate::core::error::{PickaxeError, PickaxeResult};

/// Correctness does not depend on the chunk size; 64 KiB keeps reads bounded.
const CHUNK_SIZE: usize = 64 * 1024;

/// Check a local file against an expected SHA-1 hex digest.
///
/// - No digest requested → `Ok(true)` (explicit trust escape).
/// - File missing → `Ok(false)` without reading.
/// - Digest comparison is case-insensitive.
/// - Any other I/O error propagates, so callers can tell "file invalid"
///   from "cannot read file".
pub async fn verify_digest(path: &Path, expected: Option<&str>) -> PickaxeResult<bool> {
    let Some(expected) = expected else {
        return Ok(true);
    };

    match file_digest(path).await? {
        Some(actual) => Ok(actual.eq_ignore_ascii_case(expected)),
        None => Ok(false),
    }
}

/// Streamed SHA-1 hex digest of a file; `None` when the file is missing.
pub async fn file_digest(path: &Path) -> PickaxeResult<Option<String>> {
    let mut file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(PickaxeError::io(path, e)),
    };

    let mut hasher = Sha1::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| PickaxeError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(Some(hex::encode(hasher.finalize())))
}

/// SHA-1 hex digest of a byte slice. Shared by tests and the fetch path.
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
