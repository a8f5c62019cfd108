// ─── Pipeline Configuration ───
// Filesystem layout, download sources and fetcher tuning.

use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR_NAME: &str = "Pickaxe";

/// Filesystem layout of a game root directory.
///
/// All pipeline destinations are derived from here:
///   versions/<id>/<id>.jar
///   assets/indexes/<id>.json
///   assets/objects/<2-char prefix>/<hash>
///   libraries/<maven path>
#[derive(Debug, Clone)]
pub struct GameDirs {
    root: PathBuf,
}

impl GameDirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default game root under the platform data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn client_jar(&self, version_id: &str) -> PathBuf {
        self.root
            .join("versions")
            .join(version_id)
            .join(format!("{version_id}.jar"))
    }

    pub fn asset_index(&self, index_id: &str) -> PathBuf {
        self.root
            .join("assets")
            .join("indexes")
            .join(format!("{index_id}.json"))
    }

    /// Content-addressed asset object path: the hash is the filename.
    pub fn asset_object(&self, hash: &str) -> PathBuf {
        self.root
            .join("assets")
            .join("objects")
            .join(&hash[..2])
            .join(hash)
    }

    pub fn library(&self, maven_path: &str) -> PathBuf {
        self.root.join("libraries").join(maven_path)
    }
}

impl Default for GameDirs {
    fn default() -> Self {
        Self::new(Self::default_root())
    }
}

// ─── Download Sources ───

const RESOURCES_URL: &str = "https://resources.download.minecraft.net";
const LIBRARIES_URL: &str = "https://libraries.minecraft.net";

/// CDN bases and mirror rewrites that feed candidate URL lists.
///
/// Candidate order is always official first, mirrors after.
#[derive(Debug, Clone)]
pub struct DownloadSources {
    /// Ordered base URLs for content-addressed asset objects.
    pub asset_bases: Vec<String>,
    /// Maven repository used when a library carries no artifact descriptor.
    pub library_base: String,
    /// `(official prefix, mirror prefix)` pairs applied to manifest URLs.
    pub host_rewrites: Vec<(String, String)>,
}

impl Default for DownloadSources {
    fn default() -> Self {
        Self {
            asset_bases: vec![
                RESOURCES_URL.to_string(),
                "https://bmclapi2.bangbang93.com/assets".to_string(),
            ],
            library_base: LIBRARIES_URL.to_string(),
            host_rewrites: vec![
                (
                    "https://piston-data.mojang.com".to_string(),
                    "https://bmclapi2.bangbang93.com".to_string(),
                ),
                (
                    "https://launcher.mojang.com".to_string(),
                    "https://bmclapi2.bangbang93.com".to_string(),
                ),
                (
                    "https://libraries.minecraft.net".to_string(),
                    "https://bmclapi2.bangbang93.com/maven".to_string(),
                ),
                (
                    "https://resources.download.minecraft.net".to_string(),
                    "https://bmclapi2.bangbang93.com/assets".to_string(),
                ),
            ],
        }
    }
}

impl DownloadSources {
    /// Expand one manifest URL into its ordered candidate list.
    ///
    /// The original URL comes first; a rewritten mirror URL is appended for
    /// every matching host prefix.
    pub fn candidates(&self, url: &str) -> Vec<String> {
        let mut urls = vec![url.to_string()];
        for (official, mirror) in &self.host_rewrites {
            if let Some(rest) = url.strip_prefix(official.as_str()) {
                urls.push(format!("{mirror}{rest}"));
            }
        }
        urls
    }

    /// Candidate list for an asset object `<2-char prefix>/<hash>` suffix.
    pub fn asset_candidates(&self, hash: &str) -> Vec<String> {
        self.asset_bases
            .iter()
            .map(|base| format!("{}/{}/{}", base.trim_end_matches('/'), &hash[..2], hash))
            .collect()
    }

    /// Candidate list for a Maven path under the default library repository.
    pub fn library_candidates(&self, maven_path: &str) -> Vec<String> {
        let url = format!(
            "{}/{}",
            self.library_base.trim_end_matches('/'),
            maven_path
        );
        self.candidates(&url)
    }
}

// ─── Fetcher Tuning ───

/// Tuning knobs for the mirrored fetcher and the orchestration pool.
#[derive(Debug, Clone)]
pub struct DownloaderConfig {
    pub user_agent: String,
    /// Whole-request deadline for a single URL attempt.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Maximum number of requests in flight at once. 1 = sequential.
    pub concurrency: usize,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            user_agent: format!("Pickaxe/{}", env!("CARGO_PKG_VERSION")),
            request_timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(15),
            concurrency: 8,
        }
    }
}
