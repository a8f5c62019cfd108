// ─── Version Manifest ───
// Parses a version JSON and evaluates OS rules for libraries.

use std::collections::HashMap;

use serde::Deserialize;

/// A fully parsed version manifest. Read-only input to the pipeline.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionManifest {
    pub id: Option<String>,
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexRef>,
    #[serde(default)]
    pub libraries: Vec<LibraryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct VersionDownloads {
    pub client: Option<RemoteArtifact>,
}

/// A downloadable artifact as the manifest describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteArtifact {
    pub sha1: String,
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexRef {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

// ─── Library Entry with Rules ───

#[derive(Debug, Deserialize)]
pub struct LibraryEntry {
    /// Maven coordinate `group:artifact:version[:classifier]`.
    pub name: String,
    #[serde(default)]
    pub downloads: Option<LibraryDownloads>,
    #[serde(default)]
    pub rules: Option<Vec<LibraryRule>>,
    /// Per-platform native classifier names, possibly with `${arch}`.
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct LibraryDownloads {
    pub artifact: Option<LibraryArtifact>,
    #[serde(default)]
    pub classifiers: Option<HashMap<String, LibraryArtifact>>,
}

/// Library artifact with its path relative to the libraries directory.
#[derive(Debug, Clone, Deserialize)]
pub struct LibraryArtifact {
    pub path: String,
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

// ─── OS Rule Evaluation ───

#[derive(Debug, Deserialize)]
pub struct LibraryRule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Deserialize)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
}

impl LibraryEntry {
    /// Evaluate whether this library applies to `platform`.
    ///
    /// Rules logic:
    /// - If no rules → allowed.
    /// - Process rules top-to-bottom. Start with "disallowed".
    /// - Each rule sets "allow" or "disallow" if its OS matches (or if no
    ///   OS is specified).
    /// - Final state determines inclusion.
    pub fn applies_to(&self, platform: &str) -> bool {
        let rules = match &self.rules {
            Some(r) => r,
            None => return true,
        };

        let mut allowed = false;

        for rule in rules {
            let os_matches = match &rule.os {
                None => true,
                Some(os) => match &os.name {
                    None => true,
                    Some(name) => name == platform,
                },
            };

            if os_matches {
                allowed = rule.action == RuleAction::Allow;
            }
        }

        allowed
    }

    /// Resolved native classifier name for `platform`, if any.
    ///
    /// `unknown` platforms never match a natives map, so such libraries
    /// degrade to being skipped.
    pub fn native_classifier(&self, platform: &str) -> Option<String> {
        let natives = self.natives.as_ref()?;
        natives.get(platform).map(|template| {
            let arch = if cfg!(target_pointer_width = "64") {
                "64"
            } else {
                "32"
            };
            template.replace("${arch}", arch)
        })
    }
}

/// Platform name used by manifest rules and natives maps.
///
/// `unknown` matches nothing and is the graceful-degradation path on
/// unsupported hosts.
pub fn current_platform_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else if cfg!(target_os = "linux") {
        "linux"
    } else {
        "unknown"
    }
}

impl VersionManifest {
    /// `major.minor` of the manifest's version id (`"1.20.4"` → `(1, 20)`).
    pub fn major_minor(&self) -> Option<(u32, u32)> {
        let id = self.id.as_deref()?;
        let mut parts = id.split('.');
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next()?.parse().ok()?;
        Some((major, minor))
    }
}
