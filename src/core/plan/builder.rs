use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::core::assets::{AssetIndex, AssetIndexSource};
use crate::core::config::{DownloadSources, GameDirs};
use crate::core::error::{PickaxeError, PickaxeResult};
use crate::core::manifest::{current_platform_name, LibraryArtifact, LibraryEntry, VersionManifest};
use crate::core::maven::MavenCoordinate;
use crate::core::replacement::find_replacement;

use super::{DownloadPlan, DownloadRequest};

/// Turns a version manifest into a flat download plan.
///
/// Each library resolves to exactly one request: a replacement rule match,
/// a native classifier, or the generic artifact, in that precedence order.
pub struct PlanBuilder {
    dirs: GameDirs,
    sources: DownloadSources,
    platform: String,
}

impl PlanBuilder {
    pub fn new(dirs: GameDirs, sources: DownloadSources) -> Self {
        Self {
            dirs,
            sources,
            platform: current_platform_name().to_string(),
        }
    }

    /// Override the platform name (`windows | osx | linux | unknown`).
    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    /// Build the plan. Fetches and persists the asset index when the
    /// manifest references one.
    pub async fn build(
        &self,
        manifest: &VersionManifest,
        index_source: &dyn AssetIndexSource,
    ) -> PickaxeResult<DownloadPlan> {
        let mut plan = DownloadPlan::default();
        // Destinations are unique within a plan; content addressing makes
        // same-hash assets collapse here.
        let mut seen = HashSet::new();

        self.add_client(manifest, &mut plan, &mut seen)?;
        self.add_assets(manifest, index_source, &mut plan, &mut seen)
            .await?;
        self.add_libraries(manifest, &mut plan, &mut seen);

        info!(
            "Built download plan: {} requests, {} bytes known",
            plan.len(),
            plan.total_size
        );
        Ok(plan)
    }

    // ── Client artifact ─────────────────────────────────

    fn add_client(
        &self,
        manifest: &VersionManifest,
        plan: &mut DownloadPlan,
        seen: &mut HashSet<PathBuf>,
    ) -> PickaxeResult<()> {
        let Some(client) = manifest
            .downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
        else {
            return Ok(());
        };

        let id = manifest.id.as_deref().ok_or_else(|| {
            PickaxeError::Manifest("client download requires a version id".into())
        })?;

        push_unique(
            plan,
            seen,
            DownloadRequest {
                urls: self.sources.candidates(&client.url),
                dest: self.dirs.client_jar(id),
                sha1: Some(client.sha1.clone()),
                size: client.size,
            },
        );
        Ok(())
    }

    // ── Assets ──────────────────────────────────────────

    async fn add_assets(
        &self,
        manifest: &VersionManifest,
        index_source: &dyn AssetIndexSource,
        plan: &mut DownloadPlan,
        seen: &mut HashSet<PathBuf>,
    ) -> PickaxeResult<()> {
        let Some(index_ref) = manifest.asset_index.as_ref() else {
            return Ok(());
        };

        let raw = index_source.fetch_index(&index_ref.url).await?;
        let index = AssetIndex::parse(&raw)?;

        // Persist the fetched document verbatim, keyed by its identifier.
        let index_path = self.dirs.asset_index(&index_ref.id);
        if let Some(parent) = index_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PickaxeError::io(parent, e))?;
        }
        tokio::fs::write(&index_path, &raw)
            .await
            .map_err(|e| PickaxeError::io(&index_path, e))?;

        // Stable plan order regardless of map iteration order.
        let mut objects: Vec<_> = index.objects.iter().collect();
        objects.sort_by(|a, b| a.0.cmp(b.0));

        for (name, object) in objects {
            debug!("Asset {} -> {}", name, object.hash);
            push_unique(
                plan,
                seen,
                DownloadRequest {
                    urls: self.sources.asset_candidates(&object.hash),
                    dest: self.dirs.asset_object(&object.hash),
                    sha1: Some(object.hash.clone()),
                    size: object.size,
                },
            );
        }
        Ok(())
    }

    // ── Libraries ───────────────────────────────────────

    fn add_libraries(
        &self,
        manifest: &VersionManifest,
        plan: &mut DownloadPlan,
        seen: &mut HashSet<PathBuf>,
    ) {
        for library in &manifest.libraries {
            if !library.applies_to(&self.platform) {
                debug!("Skipping library (OS rule): {}", library.name);
                continue;
            }

            let coord = match MavenCoordinate::parse(&library.name) {
                Ok(c) => c,
                Err(_) => {
                    debug!("Skipping malformed coordinate: {}", library.name);
                    continue;
                }
            };

            let request = self.resolve_library(library, &coord, manifest);
            if let Some(request) = request {
                push_unique(plan, seen, request);
            }
        }
    }

    /// Resolve a library into its single concrete request.
    fn resolve_library(
        &self,
        library: &LibraryEntry,
        coord: &MavenCoordinate,
        manifest: &VersionManifest,
    ) -> Option<DownloadRequest> {
        // Case a: replacement rule. Replacement metadata carries no size.
        if let Some(rule) = find_replacement(coord, manifest.major_minor()) {
            debug!("Replacing library {} -> {}", library.name, rule.path);
            return Some(DownloadRequest {
                urls: self.sources.candidates(rule.url),
                dest: self.dirs.library(rule.path),
                sha1: Some(rule.sha1.to_string()),
                size: 0,
            });
        }

        let generic = library.downloads.as_ref().and_then(|d| d.artifact.as_ref());

        // Case b: native classifier for this platform.
        if library.natives.is_some() {
            if let Some(classifier) = library.native_classifier(&self.platform) {
                let declared = library
                    .downloads
                    .as_ref()
                    .and_then(|d| d.classifiers.as_ref())
                    .and_then(|c| c.get(&classifier));
                return Some(match declared {
                    Some(artifact) => self.descriptor_request(artifact),
                    None => self.synthesized_request(&coord.with_classifier(&classifier)),
                });
            }
            // Natives declared but nothing for this platform ("unknown"
            // included): use the generic descriptor when there is one,
            // otherwise skip the library silently.
            return generic.map(|artifact| self.descriptor_request(artifact));
        }

        // Case c: generic artifact, synthesized when no descriptor exists.
        Some(match generic {
            Some(artifact) => self.descriptor_request(artifact),
            None => self.synthesized_request(coord),
        })
    }

    fn descriptor_request(&self, artifact: &LibraryArtifact) -> DownloadRequest {
        DownloadRequest {
            urls: self.sources.candidates(&artifact.url),
            dest: self.dirs.library(&artifact.path),
            sha1: Some(artifact.sha1.clone()),
            size: artifact.size,
        }
    }

    /// Maven-style request for a coordinate with no artifact descriptor.
    fn synthesized_request(&self, coord: &MavenCoordinate) -> DownloadRequest {
        let path = coord.maven_path();
        DownloadRequest {
            urls: self.sources.library_candidates(&path),
            dest: self.dirs.library(&path),
            sha1: None,
            size: 0,
        }
    }
}

fn push_unique(plan: &mut DownloadPlan, seen: &mut HashSet<PathBuf>, request: DownloadRequest) {
    if seen.insert(request.dest.clone()) {
        plan.push(request);
    } else {
        debug!("Skipping duplicate destination: {:?}", request.dest);
    }
}
