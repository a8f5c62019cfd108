//! Integration tests for the acquisition pipeline against a mock HTTP
//! server.

use std::sync::{Arc, Mutex};

use httpmock::prelude::*;
use tempfile::tempdir;
use uuid::Uuid;

use pickaxe::core::config::DownloaderConfig;
use pickaxe::core::downloader::Downloader;
use pickaxe::core::verify::{sha1_hex, verify_digest};
use pickaxe::{
    DownloadSources, DownloadState, GameDirs, Orchestrator, Outcome, PickaxeError, ProgressSink,
    VersionManifest,
};

struct RecordingSink {
    ratios: Mutex<Vec<f64>>,
    outcomes: Mutex<Vec<Outcome>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            ratios: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        })
    }
}

impl ProgressSink for RecordingSink {
    fn on_progress(&self, _run: Uuid, ratio: f64) {
        self.ratios.lock().unwrap().push(ratio);
    }

    fn on_finished(&self, _run: Uuid, outcome: Outcome) {
        self.outcomes.lock().unwrap().push(outcome);
    }
}

/// Sources that only ever touch the mock server.
fn test_sources(server: &MockServer) -> DownloadSources {
    DownloadSources {
        asset_bases: vec![server.url("/assets")],
        library_base: server.url("/maven"),
        host_rewrites: vec![],
    }
}

fn orchestrator(
    root: &std::path::Path,
    server: &MockServer,
    sink: Arc<RecordingSink>,
) -> Orchestrator {
    Orchestrator::new(
        GameDirs::new(root),
        test_sources(server),
        &DownloaderConfig::default(),
        sink,
    )
    .unwrap()
}

// ── Mirrored fetcher ────────────────────────────────────

#[tokio::test]
async fn fetcher_falls_back_to_later_mirrors() {
    let server = MockServer::start();
    let content = b"mirror payload";

    server.mock(|when, then| {
        when.method(GET).path("/bad1");
        then.status(500);
    });
    server.mock(|when, then| {
        when.method(GET).path("/bad2");
        then.status(404);
    });
    let good = server.mock(|when, then| {
        when.method(GET).path("/good");
        then.status(200).body(content);
    });

    let temp = tempdir().unwrap();
    let dest = temp.path().join("artifact.jar");
    let downloader = Downloader::new(&DownloaderConfig::default()).unwrap();

    let mut chunk_bytes = 0u64;
    downloader
        .fetch_mirrored(
            &[
                server.url("/bad1"),
                server.url("/bad2"),
                server.url("/good"),
            ],
            &dest,
            |n| chunk_bytes += n,
        )
        .await
        .unwrap();

    good.assert();
    assert_eq!(std::fs::read(&dest).unwrap(), content);
    assert_eq!(chunk_bytes, content.len() as u64);
}

#[tokio::test]
async fn fetcher_exhausts_all_mirrors_and_leaves_no_file() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/bad1");
        then.status(502);
    });
    server.mock(|when, then| {
        when.method(GET).path("/bad2");
        then.status(503);
    });

    let temp = tempdir().unwrap();
    let dest = temp.path().join("artifact.jar");
    let downloader = Downloader::new(&DownloaderConfig::default()).unwrap();

    let err = downloader
        .fetch_mirrored(&[server.url("/bad1"), server.url("/bad2")], &dest, |_| {})
        .await
        .unwrap_err();

    // The last underlying error is carried; earlier ones are dropped.
    match err {
        PickaxeError::MirrorsExhausted { source, .. } => match *source {
            PickaxeError::HttpStatus { status, .. } => assert_eq!(status, 503),
            other => panic!("expected HttpStatus, got {other}"),
        },
        other => panic!("expected MirrorsExhausted, got {other}"),
    }
    assert!(!dest.exists());
}

// ── Full orchestration ──────────────────────────────────

struct TestFixture {
    client_bytes: &'static [u8],
    asset_one: &'static [u8],
    asset_two: &'static [u8],
    lib_bytes: &'static [u8],
}

impl TestFixture {
    fn new() -> Self {
        Self {
            client_bytes: b"client jar bytes",
            asset_one: b"asset one content",
            asset_two: b"asset two content",
            lib_bytes: b"library jar bytes",
        }
    }

    /// Mount every artifact mock once. Order: index, client, asset one,
    /// asset two, library.
    fn mount<'a>(&self, server: &'a MockServer) -> Vec<httpmock::Mock<'a>> {
        let asset_one_sha = sha1_hex(self.asset_one);
        let asset_two_sha = sha1_hex(self.asset_two);

        let index_body = serde_json::json!({
            "objects": {
                "minecraft/sounds/one.ogg": { "hash": asset_one_sha, "size": self.asset_one.len() },
                "minecraft/lang/two.json": { "hash": asset_two_sha, "size": self.asset_two.len() }
            }
        })
        .to_string();

        let index = server.mock(|when, then| {
            when.method(GET).path("/indexes/12.json");
            then.status(200).body(&index_body);
        });
        let client = server.mock(|when, then| {
            when.method(GET).path("/objects/client.jar");
            then.status(200).body(self.client_bytes);
        });
        let asset_one = server.mock(|when, then| {
            when.method(GET)
                .path(format!("/assets/{}/{}", &asset_one_sha[..2], asset_one_sha));
            then.status(200).body(self.asset_one);
        });
        let asset_two = server.mock(|when, then| {
            when.method(GET)
                .path(format!("/assets/{}/{}", &asset_two_sha[..2], asset_two_sha));
            then.status(200).body(self.asset_two);
        });
        let lib = server.mock(|when, then| {
            when.method(GET).path("/lib/widget-2.0.jar");
            then.status(200).body(self.lib_bytes);
        });

        vec![index, client, asset_one, asset_two, lib]
    }

    fn manifest(&self, server: &MockServer) -> VersionManifest {
        let client_sha = sha1_hex(self.client_bytes);
        let lib_sha = sha1_hex(self.lib_bytes);

        serde_json::from_value(serde_json::json!({
            "id": "1.20.4",
            "downloads": {
                "client": {
                    "sha1": client_sha,
                    "size": self.client_bytes.len(),
                    "url": server.url("/objects/client.jar")
                }
            },
            "assetIndex": { "id": "12", "url": server.url("/indexes/12.json") },
            "libraries": [{
                "name": "com.example:widget:2.0",
                "downloads": {
                    "artifact": {
                        "path": "com/example/widget/2.0/widget-2.0.jar",
                        "sha1": lib_sha,
                        "size": self.lib_bytes.len(),
                        "url": server.url("/lib/widget-2.0.jar")
                    }
                }
            }]
        }))
        .unwrap()
    }
}

#[tokio::test]
async fn full_run_finishes_and_verifies_every_destination() {
    let server = MockServer::start();
    let temp = tempdir().unwrap();
    let fixture = TestFixture::new();
    let _mocks = fixture.mount(&server);
    let sink = RecordingSink::new();

    let handle = orchestrator(temp.path(), &server, sink.clone()).start(fixture.manifest(&server));
    let state = handle.wait().await;

    assert_eq!(state, DownloadState::Finished);
    assert_eq!(sink.outcomes.lock().unwrap().as_slice(), &[Outcome::Success]);

    // Layout and integrity of every destination.
    let client = temp.path().join("versions/1.20.4/1.20.4.jar");
    assert_eq!(std::fs::read(&client).unwrap(), fixture.client_bytes);
    assert!(
        verify_digest(&client, Some(&sha1_hex(fixture.client_bytes)))
            .await
            .unwrap()
    );

    let asset_sha = sha1_hex(fixture.asset_one);
    let asset = temp
        .path()
        .join(format!("assets/objects/{}/{}", &asset_sha[..2], asset_sha));
    assert!(verify_digest(&asset, Some(&asset_sha)).await.unwrap());

    assert!(temp.path().join("assets/indexes/12.json").exists());
    assert!(temp
        .path()
        .join("libraries/com/example/widget/2.0/widget-2.0.jar")
        .exists());

    // Published ratios only ever move forward.
    let ratios = sink.ratios.lock().unwrap();
    assert!(ratios.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*ratios.last().unwrap(), 1.0);
}

#[tokio::test]
async fn second_run_refetches_nothing_but_the_index() {
    let server = MockServer::start();
    let temp = tempdir().unwrap();
    let fixture = TestFixture::new();
    let mocks = fixture.mount(&server);

    let sink = RecordingSink::new();
    let orch = orchestrator(temp.path(), &server, sink);
    assert_eq!(
        orch.start(fixture.manifest(&server)).wait().await,
        DownloadState::Finished
    );

    // Same manifest, fresh run: every artifact verifies in place.
    assert_eq!(
        orch.start(fixture.manifest(&server)).wait().await,
        DownloadState::Finished
    );

    let (index, client, asset_one, asset_two, lib) =
        (&mocks[0], &mocks[1], &mocks[2], &mocks[3], &mocks[4]);
    // Plan construction re-reads the index document; artifacts do not
    // move over the network again.
    index.assert_hits(2);
    client.assert_hits(1);
    asset_one.assert_hits(1);
    asset_two.assert_hits(1);
    lib.assert_hits(1);
}

#[tokio::test]
async fn corrupt_download_is_deleted_and_fails_the_run() {
    let server = MockServer::start();
    let temp = tempdir().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/objects/client.jar");
        then.status(200).body(b"tampered bytes");
    });

    let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
        "id": "1.20.4",
        "downloads": {
            "client": {
                "sha1": sha1_hex(b"pristine bytes"),
                "size": 14,
                "url": server.url("/objects/client.jar")
            }
        },
        "libraries": []
    }))
    .unwrap();

    let sink = RecordingSink::new();
    let state = orchestrator(temp.path(), &server, sink.clone())
        .start(manifest)
        .wait()
        .await;

    match state {
        DownloadState::Error { message } => assert!(message.contains("SHA-1 mismatch")),
        other => panic!("expected Error, got {other:?}"),
    }
    // Never left in place, never accepted.
    assert!(!temp.path().join("versions/1.20.4/1.20.4.jar").exists());

    let outcomes = sink.outcomes.lock().unwrap();
    assert!(matches!(outcomes.as_slice(), [Outcome::Failure(_)]));
}

#[tokio::test]
async fn exhausted_mirrors_fail_the_whole_run() {
    let server = MockServer::start();
    let temp = tempdir().unwrap();

    server.mock(|when, then| {
        when.method(GET).path("/objects/client.jar");
        then.status(500);
    });

    let manifest: VersionManifest = serde_json::from_value(serde_json::json!({
        "id": "1.20.4",
        "downloads": {
            "client": {
                "sha1": "aa11",
                "size": 10,
                "url": server.url("/objects/client.jar")
            }
        },
        "libraries": []
    }))
    .unwrap();

    let sink = RecordingSink::new();
    let state = orchestrator(temp.path(), &server, sink)
        .start(manifest)
        .wait()
        .await;

    match state {
        DownloadState::Error { message } => assert!(message.contains("all mirrors exhausted")),
        other => panic!("expected Error, got {other:?}"),
    }
}
