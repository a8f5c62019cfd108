// ─── Asset Index ───
// Model for the manifest-referenced asset index document.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::error::{PickaxeError, PickaxeResult};

/// Top-level asset index JSON structure. Immutable once loaded.
#[derive(Debug, Deserialize)]
pub struct AssetIndex {
    pub objects: HashMap<String, AssetObject>,
}

/// One asset entry. The hash is both the integrity digest and the storage
/// key under `assets/objects/`.
#[derive(Debug, Deserialize)]
pub struct AssetObject {
    pub hash: String,
    pub size: u64,
}

impl AssetIndex {
    pub fn parse(raw: &str) -> PickaxeResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Source of the raw asset index document. Seam between plan construction
/// and the network.
#[async_trait]
pub trait AssetIndexSource: Send + Sync {
    /// Fetch the raw index document at `url`.
    async fn fetch_index(&self, url: &str) -> PickaxeResult<String>;
}

/// Plain HTTPS GET implementation over the shared client.
pub struct HttpAssetIndexSource {
    client: reqwest::Client,
}

impl HttpAssetIndexSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AssetIndexSource for HttpAssetIndexSource {
    async fn fetch_index(&self, url: &str) -> PickaxeResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(PickaxeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
