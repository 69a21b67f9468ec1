//! Media service: stored media metadata and cloning.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaInfo {
    pub id: String,
    pub mimetype: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub duration_seconds: f64,
    #[serde(default)]
    pub size_bytes: u64,
}

#[async_trait]
pub trait MediaService: Send + Sync {
    async fn media_info(&self, media_id: &str) -> UpstreamResult<MediaInfo>;
    /// Copies a media object so the clone's lifecycle is independent of the
    /// original. Returns the clone's id.
    async fn clone_media(&self, media_id: &str, owner_id: &str) -> UpstreamResult<String>;
}

pub struct NoopMediaService;

#[async_trait]
impl MediaService for NoopMediaService {
    async fn media_info(&self, media_id: &str) -> UpstreamResult<MediaInfo> {
        Err(UpstreamError::not_found(media_id))
    }

    async fn clone_media(&self, media_id: &str, _owner_id: &str) -> UpstreamResult<String> {
        Err(UpstreamError::not_found(media_id))
    }
}
