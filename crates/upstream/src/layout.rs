//! Layout service: visit layout definitions and their versions.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitLayout {
    pub id: String,
    pub name: String,
    pub current_version_id: String,
    #[serde(default)]
    pub category_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitLayoutVersion {
    pub id: String,
    pub layout_id: String,
    /// Intake and review container documents, serialized by the layout service.
    #[serde(default)]
    pub intake_json: String,
    #[serde(default)]
    pub review_json: String,
}

#[async_trait]
pub trait LayoutService: Send + Sync {
    async fn visit_layout(&self, layout_id: &str) -> UpstreamResult<VisitLayout>;
    async fn visit_layout_version(&self, version_id: &str) -> UpstreamResult<VisitLayoutVersion>;
    async fn visit_layouts_by_category(
        &self,
        category_id: &str,
    ) -> UpstreamResult<Vec<VisitLayout>>;
}

pub struct NoopLayoutService;

#[async_trait]
impl LayoutService for NoopLayoutService {
    async fn visit_layout(&self, layout_id: &str) -> UpstreamResult<VisitLayout> {
        Err(UpstreamError::not_found(layout_id))
    }

    async fn visit_layout_version(&self, version_id: &str) -> UpstreamResult<VisitLayoutVersion> {
        Err(UpstreamError::not_found(version_id))
    }

    async fn visit_layouts_by_category(
        &self,
        _category_id: &str,
    ) -> UpstreamResult<Vec<VisitLayout>> {
        Ok(Vec::new())
    }
}
