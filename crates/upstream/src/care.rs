//! Care service: visits and visit categories.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    pub id: String,
    pub name: String,
    pub layout_version_id: String,
    pub entity_id: String,
    pub organization_id: String,
    #[serde(default)]
    pub creator_entity_id: String,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub submitted_timestamp: u64,
    #[serde(default)]
    pub triaged: bool,
    #[serde(default)]
    pub created_timestamp: u64,
    /// Patient answers keyed by question id, serialized by the care service.
    #[serde(default)]
    pub answers_json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub layout_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitRequest {
    pub name: String,
    pub layout_version_id: String,
    pub entity_id: String,
    pub organization_id: String,
    pub creator_entity_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitsRequest {
    pub organization_id: String,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub submitted_only: bool,
    #[serde(default)]
    pub triaged: Option<bool>,
}

#[async_trait]
pub trait CareService: Send + Sync {
    async fn visit(&self, visit_id: &str) -> UpstreamResult<Visit>;
    async fn visits(&self, req: VisitsRequest) -> UpstreamResult<Vec<Visit>>;
    async fn create_visit(&self, req: CreateVisitRequest) -> UpstreamResult<Visit>;
    async fn submit_visit(&self, visit_id: &str, answers_json: &str) -> UpstreamResult<()>;
    async fn triage_visit(&self, visit_id: &str) -> UpstreamResult<()>;
    async fn visit_categories(&self, organization_id: &str) -> UpstreamResult<Vec<VisitCategory>>;
}

pub struct NoopCareService;

#[async_trait]
impl CareService for NoopCareService {
    async fn visit(&self, visit_id: &str) -> UpstreamResult<Visit> {
        Err(UpstreamError::not_found(visit_id))
    }

    async fn visits(&self, _req: VisitsRequest) -> UpstreamResult<Vec<Visit>> {
        Ok(Vec::new())
    }

    async fn create_visit(&self, req: CreateVisitRequest) -> UpstreamResult<Visit> {
        Err(UpstreamError::not_found(req.layout_version_id))
    }

    async fn submit_visit(&self, visit_id: &str, _answers_json: &str) -> UpstreamResult<()> {
        Err(UpstreamError::not_found(visit_id))
    }

    async fn triage_visit(&self, visit_id: &str) -> UpstreamResult<()> {
        Err(UpstreamError::not_found(visit_id))
    }

    async fn visit_categories(
        &self,
        _organization_id: &str,
    ) -> UpstreamResult<Vec<VisitCategory>> {
        Ok(Vec::new())
    }
}
