//! Invite service: organization and colleague invites.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InviteType {
    Colleague,
    Patient,
    Organization,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub token: String,
    pub invite_type: InviteType,
    pub organization_entity_id: String,
    #[serde(default)]
    pub inviter_entity_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendColleagueInviteRequest {
    pub organization_entity_id: String,
    pub inviter_entity_id: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
}

#[async_trait]
pub trait InviteService: Send + Sync {
    async fn lookup_invite(&self, token: &str) -> UpstreamResult<Invite>;
    async fn send_colleague_invite(&self, req: SendColleagueInviteRequest) -> UpstreamResult<()>;
    async fn mark_invite_consumed(&self, token: &str) -> UpstreamResult<()>;
}

pub struct NoopInviteService;

#[async_trait]
impl InviteService for NoopInviteService {
    async fn lookup_invite(&self, token: &str) -> UpstreamResult<Invite> {
        Err(UpstreamError::not_found(token))
    }

    async fn send_colleague_invite(&self, _req: SendColleagueInviteRequest) -> UpstreamResult<()> {
        Ok(())
    }

    async fn mark_invite_consumed(&self, _token: &str) -> UpstreamResult<()> {
        Ok(())
    }
}
