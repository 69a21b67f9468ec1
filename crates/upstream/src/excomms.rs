//! External communications service: provisioned endpoints and IP calls.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionEmailAddressRequest {
    pub owner_entity_id: String,
    pub local_part: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionEmailAddressResponse {
    pub email_address: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProvisionPhoneNumberRequest {
    pub owner_entity_id: String,
    pub area_code: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionPhoneNumberResponse {
    pub phone_number: String,
}

// ── IP calls ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallRole {
    Caller,
    Recipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallState {
    Pending,
    Accepted,
    Declined,
    Connected,
    Failed,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    Unknown,
    Wifi,
    Cellular,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallParticipant {
    pub account_id: String,
    pub entity_id: String,
    pub role: CallRole,
    pub state: CallState,
    #[serde(default)]
    pub network_type: Option<NetworkType>,
    /// Per-participant token for the media session.
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub identity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpCall {
    pub id: String,
    #[serde(default)]
    pub video_enabled: bool,
    pub participants: Vec<CallParticipant>,
}

impl IpCall {
    /// The participant entry for the account viewing the call, if any.
    #[must_use]
    pub fn participant_for_account(&self, account_id: &str) -> Option<&CallParticipant> {
        self.participants.iter().find(|p| p.account_id == account_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateIpCallRequest {
    pub caller_entity_id: String,
    pub recipient_entity_ids: Vec<String>,
    pub video_enabled: bool,
    #[serde(default)]
    pub network_type: Option<NetworkType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIpCallRequest {
    pub call_id: String,
    pub account_id: String,
    pub state: CallState,
    #[serde(default)]
    pub network_type: Option<NetworkType>,
}

#[async_trait]
pub trait ExcommsService: Send + Sync {
    async fn provision_email_address(
        &self,
        req: ProvisionEmailAddressRequest,
    ) -> UpstreamResult<ProvisionEmailAddressResponse>;
    async fn provision_phone_number(
        &self,
        req: ProvisionPhoneNumberRequest,
    ) -> UpstreamResult<ProvisionPhoneNumberResponse>;
    async fn initiate_ip_call(&self, req: InitiateIpCallRequest) -> UpstreamResult<IpCall>;
    async fn ip_call(&self, call_id: &str) -> UpstreamResult<IpCall>;
    async fn pending_ip_calls(&self, account_id: &str) -> UpstreamResult<Vec<IpCall>>;
    async fn update_ip_call(&self, req: UpdateIpCallRequest) -> UpstreamResult<IpCall>;
}

pub struct NoopExcommsService;

#[async_trait]
impl ExcommsService for NoopExcommsService {
    async fn provision_email_address(
        &self,
        req: ProvisionEmailAddressRequest,
    ) -> UpstreamResult<ProvisionEmailAddressResponse> {
        Err(UpstreamError::not_found(req.owner_entity_id))
    }

    async fn provision_phone_number(
        &self,
        req: ProvisionPhoneNumberRequest,
    ) -> UpstreamResult<ProvisionPhoneNumberResponse> {
        Err(UpstreamError::not_found(req.owner_entity_id))
    }

    async fn initiate_ip_call(&self, req: InitiateIpCallRequest) -> UpstreamResult<IpCall> {
        Err(UpstreamError::not_found(req.caller_entity_id))
    }

    async fn ip_call(&self, call_id: &str) -> UpstreamResult<IpCall> {
        Err(UpstreamError::not_found(call_id))
    }

    async fn pending_ip_calls(&self, _account_id: &str) -> UpstreamResult<Vec<IpCall>> {
        Ok(Vec::new())
    }

    async fn update_ip_call(&self, req: UpdateIpCallRequest) -> UpstreamResult<IpCall> {
        Err(UpstreamError::not_found(req.call_id))
    }
}
