//! IP call mutations: createVideoCall, updateCall.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use meridian_upstream::{directory, excomms};

use crate::{
    error,
    queries::parts,
    transform,
    types::{Call, CallState},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CreateVideoCallErrorCode {
    CallingNotAllowed,
    InvalidRecipient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum UpdateCallErrorCode {
    CallDoesNotExist,
    InvalidStateTransition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum NetworkType {
    Unknown,
    Wifi,
    Cellular,
}

impl From<NetworkType> for excomms::NetworkType {
    fn from(n: NetworkType) -> Self {
        match n {
            NetworkType::Unknown => Self::Unknown,
            NetworkType::Wifi => Self::Wifi,
            NetworkType::Cellular => Self::Cellular,
        }
    }
}

fn wire_state(state: CallState) -> excomms::CallState {
    match state {
        CallState::Pending => excomms::CallState::Pending,
        CallState::Accepted => excomms::CallState::Accepted,
        CallState::Declined => excomms::CallState::Declined,
        CallState::Connected => excomms::CallState::Connected,
        CallState::Failed => excomms::CallState::Failed,
        CallState::Completed => excomms::CallState::Completed,
    }
}

#[derive(InputObject)]
pub struct CreateVideoCallInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    #[graphql(name = "recipientEntityID")]
    pub recipient_entity_id: ID,
    #[graphql(default = true)]
    #[graphql(name = "videoEnabled")]
    pub video_enabled: bool,
    #[graphql(name = "networkType")]
    pub network_type: Option<NetworkType>,
}

#[derive(SimpleObject)]
pub struct CreateVideoCallPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<CreateVideoCallErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub call: Option<Call>,
}

#[derive(InputObject)]
pub struct UpdateCallInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "callID")]
    pub call_id: ID,
    #[graphql(name = "callState")]
    pub call_state: CallState,
    #[graphql(name = "networkType")]
    pub network_type: Option<NetworkType>,
}

#[derive(SimpleObject)]
pub struct UpdateCallPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<UpdateCallErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub call: Option<Call>,
}

#[derive(Default)]
pub struct CallMutations;

#[Object]
impl CallMutations {
    /// Start a two-party call with another entity in the organization.
    #[graphql(name = "createVideoCall")]
    async fn create_video_call(
        &self,
        ctx: &Context<'_>,
        input: CreateVideoCallInput,
    ) -> Result<CreateVideoCallPayload> {
        let (rc, ram, _config) = parts(ctx)?;
        let account = rc.require_account()?;

        if !rc.features.video_calling {
            return Ok(CreateVideoCallPayload {
                client_mutation_id: input.client_mutation_id,
                success: false,
                error_code: Some(CreateVideoCallErrorCode::CallingNotAllowed),
                error_message: Some("Calling is not enabled for this client.".to_string()),
                call: None,
            });
        }

        let org_id = input.organization_id.as_str();
        let caller = ram
            .entity_in_org_for_account_id(org_id, &account.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_authorized()
                } else {
                    rc.upstream(e)
                }
            })?;

        let recipient = match ram.entity(input.recipient_entity_id.as_str()).await {
            Ok(e) => e,
            Err(e) if e.is_not_found() => {
                return Ok(CreateVideoCallPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(CreateVideoCallErrorCode::InvalidRecipient),
                    error_message: Some("That person cannot receive calls.".to_string()),
                    call: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        // Calls ring through the app, so the recipient needs an account and
        // must sit in the same organization.
        if !recipient.is_member_of(org_id)
            || !recipient.has_account()
            || recipient.entity_type == directory::EntityType::Organization
        {
            return Ok(CreateVideoCallPayload {
                client_mutation_id: input.client_mutation_id,
                success: false,
                error_code: Some(CreateVideoCallErrorCode::InvalidRecipient),
                error_message: Some("That person cannot receive calls.".to_string()),
                call: None,
            });
        }

        let ip_call = ram
            .initiate_ip_call(excomms::InitiateIpCallRequest {
                caller_entity_id: caller.id,
                recipient_entity_ids: vec![recipient.id],
                video_enabled: input.video_enabled,
                network_type: input.network_type.map(Into::into),
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        let call = transform::call(&ip_call, &account.id).map_err(|e| rc.internal(e))?;
        Ok(CreateVideoCallPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            call: Some(call),
        })
    }

    /// Advance the viewer's state in a call. Transitions outside
    /// PENDING→ACCEPTED/DECLINED/FAILED, ACCEPTED→CONNECTED/FAILED,
    /// CONNECTED→COMPLETED/FAILED are rejected.
    #[graphql(name = "updateCall")]
    async fn update_call(
        &self,
        ctx: &Context<'_>,
        input: UpdateCallInput,
    ) -> Result<UpdateCallPayload> {
        let (rc, ram, _config) = parts(ctx)?;
        let account = rc.require_account()?;
        let ip_call = match ram
            .update_ip_call(excomms::UpdateIpCallRequest {
                call_id: input.call_id.to_string(),
                account_id: account.id.clone(),
                state: wire_state(input.call_state),
                network_type: input.network_type.map(Into::into),
            })
            .await
        {
            Ok(call) => call,
            Err(e) if e.is_not_found() => {
                return Ok(UpdateCallPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(UpdateCallErrorCode::CallDoesNotExist),
                    error_message: Some("The call no longer exists.".to_string()),
                    call: None,
                });
            }
            Err(e) if e.is_failed_precondition() || e.is_invalid_argument() => {
                return Ok(UpdateCallPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(UpdateCallErrorCode::InvalidStateTransition),
                    error_message: Some("The call cannot move to that state.".to_string()),
                    call: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        let call = transform::call(&ip_call, &account.id).map_err(|e| rc.internal(e))?;
        Ok(UpdateCallPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            call: Some(call),
        })
    }
}
