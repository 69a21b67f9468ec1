//! Scheduled message mutations.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use {
    meridian_common::markup,
    meridian_upstream::threading,
};

use crate::{error, queries::parts, transform, types::ScheduledMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CreateScheduledMessageErrorCode {
    ThreadDoesNotExist,
}

#[derive(InputObject)]
pub struct CreateScheduledMessageInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "threadID")]
    pub thread_id: ID,
    /// Unix seconds at which the threading service delivers the message.
    #[graphql(name = "scheduledFor")]
    pub scheduled_for: u64,
    pub text: String,
    #[graphql(default)]
    pub internal: bool,
}

#[derive(SimpleObject)]
pub struct CreateScheduledMessagePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<CreateScheduledMessageErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    #[graphql(name = "scheduledMessage")]
    pub scheduled_message: Option<ScheduledMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum DeleteScheduledMessageErrorCode {
    ScheduledMessageNotFound,
}

#[derive(InputObject)]
pub struct DeleteScheduledMessageInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "scheduledMessageID")]
    pub scheduled_message_id: ID,
}

#[derive(SimpleObject)]
pub struct DeleteScheduledMessagePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<DeleteScheduledMessageErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
}

#[derive(Default)]
pub struct ScheduledMessageMutations;

#[Object]
impl ScheduledMessageMutations {
    #[graphql(name = "createScheduledMessage")]
    async fn create_scheduled_message(
        &self,
        ctx: &Context<'_>,
        input: CreateScheduledMessageInput,
    ) -> Result<CreateScheduledMessagePayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let thread_id = input.thread_id.as_str();
        let row = match ram.thread(thread_id, "").await {
            Ok(row) => row,
            Err(e) if e.is_not_found() => {
                return Ok(CreateScheduledMessagePayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(CreateScheduledMessageErrorCode::ThreadDoesNotExist),
                    error_message: Some("Thread does not exist.".to_string()),
                    scheduled_message: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        let caller = ram
            .entity_in_org_for_account_id(&row.organization_id, &account.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_authorized()
                } else {
                    rc.upstream(e)
                }
            })?;

        let parsed = markup::parse(&input.text)
            .map_err(|err| async_graphql::Error::new(format!("invalid message text: {err}")))?;
        let caller_name = transform::entity(&caller, config).display_name;
        let plain = parsed.plain_text();
        let summary = if caller_name.is_empty() {
            plain
        } else {
            format!("{caller_name}: {plain}")
        };

        let created = ram
            .create_scheduled_message(threading::CreateScheduledMessageRequest {
                thread_id: thread_id.to_string(),
                actor_entity_id: caller.id.clone(),
                scheduled_for: input.scheduled_for,
                content: threading::MessageData {
                    text: input.text,
                    summary,
                    title: if input.internal {
                        "Internal".to_string()
                    } else {
                        String::new()
                    },
                    source: threading::Endpoint {
                        channel: threading::EndpointChannel::App,
                        id: caller.id,
                    },
                    destinations: Vec::new(),
                    attachments: Vec::new(),
                    refs: Vec::new(),
                    status: None,
                },
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(CreateScheduledMessagePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            scheduled_message: Some(transform::scheduled_message(&created, config)),
        })
    }

    #[graphql(name = "deleteScheduledMessage")]
    async fn delete_scheduled_message(
        &self,
        ctx: &Context<'_>,
        input: DeleteScheduledMessageInput,
    ) -> Result<DeleteScheduledMessagePayload> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_provider()?;
        match ram
            .delete_scheduled_message(input.scheduled_message_id.as_str())
            .await
        {
            Ok(()) => Ok(DeleteScheduledMessagePayload {
                client_mutation_id: input.client_mutation_id,
                success: true,
                error_code: None,
                error_message: None,
            }),
            Err(e) if e.is_not_found() => Ok(DeleteScheduledMessagePayload {
                client_mutation_id: input.client_mutation_id,
                success: false,
                error_code: Some(DeleteScheduledMessageErrorCode::ScheduledMessageNotFound),
                error_message: Some("The scheduled message no longer exists.".to_string()),
            }),
            Err(e) => Err(rc.upstream(e)),
        }
    }
}
