//! postMessage and cloneMessage.

use std::collections::BTreeSet;

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use {
    meridian_common::{markup, parallel},
    meridian_upstream::{directory, payments, threading},
};

use crate::{
    error,
    queries::parts,
    raccess::ResourceAccessor,
    transform,
    types::{EndpointChannel, Message, Thread, ThreadItem},
};

// ── postMessage ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum PostMessageErrorCode {
    ThreadDoesNotExist,
    InvalidDestination,
}

#[derive(InputObject)]
pub struct DestinationInput {
    pub channel: EndpointChannel,
    pub id: String,
}

#[derive(InputObject)]
pub struct MessageInput {
    /// Markup source text.
    pub text: String,
    #[graphql(default)]
    pub internal: bool,
    pub destinations: Option<Vec<DestinationInput>>,
}

#[derive(InputObject)]
pub struct PostMessageInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "threadID")]
    pub thread_id: ID,
    pub uuid: Option<String>,
    pub msg: MessageInput,
}

#[derive(SimpleObject)]
pub struct PostMessagePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<PostMessageErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub item: Option<ThreadItem>,
    pub thread: Option<Thread>,
}

// ── cloneMessage ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CloneMessageErrorCode {
    SourceMessageDoesNotExist,
    #[graphql(name = "INVALID_MEDIA_ID")]
    InvalidMediaId,
}

#[derive(InputObject)]
pub struct CloneMessageInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    /// Clone from a thread item. Exactly one of itemID / savedMessageID.
    #[graphql(name = "itemID")]
    pub item_id: Option<ID>,
    #[graphql(name = "savedMessageID")]
    pub saved_message_id: Option<ID>,
    /// When set, attachments the destination thread cannot carry are
    /// dropped and reported as alerts.
    #[graphql(name = "forThreadID")]
    pub for_thread_id: Option<ID>,
}

#[derive(SimpleObject)]
pub struct CloneMessagePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<CloneMessageErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub message: Option<Message>,
    pub alerts: Option<Vec<String>>,
}

fn fail_post(
    client_mutation_id: Option<String>,
    code: PostMessageErrorCode,
    message: &str,
) -> PostMessagePayload {
    PostMessagePayload {
        client_mutation_id,
        success: false,
        error_code: Some(code),
        error_message: Some(message.to_string()),
        item: None,
        thread: None,
    }
}

/// Title by destination channel set, labels sorted and joined with " & ".
/// Internal messages and app-only delivery read "Internal".
fn message_title(internal: bool, destinations: &[threading::Endpoint]) -> String {
    if internal {
        return "Internal".to_string();
    }
    let labels: BTreeSet<&'static str> = destinations
        .iter()
        .map(|d| EndpointChannel::from(d.channel).title_label())
        .collect();
    if labels.is_empty() {
        "Internal".to_string()
    } else {
        labels.into_iter().collect::<Vec<_>>().join(" & ")
    }
}

fn wire_channel(channel: EndpointChannel) -> threading::EndpointChannel {
    match channel {
        EndpointChannel::App => threading::EndpointChannel::App,
        EndpointChannel::Sms => threading::EndpointChannel::Sms,
        EndpointChannel::Voice => threading::EndpointChannel::Voice,
        EndpointChannel::Email => threading::EndpointChannel::Email,
    }
}

/// A destination must correspond to a contact of the thread's primary
/// entity; SMS and voice deliver to phone contacts, email to email contacts.
fn destination_allowed(primary: &directory::Entity, dest: &DestinationInput) -> bool {
    let wanted = match dest.channel {
        EndpointChannel::Sms | EndpointChannel::Voice => directory::ContactType::Phone,
        EndpointChannel::Email => directory::ContactType::Email,
        EndpointChannel::App => directory::ContactType::App,
    };
    primary
        .contacts
        .iter()
        .any(|c| c.contact_type == wanted && c.value == dest.id)
}

async fn clone_attachment(
    ram: &ResourceAccessor,
    owner_entity_id: &str,
    attachment: threading::Attachment,
) -> Result<threading::Attachment, meridian_upstream::UpstreamError> {
    let data = match attachment.data {
        threading::AttachmentPayload::Image { mimetype, media_id } => {
            let media_id = ram.clone_media(&media_id, owner_entity_id).await?;
            threading::AttachmentPayload::Image { mimetype, media_id }
        }
        threading::AttachmentPayload::Video { mimetype, media_id } => {
            let media_id = ram.clone_media(&media_id, owner_entity_id).await?;
            threading::AttachmentPayload::Video { mimetype, media_id }
        }
        threading::AttachmentPayload::Audio {
            mimetype,
            media_id,
            duration_seconds,
        } => {
            let media_id = ram.clone_media(&media_id, owner_entity_id).await?;
            threading::AttachmentPayload::Audio {
                mimetype,
                media_id,
                duration_seconds,
            }
        }
        threading::AttachmentPayload::Document {
            mimetype,
            media_id,
            name,
        } => {
            let media_id = ram.clone_media(&media_id, owner_entity_id).await?;
            threading::AttachmentPayload::Document {
                mimetype,
                media_id,
                name,
            }
        }
        threading::AttachmentPayload::PaymentRequest { payment_id } => {
            let source = ram.payment(&payment_id).await?;
            let created = ram
                .create_payment(payments::CreatePaymentRequest {
                    requesting_entity_id: owner_entity_id.to_string(),
                    amount_cents: source.amount_cents,
                    currency: source.currency,
                })
                .await?;
            threading::AttachmentPayload::PaymentRequest {
                payment_id: created.id,
            }
        }
        // Visit layouts and care plans are shared documents; the reference
        // carries over unchanged.
        keep @ (threading::AttachmentPayload::Visit { .. }
        | threading::AttachmentPayload::CarePlan { .. }) => keep,
    };
    Ok(threading::Attachment {
        content_id: String::new(),
        title: attachment.title,
        url: attachment.url,
        data,
    })
}

#[derive(Default)]
pub struct MessageMutations;

#[Object]
impl MessageMutations {
    /// Post a message to a thread as the caller's internal entity.
    #[graphql(name = "postMessage")]
    async fn post_message(
        &self,
        ctx: &Context<'_>,
        input: PostMessageInput,
    ) -> Result<PostMessagePayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let thread_id = input.thread_id.as_str();
        let row = match ram.thread(thread_id, "").await {
            Ok(row) => row,
            Err(e) if e.is_not_found() => {
                return Ok(fail_post(
                    input.client_mutation_id,
                    PostMessageErrorCode::ThreadDoesNotExist,
                    "Thread does not exist.",
                ));
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
        if caller.entity_type != directory::EntityType::Internal {
            return Err(error::not_authorized());
        }

        let parsed = markup::parse(&input.msg.text)
            .map_err(|err| async_graphql::Error::new(format!("invalid message text: {err}")))?;
        let plain = parsed.plain_text();

        let mut destinations = Vec::new();
        if let Some(wanted) = &input.msg.destinations
            && !wanted.is_empty()
        {
            if row.primary_entity_id.is_empty() {
                return Ok(fail_post(
                    input.client_mutation_id,
                    PostMessageErrorCode::InvalidDestination,
                    "This conversation has no recipient for external delivery.",
                ));
            }
            let primary = ram
                .entity(&row.primary_entity_id)
                .await
                .map_err(|e| rc.upstream(e))?;
            for dest in wanted {
                if !destination_allowed(&primary, dest) {
                    return Ok(fail_post(
                        input.client_mutation_id,
                        PostMessageErrorCode::InvalidDestination,
                        "One of the destinations is not a contact of this conversation.",
                    ));
                }
                destinations.push(threading::Endpoint {
                    channel: wire_channel(dest.channel),
                    id: dest.id.clone(),
                });
            }
        }

        let caller_name = transform::entity(&caller, config).display_name;
        let summary = if caller_name.is_empty() {
            plain.clone()
        } else {
            format!("{caller_name}: {plain}")
        };
        let title = message_title(input.msg.internal, &destinations);

        let resp = match ram
            .post_message(threading::PostMessageRequest {
                thread_id: thread_id.to_string(),
                from_entity_id: caller.id.clone(),
                uuid: input.uuid.unwrap_or_default(),
                source: threading::Endpoint {
                    channel: threading::EndpointChannel::App,
                    id: caller.id.clone(),
                },
                text: input.msg.text.clone(),
                summary,
                title,
                destinations,
                internal: input.msg.internal,
                attachments: Vec::new(),
            })
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() => {
                return Ok(fail_post(
                    input.client_mutation_id,
                    PostMessageErrorCode::ThreadDoesNotExist,
                    "Thread does not exist.",
                ));
            }
            Err(e) => return Err(rc.upstream(e)),
        };

        let item = transform::thread_item(&resp.item, config).map_err(|e| rc.internal(e))?;
        let threads = transform::hydrate_threads(
            vec![transform::thread(&resp.thread)],
            ram,
            config,
        )
        .await
        .map_err(|e| rc.upstream(e))?;
        Ok(PostMessagePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            item: Some(item),
            thread: threads.into_iter().next(),
        })
    }

    /// Copy a message from a thread item or a saved message so it can be
    /// posted again. Media attachments are cloned, payment requests are
    /// re-issued, layout-backed attachments carry over by reference.
    #[graphql(name = "cloneMessage")]
    async fn clone_message(
        &self,
        ctx: &Context<'_>,
        input: CloneMessageInput,
    ) -> Result<CloneMessagePayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;

        let fail = |client_mutation_id, code: CloneMessageErrorCode, message: &str| {
            Ok(CloneMessagePayload {
                client_mutation_id,
                success: false,
                error_code: Some(code),
                error_message: Some(message.to_string()),
                message: None,
                alerts: None,
            })
        };

        let (content, organization_id) = match (&input.item_id, &input.saved_message_id) {
            (Some(item_id), None) => match ram.thread_item(item_id.as_str()).await {
                Ok(item) => match item.data {
                    threading::ThreadItemPayload::Message(m) => (m, item.organization_id),
                    _ => {
                        return fail(
                            input.client_mutation_id,
                            CloneMessageErrorCode::SourceMessageDoesNotExist,
                            "That item is not a message.",
                        );
                    }
                },
                Err(e) if e.is_not_found() => {
                    return fail(
                        input.client_mutation_id,
                        CloneMessageErrorCode::SourceMessageDoesNotExist,
                        "The source message does not exist.",
                    );
                }
                Err(e) => return Err(rc.upstream(e)),
            },
            (None, Some(saved_id)) => {
                let mut saved = ram
                    .saved_messages(threading::SavedMessagesKey::Ids(vec![
                        saved_id.to_string(),
                    ]))
                    .await
                    .map_err(|e| rc.upstream(e))?;
                match saved.pop() {
                    Some(m) => (m.content, m.organization_id),
                    None => {
                        return fail(
                            input.client_mutation_id,
                            CloneMessageErrorCode::SourceMessageDoesNotExist,
                            "The source message does not exist.",
                        );
                    }
                }
            }
            _ => {
                return Err(async_graphql::Error::new(
                    "exactly one of itemID and savedMessageID is required",
                ));
            }
        };

        let caller = ram
            .entity_in_org_for_account_id(&organization_id, &account.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_authorized()
                } else {
                    rc.upstream(e)
                }
            })?;

        // Attachment gating for the destination thread, when supplied.
        let mut attachments = content.attachments.clone();
        let mut alerts = Vec::new();
        if let Some(thread_id) = &input.for_thread_id {
            let target = ram
                .thread(thread_id.as_str(), "")
                .await
                .map_err(|e| rc.upstream(e))?;
            attachments.retain(|a| {
                let keep = match a.data.attachment_type() {
                    threading::AttachmentType::Video => {
                        target.permissions.allow_video_attachments
                    }
                    _ => true,
                };
                if !keep {
                    alerts.push("Video attachments are not supported in that conversation and were removed.".to_string());
                }
                keep
            });
        }

        let futs: Vec<_> = attachments
            .into_iter()
            .map(|a| clone_attachment(ram, &caller.id, a))
            .collect();
        let cloned = match parallel::all(futs).await {
            Ok(cloned) => cloned,
            Err(e) if e.is_not_found() => {
                return fail(
                    input.client_mutation_id,
                    CloneMessageErrorCode::InvalidMediaId,
                    "An attachment could not be copied.",
                );
            }
            Err(e) => return Err(rc.upstream(e)),
        };

        let message = threading::MessageData {
            attachments: cloned,
            ..content
        };
        Ok(CloneMessagePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            message: Some(transform::message(&message, config)),
            alerts: if alerts.is_empty() {
                None
            } else {
                alerts.dedup();
                Some(alerts)
            },
        })
    }
}
