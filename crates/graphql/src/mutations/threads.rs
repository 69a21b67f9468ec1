//! Thread lifecycle: createThread, updateFollowingForThreads,
//! markThreadsAsRead, updateThreadTitle, deleteThread.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use {
    meridian_common::parallel,
    meridian_upstream::{directory, threading},
};

use crate::{
    error,
    queries::parts,
    transform,
    types::Thread,
};

// ── createThread ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CreateThreadErrorCode {
    ExistingThread,
}

#[derive(InputObject)]
pub struct CreateThreadInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub uuid: Option<String>,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    /// Phone number or email address to start the conversation with.
    #[graphql(name = "contactValue")]
    pub contact_value: String,
    #[graphql(name = "firstName")]
    pub first_name: Option<String>,
    #[graphql(name = "lastName")]
    pub last_name: Option<String>,
}

#[derive(SimpleObject)]
pub struct CreateThreadPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<CreateThreadErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub thread: Option<Thread>,
    /// All threads already reaching this contact in the organization.
    #[graphql(name = "existingThreads")]
    pub existing_threads: Option<Vec<Thread>>,
    /// True when the designated existing thread belongs to an entity whose
    /// name does not match the supplied one.
    #[graphql(name = "nameDiffers")]
    pub name_differs: Option<bool>,
}

// ── Following / read state / title / delete ─────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ThreadErrorCode {
    ThreadDoesNotExist,
}

const THREAD_DOES_NOT_EXIST_MESSAGE: &str = "Thread does not exist.";

#[derive(InputObject)]
pub struct UpdateFollowingForThreadsInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    #[graphql(name = "threadIDs")]
    pub thread_ids: Vec<ID>,
    pub following: bool,
}

#[derive(SimpleObject)]
pub struct UpdateFollowingForThreadsPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ThreadErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub threads: Option<Vec<Thread>>,
}

#[derive(InputObject)]
pub struct MarkThreadsAsReadInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    #[graphql(name = "threadIDs")]
    pub thread_ids: Vec<ID>,
    /// False reverts the threads to unread.
    #[graphql(default = true)]
    pub seen: bool,
}

#[derive(SimpleObject)]
pub struct MarkThreadsAsReadPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ThreadErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
}

#[derive(InputObject)]
pub struct UpdateThreadTitleInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "threadID")]
    pub thread_id: ID,
    pub title: String,
}

#[derive(SimpleObject)]
pub struct UpdateThreadTitlePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ThreadErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub thread: Option<Thread>,
}

#[derive(InputObject)]
pub struct DeleteThreadInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "threadID")]
    pub thread_id: ID,
}

#[derive(SimpleObject)]
pub struct DeleteThreadPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ThreadErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
}

fn name_matches(e: &directory::Entity, first: &str, last: &str) -> bool {
    !first.is_empty()
        && e.info.first_name.eq_ignore_ascii_case(first)
        && e.info.last_name.eq_ignore_ascii_case(last)
}

fn contact_type_for(value: &str) -> directory::ContactType {
    if value.contains('@') {
        directory::ContactType::Email
    } else {
        directory::ContactType::Phone
    }
}

#[derive(Default)]
pub struct ThreadMutations;

#[Object]
impl ThreadMutations {
    /// Start a conversation with an outside contact. If the contact already
    /// has a thread in the organization the call fails with EXISTING_THREAD
    /// and returns the candidates instead of creating a duplicate.
    #[graphql(name = "createThread")]
    async fn create_thread(
        &self,
        ctx: &Context<'_>,
        input: CreateThreadInput,
    ) -> Result<CreateThreadPayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;
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

        let candidates: Vec<directory::Entity> = ram
            .entities_by_contact(&input.contact_value)
            .await
            .map_err(|e| rc.upstream(e))?
            .into_iter()
            .filter(|e| {
                e.entity_type == directory::EntityType::External && e.is_member_of(org_id)
            })
            .collect();

        if !candidates.is_empty() {
            let futs: Vec<_> = candidates
                .iter()
                .map(|e| ram.threads_for_member(&e.id, true))
                .collect();
            let thread_lists = parallel::all(futs).await.map_err(|e| rc.upstream(e))?;
            let mut existing: Vec<(&directory::Entity, threading::Thread)> = Vec::new();
            for (entity, threads) in candidates.iter().zip(thread_lists) {
                for t in threads {
                    existing.push((entity, t));
                }
            }
            if !existing.is_empty() {
                let first = input.first_name.as_deref().unwrap_or("");
                let last = input.last_name.as_deref().unwrap_or("");
                let picked = existing
                    .iter()
                    .position(|(e, _)| name_matches(e, first, last))
                    .or_else(|| {
                        existing
                            .iter()
                            .enumerate()
                            .max_by_key(|(_, (_, t))| t.last_message_timestamp)
                            .map(|(i, _)| i)
                    })
                    .unwrap_or(0);
                let name_differs = !name_matches(existing[picked].0, first, last);
                let threads: Vec<Thread> = existing
                    .iter()
                    .map(|(e, t)| {
                        let thread = transform::thread(t);
                        thread.seed_primary_entity(Some(transform::entity(e, config)));
                        thread
                    })
                    .collect();
                let picked_thread = threads[picked].clone();
                return Ok(CreateThreadPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(CreateThreadErrorCode::ExistingThread),
                    error_message: Some(
                        "A conversation with that contact already exists.".to_string(),
                    ),
                    thread: Some(picked_thread),
                    existing_threads: Some(threads),
                    name_differs: Some(name_differs),
                });
            }
        }

        // The create-for contact goes at position 0 so default-channel
        // selection downstream picks it.
        let entity = ram
            .create_entity(directory::CreateEntityRequest {
                entity_type: directory::EntityType::External,
                initial_membership_entity_id: org_id.to_string(),
                contacts: vec![directory::Contact {
                    id: String::new(),
                    contact_type: contact_type_for(&input.contact_value),
                    value: input.contact_value.clone(),
                    provisioned: false,
                    verified: false,
                    label: String::new(),
                }],
                info: directory::EntityInfo {
                    first_name: input.first_name.unwrap_or_default(),
                    last_name: input.last_name.unwrap_or_default(),
                    ..directory::EntityInfo::default()
                },
                external_id: None,
                requested_information: directory::RequestedInformation::default(),
            })
            .await
            .map_err(|e| rc.upstream(e))?;

        let row = ram
            .create_empty_thread(threading::CreateEmptyThreadRequest {
                uuid: input.uuid.unwrap_or_default(),
                organization_id: org_id.to_string(),
                from_entity_id: caller.id.clone(),
                source: threading::Endpoint {
                    channel: threading::EndpointChannel::App,
                    id: caller.id.clone(),
                },
                primary_entity_id: entity.id.clone(),
                summary: String::new(),
            })
            .await
            .map_err(|e| rc.upstream(e))?;

        let thread = transform::thread(&row);
        thread.seed_primary_entity(Some(transform::entity(&entity, config)));
        Ok(CreateThreadPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            thread: Some(thread),
            existing_threads: None,
            name_differs: None,
        })
    }

    /// Follow or unfollow a batch of threads as the caller's entity.
    /// Idempotent per (thread, entity) pair.
    #[graphql(name = "updateFollowingForThreads")]
    async fn update_following_for_threads(
        &self,
        ctx: &Context<'_>,
        input: UpdateFollowingForThreadsInput,
    ) -> Result<UpdateFollowingForThreadsPayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let caller = ram
            .entity_in_org_for_account_id(input.organization_id.as_str(), &account.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_authorized()
                } else {
                    rc.upstream(e)
                }
            })?;
        let futs: Vec<_> = input
            .thread_ids
            .iter()
            .map(|thread_id| {
                let mut req = threading::UpdateThreadRequest {
                    thread_id: thread_id.to_string(),
                    actor_entity_id: caller.id.clone(),
                    ..threading::UpdateThreadRequest::default()
                };
                if input.following {
                    req.add_follower_entity_ids = vec![caller.id.clone()];
                } else {
                    req.remove_follower_entity_ids = vec![caller.id.clone()];
                }
                ram.update_thread(req)
            })
            .collect();
        let responses = match parallel::all(futs).await {
            Ok(responses) => responses,
            Err(e) if e.is_not_found() => {
                return Ok(UpdateFollowingForThreadsPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ThreadErrorCode::ThreadDoesNotExist),
                    error_message: Some(THREAD_DOES_NOT_EXIST_MESSAGE.to_string()),
                    threads: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        let threads: Vec<Thread> = responses
            .iter()
            .map(|r| transform::thread(&r.thread))
            .collect();
        let threads = transform::hydrate_threads(threads, ram, config)
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(UpdateFollowingForThreadsPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            threads: Some(threads),
        })
    }

    #[graphql(name = "markThreadsAsRead")]
    async fn mark_threads_as_read(
        &self,
        ctx: &Context<'_>,
        input: MarkThreadsAsReadInput,
    ) -> Result<MarkThreadsAsReadPayload> {
        let (rc, ram, _config) = parts(ctx)?;
        let account = rc.require_account()?;
        let caller = ram
            .entity_in_org_for_account_id(input.organization_id.as_str(), &account.id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_authorized()
                } else {
                    rc.upstream(e)
                }
            })?;
        match ram
            .mark_threads_as_read(threading::MarkThreadsAsReadRequest {
                entity_id: caller.id,
                thread_ids: input.thread_ids.iter().map(|id| id.to_string()).collect(),
                seen: input.seen,
            })
            .await
        {
            Ok(()) => Ok(MarkThreadsAsReadPayload {
                client_mutation_id: input.client_mutation_id,
                success: true,
                error_code: None,
                error_message: None,
            }),
            Err(e) if e.is_not_found() => Ok(MarkThreadsAsReadPayload {
                client_mutation_id: input.client_mutation_id,
                success: false,
                error_code: Some(ThreadErrorCode::ThreadDoesNotExist),
                error_message: Some(THREAD_DOES_NOT_EXIST_MESSAGE.to_string()),
            }),
            Err(e) => Err(rc.upstream(e)),
        }
    }

    #[graphql(name = "updateThreadTitle")]
    async fn update_thread_title(
        &self,
        ctx: &Context<'_>,
        input: UpdateThreadTitleInput,
    ) -> Result<UpdateThreadTitlePayload> {
        let (rc, ram, config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let thread_id = input.thread_id.as_str();
        let row = match ram.thread(thread_id, "").await {
            Ok(row) => row,
            Err(e) if e.is_not_found() => {
                return Ok(UpdateThreadTitlePayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ThreadErrorCode::ThreadDoesNotExist),
                    error_message: Some(THREAD_DOES_NOT_EXIST_MESSAGE.to_string()),
                    thread: None,
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
        let resp = ram
            .update_thread(threading::UpdateThreadRequest {
                thread_id: thread_id.to_string(),
                actor_entity_id: caller.id,
                title: Some(input.title),
                ..threading::UpdateThreadRequest::default()
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        let threads =
            transform::hydrate_threads(vec![transform::thread(&resp.thread)], ram, config)
                .await
                .map_err(|e| rc.upstream(e))?;
        Ok(UpdateThreadTitlePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            thread: threads.into_iter().next(),
        })
    }

    #[graphql(name = "deleteThread")]
    async fn delete_thread(
        &self,
        ctx: &Context<'_>,
        input: DeleteThreadInput,
    ) -> Result<DeleteThreadPayload> {
        let (rc, ram, _config) = parts(ctx)?;
        let account = rc.require_provider()?;
        let thread_id = input.thread_id.as_str();
        let row = match ram.thread(thread_id, "").await {
            Ok(row) => row,
            Err(e) if e.is_not_found() => {
                return Ok(DeleteThreadPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ThreadErrorCode::ThreadDoesNotExist),
                    error_message: Some(THREAD_DOES_NOT_EXIST_MESSAGE.to_string()),
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
        ram.delete_thread(thread_id, &caller.id)
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(DeleteThreadPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
        })
    }
}
