use std::sync::Arc;

use {
    async_graphql::{Context, Enum, ID, Object, Result, SimpleObject, Union},
    tokio::sync::OnceCell,
};

use meridian_upstream::threading;

use crate::{
    context::{RequestContext, StaticConfig},
    raccess::ResourceAccessor,
    transform,
    types::{
        Connection, ConnectionArgs, Edge, Endpoint, Entity, Message, selecting_only_id,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ThreadKind {
    External,
    Team,
    SecureExternal,
    Support,
    Setup,
    LegacyTeam,
}

impl From<threading::ThreadType> for ThreadKind {
    fn from(t: threading::ThreadType) -> Self {
        match t {
            threading::ThreadType::External => Self::External,
            threading::ThreadType::Team => Self::Team,
            threading::ThreadType::SecureExternal => Self::SecureExternal,
            threading::ThreadType::Support => Self::Support,
            threading::ThreadType::Setup => Self::Setup,
            threading::ThreadType::LegacyTeam => Self::LegacyTeam,
        }
    }
}

/// Title shown when an external thread's primary entity has no name yet.
pub const UNNAMED_THREAD_TITLE: &str = "Someone";

#[derive(Clone)]
pub struct Thread {
    pub id: ID,
    pub data: threading::Thread,
    /// Resolved title, when known without fetching (explicit markup title or
    /// a batch-hydrated one). Absent means derive from the primary entity.
    pub title: Option<String>,
    pub subtitle: String,
    /// Request-scoped primary-entity slot; shared across field resolvers so
    /// concurrent selections issue at most one fetch.
    primary: Arc<OnceCell<Option<Entity>>>,
}

impl Thread {
    #[must_use]
    pub fn new(data: threading::Thread, title: Option<String>, subtitle: String) -> Self {
        Self {
            id: ID(data.id.clone()),
            data,
            title,
            subtitle,
            primary: Arc::new(OnceCell::new()),
        }
    }

    /// Seed the primary-entity slot from a batch hydration pass.
    pub fn seed_primary_entity(&self, entity: Option<Entity>) {
        let _already = self.primary.set(entity);
    }

    async fn fetch_primary(&self, ctx: &Context<'_>) -> Result<&Option<Entity>> {
        let rc = ctx.data::<Arc<RequestContext>>()?;
        let ram = ctx.data::<Arc<ResourceAccessor>>()?;
        let config = ctx.data::<Arc<StaticConfig>>()?;
        self.primary
            .get_or_try_init(|| async {
                if self.data.primary_entity_id.is_empty() {
                    return Ok(None);
                }
                match ram.entity(&self.data.primary_entity_id).await {
                    Ok(entity) => Ok(Some(transform::entity(&entity, config))),
                    Err(e) if e.is_not_found() => Ok(None),
                    Err(e) => Err(rc.upstream(e)),
                }
            })
            .await
    }
}

#[Object]
impl Thread {
    pub async fn id(&self) -> &ID {
        &self.id
    }

    #[graphql(name = "organizationID")]
    async fn organization_id(&self) -> &str {
        &self.data.organization_id
    }

    #[graphql(name = "primaryEntityID")]
    async fn primary_entity_id(&self) -> Option<&str> {
        if self.data.primary_entity_id.is_empty() {
            None
        } else {
            Some(&self.data.primary_entity_id)
        }
    }

    #[graphql(name = "type")]
    async fn kind(&self) -> ThreadKind {
        self.data.thread_type.into()
    }

    async fn title(&self, ctx: &Context<'_>) -> Result<String> {
        if let Some(title) = &self.title {
            return Ok(title.clone());
        }
        let display = self
            .fetch_primary(ctx)
            .await?
            .as_ref()
            .map(|e| e.display_name.clone())
            .filter(|name| !name.is_empty());
        Ok(display.unwrap_or_else(|| UNNAMED_THREAD_TITLE.to_string()))
    }

    async fn subtitle(&self) -> &str {
        &self.subtitle
    }

    #[graphql(name = "lastMessageTimestamp")]
    async fn last_message_timestamp(&self) -> u64 {
        self.data.last_message_timestamp
    }

    #[graphql(name = "createdTimestamp")]
    async fn created_timestamp(&self) -> u64 {
        self.data.created_timestamp
    }

    #[graphql(name = "messageCount")]
    async fn message_count(&self) -> u32 {
        self.data.message_count
    }

    async fn unread(&self) -> bool {
        self.data.unread
    }

    #[graphql(name = "unreadReference")]
    async fn unread_reference(&self) -> bool {
        self.data.unread_reference
    }

    async fn following(&self) -> bool {
        self.data.following
    }

    async fn tags(&self) -> &[String] {
        &self.data.tags
    }

    #[graphql(name = "allowInternalMessages")]
    async fn allow_internal_messages(&self) -> bool {
        self.data.permissions.allow_internal_messages
    }

    #[graphql(name = "allowExternalDelivery")]
    async fn allow_external_delivery(&self) -> bool {
        self.data.permissions.allow_external_delivery
    }

    #[graphql(name = "allowMentions")]
    async fn allow_mentions(&self) -> bool {
        self.data.permissions.allow_mentions
    }

    #[graphql(name = "allowAddFollowers")]
    async fn allow_add_followers(&self) -> bool {
        self.data.permissions.allow_add_followers
    }

    #[graphql(name = "allowRemoveFollowers")]
    async fn allow_remove_followers(&self) -> bool {
        self.data.permissions.allow_remove_followers
    }

    #[graphql(name = "allowUpdateTitle")]
    async fn allow_update_title(&self) -> bool {
        self.data.permissions.allow_update_title
    }

    #[graphql(name = "allowDelete")]
    async fn allow_delete(&self) -> bool {
        self.data.permissions.allow_delete
    }

    #[graphql(name = "allowLeave")]
    async fn allow_leave(&self) -> bool {
        self.data.permissions.allow_leave
    }

    #[graphql(name = "allowEmailAttachments")]
    async fn allow_email_attachments(&self) -> bool {
        self.data.permissions.allow_email_attachments
    }

    #[graphql(name = "allowSMSAttachments")]
    async fn allow_sms_attachments(&self) -> bool {
        self.data.permissions.allow_sms_attachments
    }

    #[graphql(name = "allowVideoAttachments")]
    async fn allow_video_attachments(&self) -> bool {
        self.data.permissions.allow_video_attachments
    }

    #[graphql(name = "lastPrimaryEntityEndpoints")]
    async fn last_primary_entity_endpoints(&self) -> Vec<Endpoint> {
        self.data
            .last_primary_entity_endpoints
            .iter()
            .map(transform::endpoint)
            .collect()
    }

    #[graphql(name = "primaryEntity")]
    async fn primary_entity(&self, ctx: &Context<'_>) -> Result<Option<Entity>> {
        if self.data.primary_entity_id.is_empty() {
            return Ok(None);
        }
        if selecting_only_id(ctx) && self.primary.get().is_none() {
            return Ok(Some(Entity::only_id(&self.data.primary_entity_id)));
        }
        Ok(self.fetch_primary(ctx).await?.clone())
    }

    async fn items(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] args: ConnectionArgs,
    ) -> Result<Connection<ThreadItem>> {
        let rc = ctx.data::<Arc<RequestContext>>()?;
        let ram = ctx.data::<Arc<ResourceAccessor>>()?;
        let config = ctx.data::<Arc<StaticConfig>>()?;
        let iterator = args.iterator();
        let direction = iterator.direction;
        let resp = ram
            .thread_items(threading::ThreadItemsRequest {
                thread_id: self.data.id.clone(),
                iterator,
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        let edges = resp
            .edges
            .into_iter()
            .map(|edge| {
                Ok(Edge {
                    node: transform::thread_item(&edge.item, config)?,
                    cursor: edge.cursor,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Connection::from_edges(edges, direction, resp.has_more, None))
    }

    async fn deeplink(&self, ctx: &Context<'_>) -> Result<String> {
        let config = ctx.data::<Arc<StaticConfig>>()?;
        Ok(config.thread_url(&self.data.organization_id, &self.data.id))
    }
}

// ── Thread items ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, SimpleObject)]
pub struct DeletedMessage {
    pub deleted: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct MessageUpdate {
    pub message: Message,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct MessageDelete {
    #[graphql(name = "targetItemID")]
    pub target_item_id: ID,
}

#[derive(Debug, Clone, Union)]
pub enum ThreadItemData {
    Message(Message),
    DeletedMessage(DeletedMessage),
    MessageUpdate(MessageUpdate),
    MessageDelete(MessageDelete),
}

#[derive(Clone)]
pub struct ThreadItem {
    pub id: ID,
    pub uuid: String,
    pub thread_id: String,
    pub organization_id: String,
    pub actor_entity_id: String,
    pub internal: bool,
    pub timestamp: u64,
    pub modified_timestamp: u64,
    pub data: ThreadItemData,
}

#[Object]
impl ThreadItem {
    pub async fn id(&self) -> &ID {
        &self.id
    }

    async fn uuid(&self) -> Option<&str> {
        if self.uuid.is_empty() {
            None
        } else {
            Some(&self.uuid)
        }
    }

    #[graphql(name = "threadID")]
    async fn thread_id(&self) -> &str {
        &self.thread_id
    }

    #[graphql(name = "organizationID")]
    async fn organization_id(&self) -> &str {
        &self.organization_id
    }

    #[graphql(name = "actorEntityID")]
    async fn actor_entity_id(&self) -> &str {
        &self.actor_entity_id
    }

    async fn internal(&self) -> bool {
        self.internal
    }

    async fn timestamp(&self) -> u64 {
        self.timestamp
    }

    #[graphql(name = "modifiedTimestamp")]
    async fn modified_timestamp(&self) -> u64 {
        self.modified_timestamp
    }

    /// The entity that authored this item. Selections of exactly `{ id }`
    /// are answered without a directory fetch.
    async fn actor(&self, ctx: &Context<'_>) -> Result<Option<Entity>> {
        if self.actor_entity_id.is_empty() {
            return Ok(None);
        }
        if selecting_only_id(ctx) {
            return Ok(Some(Entity::only_id(&self.actor_entity_id)));
        }
        let rc = ctx.data::<Arc<RequestContext>>()?;
        let ram = ctx.data::<Arc<ResourceAccessor>>()?;
        let config = ctx.data::<Arc<StaticConfig>>()?;
        match ram.entity(&self.actor_entity_id).await {
            Ok(entity) => Ok(Some(transform::entity(&entity, config))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(rc.upstream(e)),
        }
    }

    async fn data(&self) -> &ThreadItemData {
        &self.data
    }
}
