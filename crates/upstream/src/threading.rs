//! Threading service: threads, messages, saved queries, saved and
//! scheduled messages.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadType {
    External,
    Team,
    SecureExternal,
    Support,
    Setup,
    LegacyTeam,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EndpointChannel {
    App,
    Sms,
    Voice,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub channel: EndpointChannel,
    pub id: String,
}

/// Per-thread capabilities as decided by the threading service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThreadPermissions {
    pub allow_internal_messages: bool,
    pub allow_external_delivery: bool,
    pub allow_mentions: bool,
    pub allow_add_followers: bool,
    pub allow_remove_followers: bool,
    pub allow_update_title: bool,
    pub allow_delete: bool,
    pub allow_leave: bool,
    pub allow_email_attachments: bool,
    pub allow_sms_attachments: bool,
    pub allow_video_attachments: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: String,
    pub organization_id: String,
    #[serde(default)]
    pub primary_entity_id: String,
    pub thread_type: ThreadType,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default)]
    pub last_message_timestamp: u64,
    #[serde(default)]
    pub created_timestamp: u64,
    #[serde(default)]
    pub message_count: u32,
    #[serde(default)]
    pub unread: bool,
    #[serde(default)]
    pub unread_reference: bool,
    #[serde(default)]
    pub following: bool,
    #[serde(default)]
    pub last_primary_entity_endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub permissions: ThreadPermissions,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IteratorDirection {
    FromStart,
    FromEnd,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageIterator {
    #[serde(default)]
    pub start_cursor: Option<String>,
    #[serde(default)]
    pub end_cursor: Option<String>,
    pub count: u32,
    pub direction: IteratorDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadQueryType {
    All,
    Unread,
    Following,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryThreadsRequest {
    pub organization_id: String,
    pub viewer_entity_id: String,
    #[serde(default)]
    pub query_type: Option<ThreadQueryType>,
    pub iterator: PageIterator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadEdge {
    pub thread: Thread,
    pub cursor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryThreadsResponse {
    pub edges: Vec<ThreadEdge>,
    pub has_more: bool,
    #[serde(default)]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadRequest {
    pub thread_id: String,
    /// Read-status and permissions in the response are relative to this viewer.
    #[serde(default)]
    pub viewer_entity_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsForMemberRequest {
    pub entity_id: String,
    pub primary_only: bool,
}

// ── Thread items ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    Normal,
    Deleted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    pub id: String,
    pub ref_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AttachmentType {
    Image,
    Video,
    Audio,
    Document,
    Visit,
    PaymentRequest,
    CarePlan,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachmentPayload {
    Image {
        mimetype: String,
        media_id: String,
    },
    Video {
        mimetype: String,
        media_id: String,
    },
    Audio {
        mimetype: String,
        media_id: String,
        duration_seconds: f64,
    },
    Document {
        mimetype: String,
        media_id: String,
        name: String,
    },
    Visit {
        visit_id: String,
        layout_version_id: String,
    },
    PaymentRequest {
        payment_id: String,
    },
    CarePlan {
        care_plan_id: String,
    },
}

impl AttachmentPayload {
    #[must_use]
    pub fn attachment_type(&self) -> AttachmentType {
        match self {
            Self::Image { .. } => AttachmentType::Image,
            Self::Video { .. } => AttachmentType::Video,
            Self::Audio { .. } => AttachmentType::Audio,
            Self::Document { .. } => AttachmentType::Document,
            Self::Visit { .. } => AttachmentType::Visit,
            Self::PaymentRequest { .. } => AttachmentType::PaymentRequest,
            Self::CarePlan { .. } => AttachmentType::CarePlan,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(default)]
    pub content_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    pub data: AttachmentPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageData {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub title: String,
    pub source: Endpoint,
    #[serde(default)]
    pub destinations: Vec<Endpoint>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub refs: Vec<Reference>,
    #[serde(default)]
    pub status: Option<MessageStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThreadItemPayload {
    Message(MessageData),
    DeletedMessage {},
    MessageUpdate { message: MessageData },
    MessageDelete { target_item_id: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItem {
    pub id: String,
    #[serde(default)]
    pub uuid: String,
    pub thread_id: String,
    pub organization_id: String,
    pub actor_entity_id: String,
    #[serde(default)]
    pub internal: bool,
    pub timestamp: u64,
    #[serde(default)]
    pub modified_timestamp: u64,
    pub data: ThreadItemPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItemsRequest {
    pub thread_id: String,
    pub iterator: PageIterator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItemEdge {
    pub item: ThreadItem,
    pub cursor: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadItemsResponse {
    pub edges: Vec<ThreadItemEdge>,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub thread_id: String,
    pub from_entity_id: String,
    #[serde(default)]
    pub uuid: String,
    pub source: Endpoint,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub destinations: Vec<Endpoint>,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageResponse {
    pub item: ThreadItem,
    pub thread: Thread,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmptyThreadRequest {
    #[serde(default)]
    pub uuid: String,
    pub organization_id: String,
    pub from_entity_id: String,
    pub source: Endpoint,
    pub primary_entity_id: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateThreadRequest {
    pub thread_id: String,
    pub actor_entity_id: String,
    pub title: Option<String>,
    pub add_follower_entity_ids: Vec<String>,
    pub remove_follower_entity_ids: Vec<String>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateThreadResponse {
    pub thread: Thread,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkThreadsAsReadRequest {
    pub entity_id: String,
    pub thread_ids: Vec<String>,
    pub seen: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteThreadRequest {
    pub thread_id: String,
    pub actor_entity_id: String,
}

// ── Saved queries / saved messages / scheduled messages ─────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedQuery {
    pub id: String,
    pub organization_id: String,
    pub entity_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub unread: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedMessage {
    pub id: String,
    pub title: String,
    pub owner_entity_id: String,
    pub organization_id: String,
    #[serde(default)]
    pub internal: bool,
    #[serde(default)]
    pub created_timestamp: u64,
    #[serde(default)]
    pub modified_timestamp: u64,
    pub content: MessageData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SavedMessagesKey {
    Ids(Vec<String>),
    EntityIds(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduledMessageStatus {
    Pending,
    Sent,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMessage {
    pub id: String,
    pub thread_id: String,
    pub actor_entity_id: String,
    pub scheduled_for: u64,
    pub status: ScheduledMessageStatus,
    pub content: MessageData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScheduledMessagesKey {
    Id(String),
    ThreadId(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduledMessageRequest {
    pub thread_id: String,
    pub actor_entity_id: String,
    pub scheduled_for: u64,
    pub content: MessageData,
}

#[async_trait]
pub trait ThreadingService: Send + Sync {
    async fn query_threads(&self, req: QueryThreadsRequest)
    -> UpstreamResult<QueryThreadsResponse>;
    async fn thread(&self, req: ThreadRequest) -> UpstreamResult<Thread>;
    async fn threads_for_member(&self, req: ThreadsForMemberRequest)
    -> UpstreamResult<Vec<Thread>>;
    async fn thread_items(&self, req: ThreadItemsRequest) -> UpstreamResult<ThreadItemsResponse>;
    async fn thread_item(&self, item_id: &str) -> UpstreamResult<ThreadItem>;
    async fn post_message(&self, req: PostMessageRequest) -> UpstreamResult<PostMessageResponse>;
    async fn create_empty_thread(&self, req: CreateEmptyThreadRequest) -> UpstreamResult<Thread>;
    async fn update_thread(&self, req: UpdateThreadRequest)
    -> UpstreamResult<UpdateThreadResponse>;
    async fn mark_threads_as_read(&self, req: MarkThreadsAsReadRequest) -> UpstreamResult<()>;
    async fn delete_thread(&self, req: DeleteThreadRequest) -> UpstreamResult<()>;
    async fn saved_queries(&self, entity_id: &str) -> UpstreamResult<Vec<SavedQuery>>;
    async fn saved_query(&self, saved_query_id: &str) -> UpstreamResult<SavedQuery>;
    async fn saved_messages(&self, key: SavedMessagesKey) -> UpstreamResult<Vec<SavedMessage>>;
    async fn scheduled_messages(
        &self,
        key: ScheduledMessagesKey,
    ) -> UpstreamResult<Vec<ScheduledMessage>>;
    async fn create_scheduled_message(
        &self,
        req: CreateScheduledMessageRequest,
    ) -> UpstreamResult<ScheduledMessage>;
    async fn delete_scheduled_message(&self, id: &str) -> UpstreamResult<()>;
}

pub struct NoopThreadingService;

#[async_trait]
impl ThreadingService for NoopThreadingService {
    async fn query_threads(
        &self,
        _req: QueryThreadsRequest,
    ) -> UpstreamResult<QueryThreadsResponse> {
        Ok(QueryThreadsResponse {
            edges: Vec::new(),
            has_more: false,
            total: Some(0),
        })
    }

    async fn thread(&self, req: ThreadRequest) -> UpstreamResult<Thread> {
        Err(UpstreamError::not_found(req.thread_id))
    }

    async fn threads_for_member(
        &self,
        _req: ThreadsForMemberRequest,
    ) -> UpstreamResult<Vec<Thread>> {
        Ok(Vec::new())
    }

    async fn thread_items(&self, req: ThreadItemsRequest) -> UpstreamResult<ThreadItemsResponse> {
        Err(UpstreamError::not_found(req.thread_id))
    }

    async fn thread_item(&self, item_id: &str) -> UpstreamResult<ThreadItem> {
        Err(UpstreamError::not_found(item_id))
    }

    async fn post_message(&self, req: PostMessageRequest) -> UpstreamResult<PostMessageResponse> {
        Err(UpstreamError::not_found(req.thread_id))
    }

    async fn create_empty_thread(&self, _req: CreateEmptyThreadRequest) -> UpstreamResult<Thread> {
        Err(UpstreamError::not_found("threading service not configured"))
    }

    async fn update_thread(
        &self,
        req: UpdateThreadRequest,
    ) -> UpstreamResult<UpdateThreadResponse> {
        Err(UpstreamError::not_found(req.thread_id))
    }

    async fn mark_threads_as_read(&self, _req: MarkThreadsAsReadRequest) -> UpstreamResult<()> {
        Ok(())
    }

    async fn delete_thread(&self, req: DeleteThreadRequest) -> UpstreamResult<()> {
        Err(UpstreamError::not_found(req.thread_id))
    }

    async fn saved_queries(&self, _entity_id: &str) -> UpstreamResult<Vec<SavedQuery>> {
        Ok(Vec::new())
    }

    async fn saved_query(&self, saved_query_id: &str) -> UpstreamResult<SavedQuery> {
        Err(UpstreamError::not_found(saved_query_id))
    }

    async fn saved_messages(&self, _key: SavedMessagesKey) -> UpstreamResult<Vec<SavedMessage>> {
        Ok(Vec::new())
    }

    async fn scheduled_messages(
        &self,
        _key: ScheduledMessagesKey,
    ) -> UpstreamResult<Vec<ScheduledMessage>> {
        Ok(Vec::new())
    }

    async fn create_scheduled_message(
        &self,
        req: CreateScheduledMessageRequest,
    ) -> UpstreamResult<ScheduledMessage> {
        Err(UpstreamError::not_found(req.thread_id))
    }

    async fn delete_scheduled_message(&self, id: &str) -> UpstreamResult<()> {
        Err(UpstreamError::not_found(id))
    }
}
