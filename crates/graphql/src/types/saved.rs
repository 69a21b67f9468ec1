use async_graphql::{Enum, ID, SimpleObject};

use meridian_upstream::threading;

use crate::types::Message;

#[derive(Debug, Clone, SimpleObject)]
pub struct SavedThreadQuery {
    pub id: ID,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    pub query: String,
    pub title: String,
    pub unread: u64,
    pub total: u64,
    pub hidden: bool,
    #[graphql(name = "notificationsEnabled")]
    pub notifications_enabled: bool,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct SavedMessage {
    pub id: ID,
    pub title: String,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    #[graphql(name = "ownerEntityID")]
    pub owner_entity_id: ID,
    pub internal: bool,
    #[graphql(name = "createdTimestamp")]
    pub created_timestamp: u64,
    #[graphql(name = "modifiedTimestamp")]
    pub modified_timestamp: u64,
    pub message: Message,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ScheduledMessageStatus {
    Pending,
    Sent,
    Cancelled,
}

impl From<threading::ScheduledMessageStatus> for ScheduledMessageStatus {
    fn from(s: threading::ScheduledMessageStatus) -> Self {
        match s {
            threading::ScheduledMessageStatus::Pending => Self::Pending,
            threading::ScheduledMessageStatus::Sent => Self::Sent,
            threading::ScheduledMessageStatus::Cancelled => Self::Cancelled,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ScheduledMessage {
    pub id: ID,
    #[graphql(name = "threadID")]
    pub thread_id: ID,
    #[graphql(name = "scheduledFor")]
    pub scheduled_for: u64,
    pub status: ScheduledMessageStatus,
    pub message: Message,
}
