use async_graphql::{Enum, ID, SimpleObject};

use meridian_upstream::excomms;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CallRole {
    Caller,
    Recipient,
}

impl From<excomms::CallRole> for CallRole {
    fn from(r: excomms::CallRole) -> Self {
        match r {
            excomms::CallRole::Caller => Self::Caller,
            excomms::CallRole::Recipient => Self::Recipient,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CallState {
    Pending,
    Accepted,
    Declined,
    Connected,
    Failed,
    Completed,
}

impl From<excomms::CallState> for CallState {
    fn from(s: excomms::CallState) -> Self {
        match s {
            excomms::CallState::Pending => Self::Pending,
            excomms::CallState::Accepted => Self::Accepted,
            excomms::CallState::Declined => Self::Declined,
            excomms::CallState::Connected => Self::Connected,
            excomms::CallState::Failed => Self::Failed,
            excomms::CallState::Completed => Self::Completed,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct CallParticipant {
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    pub role: CallRole,
    pub state: CallState,
    pub identity: String,
}

/// A two-party IP call as seen by the viewing account.
#[derive(Debug, Clone, SimpleObject)]
pub struct Call {
    pub id: ID,
    #[graphql(name = "accessToken")]
    pub access_token: String,
    /// The viewer's role in the call.
    pub role: CallRole,
    /// The viewer's own state.
    pub state: CallState,
    #[graphql(name = "videoEnabled")]
    pub video_enabled: bool,
    pub participants: Vec<CallParticipant>,
}
