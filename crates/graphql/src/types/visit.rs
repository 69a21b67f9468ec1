use async_graphql::{ID, SimpleObject};

#[derive(Debug, Clone, SimpleObject)]
pub struct Visit {
    pub id: ID,
    pub name: String,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    #[graphql(name = "layoutVersionID")]
    pub layout_version_id: ID,
    pub submitted: bool,
    #[graphql(name = "submittedTimestamp")]
    pub submitted_timestamp: u64,
    pub triaged: bool,
    pub deeplink: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct VisitCategory {
    pub id: ID,
    pub name: String,
    #[graphql(name = "layoutIDs")]
    pub layout_ids: Vec<ID>,
}
