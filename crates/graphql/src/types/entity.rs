use std::sync::Arc;

use async_graphql::{ComplexObject, Context, Enum, ID, Result, SimpleObject};

use meridian_upstream::directory;

use crate::{context::RequestContext, raccess::ResourceAccessor, transform};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum EntityKind {
    Organization,
    Internal,
    External,
    Patient,
    System,
}

impl From<directory::EntityType> for EntityKind {
    fn from(t: directory::EntityType) -> Self {
        match t {
            directory::EntityType::Organization => Self::Organization,
            directory::EntityType::Internal => Self::Internal,
            directory::EntityType::External => Self::External,
            directory::EntityType::Patient => Self::Patient,
            directory::EntityType::System => Self::System,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ContactInfoType {
    Phone,
    Email,
    App,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ContactInfo {
    pub id: ID,
    #[graphql(name = "type")]
    pub contact_type: ContactInfoType,
    pub value: String,
    #[graphql(name = "displayValue")]
    pub display_value: String,
    pub provisioned: bool,
    pub verified: bool,
    pub label: String,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Entity {
    pub id: ID,
    #[graphql(name = "type")]
    pub kind: EntityKind,
    #[graphql(name = "firstName")]
    pub first_name: String,
    #[graphql(name = "middleInitial")]
    pub middle_initial: String,
    #[graphql(name = "lastName")]
    pub last_name: String,
    #[graphql(name = "groupName")]
    pub group_name: String,
    #[graphql(name = "displayName")]
    pub display_name: String,
    #[graphql(name = "shortTitle")]
    pub short_title: String,
    #[graphql(name = "longTitle")]
    pub long_title: String,
    pub gender: String,
    pub note: String,
    pub initials: String,
    #[graphql(name = "contacts")]
    pub contacts: Vec<ContactInfo>,
    #[graphql(name = "isInternal")]
    pub is_internal: bool,
    #[graphql(name = "hasAccount")]
    pub has_account: bool,
    #[graphql(name = "avatarURL")]
    pub avatar_url: Option<String>,
    #[graphql(name = "lastModifiedTimestamp")]
    pub last_modified_timestamp: u64,
}

impl Entity {
    /// Stub carrying only the id, for selection sets of exactly `{ id }`.
    #[must_use]
    pub fn only_id(id: &str) -> Self {
        Self {
            id: ID(id.to_string()),
            kind: EntityKind::External,
            first_name: String::new(),
            middle_initial: String::new(),
            last_name: String::new(),
            group_name: String::new(),
            display_name: String::new(),
            short_title: String::new(),
            long_title: String::new(),
            gender: String::new(),
            note: String::new(),
            initials: String::new(),
            contacts: Vec::new(),
            is_internal: false,
            has_account: false,
            avatar_url: None,
            last_modified_timestamp: 0,
        }
    }
}

#[ComplexObject]
impl Entity {
    /// The entity's care profile, if one has been published.
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        let rc = ctx.data::<Arc<RequestContext>>()?;
        let ram = ctx.data::<Arc<ResourceAccessor>>()?;
        match ram
            .profile(directory::ProfileKey::EntityId(self.id.to_string()))
            .await
        {
            Ok(profile) => Ok(Some(transform::profile(&profile))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(rc.upstream(e)),
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ProfileSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Profile {
    pub id: ID,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    pub title: String,
    pub sections: Vec<ProfileSection>,
    #[graphql(name = "imageURL")]
    pub image_url: Option<String>,
    #[graphql(name = "lastModifiedTimestamp")]
    pub last_modified_timestamp: u64,
}

#[derive(Debug, Clone, SimpleObject)]
#[graphql(complex)]
pub struct Organization {
    pub id: ID,
    pub name: String,
    pub contacts: Vec<ContactInfo>,
}

#[ComplexObject]
impl Organization {
    /// The viewer's own entity within this organization.
    async fn entity(&self, ctx: &Context<'_>) -> Result<Option<Entity>> {
        let rc = ctx.data::<Arc<RequestContext>>()?;
        let ram = ctx.data::<Arc<ResourceAccessor>>()?;
        let account = rc.require_account()?;
        match ram
            .entity_in_org_for_account_id(self.id.as_str(), &account.id)
            .await
        {
            Ok(entity) => {
                let config = ctx.data::<Arc<crate::context::StaticConfig>>()?;
                Ok(Some(transform::entity(&entity, config)))
            }
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(rc.upstream(e)),
        }
    }
}

/// Availability of an organization subdomain.
#[derive(Debug, Clone, SimpleObject)]
pub struct Subdomain {
    pub available: bool,
}
