//! Directory service: entities, contacts, profiles, entity domains.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityType {
    Organization,
    Internal,
    External,
    Patient,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityStatus {
    Active,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactType {
    Phone,
    Email,
    App,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub id: String,
    pub contact_type: ContactType,
    pub value: String,
    #[serde(default)]
    pub provisioned: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dob {
    pub month: u32,
    pub day: u32,
    pub year: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityInfo {
    pub first_name: String,
    pub middle_initial: String,
    pub last_name: String,
    pub group_name: String,
    pub display_name: String,
    pub short_title: String,
    pub long_title: String,
    pub gender: String,
    pub dob: Option<Dob>,
    pub note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    pub entity_type: EntityType,
    #[serde(default)]
    pub status: Option<EntityStatus>,
    #[serde(default)]
    pub info: EntityInfo,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub memberships: Vec<Entity>,
    #[serde(default)]
    pub members: Vec<Entity>,
    #[serde(default)]
    pub external_ids: Vec<String>,
    #[serde(default)]
    pub image_media_id: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub last_modified_timestamp: u64,
}

impl Entity {
    /// The organization among this entity's memberships, if any.
    /// Internal/external/patient entities belong to exactly one.
    #[must_use]
    pub fn membership_org(&self) -> Option<&Entity> {
        self.memberships
            .iter()
            .find(|m| m.entity_type == EntityType::Organization)
    }

    #[must_use]
    pub fn is_member_of(&self, org_id: &str) -> bool {
        self.memberships
            .iter()
            .any(|m| m.entity_type == EntityType::Organization && m.id == org_id)
    }

    #[must_use]
    pub fn has_account(&self) -> bool {
        self.account_id.as_deref().is_some_and(|id| !id.is_empty())
    }
}

/// Which edges of the entity graph to include in a lookup response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntityInformation {
    Memberships,
    Members,
    Contacts,
    ExternalIds,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestedInformation {
    pub depth: u32,
    pub entity_information: Vec<EntityInformation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LookupKey {
    EntityId(String),
    ExternalId(String),
    BatchEntityIds(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntitiesRequest {
    pub key: LookupKey,
    #[serde(default)]
    pub requested_information: RequestedInformation,
    #[serde(default)]
    pub statuses: Vec<EntityStatus>,
    #[serde(default)]
    pub root_types: Vec<EntityType>,
    #[serde(default)]
    pub child_types: Vec<EntityType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntitiesByContactRequest {
    pub contact_value: String,
    #[serde(default)]
    pub requested_information: RequestedInformation,
    #[serde(default)]
    pub statuses: Vec<EntityStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityRequest {
    pub entity_type: EntityType,
    pub initial_membership_entity_id: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub info: EntityInfo,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub requested_information: RequestedInformation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEntityRequest {
    pub entity_id: String,
    pub info: EntityInfo,
    #[serde(default)]
    pub image_media_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactsRequest {
    pub entity_id: String,
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContactsRequest {
    pub entity_id: String,
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteContactsRequest {
    pub entity_id: String,
    pub contact_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntityDomainRequest {
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupEntityDomainResponse {
    pub entity_id: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntityDomainRequest {
    pub entity_id: String,
    pub domain: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSection {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub entity_id: String,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<ProfileSection>,
    #[serde(default)]
    pub image_media_id: Option<String>,
    #[serde(default)]
    pub last_modified_timestamp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProfileKey {
    ProfileId(String),
    EntityId(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    /// Empty id means create.
    #[serde(default)]
    pub profile_id: String,
    pub profile: Profile,
}

#[async_trait]
pub trait DirectoryService: Send + Sync {
    async fn lookup_entities(&self, req: LookupEntitiesRequest) -> UpstreamResult<Vec<Entity>>;
    async fn lookup_entities_by_contact(
        &self,
        req: LookupEntitiesByContactRequest,
    ) -> UpstreamResult<Vec<Entity>>;
    async fn create_entity(&self, req: CreateEntityRequest) -> UpstreamResult<Entity>;
    async fn update_entity(&self, req: UpdateEntityRequest) -> UpstreamResult<Entity>;
    async fn create_contacts(&self, req: CreateContactsRequest) -> UpstreamResult<Entity>;
    async fn update_contacts(&self, req: UpdateContactsRequest) -> UpstreamResult<Entity>;
    async fn delete_contacts(&self, req: DeleteContactsRequest) -> UpstreamResult<Entity>;
    async fn lookup_entity_domain(
        &self,
        req: LookupEntityDomainRequest,
    ) -> UpstreamResult<LookupEntityDomainResponse>;
    async fn create_entity_domain(&self, req: CreateEntityDomainRequest) -> UpstreamResult<()>;
    async fn profile(&self, key: ProfileKey) -> UpstreamResult<Profile>;
    async fn update_profile(&self, req: UpdateProfileRequest) -> UpstreamResult<Profile>;
}

pub struct NoopDirectoryService;

#[async_trait]
impl DirectoryService for NoopDirectoryService {
    async fn lookup_entities(&self, _req: LookupEntitiesRequest) -> UpstreamResult<Vec<Entity>> {
        Ok(Vec::new())
    }

    async fn lookup_entities_by_contact(
        &self,
        _req: LookupEntitiesByContactRequest,
    ) -> UpstreamResult<Vec<Entity>> {
        Ok(Vec::new())
    }

    async fn create_entity(&self, _req: CreateEntityRequest) -> UpstreamResult<Entity> {
        Err(UpstreamError::not_found("directory service not configured"))
    }

    async fn update_entity(&self, req: UpdateEntityRequest) -> UpstreamResult<Entity> {
        Err(UpstreamError::not_found(req.entity_id))
    }

    async fn create_contacts(&self, req: CreateContactsRequest) -> UpstreamResult<Entity> {
        Err(UpstreamError::not_found(req.entity_id))
    }

    async fn update_contacts(&self, req: UpdateContactsRequest) -> UpstreamResult<Entity> {
        Err(UpstreamError::not_found(req.entity_id))
    }

    async fn delete_contacts(&self, req: DeleteContactsRequest) -> UpstreamResult<Entity> {
        Err(UpstreamError::not_found(req.entity_id))
    }

    async fn lookup_entity_domain(
        &self,
        req: LookupEntityDomainRequest,
    ) -> UpstreamResult<LookupEntityDomainResponse> {
        Err(UpstreamError::not_found(
            req.domain.or(req.entity_id).unwrap_or_default(),
        ))
    }

    async fn create_entity_domain(&self, _req: CreateEntityDomainRequest) -> UpstreamResult<()> {
        Ok(())
    }

    async fn profile(&self, _key: ProfileKey) -> UpstreamResult<Profile> {
        Err(UpstreamError::not_found("profile"))
    }

    async fn update_profile(&self, req: UpdateProfileRequest) -> UpstreamResult<Profile> {
        Err(UpstreamError::not_found(req.profile_id))
    }
}
