//! Profile and contact-info mutations.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use meridian_upstream::directory;

use crate::{
    error,
    queries::parts,
    transform,
    types::{ContactInfoType, Entity, Profile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ProfileErrorCode {
    InvalidInput,
}

#[derive(InputObject)]
pub struct ProfileSectionInput {
    pub title: String,
    pub body: String,
}

#[derive(InputObject)]
pub struct CreateProfileInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    pub title: String,
    pub sections: Vec<ProfileSectionInput>,
}

#[derive(SimpleObject)]
pub struct CreateProfilePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ProfileErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(InputObject)]
pub struct UpdateProfileInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "profileID")]
    pub profile_id: ID,
    pub title: String,
    pub sections: Vec<ProfileSectionInput>,
}

#[derive(SimpleObject)]
pub struct UpdateProfilePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ProfileErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub profile: Option<Profile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ContactInfoErrorCode {
    InvalidInput,
}

#[derive(InputObject)]
pub struct ContactInfoInput {
    /// Required for updates, absent for adds.
    pub id: Option<ID>,
    #[graphql(name = "type")]
    pub contact_type: ContactInfoType,
    pub value: String,
    pub label: Option<String>,
}

#[derive(InputObject)]
pub struct AddContactInfosInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    #[graphql(name = "contactInfos")]
    pub contact_infos: Vec<ContactInfoInput>,
}

#[derive(InputObject)]
pub struct UpdateContactInfosInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    #[graphql(name = "contactInfos")]
    pub contact_infos: Vec<ContactInfoInput>,
}

#[derive(InputObject)]
pub struct DeleteContactInfosInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    #[graphql(name = "contactInfoIDs")]
    pub contact_info_ids: Vec<ID>,
}

#[derive(SimpleObject)]
pub struct ContactInfosPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ContactInfoErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub entity: Option<Entity>,
}

fn wire_contact_type(t: ContactInfoType) -> directory::ContactType {
    match t {
        ContactInfoType::Phone => directory::ContactType::Phone,
        ContactInfoType::Email => directory::ContactType::Email,
        ContactInfoType::App => directory::ContactType::App,
    }
}

fn wire_contacts(infos: &[ContactInfoInput]) -> Vec<directory::Contact> {
    infos
        .iter()
        .map(|c| directory::Contact {
            id: c.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            contact_type: wire_contact_type(c.contact_type),
            value: c.value.trim().to_string(),
            provisioned: false,
            verified: false,
            label: c.label.clone().unwrap_or_default(),
        })
        .collect()
}

#[derive(Default)]
pub struct ProfileMutations;

#[Object]
impl ProfileMutations {
    #[graphql(name = "createProfile")]
    async fn create_profile(
        &self,
        ctx: &Context<'_>,
        input: CreateProfileInput,
    ) -> Result<CreateProfilePayload> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_provider()?;
        let profile = match ram
            .update_profile(directory::UpdateProfileRequest {
                profile_id: String::new(),
                profile: directory::Profile {
                    id: String::new(),
                    entity_id: input.entity_id.to_string(),
                    title: input.title,
                    sections: input
                        .sections
                        .into_iter()
                        .map(|s| directory::ProfileSection {
                            title: s.title,
                            body: s.body,
                        })
                        .collect(),
                    image_media_id: None,
                    last_modified_timestamp: 0,
                },
            })
            .await
        {
            Ok(profile) => profile,
            Err(e) if e.is_invalid_argument() => {
                return Ok(CreateProfilePayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ProfileErrorCode::InvalidInput),
                    error_message: Some(e.to_string()),
                    profile: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        Ok(CreateProfilePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            profile: Some(transform::profile(&profile)),
        })
    }

    #[graphql(name = "updateProfile")]
    async fn update_profile(
        &self,
        ctx: &Context<'_>,
        input: UpdateProfileInput,
    ) -> Result<UpdateProfilePayload> {
        let (rc, ram, _config) = parts(ctx)?;
        rc.require_provider()?;
        let existing = ram
            .profile(directory::ProfileKey::ProfileId(input.profile_id.to_string()))
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    error::not_found(&*input.profile_id)
                } else {
                    rc.upstream(e)
                }
            })?;
        let profile = match ram
            .update_profile(directory::UpdateProfileRequest {
                profile_id: existing.id.clone(),
                profile: directory::Profile {
                    title: input.title,
                    sections: input
                        .sections
                        .into_iter()
                        .map(|s| directory::ProfileSection {
                            title: s.title,
                            body: s.body,
                        })
                        .collect(),
                    ..existing
                },
            })
            .await
        {
            Ok(profile) => profile,
            Err(e) if e.is_invalid_argument() => {
                return Ok(UpdateProfilePayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ProfileErrorCode::InvalidInput),
                    error_message: Some(e.to_string()),
                    profile: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        Ok(UpdateProfilePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            profile: Some(transform::profile(&profile)),
        })
    }

    #[graphql(name = "addContactInfos")]
    async fn add_contact_infos(
        &self,
        ctx: &Context<'_>,
        input: AddContactInfosInput,
    ) -> Result<ContactInfosPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_account()?;
        let entity = match ram
            .create_contacts(directory::CreateContactsRequest {
                entity_id: input.entity_id.to_string(),
                contacts: wire_contacts(&input.contact_infos),
            })
            .await
        {
            Ok(entity) => entity,
            Err(e) if e.is_invalid_argument() => {
                return Ok(ContactInfosPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ContactInfoErrorCode::InvalidInput),
                    error_message: Some(e.to_string()),
                    entity: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        Ok(ContactInfosPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            entity: Some(transform::entity(&entity, config)),
        })
    }

    #[graphql(name = "updateContactInfos")]
    async fn update_contact_infos(
        &self,
        ctx: &Context<'_>,
        input: UpdateContactInfosInput,
    ) -> Result<ContactInfosPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_account()?;
        let entity = match ram
            .update_contacts(directory::UpdateContactsRequest {
                entity_id: input.entity_id.to_string(),
                contacts: wire_contacts(&input.contact_infos),
            })
            .await
        {
            Ok(entity) => entity,
            Err(e) if e.is_invalid_argument() => {
                return Ok(ContactInfosPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ContactInfoErrorCode::InvalidInput),
                    error_message: Some(e.to_string()),
                    entity: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        Ok(ContactInfosPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            entity: Some(transform::entity(&entity, config)),
        })
    }

    #[graphql(name = "deleteContactInfos")]
    async fn delete_contact_infos(
        &self,
        ctx: &Context<'_>,
        input: DeleteContactInfosInput,
    ) -> Result<ContactInfosPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_account()?;
        let entity = ram
            .delete_contacts(directory::DeleteContactsRequest {
                entity_id: input.entity_id.to_string(),
                contact_ids: input
                    .contact_info_ids
                    .iter()
                    .map(|id| id.to_string())
                    .collect(),
            })
            .await
            .map_err(|e| rc.upstream(e))?;
        Ok(ContactInfosPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            entity: Some(transform::entity(&entity, config)),
        })
    }
}
