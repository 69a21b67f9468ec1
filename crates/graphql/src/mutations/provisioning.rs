//! Endpoint provisioning: email addresses and phone numbers.

use async_graphql::{Context, Enum, ID, InputObject, Object, Result, SimpleObject};

use meridian_upstream::{directory, excomms};

use crate::{queries::parts, transform, types::Entity};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionEmailErrorCode {
    InvalidEmail,
    SubdomainInUse,
    LocalPartInUse,
}

#[derive(InputObject)]
pub struct ProvisionEmailInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    /// Entity (or organization) the address is provisioned for.
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    #[graphql(name = "localPart")]
    pub local_part: String,
    pub subdomain: String,
}

#[derive(SimpleObject)]
pub struct ProvisionEmailPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ProvisionEmailErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    #[graphql(name = "emailAddress")]
    pub email_address: Option<String>,
    pub entity: Option<Entity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum ProvisionPhoneNumberErrorCode {
    Unavailable,
}

#[derive(InputObject)]
pub struct ProvisionPhoneNumberInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "entityID")]
    pub entity_id: ID,
    #[graphql(name = "areaCode")]
    pub area_code: Option<String>,
}

#[derive(SimpleObject)]
pub struct ProvisionPhoneNumberPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<ProvisionPhoneNumberErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    #[graphql(name = "phoneNumber")]
    pub phone_number: Option<String>,
    pub entity: Option<Entity>,
}

fn valid_local_part(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
        && !s.starts_with('.')
        && !s.ends_with('.')
}

fn valid_subdomain(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !s.starts_with('-')
        && !s.ends_with('-')
}

#[derive(Default)]
pub struct ProvisioningMutations;

#[Object]
impl ProvisioningMutations {
    /// Provision `localPart@subdomain.<email domain>` for an entity. The
    /// organization owns the subdomain; the first provisioned address
    /// claims it.
    #[graphql(name = "provisionEmail")]
    async fn provision_email(
        &self,
        ctx: &Context<'_>,
        input: ProvisionEmailInput,
    ) -> Result<ProvisionEmailPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_provider()?;

        let fail = |client_mutation_id, code: ProvisionEmailErrorCode, message: &str| {
            Ok(ProvisionEmailPayload {
                client_mutation_id,
                success: false,
                error_code: Some(code),
                error_message: Some(message.to_string()),
                email_address: None,
                entity: None,
            })
        };

        let local_part = input.local_part.trim().to_ascii_lowercase();
        let subdomain = input.subdomain.trim().to_ascii_lowercase();
        if !valid_local_part(&local_part) || !valid_subdomain(&subdomain) {
            return fail(
                input.client_mutation_id,
                ProvisionEmailErrorCode::InvalidEmail,
                "That email address is not valid.",
            );
        }

        let owner = ram
            .entity(input.entity_id.as_str())
            .await
            .map_err(|e| rc.upstream(e))?;
        let org_id = if owner.entity_type == directory::EntityType::Organization {
            owner.id.clone()
        } else {
            owner
                .membership_org()
                .map(|o| o.id.clone())
                .ok_or_else(|| rc.internal("entity has no organization membership"))?
        };

        // The org either already holds a subdomain or claims the requested
        // one now. A subdomain held by another org is a conflict.
        let subdomain = match ram.entity_domain(Some(&org_id), None).await {
            Ok(existing) => {
                if existing.domain != subdomain {
                    return fail(
                        input.client_mutation_id,
                        ProvisionEmailErrorCode::SubdomainInUse,
                        "Your organization already uses a different subdomain.",
                    );
                }
                existing.domain
            }
            Err(e) if e.is_not_found() => {
                match ram.entity_domain(None, Some(&subdomain)).await {
                    Ok(_) => {
                        return fail(
                            input.client_mutation_id,
                            ProvisionEmailErrorCode::SubdomainInUse,
                            "That subdomain is already in use.",
                        );
                    }
                    Err(e) if e.is_not_found() => {
                        ram.create_entity_domain(&org_id, &subdomain)
                            .await
                            .map_err(|e| rc.upstream(e))?;
                        subdomain
                    }
                    Err(e) => return Err(rc.upstream(e)),
                }
            }
            Err(e) => return Err(rc.upstream(e)),
        };

        let domain = format!("{subdomain}.{}", config.email_domain);
        let provisioned = match ram
            .provision_email_address(excomms::ProvisionEmailAddressRequest {
                owner_entity_id: owner.id.clone(),
                local_part,
                domain,
            })
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_already_exists() => {
                return fail(
                    input.client_mutation_id,
                    ProvisionEmailErrorCode::LocalPartInUse,
                    "That email address is already taken.",
                );
            }
            Err(e) => return Err(rc.upstream(e)),
        };

        let updated = ram
            .create_contacts(directory::CreateContactsRequest {
                entity_id: owner.id.clone(),
                contacts: vec![directory::Contact {
                    id: String::new(),
                    contact_type: directory::ContactType::Email,
                    value: provisioned.email_address.clone(),
                    provisioned: true,
                    verified: true,
                    label: String::new(),
                }],
            })
            .await
            .map_err(|e| rc.upstream(e))?;

        Ok(ProvisionEmailPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            email_address: Some(provisioned.email_address),
            entity: Some(transform::entity(&updated, config)),
        })
    }

    #[graphql(name = "provisionPhoneNumber")]
    async fn provision_phone_number(
        &self,
        ctx: &Context<'_>,
        input: ProvisionPhoneNumberInput,
    ) -> Result<ProvisionPhoneNumberPayload> {
        let (rc, ram, config) = parts(ctx)?;
        rc.require_provider()?;

        let owner = ram
            .entity(input.entity_id.as_str())
            .await
            .map_err(|e| rc.upstream(e))?;

        let provisioned = match ram
            .provision_phone_number(excomms::ProvisionPhoneNumberRequest {
                owner_entity_id: owner.id.clone(),
                area_code: input.area_code,
                phone_number: None,
            })
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() || e.is_failed_precondition() => {
                return Ok(ProvisionPhoneNumberPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(ProvisionPhoneNumberErrorCode::Unavailable),
                    error_message: Some(
                        "No phone number is available in that area code.".to_string(),
                    ),
                    phone_number: None,
                    entity: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };

        let updated = ram
            .create_contacts(directory::CreateContactsRequest {
                entity_id: owner.id.clone(),
                contacts: vec![directory::Contact {
                    id: String::new(),
                    contact_type: directory::ContactType::Phone,
                    value: provisioned.phone_number.clone(),
                    provisioned: true,
                    verified: true,
                    label: String::new(),
                }],
            })
            .await
            .map_err(|e| rc.upstream(e))?;

        Ok(ProvisionPhoneNumberPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            phone_number: Some(provisioned.phone_number),
            entity: Some(transform::entity(&updated, config)),
        })
    }
}
