//! authenticate, createAccount, unauthenticate.

use async_graphql::{Context, Enum, InputObject, Object, Result, SimpleObject};

use {
    meridian_upstream::auth,
    tracing::warn,
};

use crate::{queries::parts, types::Account};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum AuthenticateErrorCode {
    InvalidCredentials,
}

#[derive(InputObject)]
pub struct AuthenticateInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub email: String,
    pub password: String,
}

#[derive(SimpleObject)]
pub struct AuthenticatePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<AuthenticateErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub account: Option<Account>,
    #[graphql(name = "clientEncryptionKey")]
    pub client_encryption_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum CreateAccountErrorCode {
    AccountExists,
    InvalidInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum AccountKindInput {
    Provider,
    Patient,
}

#[derive(InputObject)]
pub struct CreateAccountInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    #[graphql(name = "type")]
    pub kind: AccountKindInput,
    #[graphql(name = "firstName")]
    pub first_name: String,
    #[graphql(name = "lastName")]
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[graphql(name = "phoneNumber")]
    pub phone_number: Option<String>,
}

#[derive(SimpleObject)]
pub struct CreateAccountPayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
    #[graphql(name = "errorCode")]
    pub error_code: Option<CreateAccountErrorCode>,
    #[graphql(name = "errorMessage")]
    pub error_message: Option<String>,
    pub account: Option<Account>,
}

#[derive(InputObject, Default)]
pub struct UnauthenticateInput {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
}

#[derive(SimpleObject)]
pub struct UnauthenticatePayload {
    #[graphql(name = "clientMutationId")]
    pub client_mutation_id: Option<String>,
    pub success: bool,
}

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Sign in with email and password. On success the account is published
    /// to the request context and the gateway refreshes the auth cookie.
    async fn authenticate(
        &self,
        ctx: &Context<'_>,
        input: AuthenticateInput,
    ) -> Result<AuthenticatePayload> {
        let (rc, ram, _config) = parts(ctx)?;
        let resp = match ram
            .authenticate_login(auth::AuthenticateLoginRequest {
                email: input.email,
                password: input.password,
                device_id: rc.device.device_id.clone(),
                platform: rc.device.platform.unwrap_or(auth::Platform::UnknownPlatform),
            })
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_not_found() || e.is_invalid_argument() => {
                return Ok(AuthenticatePayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(AuthenticateErrorCode::InvalidCredentials),
                    error_message: Some(
                        "The email or password you entered is incorrect.".to_string(),
                    ),
                    account: None,
                    client_encryption_key: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        rc.set_account(resp.account.clone());
        rc.set_auth_token(resp.token.value.clone());
        if !resp.token.client_encryption_key.is_empty() {
            rc.set_client_encryption_key(resp.token.client_encryption_key.clone());
        }
        rc.side_channel
            .set_auth_token(&resp.token.value, resp.token.expiration_epoch);
        Ok(AuthenticatePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            account: Some(Account::from_upstream(&resp.account)),
            client_encryption_key: if resp.token.client_encryption_key.is_empty() {
                None
            } else {
                Some(resp.token.client_encryption_key)
            },
        })
    }

    #[graphql(name = "createAccount")]
    async fn create_account(
        &self,
        ctx: &Context<'_>,
        input: CreateAccountInput,
    ) -> Result<CreateAccountPayload> {
        let (rc, ram, _config) = parts(ctx)?;
        let resp = match ram
            .create_account(auth::CreateAccountRequest {
                kind: match input.kind {
                    AccountKindInput::Provider => auth::AccountKind::Provider,
                    AccountKindInput::Patient => auth::AccountKind::Patient,
                },
                first_name: input.first_name,
                last_name: input.last_name,
                email: input.email,
                password: input.password,
                phone_number: input.phone_number.unwrap_or_default(),
                device_id: rc.device.device_id.clone(),
                platform: rc.device.platform.unwrap_or(auth::Platform::UnknownPlatform),
            })
            .await
        {
            Ok(resp) => resp,
            Err(e) if e.is_already_exists() => {
                return Ok(CreateAccountPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(CreateAccountErrorCode::AccountExists),
                    error_message: Some(
                        "An account already exists for that email address.".to_string(),
                    ),
                    account: None,
                });
            }
            Err(e) if e.is_invalid_argument() => {
                return Ok(CreateAccountPayload {
                    client_mutation_id: input.client_mutation_id,
                    success: false,
                    error_code: Some(CreateAccountErrorCode::InvalidInput),
                    error_message: Some(e.to_string()),
                    account: None,
                });
            }
            Err(e) => return Err(rc.upstream(e)),
        };
        rc.set_account(resp.account.clone());
        rc.set_auth_token(resp.token.value.clone());
        rc.side_channel
            .set_auth_token(&resp.token.value, resp.token.expiration_epoch);
        Ok(CreateAccountPayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
            error_code: None,
            error_message: None,
            account: Some(Account::from_upstream(&resp.account)),
        })
    }

    /// Sign out: best-effort token revocation, then clear the cookie.
    async fn unauthenticate(
        &self,
        ctx: &Context<'_>,
        #[graphql(default)] input: UnauthenticateInput,
    ) -> Result<UnauthenticatePayload> {
        let (rc, ram, _config) = parts(ctx)?;
        if let Some(token) = rc.auth_token()
            && let Err(err) = ram.unauthenticate(&token).await
        {
            warn!(request_id = %rc.request_id, %err, "unauthenticate upstream failed");
        }
        rc.side_channel.set_unauthenticated();
        Ok(UnauthenticatePayload {
            client_mutation_id: input.client_mutation_id,
            success: true,
        })
    }
}
