//! Identity/auth service: token checks, login, account creation.

use {
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
};

use crate::{UpstreamError, UpstreamResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Provider,
    Patient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub kind: AccountKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub value: String,
    /// Unix seconds; 0 means the service left expiry to the client default.
    #[serde(default)]
    pub expiration_epoch: u64,
    #[serde(default)]
    pub client_encryption_key: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Platform {
    Ios,
    Android,
    Web,
    UnknownPlatform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthenticationRequest {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckAuthenticationResponse {
    pub is_authenticated: bool,
    #[serde(default)]
    pub token: Option<AuthToken>,
    #[serde(default)]
    pub account: Option<Account>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateLoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub device_id: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateLoginResponse {
    pub token: AuthToken,
    pub account: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub kind: AccountKind,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub device_id: String,
    pub platform: Platform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountResponse {
    pub token: AuthToken,
    pub account: Account,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAccountRequest {
    pub id: String,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn check_authentication(
        &self,
        req: CheckAuthenticationRequest,
    ) -> UpstreamResult<CheckAuthenticationResponse>;
    async fn authenticate_login(
        &self,
        req: AuthenticateLoginRequest,
    ) -> UpstreamResult<AuthenticateLoginResponse>;
    async fn create_account(
        &self,
        req: CreateAccountRequest,
    ) -> UpstreamResult<CreateAccountResponse>;
    async fn unauthenticate(&self, token: &str) -> UpstreamResult<()>;
    async fn get_account(&self, req: GetAccountRequest) -> UpstreamResult<Account>;
}

pub struct NoopAuthService;

#[async_trait]
impl AuthService for NoopAuthService {
    async fn check_authentication(
        &self,
        _req: CheckAuthenticationRequest,
    ) -> UpstreamResult<CheckAuthenticationResponse> {
        Ok(CheckAuthenticationResponse {
            is_authenticated: false,
            token: None,
            account: None,
        })
    }

    async fn authenticate_login(
        &self,
        _req: AuthenticateLoginRequest,
    ) -> UpstreamResult<AuthenticateLoginResponse> {
        Err(UpstreamError::not_found("auth service not configured"))
    }

    async fn create_account(
        &self,
        _req: CreateAccountRequest,
    ) -> UpstreamResult<CreateAccountResponse> {
        Err(UpstreamError::not_found("auth service not configured"))
    }

    async fn unauthenticate(&self, _token: &str) -> UpstreamResult<()> {
        Ok(())
    }

    async fn get_account(&self, req: GetAccountRequest) -> UpstreamResult<Account> {
        Err(UpstreamError::not_found(req.id))
    }
}
