use async_graphql::{Enum, ID, Interface, SimpleObject};

use meridian_upstream::auth;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Provider,
    Patient,
}

impl From<auth::AccountKind> for AccountType {
    fn from(kind: auth::AccountKind) -> Self {
        match kind {
            auth::AccountKind::Provider => Self::Provider,
            auth::AccountKind::Patient => Self::Patient,
        }
    }
}

#[derive(Debug, Clone, SimpleObject)]
pub struct ProviderAccount {
    pub id: ID,
    #[graphql(name = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct PatientAccount {
    pub id: ID,
    #[graphql(name = "type")]
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Interface)]
#[graphql(
    field(name = "id", ty = "&ID"),
    field(name = "type", method = "account_type", ty = "&AccountType")
)]
pub enum Account {
    ProviderAccount(ProviderAccount),
    PatientAccount(PatientAccount),
}

impl Account {
    #[must_use]
    pub fn from_upstream(account: &auth::Account) -> Self {
        match account.kind {
            auth::AccountKind::Provider => Self::ProviderAccount(ProviderAccount {
                id: ID(account.id.clone()),
                account_type: AccountType::Provider,
            }),
            auth::AccountKind::Patient => Self::PatientAccount(PatientAccount {
                id: ID(account.id.clone()),
                account_type: AccountType::Patient,
            }),
        }
    }
}

/// The viewer: the authenticated account plus request-scoped secrets.
#[derive(Debug, Clone, SimpleObject)]
pub struct Me {
    pub account: Account,
    #[graphql(name = "clientEncryptionKey")]
    pub client_encryption_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(rename_items = "SCREAMING_SNAKE_CASE")]
pub enum InviteType {
    Colleague,
    Patient,
    Organization,
}

/// A signup invite resolved by token, before the caller has an account.
#[derive(Debug, Clone, SimpleObject)]
pub struct Invite {
    #[graphql(name = "type")]
    pub invite_type: InviteType,
    #[graphql(name = "organizationID")]
    pub organization_id: ID,
    pub email: String,
    #[graphql(name = "phoneNumber")]
    pub phone_number: String,
}
