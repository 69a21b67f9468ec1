//! Per-request context and static gateway configuration.
//!
//! The gateway attaches a [`RequestContext`] to every GraphQL request via
//! `Request::data`. Resolvers read it through `Context::data`; the only
//! mutable pieces are the account slot (written once by authenticate /
//! createAccount) and the side channel the gateway inspects after execution
//! to refresh or clear the auth cookie.

use std::{
    collections::HashMap,
    sync::{Mutex, RwLock},
};

use meridian_upstream::{
    UpstreamError,
    auth::{Account, AccountKind, Platform},
};

use crate::error;

/// Static configuration the schema needs for links and provisioning.
/// Shared across requests; attached once as schema data.
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub email_domain: String,
    pub web_domain: String,
    pub media_api_domain: String,
    pub static_url_prefix: String,
    pub system_org_id: String,
    pub service_phone_number: String,
    pub dev_mode: bool,
}

impl StaticConfig {
    #[must_use]
    pub fn thread_url(&self, org_id: &str, thread_id: &str) -> String {
        format!("https://{}/org/{org_id}/thread/{thread_id}", self.web_domain)
    }

    #[must_use]
    pub fn visit_url(&self, org_id: &str, thread_id: &str, visit_id: &str) -> String {
        format!(
            "https://{}/org/{org_id}/thread/{thread_id}/visit/{visit_id}",
            self.web_domain
        )
    }

    #[must_use]
    pub fn media_url(&self, media_id: &str) -> String {
        format!("https://{}/media/{media_id}", self.media_api_domain)
    }

    #[must_use]
    pub fn static_asset_url(&self, name: &str) -> String {
        format!("{}/{name}", self.static_url_prefix.trim_end_matches('/'))
    }
}

/// Device identification headers forwarded by clients.
#[derive(Debug, Clone, Default)]
pub struct DeviceHeaders {
    pub device_id: String,
    pub platform: Option<Platform>,
    pub app_version: String,
}

/// Per-request feature toggles derived from headers and config.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureFlags {
    pub video_calling: bool,
    pub payments: bool,
}

const KEY_AUTH_TOKEN: &str = "auth_token";
const KEY_AUTH_EXPIRATION: &str = "auth_expiration";
const KEY_UNAUTHENTICATED: &str = "unauthenticated";

/// Mutation side channel: cookie changes signaled by resolvers and applied
/// by the gateway after execution. Each key is written at most once.
#[derive(Default)]
pub struct SideChannel {
    values: Mutex<HashMap<&'static str, String>>,
}

/// What the gateway should do to the auth cookie after execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieChange {
    Set { token: String, expiration_epoch: u64 },
    Clear,
}

impl SideChannel {
    pub fn set_auth_token(&self, token: &str, expiration_epoch: u64) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values
            .entry(KEY_AUTH_TOKEN)
            .or_insert_with(|| token.to_string());
        values
            .entry(KEY_AUTH_EXPIRATION)
            .or_insert_with(|| expiration_epoch.to_string());
    }

    pub fn set_unauthenticated(&self) {
        self.values
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entry(KEY_UNAUTHENTICATED)
            .or_insert_with(|| "1".to_string());
    }

    /// Interpreted state after execution. A set token wins over a clear;
    /// both present never happens since each mutation writes one signal.
    #[must_use]
    pub fn cookie_change(&self) -> Option<CookieChange> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = values.get(KEY_AUTH_TOKEN) {
            let expiration_epoch = values
                .get(KEY_AUTH_EXPIRATION)
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            return Some(CookieChange::Set {
                token: token.clone(),
                expiration_epoch,
            });
        }
        if values.contains_key(KEY_UNAUTHENTICATED) {
            return Some(CookieChange::Clear);
        }
        None
    }
}

/// Context injected into every resolver via `Context::data()`.
pub struct RequestContext {
    pub request_id: String,
    pub remote_addr: String,
    pub user_agent: String,
    pub device: DeviceHeaders,
    pub features: FeatureFlags,
    pub dev_mode: bool,
    auth_token: RwLock<Option<String>>,
    client_encryption_key: RwLock<Option<String>>,
    account: RwLock<Option<Account>>,
    pub side_channel: SideChannel,
}

impl RequestContext {
    #[must_use]
    pub fn new(request_id: String, dev_mode: bool) -> Self {
        Self {
            request_id,
            remote_addr: String::new(),
            user_agent: String::new(),
            device: DeviceHeaders::default(),
            features: FeatureFlags::default(),
            dev_mode,
            auth_token: RwLock::new(None),
            client_encryption_key: RwLock::new(None),
            account: RwLock::new(None),
            side_channel: SideChannel::default(),
        }
    }

    #[must_use]
    pub fn account(&self) -> Option<Account> {
        self.account
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Single-write slot: authenticate and createAccount publish the account
    /// here so later fields in the same request see it.
    pub fn set_account(&self, account: Account) {
        let mut slot = self.account.write().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(account);
        }
    }

    #[must_use]
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_auth_token(&self, token: String) {
        let mut slot = self.auth_token.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(token);
    }

    #[must_use]
    pub fn client_encryption_key(&self) -> Option<String> {
        self.client_encryption_key
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn set_client_encryption_key(&self, key: String) {
        let mut slot = self
            .client_encryption_key
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *slot = Some(key);
    }

    // ── Authorization predicates ────────────────────────────────────────────

    pub fn require_account(&self) -> async_graphql::Result<Account> {
        self.account().ok_or_else(error::not_authenticated)
    }

    pub fn require_provider(&self) -> async_graphql::Result<Account> {
        let account = self.require_account()?;
        if account.kind != AccountKind::Provider {
            return Err(error::not_authorized());
        }
        Ok(account)
    }

    pub fn require_patient(&self) -> async_graphql::Result<Account> {
        let account = self.require_account()?;
        if account.kind != AccountKind::Patient {
            return Err(error::not_authorized());
        }
        Ok(account)
    }

    // ── Error helpers ───────────────────────────────────────────────────────

    #[must_use]
    pub fn internal(&self, cause: impl std::fmt::Display) -> async_graphql::Error {
        error::internal(&self.request_id, self.dev_mode, cause)
    }

    #[must_use]
    pub fn upstream(&self, err: UpstreamError) -> async_graphql::Error {
        error::from_upstream(&self.request_id, self.dev_mode, err)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn account_slot_writes_once() {
        let rc = RequestContext::new("r1".into(), true);
        assert!(rc.account().is_none());
        rc.set_account(Account {
            id: "account_1".into(),
            kind: AccountKind::Provider,
        });
        rc.set_account(Account {
            id: "account_2".into(),
            kind: AccountKind::Patient,
        });
        assert_eq!(rc.account().unwrap().id, "account_1");
    }

    #[test]
    fn side_channel_token_wins_and_is_write_once() {
        let sc = SideChannel::default();
        sc.set_auth_token("tok-a", 100);
        sc.set_auth_token("tok-b", 200);
        assert_eq!(
            sc.cookie_change(),
            Some(CookieChange::Set {
                token: "tok-a".into(),
                expiration_epoch: 100
            })
        );
    }

    #[test]
    fn side_channel_clear() {
        let sc = SideChannel::default();
        assert_eq!(sc.cookie_change(), None);
        sc.set_unauthenticated();
        assert_eq!(sc.cookie_change(), Some(CookieChange::Clear));
    }

    #[test]
    fn wrong_account_kind_is_not_authorized() {
        let rc = RequestContext::new("r1".into(), true);
        rc.set_account(Account {
            id: "account_1".into(),
            kind: AccountKind::Patient,
        });
        let err = rc.require_provider().unwrap_err();
        let ext = err.extensions.unwrap();
        assert_eq!(
            ext.get("type"),
            Some(&async_graphql::Value::from("NOT_AUTHORIZED"))
        );
    }
}
