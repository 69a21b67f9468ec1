//! Schema-level tests against mock backends.
//!
//! Each test builds a schema over a `Services` bundle whose relevant slots
//! are replaced with in-memory mocks, then executes real GraphQL documents
//! and asserts on the serialized response.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use {async_graphql::Request, async_trait::async_trait, serde_json::json};

use {
    meridian_graphql::{
        build_schema,
        context::{CookieChange, RequestContext, StaticConfig},
        raccess::ResourceAccessor,
    },
    meridian_upstream::{
        Services, UpstreamError, UpstreamResult, auth, directory, excomms, invite, threading,
    },
};

// ── Fixtures ────────────────────────────────────────────────────────────────

const ORG_ID: &str = "entity_org1";
const PROVIDER_ENTITY_ID: &str = "entity_prov1";
const PROVIDER_ACCOUNT_ID: &str = "account_prov1";
const PATIENT_ENTITY_ID: &str = "entity_pat1";
const PATIENT_PHONE: &str = "+15551230000";

fn test_config() -> StaticConfig {
    StaticConfig {
        email_domain: "mail.test".to_string(),
        web_domain: "app.test".to_string(),
        media_api_domain: "media.test".to_string(),
        static_url_prefix: "https://static.test".to_string(),
        system_org_id: "entity_system".to_string(),
        service_phone_number: String::new(),
        dev_mode: true,
    }
}

fn provider_account() -> auth::Account {
    auth::Account {
        id: PROVIDER_ACCOUNT_ID.to_string(),
        kind: auth::AccountKind::Provider,
    }
}

fn patient_account() -> auth::Account {
    auth::Account {
        id: "account_pat1".to_string(),
        kind: auth::AccountKind::Patient,
    }
}

fn bare_entity(id: &str, entity_type: directory::EntityType) -> directory::Entity {
    directory::Entity {
        id: id.to_string(),
        entity_type,
        status: Some(directory::EntityStatus::Active),
        info: directory::EntityInfo::default(),
        contacts: Vec::new(),
        memberships: Vec::new(),
        members: Vec::new(),
        external_ids: Vec::new(),
        image_media_id: None,
        account_id: None,
        last_modified_timestamp: 0,
    }
}

fn org() -> directory::Entity {
    let mut org = bare_entity(ORG_ID, directory::EntityType::Organization);
    org.info.display_name = "Lakeside Cardiology".to_string();
    org
}

fn provider_entity() -> directory::Entity {
    let mut entity = bare_entity(PROVIDER_ENTITY_ID, directory::EntityType::Internal);
    entity.info.first_name = "Ann".to_string();
    entity.info.last_name = "Lee".to_string();
    entity.memberships = vec![org()];
    entity.external_ids = vec![PROVIDER_ACCOUNT_ID.to_string()];
    entity.account_id = Some(PROVIDER_ACCOUNT_ID.to_string());
    entity
}

fn patient_entity() -> directory::Entity {
    let mut entity = bare_entity(PATIENT_ENTITY_ID, directory::EntityType::External);
    entity.info.first_name = "Paula".to_string();
    entity.info.last_name = "Smith".to_string();
    entity.memberships = vec![org()];
    entity.contacts = vec![directory::Contact {
        id: "contact_1".to_string(),
        contact_type: directory::ContactType::Phone,
        value: PATIENT_PHONE.to_string(),
        provisioned: false,
        verified: true,
        label: String::new(),
    }];
    entity
}

fn thread_row(id: &str, primary_entity_id: &str) -> threading::Thread {
    threading::Thread {
        id: id.to_string(),
        organization_id: ORG_ID.to_string(),
        primary_entity_id: primary_entity_id.to_string(),
        thread_type: threading::ThreadType::External,
        title: String::new(),
        subtitle: "SMS".to_string(),
        last_message_timestamp: 100,
        created_timestamp: 50,
        message_count: 3,
        unread: false,
        unread_reference: false,
        following: true,
        last_primary_entity_endpoints: vec![threading::Endpoint {
            channel: threading::EndpointChannel::Sms,
            id: PATIENT_PHONE.to_string(),
        }],
        permissions: threading::ThreadPermissions {
            allow_internal_messages: true,
            allow_external_delivery: true,
            allow_mentions: true,
            allow_add_followers: true,
            allow_remove_followers: true,
            allow_update_title: true,
            allow_delete: true,
            allow_leave: true,
            allow_email_attachments: true,
            allow_sms_attachments: true,
            allow_video_attachments: false,
        },
        tags: Vec::new(),
    }
}

// ── Mock services ───────────────────────────────────────────────────────────

#[derive(Default)]
struct MockDirectory {
    entities: Vec<directory::Entity>,
    /// (entity id, claimed subdomain)
    domains: Vec<(String, String)>,
}

#[async_trait]
impl directory::DirectoryService for MockDirectory {
    async fn lookup_entities(
        &self,
        req: directory::LookupEntitiesRequest,
    ) -> UpstreamResult<Vec<directory::Entity>> {
        let matches = |e: &directory::Entity| match &req.key {
            directory::LookupKey::EntityId(id) => e.id == *id,
            directory::LookupKey::ExternalId(xid) => e.external_ids.contains(xid),
            directory::LookupKey::BatchEntityIds(ids) => ids.contains(&e.id),
        };
        Ok(self.entities.iter().filter(|e| matches(e)).cloned().collect())
    }

    async fn lookup_entities_by_contact(
        &self,
        req: directory::LookupEntitiesByContactRequest,
    ) -> UpstreamResult<Vec<directory::Entity>> {
        Ok(self
            .entities
            .iter()
            .filter(|e| e.contacts.iter().any(|c| c.value == req.contact_value))
            .cloned()
            .collect())
    }

    async fn create_entity(
        &self,
        req: directory::CreateEntityRequest,
    ) -> UpstreamResult<directory::Entity> {
        let mut entity = bare_entity("entity_new", req.entity_type);
        entity.info = req.info;
        entity.contacts = req.contacts;
        entity.memberships = vec![bare_entity(
            &req.initial_membership_entity_id,
            directory::EntityType::Organization,
        )];
        Ok(entity)
    }

    async fn update_entity(
        &self,
        req: directory::UpdateEntityRequest,
    ) -> UpstreamResult<directory::Entity> {
        Err(UpstreamError::not_found(req.entity_id))
    }

    async fn create_contacts(
        &self,
        req: directory::CreateContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.entities
            .iter()
            .find(|e| e.id == req.entity_id)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(req.entity_id))
    }

    async fn update_contacts(
        &self,
        req: directory::UpdateContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.entities
            .iter()
            .find(|e| e.id == req.entity_id)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(req.entity_id))
    }

    async fn delete_contacts(
        &self,
        req: directory::DeleteContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.entities
            .iter()
            .find(|e| e.id == req.entity_id)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(req.entity_id))
    }

    async fn lookup_entity_domain(
        &self,
        req: directory::LookupEntityDomainRequest,
    ) -> UpstreamResult<directory::LookupEntityDomainResponse> {
        self.domains
            .iter()
            .find(|(entity_id, domain)| {
                req.entity_id.as_deref().is_none_or(|id| id == entity_id)
                    && req.domain.as_deref().is_none_or(|d| d == domain)
            })
            .map(|(entity_id, domain)| directory::LookupEntityDomainResponse {
                entity_id: entity_id.clone(),
                domain: domain.clone(),
            })
            .ok_or_else(|| UpstreamError::not_found("entity domain"))
    }

    async fn create_entity_domain(
        &self,
        _req: directory::CreateEntityDomainRequest,
    ) -> UpstreamResult<()> {
        Ok(())
    }

    async fn profile(&self, _key: directory::ProfileKey) -> UpstreamResult<directory::Profile> {
        Err(UpstreamError::not_found("profile"))
    }

    async fn update_profile(
        &self,
        req: directory::UpdateProfileRequest,
    ) -> UpstreamResult<directory::Profile> {
        let mut profile = req.profile;
        if profile.id.is_empty() {
            profile.id = "prof_1".to_string();
        }
        Ok(profile)
    }
}

#[derive(Default)]
struct MockThreading {
    threads: Vec<threading::Thread>,
}

#[async_trait]
impl threading::ThreadingService for MockThreading {
    async fn query_threads(
        &self,
        _req: threading::QueryThreadsRequest,
    ) -> UpstreamResult<threading::QueryThreadsResponse> {
        Ok(threading::QueryThreadsResponse {
            edges: self
                .threads
                .iter()
                .map(|t| threading::ThreadEdge {
                    thread: t.clone(),
                    cursor: t.id.clone(),
                })
                .collect(),
            has_more: false,
            total: Some(self.threads.len() as u64),
        })
    }

    async fn thread(&self, req: threading::ThreadRequest) -> UpstreamResult<threading::Thread> {
        self.threads
            .iter()
            .find(|t| t.id == req.thread_id)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(req.thread_id))
    }

    async fn threads_for_member(
        &self,
        req: threading::ThreadsForMemberRequest,
    ) -> UpstreamResult<Vec<threading::Thread>> {
        Ok(self
            .threads
            .iter()
            .filter(|t| t.primary_entity_id == req.entity_id)
            .cloned()
            .collect())
    }

    async fn thread_items(
        &self,
        _req: threading::ThreadItemsRequest,
    ) -> UpstreamResult<threading::ThreadItemsResponse> {
        Ok(threading::ThreadItemsResponse {
            edges: Vec::new(),
            has_more: false,
        })
    }

    async fn thread_item(&self, item_id: &str) -> UpstreamResult<threading::ThreadItem> {
        Err(UpstreamError::not_found(item_id))
    }

    async fn post_message(
        &self,
        req: threading::PostMessageRequest,
    ) -> UpstreamResult<threading::PostMessageResponse> {
        let thread = self
            .threads
            .iter()
            .find(|t| t.id == req.thread_id)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(&req.thread_id))?;
        Ok(threading::PostMessageResponse {
            item: threading::ThreadItem {
                id: "ti_new".to_string(),
                uuid: req.uuid,
                thread_id: req.thread_id,
                organization_id: thread.organization_id.clone(),
                actor_entity_id: req.from_entity_id,
                internal: req.internal,
                timestamp: 200,
                modified_timestamp: 200,
                data: threading::ThreadItemPayload::Message(threading::MessageData {
                    text: req.text,
                    summary: req.summary,
                    title: req.title,
                    source: req.source,
                    destinations: req.destinations,
                    attachments: req.attachments,
                    refs: Vec::new(),
                    status: None,
                }),
            },
            thread,
        })
    }

    async fn create_empty_thread(
        &self,
        req: threading::CreateEmptyThreadRequest,
    ) -> UpstreamResult<threading::Thread> {
        Ok(thread_row("t_new", &req.primary_entity_id))
    }

    async fn update_thread(
        &self,
        req: threading::UpdateThreadRequest,
    ) -> UpstreamResult<threading::UpdateThreadResponse> {
        let mut thread = self
            .threads
            .iter()
            .find(|t| t.id == req.thread_id)
            .cloned()
            .ok_or_else(|| UpstreamError::not_found(&req.thread_id))?;
        if let Some(title) = req.title {
            thread.title = title;
        }
        Ok(threading::UpdateThreadResponse { thread })
    }

    async fn mark_threads_as_read(
        &self,
        req: threading::MarkThreadsAsReadRequest,
    ) -> UpstreamResult<()> {
        for thread_id in &req.thread_ids {
            if !self.threads.iter().any(|t| t.id == *thread_id) {
                return Err(UpstreamError::not_found(thread_id));
            }
        }
        Ok(())
    }

    async fn delete_thread(&self, req: threading::DeleteThreadRequest) -> UpstreamResult<()> {
        if self.threads.iter().any(|t| t.id == req.thread_id) {
            Ok(())
        } else {
            Err(UpstreamError::not_found(req.thread_id))
        }
    }

    async fn saved_queries(&self, _entity_id: &str) -> UpstreamResult<Vec<threading::SavedQuery>> {
        Ok(Vec::new())
    }

    async fn saved_query(&self, saved_query_id: &str) -> UpstreamResult<threading::SavedQuery> {
        Err(UpstreamError::not_found(saved_query_id))
    }

    async fn saved_messages(
        &self,
        _key: threading::SavedMessagesKey,
    ) -> UpstreamResult<Vec<threading::SavedMessage>> {
        Ok(Vec::new())
    }

    async fn scheduled_messages(
        &self,
        _key: threading::ScheduledMessagesKey,
    ) -> UpstreamResult<Vec<threading::ScheduledMessage>> {
        Ok(Vec::new())
    }

    async fn create_scheduled_message(
        &self,
        req: threading::CreateScheduledMessageRequest,
    ) -> UpstreamResult<threading::ScheduledMessage> {
        Ok(threading::ScheduledMessage {
            id: "schmsg_new".to_string(),
            thread_id: req.thread_id,
            actor_entity_id: req.actor_entity_id,
            scheduled_for: req.scheduled_for,
            status: threading::ScheduledMessageStatus::Pending,
            content: req.content,
        })
    }

    async fn delete_scheduled_message(&self, id: &str) -> UpstreamResult<()> {
        Err(UpstreamError::not_found(id))
    }
}

struct MockAuth {
    password: String,
}

#[async_trait]
impl auth::AuthService for MockAuth {
    async fn check_authentication(
        &self,
        _req: auth::CheckAuthenticationRequest,
    ) -> UpstreamResult<auth::CheckAuthenticationResponse> {
        Ok(auth::CheckAuthenticationResponse {
            is_authenticated: false,
            token: None,
            account: None,
        })
    }

    async fn authenticate_login(
        &self,
        req: auth::AuthenticateLoginRequest,
    ) -> UpstreamResult<auth::AuthenticateLoginResponse> {
        if req.password != self.password {
            return Err(UpstreamError::not_found(req.email));
        }
        Ok(auth::AuthenticateLoginResponse {
            token: auth::AuthToken {
                value: "tok123".to_string(),
                expiration_epoch: 9_999_999_999,
                client_encryption_key: "cek456".to_string(),
            },
            account: provider_account(),
        })
    }

    async fn create_account(
        &self,
        req: auth::CreateAccountRequest,
    ) -> UpstreamResult<auth::CreateAccountResponse> {
        Err(UpstreamError::AlreadyExists(req.email))
    }

    async fn unauthenticate(&self, _token: &str) -> UpstreamResult<()> {
        Ok(())
    }

    async fn get_account(&self, req: auth::GetAccountRequest) -> UpstreamResult<auth::Account> {
        Err(UpstreamError::not_found(req.id))
    }
}

/// One pending call, `ipc_1`. Accept and decline work; connecting straight
/// from pending is a failed precondition.
struct MockExcomms;

#[async_trait]
impl excomms::ExcommsService for MockExcomms {
    async fn provision_email_address(
        &self,
        req: excomms::ProvisionEmailAddressRequest,
    ) -> UpstreamResult<excomms::ProvisionEmailAddressResponse> {
        Ok(excomms::ProvisionEmailAddressResponse {
            email_address: format!("{}@{}", req.local_part, req.domain),
        })
    }

    async fn provision_phone_number(
        &self,
        _req: excomms::ProvisionPhoneNumberRequest,
    ) -> UpstreamResult<excomms::ProvisionPhoneNumberResponse> {
        Ok(excomms::ProvisionPhoneNumberResponse {
            phone_number: "+15557770000".to_string(),
        })
    }

    async fn initiate_ip_call(
        &self,
        req: excomms::InitiateIpCallRequest,
    ) -> UpstreamResult<excomms::IpCall> {
        Ok(pending_call(req.video_enabled))
    }

    async fn ip_call(&self, call_id: &str) -> UpstreamResult<excomms::IpCall> {
        if call_id == "ipc_1" {
            Ok(pending_call(true))
        } else {
            Err(UpstreamError::not_found(call_id))
        }
    }

    async fn pending_ip_calls(&self, _account_id: &str) -> UpstreamResult<Vec<excomms::IpCall>> {
        Ok(Vec::new())
    }

    async fn update_ip_call(
        &self,
        req: excomms::UpdateIpCallRequest,
    ) -> UpstreamResult<excomms::IpCall> {
        if req.call_id != "ipc_1" {
            return Err(UpstreamError::not_found(req.call_id));
        }
        if req.state == excomms::CallState::Connected {
            return Err(UpstreamError::FailedPrecondition(
                "pending call cannot connect".to_string(),
            ));
        }
        let mut call = pending_call(true);
        if let Some(p) = call
            .participants
            .iter_mut()
            .find(|p| p.account_id == req.account_id)
        {
            p.state = req.state;
        }
        Ok(call)
    }
}

fn pending_call(video_enabled: bool) -> excomms::IpCall {
    excomms::IpCall {
        id: "ipc_1".to_string(),
        video_enabled,
        participants: vec![
            excomms::CallParticipant {
                account_id: PROVIDER_ACCOUNT_ID.to_string(),
                entity_id: PROVIDER_ENTITY_ID.to_string(),
                role: excomms::CallRole::Caller,
                state: excomms::CallState::Pending,
                network_type: None,
                access_token: "at1".to_string(),
                identity: PROVIDER_ENTITY_ID.to_string(),
            },
            excomms::CallParticipant {
                account_id: "account_pat1".to_string(),
                entity_id: PATIENT_ENTITY_ID.to_string(),
                role: excomms::CallRole::Recipient,
                state: excomms::CallState::Pending,
                network_type: None,
                access_token: "at2".to_string(),
                identity: PATIENT_ENTITY_ID.to_string(),
            },
        ],
    }
}

/// Knows a single colleague invite token, `inv_tok1`.
struct MockInvite;

#[async_trait]
impl invite::InviteService for MockInvite {
    async fn lookup_invite(&self, token: &str) -> UpstreamResult<invite::Invite> {
        if token != "inv_tok1" {
            return Err(UpstreamError::not_found(token));
        }
        Ok(invite::Invite {
            token: token.to_string(),
            invite_type: invite::InviteType::Colleague,
            organization_entity_id: ORG_ID.to_string(),
            inviter_entity_id: PROVIDER_ENTITY_ID.to_string(),
            email: "newdoc@mail.test".to_string(),
            phone_number: String::new(),
        })
    }

    async fn send_colleague_invite(
        &self,
        _req: invite::SendColleagueInviteRequest,
    ) -> UpstreamResult<()> {
        Ok(())
    }

    async fn mark_invite_consumed(&self, _token: &str) -> UpstreamResult<()> {
        Ok(())
    }
}

// ── Harness ─────────────────────────────────────────────────────────────────

fn care_org_services() -> Services {
    let mut services = Services::noop();
    services.auth = Arc::new(MockAuth {
        password: "hunter2".to_string(),
    });
    services.directory = Arc::new(MockDirectory {
        entities: vec![org(), provider_entity(), patient_entity()],
        domains: vec![(ORG_ID.to_string(), "lakeside".to_string())],
    });
    services.threading = Arc::new(MockThreading {
        threads: vec![thread_row("t_1", PATIENT_ENTITY_ID)],
    });
    services.excomms = Arc::new(MockExcomms);
    services.invite = Arc::new(MockInvite);
    services
}

async fn execute_as(
    services: &Services,
    account: Option<auth::Account>,
    document: &str,
) -> (serde_json::Value, Vec<serde_json::Value>, Arc<RequestContext>) {
    let schema = build_schema(services.clone(), test_config());
    let rc = RequestContext::new("test-req".to_string(), true);
    if let Some(account) = account {
        rc.set_account(account);
    }
    let rc = Arc::new(rc);
    let request = Request::new(document)
        .data(Arc::clone(&rc))
        .data(Arc::new(ResourceAccessor::new(services.clone())));
    let response = schema.execute(request).await;
    let errors = response
        .errors
        .iter()
        .map(|e| serde_json::to_value(e).unwrap())
        .collect();
    (response.data.into_json().unwrap(), errors, rc)
}

// ── Authorization ───────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_request_is_not_authenticated() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(&services, None, "{ node(id: \"t_1\") { id } }").await;
    assert!(data.is_null() || data["node"].is_null());
    assert_eq!(errors[0]["extensions"]["type"], "NOT_AUTHENTICATED");
    assert_eq!(
        errors[0]["extensions"]["userMessage"],
        "Please sign in to continue."
    );
}

#[tokio::test]
async fn patient_cannot_use_provider_queries() {
    let services = care_org_services();
    let (_data, errors, _rc) = execute_as(
        &services,
        Some(patient_account()),
        "{ thread(id: \"t_1\") { id } }",
    )
    .await;
    assert_eq!(errors[0]["extensions"]["type"], "NOT_AUTHORIZED");
}

#[tokio::test]
async fn unknown_node_prefix_is_not_supported() {
    let services = care_org_services();
    let (_data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        "{ node(id: \"bogus_1\") { id } }",
    )
    .await;
    assert_eq!(errors[0]["extensions"]["type"], "NOT_SUPPORTED");
}

#[tokio::test]
async fn node_dispatches_on_id_prefix() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        "{ entity: node(id: \"entity_pat1\") { id } thread: node(id: \"t_1\") { id } }",
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["entity"]["id"], "entity_pat1");
    assert_eq!(data["thread"]["id"], "t_1");
}

// ── Queries ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn subdomain_reports_availability() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        "{ claimed: subdomain(value: \"lakeside\") { available } open: subdomain(value: \"northshore\") { available } }",
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["claimed"]["available"], json!(false));
    assert_eq!(data["open"]["available"], json!(true));
}

#[tokio::test]
async fn invite_resolves_without_an_account() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        None,
        "{ invite(token: \"inv_tok1\") { type organizationID email } }",
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["invite"]["type"], "COLLEAGUE");
    assert_eq!(data["invite"]["organizationID"], ORG_ID);
    assert_eq!(data["invite"]["email"], "newdoc@mail.test");
}

#[tokio::test]
async fn unknown_invite_token_is_not_found() {
    let services = care_org_services();
    let (_data, errors, _rc) = execute_as(
        &services,
        None,
        "{ invite(token: \"inv_nope\") { email } }",
    )
    .await;
    assert_eq!(errors[0]["extensions"]["type"], "NOT_FOUND");
}

#[tokio::test]
async fn id_only_entity_selection_skips_the_directory() {
    // The primary entity is deliberately absent from the directory: an
    // `{ id }` selection must be answered from the thread row alone.
    let mut services = care_org_services();
    services.directory = Arc::new(MockDirectory {
        entities: vec![org(), provider_entity()],
        domains: Vec::new(),
    });
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        "{ thread(id: \"t_1\") { primaryEntity { id } } }",
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["thread"]["primaryEntity"]["id"], PATIENT_ENTITY_ID);
}

#[tokio::test]
async fn thread_read_state_is_relative_to_the_viewer() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        "{ thread(id: \"t_1\") { id unread following subtitle } }",
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["thread"]["id"], "t_1");
    assert_eq!(data["thread"]["following"], json!(true));
}

// ── Mutations ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn authenticate_publishes_account_and_cookie() {
    let services = care_org_services();
    let (data, errors, rc) = execute_as(
        &services,
        None,
        r#"mutation {
            authenticate(input: { clientMutationId: "m1", email: "ann@lakeside.test", password: "hunter2" }) {
                clientMutationId success errorCode account { id } clientEncryptionKey
            }
        }"#,
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let payload = &data["authenticate"];
    assert_eq!(payload["clientMutationId"], "m1");
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["account"]["id"], PROVIDER_ACCOUNT_ID);
    assert_eq!(payload["clientEncryptionKey"], "cek456");
    assert_eq!(
        rc.side_channel.cookie_change(),
        Some(CookieChange::Set {
            token: "tok123".to_string(),
            expiration_epoch: 9_999_999_999,
        })
    );
}

#[tokio::test]
async fn authenticate_rejects_bad_credentials_in_the_payload() {
    let services = care_org_services();
    let (data, errors, rc) = execute_as(
        &services,
        None,
        r#"mutation {
            authenticate(input: { email: "ann@lakeside.test", password: "wrong" }) {
                success errorCode errorMessage
            }
        }"#,
    )
    .await;
    assert!(errors.is_empty(), "credential failures must stay in the payload");
    let payload = &data["authenticate"];
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["errorCode"], "INVALID_CREDENTIALS");
    assert_eq!(
        payload["errorMessage"],
        "The email or password you entered is incorrect."
    );
    assert_eq!(rc.side_channel.cookie_change(), None);
}

#[tokio::test]
async fn unauthenticate_signals_a_cookie_clear() {
    let services = care_org_services();
    let (data, errors, rc) = execute_as(
        &services,
        Some(provider_account()),
        "mutation { unauthenticate { success } }",
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["unauthenticate"]["success"], json!(true));
    assert_eq!(rc.side_channel.cookie_change(), Some(CookieChange::Clear));
}

#[tokio::test]
async fn post_message_to_missing_thread_stays_in_the_payload() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        r#"mutation {
            postMessage(input: { threadID: "t_missing", msg: { text: "hello" } }) {
                success errorCode errorMessage
            }
        }"#,
    )
    .await;
    assert!(errors.is_empty(), "user-surface failures must stay in the payload");
    let payload = &data["postMessage"];
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["errorCode"], "THREAD_DOES_NOT_EXIST");
    assert_eq!(payload["errorMessage"], "Thread does not exist.");
}

#[tokio::test]
async fn post_message_round_trips_text() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        r#"mutation {
            postMessage(input: { threadID: "t_1", msg: { text: "hello there", internal: true } }) {
                success item { id } thread { id }
            }
        }"#,
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let payload = &data["postMessage"];
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["item"]["id"], "ti_new");
    assert_eq!(payload["thread"]["id"], "t_1");
}

#[tokio::test]
async fn create_thread_reports_existing_threads() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        &format!(
            r#"mutation {{
                createThread(input: {{
                    organizationID: "{ORG_ID}",
                    contactValue: "{PATIENT_PHONE}",
                    firstName: "Pat", lastName: "Smith"
                }}) {{
                    success errorCode nameDiffers
                    thread {{ id }}
                    existingThreads {{ id }}
                }}
            }}"#
        ),
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let payload = &data["createThread"];
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["errorCode"], "EXISTING_THREAD");
    // Fixture patient is Paula Smith; the request said Pat.
    assert_eq!(payload["nameDiffers"], json!(true));
    assert_eq!(payload["thread"]["id"], "t_1");
    assert_eq!(payload["existingThreads"][0]["id"], "t_1");
}

#[tokio::test]
async fn create_thread_with_new_contact_succeeds() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        &format!(
            r#"mutation {{
                createThread(input: {{
                    organizationID: "{ORG_ID}",
                    contactValue: "+15559998888",
                    firstName: "New", lastName: "Contact"
                }}) {{ success errorCode thread {{ id }} }}
            }}"#
        ),
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let payload = &data["createThread"];
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["thread"]["id"], "t_new");
}

#[tokio::test]
async fn mark_threads_as_read_echoes_the_mutation_id() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        &format!(
            r#"mutation {{
                markThreadsAsRead(input: {{
                    clientMutationId: "42",
                    organizationID: "{ORG_ID}",
                    threadIDs: ["t_1"]
                }}) {{ clientMutationId success errorCode }}
            }}"#
        ),
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let payload = &data["markThreadsAsRead"];
    assert_eq!(payload["clientMutationId"], "42");
    assert_eq!(payload["success"], json!(true));
}

#[tokio::test]
async fn update_call_maps_invalid_transitions() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        r#"mutation {
            updateCall(input: { callID: "ipc_1", callState: CONNECTED }) {
                success errorCode errorMessage
            }
        }"#,
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    let payload = &data["updateCall"];
    assert_eq!(payload["success"], json!(false));
    assert_eq!(payload["errorCode"], "INVALID_STATE_TRANSITION");
}

#[tokio::test]
async fn update_call_on_missing_call_stays_in_the_payload() {
    let services = care_org_services();
    let (data, errors, _rc) = execute_as(
        &services,
        Some(provider_account()),
        r#"mutation {
            updateCall(input: { callID: "ipc_gone", callState: DECLINED }) {
                success errorCode
            }
        }"#,
    )
    .await;
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    assert_eq!(data["updateCall"]["errorCode"], "CALL_DOES_NOT_EXIST");
}
