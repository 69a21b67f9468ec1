//! Resource accessor: the single path from resolvers to upstream services.
//!
//! One accessor is built per request. It owns a clone of the service bundle
//! plus request-scoped caches, translates upstream not-found into the
//! [`UpstreamError::NotFound`] sentinel uniformly, and performs the
//! per-operation authorization checks that must not be left to individual
//! resolvers (notably [`ResourceAccessor::entity_in_org_for_account_id`]).

use std::collections::HashMap;

use tokio::sync::Mutex;

use meridian_upstream::{
    Services, UpstreamError, UpstreamResult, auth, care, directory, excomms, invite, layout,
    media, payments, settings, threading,
};

/// Edges requested for the common "full entity" lookup shape.
fn full_entity_info() -> directory::RequestedInformation {
    directory::RequestedInformation {
        depth: 0,
        entity_information: vec![
            directory::EntityInformation::Memberships,
            directory::EntityInformation::Contacts,
            directory::EntityInformation::ExternalIds,
        ],
    }
}

pub struct ResourceAccessor {
    services: Services,
    entity_cache: Mutex<HashMap<String, directory::Entity>>,
}

impl ResourceAccessor {
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self {
            services,
            entity_cache: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn services(&self) -> &Services {
        &self.services
    }

    // ── Auth ────────────────────────────────────────────────────────────────

    pub async fn account(&self, account_id: &str) -> UpstreamResult<auth::Account> {
        self.services
            .auth
            .get_account(auth::GetAccountRequest {
                id: account_id.to_string(),
            })
            .await
    }

    pub async fn authenticate_login(
        &self,
        req: auth::AuthenticateLoginRequest,
    ) -> UpstreamResult<auth::AuthenticateLoginResponse> {
        self.services.auth.authenticate_login(req).await
    }

    pub async fn create_account(
        &self,
        req: auth::CreateAccountRequest,
    ) -> UpstreamResult<auth::CreateAccountResponse> {
        self.services.auth.create_account(req).await
    }

    pub async fn unauthenticate(&self, token: &str) -> UpstreamResult<()> {
        self.services.auth.unauthenticate(token).await
    }

    // ── Directory ───────────────────────────────────────────────────────────

    /// Fetch a single entity by id, memoized for the request.
    pub async fn entity(&self, entity_id: &str) -> UpstreamResult<directory::Entity> {
        {
            let cache = self.entity_cache.lock().await;
            if let Some(entity) = cache.get(entity_id) {
                return Ok(entity.clone());
            }
        }
        let entities = self
            .services
            .directory
            .lookup_entities(directory::LookupEntitiesRequest {
                key: directory::LookupKey::EntityId(entity_id.to_string()),
                requested_information: full_entity_info(),
                statuses: vec![directory::EntityStatus::Active],
                root_types: Vec::new(),
                child_types: Vec::new(),
            })
            .await?;
        let entity = entities
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::not_found(entity_id))?;
        self.entity_cache
            .lock()
            .await
            .insert(entity.id.clone(), entity.clone());
        Ok(entity)
    }

    /// Batch fetch; results keyed by entity id. Missing ids are absent from
    /// the map rather than an error.
    pub async fn entities(
        &self,
        entity_ids: &[String],
    ) -> UpstreamResult<HashMap<String, directory::Entity>> {
        let mut found = HashMap::new();
        let mut missing = Vec::new();
        {
            let cache = self.entity_cache.lock().await;
            for id in entity_ids {
                match cache.get(id) {
                    Some(entity) => {
                        found.insert(id.clone(), entity.clone());
                    }
                    None => missing.push(id.clone()),
                }
            }
        }
        if !missing.is_empty() {
            let entities = self
                .services
                .directory
                .lookup_entities(directory::LookupEntitiesRequest {
                    key: directory::LookupKey::BatchEntityIds(missing),
                    requested_information: full_entity_info(),
                    statuses: vec![directory::EntityStatus::Active],
                    root_types: Vec::new(),
                    child_types: Vec::new(),
                })
                .await?;
            let mut cache = self.entity_cache.lock().await;
            for entity in entities {
                cache.insert(entity.id.clone(), entity.clone());
                found.insert(entity.id.clone(), entity);
            }
        }
        Ok(found)
    }

    pub async fn entities_by_contact(
        &self,
        contact_value: &str,
    ) -> UpstreamResult<Vec<directory::Entity>> {
        self.services
            .directory
            .lookup_entities_by_contact(directory::LookupEntitiesByContactRequest {
                contact_value: contact_value.to_string(),
                requested_information: full_entity_info(),
                statuses: vec![directory::EntityStatus::Active],
            })
            .await
    }

    /// All entities registered against an account id.
    pub async fn entities_for_account(
        &self,
        account_id: &str,
    ) -> UpstreamResult<Vec<directory::Entity>> {
        self.services
            .directory
            .lookup_entities(directory::LookupEntitiesRequest {
                key: directory::LookupKey::ExternalId(account_id.to_string()),
                requested_information: full_entity_info(),
                statuses: vec![directory::EntityStatus::Active],
                root_types: Vec::new(),
                child_types: Vec::new(),
            })
            .await
    }

    /// The account's entity within a specific organization. Membership is
    /// verified here; an entity outside the org reads as not found so callers
    /// cannot act across org boundaries.
    pub async fn entity_in_org_for_account_id(
        &self,
        org_id: &str,
        account_id: &str,
    ) -> UpstreamResult<directory::Entity> {
        let entities = self.entities_for_account(account_id).await?;
        entities
            .into_iter()
            .find(|e| e.is_member_of(org_id))
            .ok_or_else(|| UpstreamError::not_found(account_id))
    }

    pub async fn create_entity(
        &self,
        req: directory::CreateEntityRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.services.directory.create_entity(req).await
    }

    pub async fn update_entity(
        &self,
        req: directory::UpdateEntityRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.services.directory.update_entity(req).await
    }

    pub async fn create_contacts(
        &self,
        req: directory::CreateContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.services.directory.create_contacts(req).await
    }

    pub async fn update_contacts(
        &self,
        req: directory::UpdateContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.services.directory.update_contacts(req).await
    }

    pub async fn delete_contacts(
        &self,
        req: directory::DeleteContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.services.directory.delete_contacts(req).await
    }

    pub async fn entity_domain(
        &self,
        entity_id: Option<&str>,
        domain: Option<&str>,
    ) -> UpstreamResult<directory::LookupEntityDomainResponse> {
        self.services
            .directory
            .lookup_entity_domain(directory::LookupEntityDomainRequest {
                entity_id: entity_id.map(str::to_string),
                domain: domain.map(str::to_string),
            })
            .await
    }

    pub async fn create_entity_domain(&self, entity_id: &str, domain: &str) -> UpstreamResult<()> {
        self.services
            .directory
            .create_entity_domain(directory::CreateEntityDomainRequest {
                entity_id: entity_id.to_string(),
                domain: domain.to_string(),
            })
            .await
    }

    pub async fn profile(&self, key: directory::ProfileKey) -> UpstreamResult<directory::Profile> {
        self.services.directory.profile(key).await
    }

    pub async fn update_profile(
        &self,
        req: directory::UpdateProfileRequest,
    ) -> UpstreamResult<directory::Profile> {
        self.services.directory.update_profile(req).await
    }

    // ── Threading ───────────────────────────────────────────────────────────

    pub async fn thread(
        &self,
        thread_id: &str,
        viewer_entity_id: &str,
    ) -> UpstreamResult<threading::Thread> {
        self.services
            .threading
            .thread(threading::ThreadRequest {
                thread_id: thread_id.to_string(),
                viewer_entity_id: viewer_entity_id.to_string(),
            })
            .await
    }

    pub async fn query_threads(
        &self,
        req: threading::QueryThreadsRequest,
    ) -> UpstreamResult<threading::QueryThreadsResponse> {
        self.services.threading.query_threads(req).await
    }

    pub async fn threads_for_member(
        &self,
        entity_id: &str,
        primary_only: bool,
    ) -> UpstreamResult<Vec<threading::Thread>> {
        self.services
            .threading
            .threads_for_member(threading::ThreadsForMemberRequest {
                entity_id: entity_id.to_string(),
                primary_only,
            })
            .await
    }

    pub async fn thread_items(
        &self,
        req: threading::ThreadItemsRequest,
    ) -> UpstreamResult<threading::ThreadItemsResponse> {
        self.services.threading.thread_items(req).await
    }

    pub async fn thread_item(&self, item_id: &str) -> UpstreamResult<threading::ThreadItem> {
        self.services.threading.thread_item(item_id).await
    }

    pub async fn post_message(
        &self,
        req: threading::PostMessageRequest,
    ) -> UpstreamResult<threading::PostMessageResponse> {
        self.services.threading.post_message(req).await
    }

    pub async fn create_empty_thread(
        &self,
        req: threading::CreateEmptyThreadRequest,
    ) -> UpstreamResult<threading::Thread> {
        self.services.threading.create_empty_thread(req).await
    }

    pub async fn update_thread(
        &self,
        req: threading::UpdateThreadRequest,
    ) -> UpstreamResult<threading::UpdateThreadResponse> {
        self.services.threading.update_thread(req).await
    }

    pub async fn mark_threads_as_read(
        &self,
        req: threading::MarkThreadsAsReadRequest,
    ) -> UpstreamResult<()> {
        self.services.threading.mark_threads_as_read(req).await
    }

    pub async fn delete_thread(
        &self,
        thread_id: &str,
        actor_entity_id: &str,
    ) -> UpstreamResult<()> {
        self.services
            .threading
            .delete_thread(threading::DeleteThreadRequest {
                thread_id: thread_id.to_string(),
                actor_entity_id: actor_entity_id.to_string(),
            })
            .await
    }

    pub async fn saved_queries(&self, entity_id: &str) -> UpstreamResult<Vec<threading::SavedQuery>> {
        self.services.threading.saved_queries(entity_id).await
    }

    pub async fn saved_query(&self, saved_query_id: &str) -> UpstreamResult<threading::SavedQuery> {
        self.services.threading.saved_query(saved_query_id).await
    }

    pub async fn saved_messages(
        &self,
        key: threading::SavedMessagesKey,
    ) -> UpstreamResult<Vec<threading::SavedMessage>> {
        self.services.threading.saved_messages(key).await
    }

    pub async fn scheduled_messages(
        &self,
        key: threading::ScheduledMessagesKey,
    ) -> UpstreamResult<Vec<threading::ScheduledMessage>> {
        self.services.threading.scheduled_messages(key).await
    }

    pub async fn create_scheduled_message(
        &self,
        req: threading::CreateScheduledMessageRequest,
    ) -> UpstreamResult<threading::ScheduledMessage> {
        self.services.threading.create_scheduled_message(req).await
    }

    pub async fn delete_scheduled_message(&self, id: &str) -> UpstreamResult<()> {
        self.services.threading.delete_scheduled_message(id).await
    }

    // ── Excomms ─────────────────────────────────────────────────────────────

    pub async fn provision_email_address(
        &self,
        req: excomms::ProvisionEmailAddressRequest,
    ) -> UpstreamResult<excomms::ProvisionEmailAddressResponse> {
        self.services.excomms.provision_email_address(req).await
    }

    pub async fn provision_phone_number(
        &self,
        req: excomms::ProvisionPhoneNumberRequest,
    ) -> UpstreamResult<excomms::ProvisionPhoneNumberResponse> {
        self.services.excomms.provision_phone_number(req).await
    }

    pub async fn initiate_ip_call(
        &self,
        req: excomms::InitiateIpCallRequest,
    ) -> UpstreamResult<excomms::IpCall> {
        self.services.excomms.initiate_ip_call(req).await
    }

    pub async fn ip_call(&self, call_id: &str) -> UpstreamResult<excomms::IpCall> {
        self.services.excomms.ip_call(call_id).await
    }

    pub async fn pending_ip_calls(&self, account_id: &str) -> UpstreamResult<Vec<excomms::IpCall>> {
        self.services.excomms.pending_ip_calls(account_id).await
    }

    pub async fn update_ip_call(
        &self,
        req: excomms::UpdateIpCallRequest,
    ) -> UpstreamResult<excomms::IpCall> {
        self.services.excomms.update_ip_call(req).await
    }

    // ── Care & layout ───────────────────────────────────────────────────────

    pub async fn visit(&self, visit_id: &str) -> UpstreamResult<care::Visit> {
        self.services.care.visit(visit_id).await
    }

    pub async fn visits(&self, req: care::VisitsRequest) -> UpstreamResult<Vec<care::Visit>> {
        self.services.care.visits(req).await
    }

    pub async fn create_visit(&self, req: care::CreateVisitRequest) -> UpstreamResult<care::Visit> {
        self.services.care.create_visit(req).await
    }

    pub async fn submit_visit(&self, visit_id: &str, answers_json: &str) -> UpstreamResult<()> {
        self.services.care.submit_visit(visit_id, answers_json).await
    }

    pub async fn triage_visit(&self, visit_id: &str) -> UpstreamResult<()> {
        self.services.care.triage_visit(visit_id).await
    }

    pub async fn visit_categories(
        &self,
        organization_id: &str,
    ) -> UpstreamResult<Vec<care::VisitCategory>> {
        self.services.care.visit_categories(organization_id).await
    }

    pub async fn visit_layout(&self, layout_id: &str) -> UpstreamResult<layout::VisitLayout> {
        self.services.layout.visit_layout(layout_id).await
    }

    pub async fn visit_layout_version(
        &self,
        version_id: &str,
    ) -> UpstreamResult<layout::VisitLayoutVersion> {
        self.services.layout.visit_layout_version(version_id).await
    }

    pub async fn visit_layouts_by_category(
        &self,
        category_id: &str,
    ) -> UpstreamResult<Vec<layout::VisitLayout>> {
        self.services.layout.visit_layouts_by_category(category_id).await
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub async fn setting_configs(
        &self,
        keys: &[String],
    ) -> UpstreamResult<Vec<settings::SettingConfig>> {
        self.services.settings.configs(keys).await
    }

    pub async fn setting_values(
        &self,
        req: settings::GetValuesRequest,
    ) -> UpstreamResult<Vec<settings::Setting>> {
        self.services.settings.values(req).await
    }

    pub async fn set_setting_value(&self, req: settings::SetValueRequest) -> UpstreamResult<()> {
        self.services.settings.set_value(req).await
    }

    // ── Invite, media, payments ─────────────────────────────────────────────

    pub async fn lookup_invite(&self, token: &str) -> UpstreamResult<invite::Invite> {
        self.services.invite.lookup_invite(token).await
    }

    pub async fn media_info(&self, media_id: &str) -> UpstreamResult<media::MediaInfo> {
        self.services.media.media_info(media_id).await
    }

    pub async fn clone_media(&self, media_id: &str, owner_id: &str) -> UpstreamResult<String> {
        self.services.media.clone_media(media_id, owner_id).await
    }

    pub async fn payment(&self, payment_id: &str) -> UpstreamResult<payments::Payment> {
        self.services.payments.payment(payment_id).await
    }

    pub async fn create_payment(
        &self,
        req: payments::CreatePaymentRequest,
    ) -> UpstreamResult<payments::Payment> {
        self.services.payments.create_payment(req).await
    }
}
