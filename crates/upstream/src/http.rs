//! HTTP implementations of the service traits.
//!
//! Every backend speaks the same convention: `POST {base}/{operation}` with a
//! JSON request body and a JSON response body. Error statuses map onto
//! [`UpstreamError`] variants so resolvers never see raw status codes.

use {
    async_trait::async_trait,
    reqwest::StatusCode,
    serde::{Serialize, de::DeserializeOwned},
    serde_json::json,
    std::sync::Arc,
    tracing::debug,
    url::Url,
};

use crate::{
    Services, UpstreamError, UpstreamResult, auth, care, directory, excomms, invite, layout,
    media, payments, settings, threading,
};

/// Base URLs for each backend service.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub auth: Url,
    pub directory: Url,
    pub threading: Url,
    pub excomms: Url,
    pub care: Url,
    pub layout: Url,
    pub settings: Url,
    pub invite: Url,
    pub media: Url,
    pub payments: Url,
}

/// Builds a [`Services`] bundle of HTTP clients sharing one connection pool.
#[must_use]
pub fn connect(endpoints: Endpoints) -> Services {
    let http = reqwest::Client::new();
    Services {
        auth: Arc::new(HttpService::new("auth", endpoints.auth, http.clone())),
        directory: Arc::new(HttpService::new("directory", endpoints.directory, http.clone())),
        threading: Arc::new(HttpService::new("threading", endpoints.threading, http.clone())),
        excomms: Arc::new(HttpService::new("excomms", endpoints.excomms, http.clone())),
        care: Arc::new(HttpService::new("care", endpoints.care, http.clone())),
        layout: Arc::new(HttpService::new("layout", endpoints.layout, http.clone())),
        settings: Arc::new(HttpService::new("settings", endpoints.settings, http.clone())),
        invite: Arc::new(HttpService::new("invite", endpoints.invite, http.clone())),
        media: Arc::new(HttpService::new("media", endpoints.media, http.clone())),
        payments: Arc::new(HttpService::new("payments", endpoints.payments, http)),
    }
}

/// One backend client. The same type implements every service trait; which
/// trait is used depends on which slot of [`Services`] it occupies.
pub struct HttpService {
    service: &'static str,
    base: Url,
    http: reqwest::Client,
}

#[derive(serde::Deserialize)]
struct WireError {
    #[serde(default)]
    message: String,
}

impl HttpService {
    #[must_use]
    pub fn new(service: &'static str, mut base: Url, http: reqwest::Client) -> Self {
        // Url::join treats a path without a trailing slash as a file.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        Self { service, base, http }
    }

    async fn post<Req, Resp>(&self, operation: &str, req: &Req) -> UpstreamResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self
            .base
            .join(operation)
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        debug!(service = self.service, operation, "upstream call");
        let resp = self
            .http
            .post(url)
            .json(req)
            .send()
            .await
            .map_err(|e| UpstreamError::Transport(e.to_string()))?;
        let status = resp.status();
        if status.is_success() {
            return resp
                .json::<Resp>()
                .await
                .map_err(|e| UpstreamError::Transport(e.to_string()));
        }

        let message = match resp.json::<WireError>().await {
            Ok(body) if !body.message.is_empty() => body.message,
            _ => status.to_string(),
        };
        Err(status_error(self.service, status, message))
    }

    async fn post_unit<Req>(&self, operation: &str, req: &Req) -> UpstreamResult<()>
    where
        Req: Serialize + ?Sized,
    {
        let _ignored: serde_json::Value = self.post(operation, req).await?;
        Ok(())
    }
}

fn status_error(service: &'static str, status: StatusCode, message: String) -> UpstreamError {
    match status {
        StatusCode::NOT_FOUND => UpstreamError::NotFound(message),
        StatusCode::BAD_REQUEST => UpstreamError::InvalidArgument(message),
        StatusCode::CONFLICT => UpstreamError::AlreadyExists(message),
        StatusCode::PRECONDITION_FAILED => UpstreamError::FailedPrecondition(message),
        _ => UpstreamError::Remote {
            service,
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl auth::AuthService for HttpService {
    async fn check_authentication(
        &self,
        req: auth::CheckAuthenticationRequest,
    ) -> UpstreamResult<auth::CheckAuthenticationResponse> {
        self.post("checkAuthentication", &req).await
    }

    async fn authenticate_login(
        &self,
        req: auth::AuthenticateLoginRequest,
    ) -> UpstreamResult<auth::AuthenticateLoginResponse> {
        self.post("authenticateLogin", &req).await
    }

    async fn create_account(
        &self,
        req: auth::CreateAccountRequest,
    ) -> UpstreamResult<auth::CreateAccountResponse> {
        self.post("createAccount", &req).await
    }

    async fn unauthenticate(&self, token: &str) -> UpstreamResult<()> {
        self.post_unit("unauthenticate", &json!({ "token": token })).await
    }

    async fn get_account(&self, req: auth::GetAccountRequest) -> UpstreamResult<auth::Account> {
        self.post("getAccount", &req).await
    }
}

#[async_trait]
impl directory::DirectoryService for HttpService {
    async fn lookup_entities(
        &self,
        req: directory::LookupEntitiesRequest,
    ) -> UpstreamResult<Vec<directory::Entity>> {
        self.post("lookupEntities", &req).await
    }

    async fn lookup_entities_by_contact(
        &self,
        req: directory::LookupEntitiesByContactRequest,
    ) -> UpstreamResult<Vec<directory::Entity>> {
        self.post("lookupEntitiesByContact", &req).await
    }

    async fn create_entity(
        &self,
        req: directory::CreateEntityRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.post("createEntity", &req).await
    }

    async fn update_entity(
        &self,
        req: directory::UpdateEntityRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.post("updateEntity", &req).await
    }

    async fn create_contacts(
        &self,
        req: directory::CreateContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.post("createContacts", &req).await
    }

    async fn update_contacts(
        &self,
        req: directory::UpdateContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.post("updateContacts", &req).await
    }

    async fn delete_contacts(
        &self,
        req: directory::DeleteContactsRequest,
    ) -> UpstreamResult<directory::Entity> {
        self.post("deleteContacts", &req).await
    }

    async fn lookup_entity_domain(
        &self,
        req: directory::LookupEntityDomainRequest,
    ) -> UpstreamResult<directory::LookupEntityDomainResponse> {
        self.post("lookupEntityDomain", &req).await
    }

    async fn create_entity_domain(
        &self,
        req: directory::CreateEntityDomainRequest,
    ) -> UpstreamResult<()> {
        self.post_unit("createEntityDomain", &req).await
    }

    async fn profile(&self, key: directory::ProfileKey) -> UpstreamResult<directory::Profile> {
        self.post("profile", &key).await
    }

    async fn update_profile(
        &self,
        req: directory::UpdateProfileRequest,
    ) -> UpstreamResult<directory::Profile> {
        self.post("updateProfile", &req).await
    }
}

#[async_trait]
impl threading::ThreadingService for HttpService {
    async fn query_threads(
        &self,
        req: threading::QueryThreadsRequest,
    ) -> UpstreamResult<threading::QueryThreadsResponse> {
        self.post("queryThreads", &req).await
    }

    async fn thread(&self, req: threading::ThreadRequest) -> UpstreamResult<threading::Thread> {
        self.post("thread", &req).await
    }

    async fn threads_for_member(
        &self,
        req: threading::ThreadsForMemberRequest,
    ) -> UpstreamResult<Vec<threading::Thread>> {
        self.post("threadsForMember", &req).await
    }

    async fn thread_items(
        &self,
        req: threading::ThreadItemsRequest,
    ) -> UpstreamResult<threading::ThreadItemsResponse> {
        self.post("threadItems", &req).await
    }

    async fn thread_item(&self, item_id: &str) -> UpstreamResult<threading::ThreadItem> {
        self.post("threadItem", &json!({ "itemId": item_id })).await
    }

    async fn post_message(
        &self,
        req: threading::PostMessageRequest,
    ) -> UpstreamResult<threading::PostMessageResponse> {
        self.post("postMessage", &req).await
    }

    async fn create_empty_thread(
        &self,
        req: threading::CreateEmptyThreadRequest,
    ) -> UpstreamResult<threading::Thread> {
        self.post("createEmptyThread", &req).await
    }

    async fn update_thread(
        &self,
        req: threading::UpdateThreadRequest,
    ) -> UpstreamResult<threading::UpdateThreadResponse> {
        self.post("updateThread", &req).await
    }

    async fn mark_threads_as_read(
        &self,
        req: threading::MarkThreadsAsReadRequest,
    ) -> UpstreamResult<()> {
        self.post_unit("markThreadsAsRead", &req).await
    }

    async fn delete_thread(&self, req: threading::DeleteThreadRequest) -> UpstreamResult<()> {
        self.post_unit("deleteThread", &req).await
    }

    async fn saved_queries(&self, entity_id: &str) -> UpstreamResult<Vec<threading::SavedQuery>> {
        self.post("savedQueries", &json!({ "entityId": entity_id })).await
    }

    async fn saved_query(&self, saved_query_id: &str) -> UpstreamResult<threading::SavedQuery> {
        self.post("savedQuery", &json!({ "savedQueryId": saved_query_id })).await
    }

    async fn saved_messages(
        &self,
        key: threading::SavedMessagesKey,
    ) -> UpstreamResult<Vec<threading::SavedMessage>> {
        self.post("savedMessages", &key).await
    }

    async fn scheduled_messages(
        &self,
        key: threading::ScheduledMessagesKey,
    ) -> UpstreamResult<Vec<threading::ScheduledMessage>> {
        self.post("scheduledMessages", &key).await
    }

    async fn create_scheduled_message(
        &self,
        req: threading::CreateScheduledMessageRequest,
    ) -> UpstreamResult<threading::ScheduledMessage> {
        self.post("createScheduledMessage", &req).await
    }

    async fn delete_scheduled_message(&self, id: &str) -> UpstreamResult<()> {
        self.post_unit("deleteScheduledMessage", &json!({ "id": id })).await
    }
}

#[async_trait]
impl excomms::ExcommsService for HttpService {
    async fn provision_email_address(
        &self,
        req: excomms::ProvisionEmailAddressRequest,
    ) -> UpstreamResult<excomms::ProvisionEmailAddressResponse> {
        self.post("provisionEmailAddress", &req).await
    }

    async fn provision_phone_number(
        &self,
        req: excomms::ProvisionPhoneNumberRequest,
    ) -> UpstreamResult<excomms::ProvisionPhoneNumberResponse> {
        self.post("provisionPhoneNumber", &req).await
    }

    async fn initiate_ip_call(
        &self,
        req: excomms::InitiateIpCallRequest,
    ) -> UpstreamResult<excomms::IpCall> {
        self.post("initiateIpCall", &req).await
    }

    async fn ip_call(&self, call_id: &str) -> UpstreamResult<excomms::IpCall> {
        self.post("ipCall", &json!({ "callId": call_id })).await
    }

    async fn pending_ip_calls(&self, account_id: &str) -> UpstreamResult<Vec<excomms::IpCall>> {
        self.post("pendingIpCalls", &json!({ "accountId": account_id })).await
    }

    async fn update_ip_call(
        &self,
        req: excomms::UpdateIpCallRequest,
    ) -> UpstreamResult<excomms::IpCall> {
        self.post("updateIpCall", &req).await
    }
}

#[async_trait]
impl care::CareService for HttpService {
    async fn visit(&self, visit_id: &str) -> UpstreamResult<care::Visit> {
        self.post("visit", &json!({ "visitId": visit_id })).await
    }

    async fn visits(&self, req: care::VisitsRequest) -> UpstreamResult<Vec<care::Visit>> {
        self.post("visits", &req).await
    }

    async fn create_visit(&self, req: care::CreateVisitRequest) -> UpstreamResult<care::Visit> {
        self.post("createVisit", &req).await
    }

    async fn submit_visit(&self, visit_id: &str, answers_json: &str) -> UpstreamResult<()> {
        self.post_unit(
            "submitVisit",
            &json!({ "visitId": visit_id, "answersJson": answers_json }),
        )
        .await
    }

    async fn triage_visit(&self, visit_id: &str) -> UpstreamResult<()> {
        self.post_unit("triageVisit", &json!({ "visitId": visit_id })).await
    }

    async fn visit_categories(
        &self,
        organization_id: &str,
    ) -> UpstreamResult<Vec<care::VisitCategory>> {
        self.post("visitCategories", &json!({ "organizationId": organization_id }))
            .await
    }
}

#[async_trait]
impl layout::LayoutService for HttpService {
    async fn visit_layout(&self, layout_id: &str) -> UpstreamResult<layout::VisitLayout> {
        self.post("visitLayout", &json!({ "layoutId": layout_id })).await
    }

    async fn visit_layout_version(
        &self,
        version_id: &str,
    ) -> UpstreamResult<layout::VisitLayoutVersion> {
        self.post("visitLayoutVersion", &json!({ "versionId": version_id })).await
    }

    async fn visit_layouts_by_category(
        &self,
        category_id: &str,
    ) -> UpstreamResult<Vec<layout::VisitLayout>> {
        self.post("visitLayoutsByCategory", &json!({ "categoryId": category_id }))
            .await
    }
}

#[async_trait]
impl settings::SettingsService for HttpService {
    async fn configs(&self, keys: &[String]) -> UpstreamResult<Vec<settings::SettingConfig>> {
        self.post("configs", &json!({ "keys": keys })).await
    }

    async fn values(
        &self,
        req: settings::GetValuesRequest,
    ) -> UpstreamResult<Vec<settings::Setting>> {
        self.post("values", &req).await
    }

    async fn set_value(&self, req: settings::SetValueRequest) -> UpstreamResult<()> {
        self.post_unit("setValue", &req).await
    }
}

#[async_trait]
impl invite::InviteService for HttpService {
    async fn lookup_invite(&self, token: &str) -> UpstreamResult<invite::Invite> {
        self.post("lookupInvite", &json!({ "token": token })).await
    }

    async fn send_colleague_invite(
        &self,
        req: invite::SendColleagueInviteRequest,
    ) -> UpstreamResult<()> {
        self.post_unit("sendColleagueInvite", &req).await
    }

    async fn mark_invite_consumed(&self, token: &str) -> UpstreamResult<()> {
        self.post_unit("markInviteConsumed", &json!({ "token": token })).await
    }
}

#[async_trait]
impl media::MediaService for HttpService {
    async fn media_info(&self, media_id: &str) -> UpstreamResult<media::MediaInfo> {
        self.post("mediaInfo", &json!({ "mediaId": media_id })).await
    }

    async fn clone_media(&self, media_id: &str, owner_id: &str) -> UpstreamResult<String> {
        #[derive(serde::Deserialize)]
        struct CloneMediaResponse {
            id: String,
        }
        let resp: CloneMediaResponse = self
            .post("cloneMedia", &json!({ "mediaId": media_id, "ownerId": owner_id }))
            .await?;
        Ok(resp.id)
    }
}

#[async_trait]
impl payments::PaymentsService for HttpService {
    async fn payment(&self, payment_id: &str) -> UpstreamResult<payments::Payment> {
        self.post("payment", &json!({ "paymentId": payment_id })).await
    }

    async fn create_payment(
        &self,
        req: payments::CreatePaymentRequest,
    ) -> UpstreamResult<payments::Payment> {
        self.post("createPayment", &req).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn base_url_gets_trailing_slash() {
        let svc = HttpService::new(
            "auth",
            Url::parse("http://auth.internal/v1").unwrap(),
            reqwest::Client::new(),
        );
        assert_eq!(svc.base.path(), "/v1/");
        assert_eq!(
            svc.base.join("checkAuthentication").unwrap().as_str(),
            "http://auth.internal/v1/checkAuthentication"
        );
    }

    #[test]
    fn operation_join_preserves_base_path() {
        let svc = HttpService::new(
            "threading",
            Url::parse("http://threading.internal/").unwrap(),
            reqwest::Client::new(),
        );
        assert_eq!(
            svc.base.join("queryThreads").unwrap().as_str(),
            "http://threading.internal/queryThreads"
        );
    }

    #[test]
    fn error_statuses_map_onto_variants() {
        let err = status_error("directory", StatusCode::NOT_FOUND, "no such entity".into());
        assert!(matches!(err, UpstreamError::NotFound(m) if m == "no such entity"));

        let err = status_error("threading", StatusCode::BAD_REQUEST, "bad cursor".into());
        assert!(matches!(err, UpstreamError::InvalidArgument(_)));

        let err = status_error("excomms", StatusCode::CONFLICT, "taken".into());
        assert!(matches!(err, UpstreamError::AlreadyExists(_)));

        let err = status_error("excomms", StatusCode::PRECONDITION_FAILED, "state".into());
        assert!(matches!(err, UpstreamError::FailedPrecondition(_)));

        let err = status_error("auth", StatusCode::BAD_GATEWAY, "down".into());
        assert!(matches!(
            err,
            UpstreamError::Remote {
                service: "auth",
                status: 502,
                ..
            }
        ));
    }
}
