//! The `/graphql` endpoint.
//!
//! Decodes GET and POST requests into a GraphQL execution, runs the
//! auth-cookie handshake, enforces the request deadline, and serializes the
//! response envelope. Everything leaves with status 200 except requests the
//! gateway cannot decode at all, which get a 400.

use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use {
    async_graphql::{PathSegment, Pos, ServerError, Variables},
    axum::{
        body::Bytes,
        extract::{ConnectInfo, Query, State, rejection::ExtensionRejection},
        http::{HeaderMap, HeaderValue, StatusCode, header},
        response::{IntoResponse, Response},
    },
    axum_extra::extract::CookieJar,
    serde::Deserialize,
    serde_json::json,
    tracing::{debug, warn},
};

use {
    meridian_graphql::{
        context::{CookieChange, DeviceHeaders, RequestContext},
        error::{self, ErrorKind},
    },
    meridian_upstream::auth::{CheckAuthenticationRequest, Platform},
};

use crate::{cookies, state::AppState};

/// Hard ceiling on schema execution, upstream fan-outs included.
const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

const HEADER_DEVICE_ID: &str = "s-device-id";
const HEADER_PLATFORM: &str = "s-platform";
const HEADER_APP_VERSION: &str = "s-app-version";
const HEADER_FORWARDED_FOR: &str = "x-forwarded-for";

#[derive(Deserialize)]
pub struct GetParams {
    query: Option<String>,
    #[serde(rename = "operationName")]
    operation_name: Option<String>,
    /// JSON-encoded variables object.
    variables: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostBody {
    query: String,
    #[serde(default)]
    operation_name: Option<String>,
    #[serde(default)]
    variables: Option<serde_json::Value>,
}

pub async fn graphql_get(
    State(state): State<Arc<AppState>>,
    peer: Result<ConnectInfo<SocketAddr>, ExtensionRejection>,
    headers: HeaderMap,
    jar: CookieJar,
    Query(params): Query<GetParams>,
) -> Response {
    let Some(query) = params.query else {
        return bad_request("missing query parameter");
    };
    let mut request = async_graphql::Request::new(query);
    if let Some(operation_name) = params.operation_name {
        request = request.operation_name(operation_name);
    }
    if let Some(raw) = params.variables {
        match serde_json::from_str(&raw) {
            Ok(value) => request = request.variables(Variables::from_json(value)),
            Err(err) => return bad_request(&format!("invalid variables: {err}")),
        }
    }
    execute(&state, peer.ok(), &headers, &jar, request).await
}

pub async fn graphql_post(
    State(state): State<Arc<AppState>>,
    peer: Result<ConnectInfo<SocketAddr>, ExtensionRejection>,
    headers: HeaderMap,
    jar: CookieJar,
    body: Bytes,
) -> Response {
    let body: PostBody = match serde_json::from_slice(&body) {
        Ok(body) => body,
        Err(err) => return bad_request(&format!("invalid request body: {err}")),
    };
    let mut request = async_graphql::Request::new(body.query);
    if let Some(operation_name) = body.operation_name {
        request = request.operation_name(operation_name);
    }
    if let Some(value) = body.variables {
        request = request.variables(Variables::from_json(value));
    }
    execute(&state, peer.ok(), &headers, &jar, request).await
}

async fn execute(
    state: &AppState,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
    jar: &CookieJar,
    request: async_graphql::Request,
) -> Response {
    let request_id = state.request_ids.next_id();
    let mut rc = RequestContext::new(request_id.clone(), state.dev_mode);
    rc.features = state.features;
    rc.user_agent = header_str(headers, header::USER_AGENT);
    rc.remote_addr = remote_addr(state, peer, headers);
    rc.device = DeviceHeaders {
        device_id: header_str(headers, HEADER_DEVICE_ID),
        platform: parse_platform(&header_str(headers, HEADER_PLATFORM)),
        app_version: header_str(headers, HEADER_APP_VERSION),
    };

    // Auth handshake: an `at` cookie is validated before execution. A
    // rotated token is pushed back as a cookie refresh; an invalid token
    // clears the cookie and runs the request anonymously. An unreachable
    // auth backend keeps the cookie and runs anonymously.
    let mut pre_cookie: Option<CookieChange> = None;
    if let Some(cookie) = jar.get(cookies::AUTH_COOKIE) {
        let presented = cookie.value().to_string();
        if !presented.is_empty() {
            let check = state
                .services
                .auth
                .check_authentication(CheckAuthenticationRequest {
                    token: presented.clone(),
                })
                .await;
            match check {
                Ok(resp) if resp.is_authenticated => {
                    if let Some(account) = resp.account {
                        rc.set_account(account);
                    }
                    match resp.token {
                        Some(token) => {
                            if token.value != presented {
                                pre_cookie = Some(CookieChange::Set {
                                    token: token.value.clone(),
                                    expiration_epoch: token.expiration_epoch,
                                });
                            }
                            if !token.client_encryption_key.is_empty() {
                                rc.set_client_encryption_key(token.client_encryption_key);
                            }
                            rc.set_auth_token(token.value);
                        }
                        None => rc.set_auth_token(presented),
                    }
                }
                Ok(_) => pre_cookie = Some(CookieChange::Clear),
                Err(err) => warn!(request_id, %err, "check_authentication failed"),
            }
        }
    }

    let rc = Arc::new(rc);
    let request = request
        .data(Arc::clone(&rc))
        .data(Arc::clone(&state.raccess));

    let started = SystemTime::now();
    let (data, errors) =
        match tokio::time::timeout(REQUEST_DEADLINE, state.schema.execute(request)).await {
            Ok(response) => (response.data, response.errors),
            Err(_) => (
                async_graphql::Value::Null,
                vec![deadline_error(&request_id, state.dev_mode)],
            ),
        };
    debug!(
        request_id,
        errors = errors.len(),
        elapsed_ms = started.elapsed().map(|d| d.as_millis() as u64).unwrap_or(0),
        "graphql request"
    );

    let body = envelope(&request_id, state.dev_mode, &data, &errors);
    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response();

    // Resolver-signaled cookie changes win over the handshake's.
    if let Some(change) = rc.side_channel.cookie_change().or(pre_cookie) {
        let host = header_str(headers, header::HOST);
        let value = match change {
            CookieChange::Set {
                token,
                expiration_epoch,
            } => cookies::set_auth_cookie(
                &host,
                &token,
                expiration_epoch,
                now_epoch(),
                state.dev_mode,
            ),
            CookieChange::Clear => cookies::clear_auth_cookie(&host, state.dev_mode),
        };
        if let Ok(value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(header::SET_COOKIE, value);
        }
    }
    response
}

// ── Envelope ────────────────────────────────────────────────────────────────

/// Serialize the response envelope. `errors` is omitted when empty; every
/// serialized error carries `type` and `userMessage`.
fn envelope(
    request_id: &str,
    dev_mode: bool,
    data: &async_graphql::Value,
    errors: &[ServerError],
) -> serde_json::Value {
    let mut body = json!({ "data": data });
    if !errors.is_empty() {
        let errors: Vec<serde_json::Value> = errors
            .iter()
            .map(|err| envelope_error(request_id, dev_mode, err))
            .collect();
        body["errors"] = json!(errors);
    }
    body
}

/// One envelope error. Errors already tagged by the schema pass through;
/// anything untyped (validation failures, stray resolver errors) is logged
/// and wrapped as INTERNAL so no raw message reaches a client in production.
fn envelope_error(request_id: &str, dev_mode: bool, err: &ServerError) -> serde_json::Value {
    let path: Vec<serde_json::Value> = err
        .path
        .iter()
        .map(|segment| match segment {
            PathSegment::Field(name) => json!(name),
            PathSegment::Index(index) => json!(index),
        })
        .collect();

    let extensions = err
        .extensions
        .as_ref()
        .and_then(|ext| serde_json::to_value(ext).ok())
        .unwrap_or(serde_json::Value::Null);
    if let Some(kind) = extensions.get("type").and_then(serde_json::Value::as_str) {
        let user_message = extensions
            .get("userMessage")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_else(|| ErrorKind::Internal.user_message());
        return json!({
            "message": err.message,
            "type": kind,
            "userMessage": user_message,
            "path": path,
        });
    }

    let wrapped = error::internal(request_id, dev_mode, &err.message);
    json!({
        "message": wrapped.message,
        "type": ErrorKind::Internal.tag(),
        "userMessage": ErrorKind::Internal.user_message(),
        "path": path,
    })
}

fn deadline_error(request_id: &str, dev_mode: bool) -> ServerError {
    error::internal(request_id, dev_mode, "request deadline exceeded")
        .into_server_error(Pos { line: 0, column: 0 })
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        [(header::CONTENT_TYPE, "application/json")],
        json!({ "error": message }).to_string(),
    )
        .into_response()
}

fn header_str(headers: &HeaderMap, name: impl header::AsHeaderName) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn parse_platform(raw: &str) -> Option<Platform> {
    match raw {
        "IOS" => Some(Platform::Ios),
        "ANDROID" => Some(Platform::Android),
        "WEB" => Some(Platform::Web),
        "" => None,
        _ => Some(Platform::UnknownPlatform),
    }
}

fn remote_addr(
    state: &AppState,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: &HeaderMap,
) -> String {
    if state.behind_proxy {
        let forwarded = header_str(headers, HEADER_FORWARDED_FOR);
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    peer.map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default()
}

fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn typed_error() -> ServerError {
        error::not_authenticated().into_server_error(Pos { line: 1, column: 1 })
    }

    #[test]
    fn typed_errors_pass_through() {
        let mut err = typed_error();
        err.path = vec![PathSegment::Field("node".into())];
        let value = envelope_error("req-1", false, &err);
        assert_eq!(value["type"], "NOT_AUTHENTICATED");
        assert_eq!(value["userMessage"], "Please sign in to continue.");
        assert_eq!(value["message"], "not authenticated");
        assert_eq!(value["path"], json!(["node"]));
    }

    #[test]
    fn untyped_errors_wrap_as_internal() {
        let err = ServerError::new("Unknown field \"nope\" on type \"Query\"", None);
        let value = envelope_error("req-2", false, &err);
        assert_eq!(value["type"], "INTERNAL");
        assert_eq!(value["message"], "Internal error [req-2]");
        assert!(
            value["userMessage"]
                .as_str()
                .unwrap()
                .contains("Something went wrong")
        );
    }

    #[test]
    fn dev_mode_keeps_the_cause() {
        let err = ServerError::new("boom", None);
        let value = envelope_error("req-3", true, &err);
        assert_eq!(value["message"], "Internal error [req-3]: boom");
    }

    #[test]
    fn envelope_omits_empty_errors() {
        let body = envelope("req-4", false, &async_graphql::Value::Null, &[]);
        assert!(body.get("errors").is_none());
        assert!(body["data"].is_null());
    }

    #[test]
    fn platform_header_parses() {
        assert_eq!(parse_platform("IOS"), Some(Platform::Ios));
        assert_eq!(parse_platform(""), None);
        assert_eq!(parse_platform("WATCH"), Some(Platform::UnknownPlatform));
    }
}
