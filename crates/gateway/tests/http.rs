//! End-to-end checks of the HTTP surface against no-op backends.

#![allow(clippy::unwrap_used)]

use {
    axum::{
        body::Body,
        http::{Request, StatusCode, header},
    },
    clap::Parser,
    tower::ServiceExt,
};

use {
    meridian_gateway::{config::Config, routes, state::AppState},
    meridian_upstream::Services,
};

fn test_router() -> axum::Router {
    let config = Config::parse_from(["meridian-gateway"]);
    routes::router(AppState::new(&config, Services::noop()))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_graphql(query: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "query": query }).to_string(),
        ))
        .unwrap()
}

#[tokio::test]
async fn health_answers() {
    let response = test_router()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_post_body_is_a_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = test_router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_without_query_is_a_400() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/graphql")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn anonymous_node_is_not_authenticated() {
    let response = test_router()
        .oneshot(post_graphql("{ node(id: \"t_1\") { id } }"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["data"].is_null() || body["data"]["node"].is_null());
    let error = &body["errors"][0];
    assert_eq!(error["type"], "NOT_AUTHENTICATED");
    assert_eq!(error["userMessage"], "Please sign in to continue.");
}

#[tokio::test]
async fn unknown_field_wraps_as_internal() {
    let response = test_router()
        .oneshot(post_graphql("{ definitelyNotAField }"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["type"], "INTERNAL");
    assert!(
        body["errors"][0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Internal error [")
    );
}

#[tokio::test]
async fn get_with_query_executes() {
    let response = test_router()
        .oneshot(
            Request::builder()
                .uri("/graphql?query=%7B%20node(id%3A%20%22t_1%22)%20%7B%20id%20%7D%20%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["type"], "NOT_AUTHENTICATED");
}
