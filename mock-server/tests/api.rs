use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, state, Status};
use serde_json::{json, Value};
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, api_key: Option<&str>, body: Value) -> Request<String> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(key) = api_key {
        builder = builder.header("X-Api-Key", key);
    }
    builder.body(body.to_string()).unwrap()
}

fn open_body() -> Value {
    json!({
        "ownerEmailAddress": "owner@example.com",
        "summaryOfChange": "Deploy",
        "changeCategory": "Minor",
        "environment": "Test"
    })
}

// --- auth ---

#[tokio::test]
async fn missing_api_key_returns_401() {
    let resp = app(KEY)
        .oneshot(json_request("/v2/releaselog", None, open_body()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await, json!({"error": "Missing API key"}));
}

#[tokio::test]
async fn wrong_api_key_returns_401() {
    let resp = app(KEY)
        .oneshot(json_request("/v2/close", Some("nope"), json!({"id": "CR1"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(resp).await["error"], "Invalid API key");
}

// --- open ---

#[tokio::test]
async fn open_returns_created_record() {
    let resp = app(KEY)
        .oneshot(json_request("/v2/releaselog", Some(KEY), open_body()))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let records = body["changeRequests"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert!(records[0]["id"].as_str().unwrap().starts_with("CR"));
    assert_eq!(records[0]["status"], "Open");
}

#[tokio::test]
async fn open_missing_owner_is_a_logical_error() {
    let resp = app(KEY)
        .oneshot(json_request(
            "/v2/releaselog",
            Some(KEY),
            json!({"summaryOfChange": "Deploy"}),
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await,
        json!({"cause": {"errorMessage": "ownerEmailAddress is required"}})
    );
}

#[tokio::test]
async fn open_rejects_unknown_category() {
    let mut body = open_body();
    body["changeCategory"] = json!("Huge");
    let resp = app(KEY)
        .oneshot(json_request("/v2/releaselog", Some(KEY), body))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["cause"]["errorMessage"],
        "changeCategory must be one of Major, Minor, Significant"
    );
}

#[tokio::test]
async fn open_malformed_json_is_rejected() {
    let req = Request::builder()
        .method("POST")
        .uri("/v2/releaselog")
        .header(http::header::CONTENT_TYPE, "application/json")
        .header("X-Api-Key", KEY)
        .body("{not json".to_string())
        .unwrap();
    let resp = app(KEY).oneshot(req).await.unwrap();

    assert!(resp.status().is_client_error());
}

// --- close ---

#[tokio::test]
async fn close_unknown_id_returns_404() {
    let resp = app(KEY)
        .oneshot(json_request("/v2/close", Some(KEY), json!({"id": "CR404"})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await["error"],
        "Change request CR404 not found"
    );
}

#[tokio::test]
async fn close_without_id_is_a_logical_error() {
    let resp = app(KEY)
        .oneshot(json_request("/v2/close", Some(KEY), json!({"notify": false})))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        body_json(resp).await["cause"]["errorMessage"],
        "id is required"
    );
}

// --- full open/close lifecycle ---

#[tokio::test]
async fn open_close_lifecycle() {
    use tower::Service;

    let state = state(KEY);
    let mut app = app_with_state(state.clone()).into_service();

    // open
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("/v2/releaselog", Some(KEY), open_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let id = body_json(resp).await["changeRequests"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(state.db.read().await[&id].status, Status::Open);

    // close
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "/v2/close",
            Some(KEY),
            json!({"id": id, "closeCategory": "Rolled back"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["changeRequests"][0]["id"], id.as_str());
    assert_eq!(body["changeRequests"][0]["status"], "Closed");
    assert_eq!(body["changeRequests"][0]["closeCategory"], "Rolled back");
    assert_eq!(state.db.read().await[&id].status, Status::Closed);

    // close again — conflict
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("/v2/close", Some(KEY), json!({"id": id})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(
        body_json(resp).await["error"],
        format!("Change request {id} is already closed")
    );
}
