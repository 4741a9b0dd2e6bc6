use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const OPEN_CATEGORIES: &[&str] = &["Major", "Minor", "Significant"];
pub const CLOSE_CATEGORIES: &[&str] = &[
    "Implemented",
    "Partially Implemented",
    "Rejected",
    "Rolled back",
    "Cancelled",
];
pub const ENVIRONMENTS: &[&str] = &["Production", "Test", "Development", "Disaster Recovery"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Open,
    Closed,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRequest {
    pub id: String,
    pub status: Status,
    pub owner_email_address: String,
    pub summary_of_change: String,
    pub change_category: String,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close_category: Option<String>,
}

pub type Db = Arc<RwLock<HashMap<String, ChangeRequest>>>;

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    pub db: Db,
}

type Reply = (StatusCode, Json<Value>);

pub fn app(api_key: &str) -> Router {
    app_with_state(state(api_key))
}

pub fn app_with_state(state: AppState) -> Router {
    Router::new()
        .route("/v2/releaselog", post(open_record))
        .route("/v2/close", post(close_record))
        .with_state(state)
}

pub fn state(api_key: &str) -> AppState {
    AppState {
        api_key: Arc::from(api_key),
        db: Arc::new(RwLock::new(HashMap::new())),
    }
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn status_error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "error": message })))
}

/// The real API reports validation failures inside a 200 response.
fn logical_error(message: &str) -> Reply {
    (StatusCode::OK, Json(json!({ "cause": { "errorMessage": message } })))
}

fn records(record: &ChangeRequest) -> Reply {
    (StatusCode::OK, Json(json!({ "changeRequests": [record] })))
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), Reply> {
    match headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        Some(key) if key == &*state.api_key => Ok(()),
        Some(_) => Err(status_error(StatusCode::UNAUTHORIZED, "Invalid API key")),
        None => Err(status_error(StatusCode::UNAUTHORIZED, "Missing API key")),
    }
}

fn field<'a>(input: &'a Value, name: &str) -> Option<&'a str> {
    input.get(name).and_then(Value::as_str).filter(|v| !v.is_empty())
}

fn required<'a>(input: &'a Value, name: &str) -> Result<&'a str, Reply> {
    field(input, name).ok_or_else(|| logical_error(&format!("{name} is required")))
}

fn one_of<'a>(input: &'a Value, name: &str, allowed: &[&str], default: &'a str) -> Result<&'a str, Reply> {
    let value = field(input, name).unwrap_or(default);
    if allowed.contains(&value) {
        Ok(value)
    } else {
        Err(logical_error(&format!("{name} must be one of {}", allowed.join(", "))))
    }
}

async fn open_record(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<Value>) -> Reply {
    match try_open(&state, &headers, &input).await {
        Ok(reply) | Err(reply) => reply,
    }
}

async fn try_open(state: &AppState, headers: &HeaderMap, input: &Value) -> Result<Reply, Reply> {
    authorize(state, headers)?;
    let owner = required(input, "ownerEmailAddress")?;
    let summary = required(input, "summaryOfChange")?;
    let category = one_of(input, "changeCategory", OPEN_CATEGORIES, "Minor")?;
    let environment = one_of(input, "environment", ENVIRONMENTS, "Test")?;

    let id = format!("CR{}", &Uuid::new_v4().simple().to_string()[..8]).to_uppercase();
    let record = ChangeRequest {
        id: id.clone(),
        status: Status::Open,
        owner_email_address: owner.to_string(),
        summary_of_change: summary.to_string(),
        change_category: category.to_string(),
        environment: environment.to_string(),
        close_category: None,
    };
    state.db.write().await.insert(id, record.clone());
    Ok(records(&record))
}

async fn close_record(State(state): State<AppState>, headers: HeaderMap, Json(input): Json<Value>) -> Reply {
    match try_close(&state, &headers, &input).await {
        Ok(reply) | Err(reply) => reply,
    }
}

async fn try_close(state: &AppState, headers: &HeaderMap, input: &Value) -> Result<Reply, Reply> {
    authorize(state, headers)?;
    let id = required(input, "id")?;
    let category = one_of(input, "closeCategory", CLOSE_CATEGORIES, "Implemented")?;

    let mut db = state.db.write().await;
    let record = db.get_mut(id).ok_or_else(|| {
        status_error(StatusCode::NOT_FOUND, &format!("Change request {id} not found"))
    })?;
    if record.status == Status::Closed {
        return Err(status_error(
            StatusCode::CONFLICT,
            &format!("Change request {id} is already closed"),
        ));
    }
    record.status = Status::Closed;
    record.close_category = Some(category.to_string());
    Ok(records(record))
}
