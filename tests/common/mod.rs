// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process fake of the remote account/document service.
//!
//! Serves the subset of the REST API the client uses, keeps state in memory
//! and can be told to fail specific calls.

#![allow(dead_code)]

use axum::{
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, TimeZone, Utc};
use dashmap::{DashMap, DashSet};
use ev_charging_finder::config::Config;
use ev_charging_finder::StationDataClient;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

pub const PROJECT: &str = "test-project";
pub const USERS: &str = "users";
pub const STATIONS: &str = "stations";
pub const VISITED: &str = "visited";

struct FakeAccount {
    id: String,
    email: String,
    password: String,
    name: String,
}

#[derive(Default)]
pub struct FakeState {
    accounts: DashMap<String, FakeAccount>,
    /// session secret -> (session id, account id)
    sessions: DashMap<String, (String, String)>,
    /// collection -> documents in insertion order
    collections: DashMap<String, Vec<Value>>,
    counter: AtomicU64,
    requests: AtomicU64,
    /// Document IDs whose GET returns 500
    failing_gets: DashSet<String>,
    /// Collections whose document POST returns 500
    failing_writes: DashSet<String>,
    /// Session creation returns 500
    failing_sessions: AtomicBool,
    /// Send session secrets only via Set-Cookie
    cookie_sessions: AtomicBool,
    /// Leave relationship attributes as bare IDs
    no_expand: AtomicBool,
}

/// A running fake backend.
pub struct FakeBackend {
    pub endpoint: String,
    pub state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("No local address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend died");
        });

        Self {
            endpoint: format!("http://{}/v1", addr),
            state,
        }
    }

    pub fn config(&self) -> Config {
        Config {
            project_id: PROJECT.to_string(),
            user_collection_id: USERS.to_string(),
            stations_collection_id: STATIONS.to_string(),
            visited_collection_id: VISITED.to_string(),
            max_concurrent_fetches: 4,
            ..Config::default()
        }
        .with_endpoint(self.endpoint.clone())
    }

    pub fn client(&self) -> StationDataClient {
        StationDataClient::new(&self.config()).expect("Failed to build client")
    }

    /// Client whose list calls fetch `page_size` documents per request.
    pub fn client_with_page_size(&self, page_size: u32) -> StationDataClient {
        let config = Config {
            list_limit: page_size,
            ..self.config()
        };
        StationDataClient::new(&config).expect("Failed to build client")
    }

    /// Insert a station directly, as the external data-entry process would.
    /// `created_minutes` offsets `$createdAt` from a fixed base time.
    pub fn seed_station(&self, title: &str, created_minutes: i64) -> String {
        let created_at = Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap()
            + Duration::minutes(created_minutes);
        let id = format!("st-{}", self.state.next());
        let doc = json!({
            "$id": id,
            "$collectionId": STATIONS,
            "$databaseId": "test-db",
            "$createdAt": created_at.format("%Y-%m-%dT%H:%M:%S%.3f+00:00").to_string(),
            "$updatedAt": created_at.format("%Y-%m-%dT%H:%M:%S%.3f+00:00").to_string(),
            "$permissions": [],
            "title": title,
            "thumbnail": format!("https://img.example/{}.png", id),
            "latitude": 37.4,
            "longitude": -122.1,
            "address": "1 Charge Way",
            "phone": "555-0100",
            "web": "https://stations.example",
            "operating_hours": "24/7",
            "services": ["CCS", "Type 2"],
            "rating": 4.0,
        });
        self.state
            .collections
            .entry(STATIONS.to_string())
            .or_default()
            .push(doc);
        id
    }

    pub fn fail_get(&self, document_id: &str) {
        self.state.failing_gets.insert(document_id.to_string());
    }

    pub fn fail_writes_to(&self, collection: &str) {
        self.state.failing_writes.insert(collection.to_string());
    }

    pub fn fail_sessions(&self) {
        self.state.failing_sessions.store(true, Ordering::SeqCst);
    }

    pub fn use_cookie_sessions(&self) {
        self.state.cookie_sessions.store(true, Ordering::SeqCst);
    }

    pub fn disable_expansion(&self) {
        self.state.no_expand.store(true, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> u64 {
        self.state.requests.load(Ordering::SeqCst)
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.state
            .collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn account_exists(&self, email: &str) -> bool {
        self.state.accounts.contains_key(email)
    }

    pub fn live_session_count(&self) -> usize {
        self.state.sessions.len()
    }
}

impl FakeState {
    fn next(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn hit(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }

    fn now(&self) -> String {
        let t = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap()
            + Duration::seconds(self.next() as i64);
        t.format("%Y-%m-%dT%H:%M:%S%.3f+00:00").to_string()
    }

    fn account_for(&self, headers: &HeaderMap) -> Result<(String, String), Response> {
        if headers.get("x-appwrite-project").and_then(|v| v.to_str().ok()) != Some(PROJECT) {
            return Err(error(StatusCode::BAD_REQUEST, "project_unknown", "Missing project"));
        }
        headers
            .get("x-appwrite-session")
            .and_then(|v| v.to_str().ok())
            .and_then(|secret| self.sessions.get(secret).map(|s| s.value().clone()))
            .ok_or_else(|| {
                error(
                    StatusCode::UNAUTHORIZED,
                    "general_unauthorized_scope",
                    "User (role: guests) missing scope (account)",
                )
            })
    }

    fn find(&self, collection: &str, id: &str) -> Option<Value> {
        self.collections
            .get(collection)?
            .iter()
            .find(|doc| doc["$id"] == id)
            .cloned()
    }

    /// Replace relationship IDs with the related documents.
    fn expand(&self, collection: &str, mut doc: Value) -> Value {
        if collection != VISITED || self.no_expand.load(Ordering::SeqCst) {
            return doc;
        }
        for (attribute, target) in [("creator", USERS), ("stationsId", STATIONS)] {
            let related = doc[attribute]
                .as_str()
                .and_then(|id| self.find(target, id));
            if let Some(related) = related {
                doc[attribute] = related;
            }
        }
        doc
    }
}

fn router(state: Arc<FakeState>) -> Router {
    Router::new()
        .route("/v1/account", post(create_account).get(get_account))
        .route("/v1/account/sessions/email", post(create_session))
        .route(
            "/v1/account/sessions/current",
            axum::routing::delete(delete_session),
        )
        .route(
            "/v1/databases/{db}/collections/{col}/documents",
            get(list_documents).post(create_document),
        )
        .route(
            "/v1/databases/{db}/collections/{col}/documents/{id}",
            get(get_document)
                .patch(update_document)
                .delete(delete_document),
        )
        .with_state(state)
}

fn error(status: StatusCode, kind: &str, message: &str) -> Response {
    (
        status,
        Json(json!({ "message": message, "code": status.as_u16(), "type": kind })),
    )
        .into_response()
}

// ─── Account Routes ──────────────────────────────────────────

async fn create_account(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.hit();
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.accounts.contains_key(&email) {
        return error(
            StatusCode::CONFLICT,
            "user_already_exists",
            "A user with the same id, email, or phone already exists",
        );
    }
    let account = FakeAccount {
        id: format!("acc-{}", state.next()),
        email: email.clone(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
        name: body["name"].as_str().unwrap_or_default().to_string(),
    };
    let response = json!({ "$id": account.id, "email": account.email, "name": account.name });
    state.accounts.insert(email, account);
    (StatusCode::CREATED, Json(response)).into_response()
}

async fn create_session(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.hit();
    if state.failing_sessions.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "general_unknown", "Server Error");
    }
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    if password.len() < 8 {
        return error(
            StatusCode::BAD_REQUEST,
            "general_argument_invalid",
            "Invalid `password` param: Password must be at least 8 characters",
        );
    }
    let account_id = match state.accounts.get(email) {
        Some(account) if account.password == password => account.id.clone(),
        _ => {
            return error(
                StatusCode::UNAUTHORIZED,
                "user_invalid_credentials",
                "Invalid credentials. Please check the email and password.",
            )
        }
    };

    let n = state.next();
    let session_id = format!("sess-{}", n);
    let secret = format!("secret-{}-{}", n, account_id);
    state
        .sessions
        .insert(secret.clone(), (session_id.clone(), account_id.clone()));

    let cookies = state.cookie_sessions.load(Ordering::SeqCst);
    let body_secret = if cookies { String::new() } else { secret.clone() };
    let body = json!({
        "$id": session_id,
        "userId": account_id,
        "secret": body_secret,
        "expire": "2031-01-01T00:00:00.000+00:00",
    });
    let mut response = (StatusCode::CREATED, Json(body)).into_response();
    if cookies {
        let cookie = format!("a_session_{}={}; path=/; httponly", PROJECT, secret);
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append("set-cookie", value);
        }
    }
    response
}

async fn get_account(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.hit();
    let (_, account_id) = match state.account_for(&headers) {
        Ok(found) => found,
        Err(response) => return response,
    };
    let account = state
        .accounts
        .iter()
        .find(|a| a.id == account_id)
        .map(|a| json!({ "$id": a.id, "email": a.email, "name": a.name }));
    match account {
        Some(account) => Json(account).into_response(),
        None => error(StatusCode::NOT_FOUND, "user_not_found", "User not found"),
    }
}

async fn delete_session(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    state.hit();
    if let Err(response) = state.account_for(&headers) {
        return response;
    }
    if let Some(secret) = headers.get("x-appwrite-session").and_then(|v| v.to_str().ok()) {
        state.sessions.remove(secret);
    }
    StatusCode::NO_CONTENT.into_response()
}

// ─── Document Routes ─────────────────────────────────────────

fn parse_queries(raw: Option<String>) -> Vec<Value> {
    raw.unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .filter_map(|(key, value)| {
            let key = urlencoding::decode(&key.replace('+', " ")).ok()?.into_owned();
            let value = urlencoding::decode(&value.replace('+', " ")).ok()?.into_owned();
            (key == "queries[]").then(|| serde_json::from_str::<Value>(&value).ok())?
        })
        .collect()
}

fn matches(doc: &Value, query: &Value) -> bool {
    let attribute = query["attribute"].as_str().unwrap_or_default();
    let values = query["values"].as_array().cloned().unwrap_or_default();
    match query["method"].as_str() {
        Some("equal") => values.iter().any(|v| &doc[attribute] == v),
        Some("search") => {
            let text = doc[attribute].as_str().unwrap_or_default().to_lowercase();
            values
                .first()
                .and_then(Value::as_str)
                .map(|q| {
                    q.split_whitespace()
                        .any(|term| text.contains(&term.to_lowercase()))
                })
                .unwrap_or(false)
        }
        _ => true,
    }
}

async fn list_documents(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path((_db, col)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
) -> Response {
    state.hit();
    if let Err(response) = state.account_for(&headers) {
        return response;
    }
    let queries = parse_queries(raw);

    let mut docs: Vec<Value> = state
        .collections
        .get(&col)
        .map(|docs| docs.clone())
        .unwrap_or_default()
        .into_iter()
        .filter(|doc| queries.iter().all(|q| matches(doc, q)))
        .collect();

    for query in &queries {
        if query["method"] == "orderDesc" {
            let attribute = query["attribute"].as_str().unwrap_or_default().to_string();
            docs.sort_by(|a, b| {
                b[&attribute]
                    .as_str()
                    .unwrap_or_default()
                    .cmp(a[&attribute].as_str().unwrap_or_default())
            });
        }
    }
    let total = docs.len();
    let offset = queries
        .iter()
        .find(|q| q["method"] == "offset")
        .and_then(|q| q["values"][0].as_u64())
        .unwrap_or(0) as usize;
    let limit = queries
        .iter()
        .find(|q| q["method"] == "limit")
        .and_then(|q| q["values"][0].as_u64())
        .map_or(25, |limit| limit as usize);
    let docs: Vec<Value> = docs.into_iter().skip(offset).take(limit).collect();

    let documents: Vec<Value> = docs.into_iter().map(|d| state.expand(&col, d)).collect();
    Json(json!({ "total": total, "documents": documents })).into_response()
}

async fn create_document(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path((db, col)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    state.hit();
    if let Err(response) = state.account_for(&headers) {
        return response;
    }
    if state.failing_writes.contains(&col) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "general_unknown", "Server Error");
    }
    if !body["data"].is_object() {
        return error(
            StatusCode::BAD_REQUEST,
            "document_invalid_structure",
            "Invalid document structure",
        );
    }

    let id = match body["documentId"].as_str() {
        Some("unique()") | None => format!("doc-{}", state.next()),
        Some(id) => id.to_string(),
    };
    let now = state.now();
    let mut doc = body["data"].clone();
    doc["$id"] = json!(id);
    doc["$collectionId"] = json!(col);
    doc["$databaseId"] = json!(db);
    doc["$createdAt"] = json!(now);
    doc["$updatedAt"] = json!(now);
    doc["$permissions"] = json!([]);

    state
        .collections
        .entry(col.clone())
        .or_default()
        .push(doc.clone());
    (StatusCode::CREATED, Json(state.expand(&col, doc))).into_response()
}

async fn get_document(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path((_db, col, id)): Path<(String, String, String)>,
) -> Response {
    state.hit();
    if let Err(response) = state.account_for(&headers) {
        return response;
    }
    if state.failing_gets.contains(&id) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "general_unknown", "Server Error");
    }
    match state.find(&col, &id) {
        Some(doc) => Json(state.expand(&col, doc)).into_response(),
        None => error(
            StatusCode::NOT_FOUND,
            "document_not_found",
            "Document with the requested ID could not be found.",
        ),
    }
}

async fn update_document(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path((_db, col, id)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    state.hit();
    if let Err(response) = state.account_for(&headers) {
        return response;
    }
    let now = state.now();
    let updated = state.collections.get_mut(&col).and_then(|mut docs| {
        let doc = docs.iter_mut().find(|doc| doc["$id"] == id.as_str())?;
        if let Some(data) = body["data"].as_object() {
            for (key, value) in data {
                doc[key] = value.clone();
            }
        }
        doc["$updatedAt"] = json!(now);
        Some(doc.clone())
    });
    match updated {
        Some(doc) => Json(state.expand(&col, doc)).into_response(),
        None => error(
            StatusCode::NOT_FOUND,
            "document_not_found",
            "Document with the requested ID could not be found.",
        ),
    }
}

async fn delete_document(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Path((_db, col, id)): Path<(String, String, String)>,
) -> Response {
    state.hit();
    if let Err(response) = state.account_for(&headers) {
        return response;
    }
    let removed = state
        .collections
        .get_mut(&col)
        .map(|mut docs| {
            let before = docs.len();
            docs.retain(|doc| doc["$id"] != id.as_str());
            before != docs.len()
        })
        .unwrap_or(false);
    if removed {
        StatusCode::NO_CONTENT.into_response()
    } else {
        error(
            StatusCode::NOT_FOUND,
            "document_not_found",
            "Document with the requested ID could not be found.",
        )
    }
}
