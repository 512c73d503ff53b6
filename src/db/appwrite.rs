// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! REST client wrapper for the backend service with typed operations.
//!
//! Provides low-level calls for:
//! - Accounts and email/password sessions
//! - Documents (create, list, get, update, delete)
//! - Avatar and storage URLs (built locally, never fetched)

use crate::config::Config;
use crate::db::query::Query;
use crate::error::DbError;
use crate::models::Account;
use crate::session::{secret_from_cookies, Session, SESSION_HEADER};
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, SET_COOKIE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Server-side ID generation marker.
const UNIQUE_ID: &str = "unique()";
const RESPONSE_FORMAT: &str = "1.5.0";

/// Client for the document database and account API.
#[derive(Clone)]
pub struct AppwriteDb {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    database_id: String,
    storage_id: String,
}

/// One page of documents.
#[derive(Debug, Deserialize)]
pub struct DocumentList<T> {
    pub total: u64,
    pub documents: Vec<T>,
}

/// Error body returned by the service.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[derive(Deserialize)]
struct SessionBody {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "userId")]
    user_id: String,
    #[serde(default)]
    secret: String,
    #[serde(default)]
    expire: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
struct CreateDocument<'a, T> {
    #[serde(rename = "documentId")]
    document_id: &'a str,
    data: &'a T,
}

#[derive(Serialize)]
struct UpdateDocument<'a, T> {
    data: &'a T,
}

impl AppwriteDb {
    /// Create a client for the configured project and database.
    pub fn new(config: &Config) -> Result<Self, DbError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "X-Appwrite-Project",
            HeaderValue::from_str(&config.project_id).map_err(|e| DbError::Invalid {
                kind: "config".to_string(),
                message: format!("project id is not a valid header value: {}", e),
            })?,
        );
        headers.insert(
            "X-Appwrite-Response-Format",
            HeaderValue::from_static(RESPONSE_FORMAT),
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.platform.clone())
            .build()?;

        tracing::debug!(
            endpoint = %config.endpoint,
            project = %config.project_id,
            "Remote client initialized"
        );

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            project_id: config.project_id.clone(),
            database_id: config.database_id.clone(),
            storage_id: config.storage_id.clone(),
        })
    }

    // ─── Account Operations ──────────────────────────────────────

    /// Create an authentication account with a server-generated ID.
    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<Account, DbError> {
        let body = serde_json::json!({
            "userId": UNIQUE_ID,
            "email": email,
            "password": password,
            "name": name,
        });

        self.send_json(self.request(Method::POST, "/account").json(&body))
            .await
    }

    /// Open an email/password session.
    ///
    /// The secret comes from the response body when the server includes it,
    /// otherwise from the session cookie.
    pub async fn create_email_session(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, DbError> {
        let body = serde_json::json!({ "email": email, "password": password });

        let response = self
            .request(Method::POST, "/account/sessions/email")
            .json(&body)
            .send()
            .await?;
        let response = check_response(response).await?;

        let cookies: Vec<String> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok().map(str::to_string))
            .collect();

        let body: SessionBody = response
            .json()
            .await
            .map_err(|e| DbError::Decode(format!("session body: {}", e)))?;

        let secret = if body.secret.is_empty() {
            secret_from_cookies(cookies.iter().map(String::as_str), &self.project_id)
                .ok_or_else(|| DbError::Decode("session response carried no secret".to_string()))?
        } else {
            body.secret
        };

        Ok(Session::new(body.id, body.user_id, secret, body.expire))
    }

    /// Get the account behind a session.
    pub async fn get_account(&self, session: &Session) -> Result<Account, DbError> {
        self.send_json(self.authed(Method::GET, "/account", session)?)
            .await
    }

    /// Delete the session used to make the call.
    pub async fn delete_current_session(&self, session: &Session) -> Result<(), DbError> {
        let response = self
            .authed(Method::DELETE, "/account/sessions/current", session)?
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    // ─── Document Operations ─────────────────────────────────────

    /// Create a document with a server-generated ID.
    pub async fn create_document<T, R>(
        &self,
        session: &Session,
        collection: &str,
        data: &T,
    ) -> Result<R, DbError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body = CreateDocument {
            document_id: UNIQUE_ID,
            data,
        };

        self.send_json(
            self.authed(Method::POST, &self.documents_path(collection), session)?
                .json(&body),
        )
        .await
    }

    /// List documents matching all `queries`.
    pub async fn list_documents<R: DeserializeOwned>(
        &self,
        session: &Session,
        collection: &str,
        queries: &[Query],
    ) -> Result<DocumentList<R>, DbError> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", q.to_param()))
            .collect();

        self.send_json(
            self.authed(Method::GET, &self.documents_path(collection), session)?
                .query(&params),
        )
        .await
    }

    /// List every document matching `queries`, `page_size` at a time.
    ///
    /// Pages are requested with increasing offsets until `total` documents
    /// have been collected or a page comes back short.
    pub async fn list_all_documents<R: DeserializeOwned>(
        &self,
        session: &Session,
        collection: &str,
        queries: &[Query],
        page_size: u32,
    ) -> Result<DocumentList<R>, DbError> {
        let page_size = page_size.max(1);
        let mut documents: Vec<R> = Vec::new();

        loop {
            let mut page_queries = queries.to_vec();
            page_queries.push(Query::limit(page_size));
            page_queries.push(Query::offset(documents.len() as u64));

            let page: DocumentList<R> = self
                .list_documents(session, collection, &page_queries)
                .await?;
            let fetched = page.documents.len();
            documents.extend(page.documents);

            if fetched < page_size as usize || documents.len() as u64 >= page.total {
                tracing::debug!(
                    collection,
                    total = page.total,
                    count = documents.len(),
                    "Listed documents"
                );
                return Ok(DocumentList {
                    total: page.total,
                    documents,
                });
            }
        }
    }

    /// Get a document by ID.
    pub async fn get_document<R: DeserializeOwned>(
        &self,
        session: &Session,
        collection: &str,
        document_id: &str,
    ) -> Result<R, DbError> {
        let path = self.document_path(collection, document_id);
        self.send_json(self.authed(Method::GET, &path, session)?)
            .await
    }

    /// Patch some attributes of a document.
    pub async fn update_document<T, R>(
        &self,
        session: &Session,
        collection: &str,
        document_id: &str,
        data: &T,
    ) -> Result<R, DbError>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let path = self.document_path(collection, document_id);
        self.send_json(
            self.authed(Method::PATCH, &path, session)?
                .json(&UpdateDocument { data }),
        )
        .await
    }

    /// Delete a document by ID.
    pub async fn delete_document(
        &self,
        session: &Session,
        collection: &str,
        document_id: &str,
    ) -> Result<(), DbError> {
        let path = self.document_path(collection, document_id);
        let response = self
            .authed(Method::DELETE, &path, session)?
            .send()
            .await?;
        check_response(response).await?;
        Ok(())
    }

    // ─── URL Builders ────────────────────────────────────────────

    /// URL of the generated initials avatar for a display name.
    pub fn avatar_initials_url(&self, name: &str) -> String {
        format!(
            "{}/avatars/initials?name={}&project={}",
            self.endpoint,
            urlencoding::encode(name),
            urlencoding::encode(&self.project_id)
        )
    }

    /// Public view URL of a file in the configured storage bucket.
    pub fn file_view_url(&self, file_id: &str) -> String {
        format!(
            "{}/storage/buckets/{}/files/{}/view?project={}",
            self.endpoint,
            urlencoding::encode(&self.storage_id),
            urlencoding::encode(file_id),
            urlencoding::encode(&self.project_id)
        )
    }

    // ─── Helper Methods ──────────────────────────────────────────

    fn documents_path(&self, collection: &str) -> String {
        format!(
            "/databases/{}/collections/{}/documents",
            urlencoding::encode(&self.database_id),
            urlencoding::encode(collection)
        )
    }

    fn document_path(&self, collection: &str, document_id: &str) -> String {
        format!(
            "{}/{}",
            self.documents_path(collection),
            urlencoding::encode(document_id)
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        tracing::trace!(%method, path, "Remote request");
        self.http.request(method, format!("{}{}", self.endpoint, path))
    }

    /// Request carrying the session secret. A session past its expiry is
    /// rejected locally instead of costing a round trip.
    fn authed(
        &self,
        method: Method,
        path: &str,
        session: &Session,
    ) -> Result<RequestBuilder, DbError> {
        if session.is_expired(Utc::now()) {
            tracing::debug!(session_id = %session.id, "Session expired");
            return Err(DbError::Unauthorized {
                kind: "session_expired".to_string(),
                message: "Session has expired".to_string(),
            });
        }
        Ok(self
            .request(method, path)
            .header(SESSION_HEADER, session.secret()))
    }

    /// Send a request and parse the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, DbError> {
        let response = builder.send().await?;
        let response = check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| DbError::Decode(e.to_string()))
    }
}

/// Check response status and return the service's error if not successful.
async fn check_response(response: Response) -> Result<Response, DbError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let (kind, message) = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => (parsed.kind, parsed.message),
        Err(_) => ("unknown".to_string(), body),
    };

    if status == 429 {
        tracing::warn!("Rate limit hit (429)");
    }

    Err(DbError::from_status(status, kind, message))
}
