//! User model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User profile document in the users collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Profile document ID (referenced by visited records)
    #[serde(rename = "$id")]
    pub id: String,
    /// Linked authentication account ID
    #[serde(rename = "accountId")]
    pub account_id: String,
    pub email: String,
    /// Display name
    pub username: String,
    /// Initials-avatar URL
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(rename = "$createdAt", default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Sign-up input, checked before any round trip.
#[derive(Validate)]
pub struct SignUp {
    #[validate(email(message = "email address is not valid"))]
    pub email: String,
    /// The service rejects shorter passwords
    #[validate(length(min = 8, max = 256, message = "password must be 8 to 256 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 128, message = "username must be 1 to 128 characters"))]
    pub username: String,
}

/// Profile fields written at registration.
#[derive(Debug, Serialize)]
pub struct NewUserProfile<'a> {
    #[serde(rename = "accountId")]
    pub account_id: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub avatar: &'a str,
}

/// Authentication account, as returned by the account endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    /// Session opened as part of registration
    pub session: crate::session::Session,
}
