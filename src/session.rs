// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Explicit authentication session.
//!
//! A `Session` is returned by sign-in and passed to every authenticated
//! call, so independent sessions can be used side by side.

use chrono::{DateTime, Utc};
use std::fmt;

/// Header carrying the session secret on authenticated requests.
pub const SESSION_HEADER: &str = "X-Appwrite-Session";

/// An active session on the remote service.
#[derive(Clone)]
pub struct Session {
    /// Session identifier (`$id`)
    pub id: String,
    /// Account the session belongs to
    pub account_id: String,
    /// When the server will expire the session
    pub expires_at: Option<DateTime<Utc>>,
    secret: String,
}

impl Session {
    pub fn new(
        id: impl Into<String>,
        account_id: impl Into<String>,
        secret: impl Into<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: id.into(),
            account_id: account_id.into(),
            expires_at,
            secret: secret.into(),
        }
    }

    /// Secret value attached to requests.
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether the server-side expiry has passed.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expiry| expiry <= now)
    }
}

// Keep the secret out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("account_id", &self.account_id)
            .field("expires_at", &self.expires_at)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Extract the session secret from `Set-Cookie` header values.
///
/// Client platforms receive the secret only as the `a_session_<project>`
/// cookie; the `_legacy` variant carries the same value and is ignored.
pub fn secret_from_cookies<'a, I>(cookies: I, project_id: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let name = format!("a_session_{}", project_id.to_lowercase());

    cookies.into_iter().find_map(|cookie| {
        let pair = cookie.split(';').next()?.trim();
        let (key, value) = pair.split_once('=')?;
        (key.eq_ignore_ascii_case(&name) && !value.is_empty()).then(|| value.to_string())
    })
}
