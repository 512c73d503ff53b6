// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the station data client.
//!
//! `DbError` is what the REST wrapper returns. Services convert it into
//! `AppError`, the only error type that crosses the public façade.

use std::fmt;

/// Failure kinds a caller can branch on.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Write failed: {0}")]
    Write(String),

    #[error("Registration failed during {stage} step: {message}")]
    Registration {
        stage: RegistrationStage,
        /// Set when an account exists on the server but has no profile.
        account_id: Option<String>,
        message: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Step of the account -> session -> profile sequence that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStage {
    Account,
    Session,
    Profile,
}

impl fmt::Display for RegistrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationStage::Account => write!(f, "account"),
            RegistrationStage::Session => write!(f, "session"),
            RegistrationStage::Profile => write!(f, "profile"),
        }
    }
}

impl AppError {
    /// Check if this error means the identifier did not resolve.
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// Check if this error is due to bad credentials or a dead session.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(errors.to_string())
    }
}

/// Errors from the remote API wrapper.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("unauthorized ({kind}): {message}")]
    Unauthorized { kind: String, message: String },

    #[error("not found ({kind}): {message}")]
    NotFound { kind: String, message: String },

    #[error("conflict ({kind}): {message}")]
    Conflict { kind: String, message: String },

    #[error("invalid request ({kind}): {message}")]
    Invalid { kind: String, message: String },

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("HTTP {status} ({kind}): {message}")]
    Rejected {
        status: u16,
        kind: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("response decode error: {0}")]
    Decode(String),
}

impl DbError {
    /// Build an error from a non-success status and the service's error body.
    pub fn from_status(status: u16, kind: String, message: String) -> Self {
        match status {
            401 | 403 => DbError::Unauthorized { kind, message },
            404 => DbError::NotFound { kind, message },
            409 => DbError::Conflict { kind, message },
            400 => DbError::Invalid { kind, message },
            429 => DbError::RateLimited(message),
            _ => DbError::Rejected {
                status,
                kind,
                message,
            },
        }
    }

    /// Convert for a read-side operation.
    pub fn into_fetch_error(self) -> AppError {
        match self {
            DbError::Unauthorized { message, .. } => AppError::Auth(message),
            DbError::NotFound { message, .. } => AppError::NotFound(message),
            other => AppError::Fetch(other.to_string()),
        }
    }

    /// Convert for a write-side operation.
    pub fn into_write_error(self) -> AppError {
        match self {
            DbError::Unauthorized { message, .. } => AppError::Auth(message),
            DbError::NotFound { message, .. } => AppError::NotFound(message),
            other => AppError::Write(other.to_string()),
        }
    }

    /// Log a failed read and convert it.
    pub fn fetch_failed(self, operation: &'static str) -> AppError {
        self.log(operation);
        self.into_fetch_error()
    }

    /// Log a failed write and convert it.
    pub fn write_failed(self, operation: &'static str) -> AppError {
        self.log(operation);
        self.into_write_error()
    }

    fn log(&self, operation: &'static str) {
        match self {
            DbError::NotFound { .. } => {
                tracing::debug!(operation, error = %self, "Remote lookup missed")
            }
            _ => tracing::error!(operation, error = %self, "Remote call failed"),
        }
    }
}

/// Result type alias for façade operations
pub type Result<T> = std::result::Result<T, AppError>;
