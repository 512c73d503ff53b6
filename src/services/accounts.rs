// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account service: registration, sessions and the current user's profile.
//!
//! Registration is a three-step sequence:
//! 1. Create the authentication account
//! 2. Open a session for it
//! 3. Write the profile document to the users collection
//!
//! A failure after step 1 leaves the account in place; the error carries
//! its ID so the caller can report or clean it up. If the profile write
//! fails, the session from step 2 is closed before returning.

use crate::db::{attributes, AppwriteDb, DocumentList, Query};
use crate::error::{AppError, DbError, RegistrationStage, Result};
use crate::models::user::NewUserProfile;
use crate::models::{Registration, SignUp, User};
use crate::session::Session;
use validator::Validate;

/// Account and profile operations.
#[derive(Clone)]
pub struct AccountService {
    db: AppwriteDb,
    users_collection: String,
}

impl AccountService {
    pub fn new(db: AppwriteDb, users_collection: impl Into<String>) -> Self {
        Self {
            db,
            users_collection: users_collection.into(),
        }
    }

    /// Register a new user and sign them in.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Registration> {
        SignUp {
            email: email.to_string(),
            password: password.to_string(),
            username: username.to_string(),
        }
        .validate()?;

        let account = self
            .db
            .create_account(email, password, username)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Account creation failed");
                AppError::Registration {
                    stage: RegistrationStage::Account,
                    account_id: None,
                    message: e.to_string(),
                }
            })?;

        tracing::info!(account_id = %account.id, "Account created");

        let session = self
            .db
            .create_email_session(email, password)
            .await
            .map_err(|e| orphaned(RegistrationStage::Session, &account.id, e))?;

        let avatar = self.db.avatar_initials_url(username);
        let profile = NewUserProfile {
            account_id: &account.id,
            email,
            username,
            avatar: &avatar,
        };

        let user: User = match self
            .db
            .create_document(&session, &self.users_collection, &profile)
            .await
        {
            Ok(user) => user,
            Err(e) => {
                // Nobody gets this session back, so close it.
                if let Err(close) = self.db.delete_current_session(&session).await {
                    tracing::warn!(
                        account_id = %account.id,
                        error = %close,
                        "Failed to close registration session"
                    );
                }
                return Err(orphaned(RegistrationStage::Profile, &account.id, e));
            }
        };

        tracing::info!(
            account_id = %account.id,
            user_id = %user.id,
            "User registered"
        );

        Ok(Registration { user, session })
    }

    /// Open a session with email and password.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self
            .db
            .create_email_session(email, password)
            .await
            .map_err(|e| match e {
                DbError::Invalid { kind, message } => {
                    tracing::warn!(kind = %kind, message = %message, "Sign-in rejected");
                    AppError::Auth(message)
                }
                other => other.fetch_failed("sign_in"),
            })?;

        tracing::info!(account_id = %session.account_id, "Signed in");
        Ok(session)
    }

    /// Get the profile behind a session.
    ///
    /// Returns `Ok(None)` when the session is no longer valid or the account
    /// has no profile document. Lookup failures are errors.
    pub async fn get_current_user(&self, session: &Session) -> Result<Option<User>> {
        let account = match self.db.get_account(session).await {
            Ok(account) => account,
            Err(DbError::Unauthorized { .. }) => {
                tracing::debug!(session_id = %session.id, "No active session");
                return Ok(None);
            }
            Err(e) => return Err(e.fetch_failed("get_current_user")),
        };

        let found: DocumentList<User> = self
            .db
            .list_documents(
                session,
                &self.users_collection,
                &[
                    Query::equal(attributes::ACCOUNT_ID, [account.id.as_str()]),
                    Query::limit(1),
                ],
            )
            .await
            .map_err(|e| e.fetch_failed("get_current_user"))?;

        let user = found.documents.into_iter().next();
        if user.is_none() {
            tracing::warn!(account_id = %account.id, "Account has no profile document");
        }

        Ok(user)
    }

    /// End the session.
    pub async fn sign_out(&self, session: &Session) -> Result<()> {
        self.db
            .delete_current_session(session)
            .await
            .map_err(|e| match e {
                DbError::Unauthorized { message, .. } | DbError::NotFound { message, .. } => {
                    AppError::Auth(message)
                }
                other => other.write_failed("sign_out"),
            })?;

        tracing::info!(account_id = %session.account_id, "Signed out");
        Ok(())
    }

    /// Regenerate the initials avatar from the current username.
    pub async fn refresh_avatar(&self, session: &Session, user: &User) -> Result<User> {
        let avatar = self.db.avatar_initials_url(&user.username);
        let data = serde_json::json!({ "avatar": avatar });

        let updated: User = self
            .db
            .update_document(session, &self.users_collection, &user.id, &data)
            .await
            .map_err(|e| e.write_failed("refresh_avatar"))?;

        tracing::debug!(user_id = %user.id, "Avatar refreshed");
        Ok(updated)
    }
}

/// Registration error for a step after the account already exists.
fn orphaned(stage: RegistrationStage, account_id: &str, error: DbError) -> AppError {
    tracing::error!(
        account_id,
        %stage,
        error = %error,
        "Registration incomplete; account left without profile"
    );
    AppError::Registration {
        stage,
        account_id: Some(account_id.to_string()),
        message: error.to_string(),
    }
}
