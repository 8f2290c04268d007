// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session lifecycle service for dromi authentication flows.
//!
//! Consolidates what signup, signin, the auth middleware and signout need from
//! sessions:
//!
//! - Creating a session for a fresh bearer token
//! - Validating a token, with lazy expiry and sliding renewal
//! - Invalidating a session
//!
//! The service depends on [`SessionStore`] rather than a concrete repository, so
//! tests can inject a double.

use chrono::{DateTime, Utc};
use dromi_server_auth::{
	generate_session_token, Session, SessionId, SessionKey, SessionState, User, UserId,
};
use dromi_server_db::SessionStore;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
	#[error("session store error: {0}")]
	Database(#[from] dromi_server_db::DbError),
}

pub type Result<T> = std::result::Result<T, SessionError>;

/// A successfully validated session.
#[derive(Debug, Clone)]
pub struct SessionValidation {
	pub session: Session,
	pub user: User,
	/// Expiry moved during this validation; the cookie should be re-issued.
	pub renewed: bool,
}

/// A newly issued session and the token the client must hold.
pub struct IssuedSession {
	pub token: String,
	pub session: Session,
}

impl std::fmt::Debug for IssuedSession {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("IssuedSession")
			.field("token", &"[REDACTED]")
			.field("session", &self.session)
			.finish()
	}
}

#[derive(Clone)]
pub struct SessionService {
	store: Arc<dyn SessionStore>,
	key: SessionKey,
}

impl SessionService {
	pub fn new(store: Arc<dyn SessionStore>, key: SessionKey) -> Self {
		Self { store, key }
	}

	/// Generate a token and persist a session for it.
	pub async fn issue_session(&self, user_id: &UserId) -> Result<IssuedSession> {
		let token = generate_session_token();
		let session = self.create_session(&token, user_id).await?;
		Ok(IssuedSession { token, session })
	}

	/// Persist a session for `token`, expiring 30 days from now.
	#[tracing::instrument(skip(self, token), fields(user_id = %user_id))]
	pub async fn create_session(&self, token: &str, user_id: &UserId) -> Result<Session> {
		let session = Session::new(self.key.derive_session_id(token), user_id.clone(), Utc::now());
		self.store.create_session(&session).await?;

		tracing::info!(user_id = %user_id, "session created");
		Ok(session)
	}

	/// Resolve a token to its session and user.
	///
	/// Returns `None` for unknown tokens and for expired sessions, which are
	/// deleted on the way out. A session inside the renewal window is extended.
	pub async fn validate_session_token(&self, token: &str) -> Result<Option<SessionValidation>> {
		self.validate_session_token_at(token, Utc::now()).await
	}

	#[tracing::instrument(skip(self, token))]
	async fn validate_session_token_at(
		&self,
		token: &str,
		now: DateTime<Utc>,
	) -> Result<Option<SessionValidation>> {
		let session_id = self.key.derive_session_id(token);
		let Some((mut session, user)) = self.store.get_session_with_user(&session_id).await? else {
			tracing::debug!("session not found");
			return Ok(None);
		};

		let renewed = match session.state_at(now) {
			SessionState::Expired => {
				self.store.delete_session(&session.id).await?;
				tracing::debug!(user_id = %user.id, "expired session removed");
				return Ok(None);
			}
			SessionState::NeedsRenewal => {
				session.renew(now);
				self.store
					.update_session_expiry(&session.id, session.expires_at)
					.await?;
				tracing::debug!(user_id = %user.id, expires_at = %session.expires_at, "session renewed");
				true
			}
			SessionState::Active => false,
		};

		Ok(Some(SessionValidation {
			session,
			user,
			renewed,
		}))
	}

	/// Delete a session. Deleting an absent session is not an error.
	#[tracing::instrument(skip(self, session_id))]
	pub async fn invalidate_session(&self, session_id: &SessionId) -> Result<()> {
		let deleted = self.store.delete_session(session_id).await?;
		tracing::debug!(deleted, "session invalidated");
		Ok(())
	}
}
