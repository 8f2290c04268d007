// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session repository.
//!
//! Rows are keyed by the derived [`SessionId`]; the bearer token itself is never
//! stored. Expiry is not checked here, callers decide what an expired row means.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dromi_server_auth::{Session, SessionId, User, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{decode_ts, encode_ts};
use crate::user::parse_prefixed_user_row;

#[async_trait]
pub trait SessionStore: Send + Sync {
	async fn create_session(&self, session: &Session) -> Result<(), DbError>;
	async fn get_session_with_user(
		&self,
		id: &SessionId,
	) -> Result<Option<(Session, User)>, DbError>;
	async fn update_session_expiry(
		&self,
		id: &SessionId,
		expires_at: DateTime<Utc>,
	) -> Result<(), DbError>;
	async fn delete_session(&self, id: &SessionId) -> Result<bool, DbError>;
}

#[async_trait]
impl SessionStore for SessionRepository {
	async fn create_session(&self, session: &Session) -> Result<(), DbError> {
		self.create_session(session).await
	}

	async fn get_session_with_user(
		&self,
		id: &SessionId,
	) -> Result<Option<(Session, User)>, DbError> {
		self.get_session_with_user(id).await
	}

	async fn update_session_expiry(
		&self,
		id: &SessionId,
		expires_at: DateTime<Utc>,
	) -> Result<(), DbError> {
		self.update_session_expiry(id, expires_at).await
	}

	async fn delete_session(&self, id: &SessionId) -> Result<bool, DbError> {
		self.delete_session(id).await
	}
}

/// Repository for browser sessions.
#[derive(Clone)]
pub struct SessionRepository {
	pool: SqlitePool,
}

impl SessionRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a session.
	///
	/// # Database Constraints
	/// - `id` must be unique
	/// - `user_id` must reference an existing user
	#[tracing::instrument(skip(self, session), fields(user_id = %session.user_id))]
	pub async fn create_session(&self, session: &Session) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO sessions (id, user_id, expires_at, created_at)
			VALUES (?, ?, ?, ?)
			"#,
		)
		.bind(session.id.as_str())
		.bind(session.user_id.as_str())
		.bind(encode_ts(&session.expires_at))
		.bind(encode_ts(&session.created_at))
		.execute(&self.pool)
		.await?;

		tracing::debug!(user_id = %session.user_id, "session created");
		Ok(())
	}

	/// Fetch a session joined with its user. Does not check expiry.
	#[tracing::instrument(skip(self, id))]
	pub async fn get_session_with_user(
		&self,
		id: &SessionId,
	) -> Result<Option<(Session, User)>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT s.id, s.user_id, s.expires_at, s.created_at,
				   u.id AS u_id, u.email AS u_email, u.username AS u_username,
				   u.created_at AS u_created_at, u.updated_at AS u_updated_at
			FROM sessions s
			JOIN users u ON u.id = s.user_id
			WHERE s.id = ?
			"#,
		)
		.bind(id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let session = parse_session_row(&row)?;
				let user = parse_prefixed_user_row(&row, "u_")?;
				tracing::debug!(user_id = %user.id, "session found");
				Ok(Some((session, user)))
			}
			None => Ok(None),
		}
	}

	/// Move a session's expiry.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the session does not exist.
	#[tracing::instrument(skip(self, id))]
	pub async fn update_session_expiry(
		&self,
		id: &SessionId,
		expires_at: DateTime<Utc>,
	) -> Result<(), DbError> {
		let result = sqlx::query("UPDATE sessions SET expires_at = ? WHERE id = ?")
			.bind(encode_ts(&expires_at))
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound("session".to_string()));
		}
		tracing::debug!(%expires_at, "session expiry updated");
		Ok(())
	}

	/// Delete a session. Returns `false` if there was nothing to delete.
	#[tracing::instrument(skip(self, id))]
	pub async fn delete_session(&self, id: &SessionId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(deleted, "session delete");
		Ok(deleted)
	}
}

fn parse_session_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session, DbError> {
	let id: String = row.get("id");
	let user_id: String = row.get("user_id");
	let expires_at: String = row.get("expires_at");
	let created_at: String = row.get("created_at");

	Ok(Session {
		id: SessionId::new(id),
		user_id: UserId::new(user_id),
		expires_at: decode_ts(&expires_at, "expires_at")?,
		created_at: decode_ts(&created_at, "created_at")?,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::create_migrated_test_pool;
	use crate::user::UserRepository;
	use chrono::Duration;

	async fn setup() -> (SessionRepository, User) {
		let pool = create_migrated_test_pool().await;
		let user = User::new("ada@example.com", "ada");
		UserRepository::new(pool.clone())
			.create_user(&user, "hash")
			.await
			.unwrap();
		(SessionRepository::new(pool), user)
	}

	#[tokio::test]
	async fn create_and_fetch_with_user() {
		let (repo, user) = setup().await;
		let session = Session::new(SessionId::new("sid-1"), user.id.clone(), Utc::now());
		repo.create_session(&session).await.unwrap();

		let (found, found_user) = repo
			.get_session_with_user(&session.id)
			.await
			.unwrap()
			.unwrap();
		assert_eq!(found.id, session.id);
		assert_eq!(found.user_id, user.id);
		assert_eq!(found_user.id, user.id);
		assert_eq!(found_user.email, user.email);
		assert!((found.expires_at - session.expires_at).num_milliseconds().abs() < 1);
	}

	#[tokio::test]
	async fn unknown_session_is_none() {
		let (repo, _) = setup().await;
		assert!(repo
			.get_session_with_user(&SessionId::new("missing"))
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn update_expiry_persists() {
		let (repo, user) = setup().await;
		let session = Session::new(SessionId::new("sid-2"), user.id, Utc::now());
		repo.create_session(&session).await.unwrap();

		let later = Utc::now() + Duration::days(45);
		repo.update_session_expiry(&session.id, later).await.unwrap();
		let (found, _) = repo
			.get_session_with_user(&session.id)
			.await
			.unwrap()
			.unwrap();
		assert!((found.expires_at - later).num_milliseconds().abs() < 1);

		let missing = repo
			.update_session_expiry(&SessionId::new("missing"), later)
			.await;
		assert!(matches!(missing, Err(DbError::NotFound(_))));
	}

	#[tokio::test]
	async fn delete_is_idempotent() {
		let (repo, user) = setup().await;
		let session = Session::new(SessionId::new("sid-3"), user.id, Utc::now());
		repo.create_session(&session).await.unwrap();

		assert!(repo.delete_session(&session.id).await.unwrap());
		assert!(!repo.delete_session(&session.id).await.unwrap());
		assert!(repo
			.get_session_with_user(&session.id)
			.await
			.unwrap()
			.is_none());
	}

	#[tokio::test]
	async fn session_for_missing_user_is_rejected() {
		let (repo, _) = setup().await;
		let orphan = Session::new(SessionId::new("sid-4"), UserId::new("ghost"), Utc::now());
		assert!(repo.create_session(&orphan).await.is_err());
	}
}
