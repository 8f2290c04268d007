// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User repository.
//!
//! The password hash is written once at signup and only ever read back through
//! [`UserStore::get_credentials_by_identifier`]. Every other lookup returns a
//! [`User`] without it.

use async_trait::async_trait;
use dromi_server_auth::{User, UserId};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{decode_ts, encode_ts};

/// A user together with their stored password hash.
#[derive(Debug, Clone)]
pub struct UserCredentials {
	pub user: User,
	pub password_hash: String,
}

#[async_trait]
pub trait UserStore: Send + Sync {
	async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), DbError>;
	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError>;
	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError>;
	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError>;
	async fn get_credentials_by_identifier(
		&self,
		identifier: &str,
	) -> Result<Option<UserCredentials>, DbError>;
}

#[async_trait]
impl UserStore for UserRepository {
	async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), DbError> {
		self.create_user(user, password_hash).await
	}

	async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		self.get_user_by_id(id).await
	}

	async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_email(email).await
	}

	async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		self.get_user_by_username(username).await
	}

	async fn get_credentials_by_identifier(
		&self,
		identifier: &str,
	) -> Result<Option<UserCredentials>, DbError> {
		self.get_credentials_by_identifier(identifier).await
	}
}

/// Repository for user accounts.
#[derive(Clone)]
pub struct UserRepository {
	pool: SqlitePool,
}

impl UserRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a user.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the email or username is already taken.
	#[tracing::instrument(skip(self, user, password_hash), fields(user_id = %user.id))]
	pub async fn create_user(&self, user: &User, password_hash: &str) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO users (id, email, username, password, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(user.id.as_str())
		.bind(&user.email)
		.bind(&user.username)
		.bind(password_hash)
		.bind(encode_ts(&user.created_at))
		.bind(encode_ts(&user.updated_at))
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, "email or username already in use"))?;

		tracing::debug!(user_id = %user.id, "user created");
		Ok(())
	}

	#[tracing::instrument(skip(self), fields(user_id = %id))]
	pub async fn get_user_by_id(&self, id: &UserId) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, username, created_at, updated_at
			FROM users
			WHERE id = ?
			"#,
		)
		.bind(id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_user_row(&r)).transpose()
	}

	#[tracing::instrument(skip(self, email))]
	pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, username, created_at, updated_at
			FROM users
			WHERE email = ?
			"#,
		)
		.bind(email)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_user_row(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, username, created_at, updated_at
			FROM users
			WHERE username = ?
			"#,
		)
		.bind(username)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_user_row(&r)).transpose()
	}

	/// Look up a user by email or username, returning the password hash too.
	///
	/// Email wins when one user's email equals another user's username.
	#[tracing::instrument(skip(self, identifier))]
	pub async fn get_credentials_by_identifier(
		&self,
		identifier: &str,
	) -> Result<Option<UserCredentials>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, email, username, password, created_at, updated_at
			FROM users
			WHERE email = ? OR username = ?
			ORDER BY CASE WHEN email = ? THEN 0 ELSE 1 END
			LIMIT 1
			"#,
		)
		.bind(identifier)
		.bind(identifier)
		.bind(identifier)
		.fetch_optional(&self.pool)
		.await?;

		match row {
			Some(row) => {
				let user = parse_user_row(&row)?;
				let password_hash: String = row.get("password");
				Ok(Some(UserCredentials {
					user,
					password_hash,
				}))
			}
			None => Ok(None),
		}
	}
}

/// Parse the user columns (`id, email, username, created_at, updated_at`) of a row.
pub(crate) fn parse_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, DbError> {
	parse_prefixed_user_row(row, "")
}

/// Same as [`parse_user_row`] for joined rows whose user columns carry `prefix`.
pub(crate) fn parse_prefixed_user_row(
	row: &sqlx::sqlite::SqliteRow,
	prefix: &str,
) -> Result<User, DbError> {
	let col = |name: &str| format!("{prefix}{name}");
	let id: String = row.get(col("id").as_str());
	let created_at: String = row.get(col("created_at").as_str());
	let updated_at: String = row.get(col("updated_at").as_str());

	Ok(User {
		id: UserId::new(id),
		email: row.get(col("email").as_str()),
		username: row.get(col("username").as_str()),
		created_at: decode_ts(&created_at, "created_at")?,
		updated_at: decode_ts(&updated_at, "updated_at")?,
	})
}
