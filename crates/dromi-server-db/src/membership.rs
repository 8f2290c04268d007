// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Membership and permission-row repository.
//!
//! The permission evaluator is a pure function; this repository loads its input.
//! [`MembershipRepository::get_member_snapshot`] reads the caller's membership and
//! all of its permission rows in one pass.

use async_trait::async_trait;
use dromi_server_auth::{
	MemberId, MemberSnapshot, PermissionFlags, PermissionGrant, PermissionId, Resource, User,
	UserId, WorkspaceId,
};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{decode_ts, encode_ts};
use crate::user::parse_prefixed_user_row;
use crate::workspace::WorkspaceMember;

/// A member row joined with its user.
#[derive(Debug, Clone)]
pub struct MemberWithUser {
	pub member: WorkspaceMember,
	pub user: User,
}

#[async_trait]
pub trait MembershipStore: Send + Sync {
	async fn get_member_snapshot(
		&self,
		workspace_id: &WorkspaceId,
		user_id: &UserId,
		require_owner: bool,
	) -> Result<Option<MemberSnapshot>, DbError>;
	async fn is_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> Result<bool, DbError>;
	async fn list_members(&self, workspace_id: &WorkspaceId) -> Result<Vec<MemberWithUser>, DbError>;
	async fn add_member(
		&self,
		workspace_id: &WorkspaceId,
		user_id: &UserId,
		grants: &[PermissionGrant],
	) -> Result<WorkspaceMember, DbError>;
}

#[async_trait]
impl MembershipStore for MembershipRepository {
	async fn get_member_snapshot(
		&self,
		workspace_id: &WorkspaceId,
		user_id: &UserId,
		require_owner: bool,
	) -> Result<Option<MemberSnapshot>, DbError> {
		self
			.get_member_snapshot(workspace_id, user_id, require_owner)
			.await
	}

	async fn is_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> Result<bool, DbError> {
		self.is_member(workspace_id, user_id).await
	}

	async fn list_members(&self, workspace_id: &WorkspaceId) -> Result<Vec<MemberWithUser>, DbError> {
		self.list_members(workspace_id).await
	}

	async fn add_member(
		&self,
		workspace_id: &WorkspaceId,
		user_id: &UserId,
		grants: &[PermissionGrant],
	) -> Result<WorkspaceMember, DbError> {
		self.add_member(workspace_id, user_id, grants).await
	}
}

/// Repository for workspace members and their permission rows.
#[derive(Clone)]
pub struct MembershipRepository {
	pool: SqlitePool,
}

impl MembershipRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Load the caller's membership and permission rows.
	///
	/// Returns `None` when the user is not a member, or when `require_owner` is
	/// set and the member is not an owner.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id, user_id = %user_id))]
	pub async fn get_member_snapshot(
		&self,
		workspace_id: &WorkspaceId,
		user_id: &UserId,
		require_owner: bool,
	) -> Result<Option<MemberSnapshot>, DbError> {
		let member = sqlx::query(
			r#"
			SELECT id, is_owner
			FROM workspace_members
			WHERE workspace_id = ? AND user_id = ? AND (? = 0 OR is_owner = 1)
			"#,
		)
		.bind(workspace_id.as_str())
		.bind(user_id.as_str())
		.bind(require_owner)
		.fetch_optional(&self.pool)
		.await?;

		let Some(member) = member else {
			return Ok(None);
		};
		let member_id: String = member.get("id");
		let is_owner: bool = member.get("is_owner");

		let rows = sqlx::query(
			r#"
			SELECT resource, resource_id, flags
			FROM permissions
			WHERE member_id = ?
			ORDER BY created_at, id
			"#,
		)
		.bind(&member_id)
		.fetch_all(&self.pool)
		.await?;

		let grants = rows
			.iter()
			.map(parse_grant_row)
			.collect::<Result<Vec<_>, _>>()?;

		tracing::debug!(member_id = %member_id, is_owner, grants = grants.len(), "member snapshot loaded");
		Ok(Some(MemberSnapshot {
			member_id: MemberId::new(member_id),
			is_owner,
			grants,
		}))
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id, user_id = %user_id))]
	pub async fn is_member(&self, workspace_id: &WorkspaceId, user_id: &UserId) -> Result<bool, DbError> {
		let row = sqlx::query(
			r#"
			SELECT EXISTS(
				SELECT 1 FROM workspace_members WHERE workspace_id = ? AND user_id = ?
			) AS present
			"#,
		)
		.bind(workspace_id.as_str())
		.bind(user_id.as_str())
		.fetch_one(&self.pool)
		.await?;
		Ok(row.get::<i64, _>("present") != 0)
	}

	/// Members of a workspace with their users, oldest membership first.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn list_members(&self, workspace_id: &WorkspaceId) -> Result<Vec<MemberWithUser>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT m.id, m.workspace_id, m.user_id, m.is_owner, m.created_at, m.updated_at,
				   u.id AS u_id, u.email AS u_email, u.username AS u_username,
				   u.created_at AS u_created_at, u.updated_at AS u_updated_at
			FROM workspace_members m
			JOIN users u ON u.id = m.user_id
			WHERE m.workspace_id = ?
			ORDER BY m.created_at, m.id
			"#,
		)
		.bind(workspace_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|row| {
				Ok(MemberWithUser {
					member: parse_member_row(row)?,
					user: parse_prefixed_user_row(row, "u_")?,
				})
			})
			.collect()
	}

	/// Add a non-owner member with the given permission rows.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the user is already a member.
	#[tracing::instrument(skip(self, grants), fields(workspace_id = %workspace_id, user_id = %user_id))]
	pub async fn add_member(
		&self,
		workspace_id: &WorkspaceId,
		user_id: &UserId,
		grants: &[PermissionGrant],
	) -> Result<WorkspaceMember, DbError> {
		let now = chrono::Utc::now();
		let member = WorkspaceMember {
			id: MemberId::generate(),
			workspace_id: workspace_id.clone(),
			user_id: user_id.clone(),
			is_owner: false,
			created_at: now,
			updated_at: now,
		};

		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO workspace_members (id, workspace_id, user_id, is_owner, created_at, updated_at)
			VALUES (?, ?, ?, 0, ?, ?)
			"#,
		)
		.bind(member.id.as_str())
		.bind(member.workspace_id.as_str())
		.bind(member.user_id.as_str())
		.bind(encode_ts(&member.created_at))
		.bind(encode_ts(&member.updated_at))
		.execute(&mut *tx)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, "already a member"))?;

		for grant in grants {
			sqlx::query(
				r#"
				INSERT INTO permissions (id, member_id, resource, resource_id, flags, created_at)
				VALUES (?, ?, ?, ?, ?, ?)
				"#,
			)
			.bind(PermissionId::generate().as_str())
			.bind(member.id.as_str())
			.bind(grant.resource.as_str())
			.bind(grant.resource_id.as_deref())
			.bind(i64::from(grant.flags.bits()))
			.bind(encode_ts(&now))
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;

		tracing::debug!(member_id = %member.id, grants = grants.len(), "member added");
		Ok(member)
	}
}

fn parse_member_row(row: &sqlx::sqlite::SqliteRow) -> Result<WorkspaceMember, DbError> {
	let id: String = row.get("id");
	let workspace_id: String = row.get("workspace_id");
	let user_id: String = row.get("user_id");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(WorkspaceMember {
		id: MemberId::new(id),
		workspace_id: WorkspaceId::new(workspace_id),
		user_id: UserId::new(user_id),
		is_owner: row.get("is_owner"),
		created_at: decode_ts(&created_at, "created_at")?,
		updated_at: decode_ts(&updated_at, "updated_at")?,
	})
}

fn parse_grant_row(row: &sqlx::sqlite::SqliteRow) -> Result<PermissionGrant, DbError> {
	let resource: String = row.get("resource");
	let flags: i64 = row.get("flags");

	let resource = resource.parse::<Resource>().map_err(DbError::Internal)?;
	let flags = u32::try_from(flags)
		.map(PermissionFlags::from_bits)
		.map_err(|e| DbError::Internal(format!("Invalid permission flags {flags}: {e}")))?;

	Ok(PermissionGrant {
		resource,
		resource_id: row.get("resource_id"),
		flags,
	})
}
