// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace repository.
//!
//! A workspace is the tenant boundary. Creating one also creates its owner
//! membership and the owner's permission rows, all in one transaction. Deleting
//! one cascades to members, permissions, lists, items, labels and values.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dromi_server_auth::{MemberId, PermissionFlags, PermissionId, Resource, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};

use crate::error::DbError;
use crate::types::{decode_ts, encode_ts};

/// A workspace record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
	pub id: WorkspaceId,
	pub display_name: String,
	pub slug: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl Workspace {
	pub fn new(display_name: impl Into<String>, slug: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: WorkspaceId::generate(),
			display_name: display_name.into(),
			slug: slug.into(),
			created_at: now,
			updated_at: now,
		}
	}
}

/// A workspace with its member count.
#[derive(Debug, Clone)]
pub struct WorkspaceSummary {
	pub workspace: Workspace,
	pub member_count: i64,
}

/// A user's membership in a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceMember {
	pub id: MemberId,
	pub workspace_id: WorkspaceId,
	pub user_id: UserId,
	pub is_owner: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait WorkspaceStore: Send + Sync {
	async fn create_workspace_with_owner(
		&self,
		workspace: &Workspace,
		owner_id: &UserId,
	) -> Result<WorkspaceMember, DbError>;
	async fn get_workspace(&self, id_or_slug: &str) -> Result<Option<Workspace>, DbError>;
	async fn is_slug_taken(&self, slug: &str) -> Result<bool, DbError>;
	async fn list_workspaces_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<WorkspaceSummary>, DbError>;
	async fn delete_workspace(&self, id: &WorkspaceId) -> Result<bool, DbError>;
}

#[async_trait]
impl WorkspaceStore for WorkspaceRepository {
	async fn create_workspace_with_owner(
		&self,
		workspace: &Workspace,
		owner_id: &UserId,
	) -> Result<WorkspaceMember, DbError> {
		self.create_workspace_with_owner(workspace, owner_id).await
	}

	async fn get_workspace(&self, id_or_slug: &str) -> Result<Option<Workspace>, DbError> {
		self.get_workspace(id_or_slug).await
	}

	async fn is_slug_taken(&self, slug: &str) -> Result<bool, DbError> {
		self.is_slug_taken(slug).await
	}

	async fn list_workspaces_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<WorkspaceSummary>, DbError> {
		self.list_workspaces_for_user(user_id).await
	}

	async fn delete_workspace(&self, id: &WorkspaceId) -> Result<bool, DbError> {
		self.delete_workspace(id).await
	}
}

/// Repository for workspaces.
#[derive(Clone)]
pub struct WorkspaceRepository {
	pool: SqlitePool,
}

impl WorkspaceRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	/// Insert a workspace, its owner member, and one all-flags workspace-wide
	/// permission row per resource kind.
	///
	/// # Errors
	/// Returns `DbError::Conflict` if the slug is taken. Nothing is written in that case.
	#[tracing::instrument(skip(self, workspace), fields(workspace_id = %workspace.id, owner_id = %owner_id))]
	pub async fn create_workspace_with_owner(
		&self,
		workspace: &Workspace,
		owner_id: &UserId,
	) -> Result<WorkspaceMember, DbError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			r#"
			INSERT INTO workspaces (id, display_name, slug, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?)
			"#,
		)
		.bind(workspace.id.as_str())
		.bind(&workspace.display_name)
		.bind(&workspace.slug)
		.bind(encode_ts(&workspace.created_at))
		.bind(encode_ts(&workspace.updated_at))
		.execute(&mut *tx)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, "slug already in use"))?;

		let member = WorkspaceMember {
			id: MemberId::generate(),
			workspace_id: workspace.id.clone(),
			user_id: owner_id.clone(),
			is_owner: true,
			created_at: workspace.created_at,
			updated_at: workspace.created_at,
		};

		sqlx::query(
			r#"
			INSERT INTO workspace_members (id, workspace_id, user_id, is_owner, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(member.id.as_str())
		.bind(member.workspace_id.as_str())
		.bind(member.user_id.as_str())
		.bind(member.is_owner)
		.bind(encode_ts(&member.created_at))
		.bind(encode_ts(&member.updated_at))
		.execute(&mut *tx)
		.await?;

		for resource in Resource::all() {
			sqlx::query(
				r#"
				INSERT INTO permissions (id, member_id, resource, resource_id, flags, created_at)
				VALUES (?, ?, ?, NULL, ?, ?)
				"#,
			)
			.bind(PermissionId::generate().as_str())
			.bind(member.id.as_str())
			.bind(resource.as_str())
			.bind(i64::from(PermissionFlags::ALL.bits()))
			.bind(encode_ts(&member.created_at))
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;

		tracing::debug!(workspace_id = %workspace.id, member_id = %member.id, "workspace created");
		Ok(member)
	}

	/// Fetch a workspace by id, falling back to slug.
	#[tracing::instrument(skip(self))]
	pub async fn get_workspace(&self, id_or_slug: &str) -> Result<Option<Workspace>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, display_name, slug, created_at, updated_at
			FROM workspaces
			WHERE id = ? OR slug = ?
			ORDER BY CASE WHEN id = ? THEN 0 ELSE 1 END
			LIMIT 1
			"#,
		)
		.bind(id_or_slug)
		.bind(id_or_slug)
		.bind(id_or_slug)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_workspace_row(&r)).transpose()
	}

	#[tracing::instrument(skip(self))]
	pub async fn is_slug_taken(&self, slug: &str) -> Result<bool, DbError> {
		let row = sqlx::query("SELECT EXISTS(SELECT 1 FROM workspaces WHERE slug = ?) AS taken")
			.bind(slug)
			.fetch_one(&self.pool)
			.await?;
		Ok(row.get::<i64, _>("taken") != 0)
	}

	/// Workspaces the user is a member of, oldest first, with member counts.
	#[tracing::instrument(skip(self), fields(user_id = %user_id))]
	pub async fn list_workspaces_for_user(
		&self,
		user_id: &UserId,
	) -> Result<Vec<WorkspaceSummary>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT w.id, w.display_name, w.slug, w.created_at, w.updated_at,
				   (SELECT COUNT(*) FROM workspace_members c WHERE c.workspace_id = w.id) AS member_count
			FROM workspaces w
			JOIN workspace_members m ON m.workspace_id = w.id
			WHERE m.user_id = ?
			ORDER BY w.created_at, w.id
			"#,
		)
		.bind(user_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|row| {
				Ok(WorkspaceSummary {
					workspace: parse_workspace_row(row)?,
					member_count: row.get("member_count"),
				})
			})
			.collect()
	}

	/// Delete a workspace and everything under it.
	#[tracing::instrument(skip(self), fields(workspace_id = %id))]
	pub async fn delete_workspace(&self, id: &WorkspaceId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM workspaces WHERE id = ?")
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(workspace_id = %id, deleted, "workspace delete");
		Ok(deleted)
	}
}

fn parse_workspace_row(row: &sqlx::sqlite::SqliteRow) -> Result<Workspace, DbError> {
	let id: String = row.get("id");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(Workspace {
		id: WorkspaceId::new(id),
		display_name: row.get("display_name"),
		slug: row.get("slug"),
		created_at: decode_ts(&created_at, "created_at")?,
		updated_at: decode_ts(&updated_at, "updated_at")?,
	})
}
