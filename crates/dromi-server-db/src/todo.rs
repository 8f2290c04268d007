// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Todo list and item repository.
//!
//! Lists belong to a workspace and are addressed by id or by a slug unique within
//! that workspace. Items belong to a list; every item lookup is scoped by list id.
//! Deleting an item stamps `deleted_at` and hides it from every query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dromi_server_auth::{TodoItemId, TodoListId, UserId, WorkspaceId};
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqlitePool, Row};
use std::fmt;
use std::str::FromStr;

use crate::error::DbError;
use crate::types::{decode_opt_ts, decode_ts, encode_ts};

// =============================================================================
// Enumerations
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoPriority {
	#[default]
	None,
	Low,
	Medium,
	High,
	Urgent,
}

impl TodoPriority {
	pub fn as_str(&self) -> &'static str {
		match self {
			TodoPriority::None => "NONE",
			TodoPriority::Low => "LOW",
			TodoPriority::Medium => "MEDIUM",
			TodoPriority::High => "HIGH",
			TodoPriority::Urgent => "URGENT",
		}
	}
}

impl fmt::Display for TodoPriority {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TodoPriority {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"NONE" => Ok(TodoPriority::None),
			"LOW" => Ok(TodoPriority::Low),
			"MEDIUM" => Ok(TodoPriority::Medium),
			"HIGH" => Ok(TodoPriority::High),
			"URGENT" => Ok(TodoPriority::Urgent),
			other => Err(format!("unknown priority: {other}")),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoState {
	#[default]
	Open,
	InProgress,
	Done,
	Cancelled,
}

impl TodoState {
	pub fn as_str(&self) -> &'static str {
		match self {
			TodoState::Open => "OPEN",
			TodoState::InProgress => "IN_PROGRESS",
			TodoState::Done => "DONE",
			TodoState::Cancelled => "CANCELLED",
		}
	}

	/// `DONE` and `CANCELLED` are closed states.
	pub fn is_closed(&self) -> bool {
		matches!(self, TodoState::Done | TodoState::Cancelled)
	}
}

impl fmt::Display for TodoState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for TodoState {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"OPEN" => Ok(TodoState::Open),
			"IN_PROGRESS" => Ok(TodoState::InProgress),
			"DONE" => Ok(TodoState::Done),
			"CANCELLED" => Ok(TodoState::Cancelled),
			other => Err(format!("unknown state: {other}")),
		}
	}
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
	pub id: TodoListId,
	pub workspace_id: WorkspaceId,
	pub display_name: String,
	pub slug: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl TodoList {
	pub fn new(
		workspace_id: WorkspaceId,
		display_name: impl Into<String>,
		slug: impl Into<String>,
	) -> Self {
		let now = Utc::now();
		Self {
			id: TodoListId::generate(),
			workspace_id,
			display_name: display_name.into(),
			slug: slug.into(),
			created_at: now,
			updated_at: now,
		}
	}
}

/// A list with its live item count.
#[derive(Debug, Clone)]
pub struct TodoListSummary {
	pub list: TodoList,
	pub item_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
	pub id: TodoItemId,
	pub list_id: TodoListId,
	pub title: String,
	pub description: Option<String>,
	pub due_date: Option<DateTime<Utc>>,
	pub priority: TodoPriority,
	pub state: TodoState,
	pub assignee_id: Option<UserId>,
	pub created_by_id: UserId,
	pub closed_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub deleted_at: Option<DateTime<Utc>>,
}

impl TodoItem {
	/// A fresh `OPEN`, `NONE`-priority item.
	pub fn new(list_id: TodoListId, title: impl Into<String>, created_by_id: UserId) -> Self {
		let now = Utc::now();
		Self {
			id: TodoItemId::generate(),
			list_id,
			title: title.into(),
			description: None,
			due_date: None,
			priority: TodoPriority::default(),
			state: TodoState::default(),
			assignee_id: None,
			created_by_id,
			closed_at: None,
			created_at: now,
			updated_at: now,
			deleted_at: None,
		}
	}

	/// Change state, keeping `closed_at` in step.
	///
	/// Entering a closed state stamps `closed_at` unless the item was already
	/// closed. Any open state clears it.
	pub fn set_state(&mut self, state: TodoState, now: DateTime<Utc>) {
		if state.is_closed() {
			if !self.state.is_closed() || self.closed_at.is_none() {
				self.closed_at = Some(now);
			}
		} else {
			self.closed_at = None;
		}
		self.state = state;
	}
}

// =============================================================================
// Store
// =============================================================================

#[async_trait]
pub trait TodoStore: Send + Sync {
	async fn create_list(&self, list: &TodoList) -> Result<(), DbError>;
	async fn get_list(
		&self,
		workspace_id: &WorkspaceId,
		id_or_slug: &str,
	) -> Result<Option<TodoList>, DbError>;
	async fn list_lists(&self, workspace_id: &WorkspaceId) -> Result<Vec<TodoListSummary>, DbError>;
	async fn is_list_slug_taken(
		&self,
		workspace_id: &WorkspaceId,
		slug: &str,
		excluding: Option<&TodoListId>,
	) -> Result<bool, DbError>;
	async fn update_list(&self, list: &TodoList) -> Result<(), DbError>;
	async fn delete_list(&self, id: &TodoListId) -> Result<bool, DbError>;
	async fn count_items(&self, list_id: &TodoListId) -> Result<i64, DbError>;
	async fn create_item(&self, item: &TodoItem) -> Result<(), DbError>;
	async fn get_item(
		&self,
		list_id: &TodoListId,
		item_id: &TodoItemId,
	) -> Result<Option<TodoItem>, DbError>;
	async fn list_items(&self, list_id: &TodoListId) -> Result<Vec<TodoItem>, DbError>;
	async fn update_item(&self, item: &TodoItem) -> Result<(), DbError>;
	async fn delete_item(&self, list_id: &TodoListId, item_id: &TodoItemId) -> Result<bool, DbError>;
}

#[async_trait]
impl TodoStore for TodoRepository {
	async fn create_list(&self, list: &TodoList) -> Result<(), DbError> {
		self.create_list(list).await
	}

	async fn get_list(
		&self,
		workspace_id: &WorkspaceId,
		id_or_slug: &str,
	) -> Result<Option<TodoList>, DbError> {
		self.get_list(workspace_id, id_or_slug).await
	}

	async fn list_lists(&self, workspace_id: &WorkspaceId) -> Result<Vec<TodoListSummary>, DbError> {
		self.list_lists(workspace_id).await
	}

	async fn is_list_slug_taken(
		&self,
		workspace_id: &WorkspaceId,
		slug: &str,
		excluding: Option<&TodoListId>,
	) -> Result<bool, DbError> {
		self.is_list_slug_taken(workspace_id, slug, excluding).await
	}

	async fn update_list(&self, list: &TodoList) -> Result<(), DbError> {
		self.update_list(list).await
	}

	async fn delete_list(&self, id: &TodoListId) -> Result<bool, DbError> {
		self.delete_list(id).await
	}

	async fn count_items(&self, list_id: &TodoListId) -> Result<i64, DbError> {
		self.count_items(list_id).await
	}

	async fn create_item(&self, item: &TodoItem) -> Result<(), DbError> {
		self.create_item(item).await
	}

	async fn get_item(
		&self,
		list_id: &TodoListId,
		item_id: &TodoItemId,
	) -> Result<Option<TodoItem>, DbError> {
		self.get_item(list_id, item_id).await
	}

	async fn list_items(&self, list_id: &TodoListId) -> Result<Vec<TodoItem>, DbError> {
		self.list_items(list_id).await
	}

	async fn update_item(&self, item: &TodoItem) -> Result<(), DbError> {
		self.update_item(item).await
	}

	async fn delete_item(&self, list_id: &TodoListId, item_id: &TodoItemId) -> Result<bool, DbError> {
		self.delete_item(list_id, item_id).await
	}
}

/// Repository for todo lists and their items.
#[derive(Clone)]
pub struct TodoRepository {
	pool: SqlitePool,
}

impl TodoRepository {
	pub fn new(pool: SqlitePool) -> Self {
		Self { pool }
	}

	// =========================================================================
	// Lists
	// =========================================================================

	/// # Errors
	/// Returns `DbError::Conflict` if the slug is taken within the workspace.
	#[tracing::instrument(skip(self, list), fields(list_id = %list.id, workspace_id = %list.workspace_id))]
	pub async fn create_list(&self, list: &TodoList) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO todo_lists (id, workspace_id, display_name, slug, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?)
			"#,
		)
		.bind(list.id.as_str())
		.bind(list.workspace_id.as_str())
		.bind(&list.display_name)
		.bind(&list.slug)
		.bind(encode_ts(&list.created_at))
		.bind(encode_ts(&list.updated_at))
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, "slug already in use"))?;

		tracing::debug!(list_id = %list.id, "todo list created");
		Ok(())
	}

	/// Fetch a list of the workspace by id, falling back to slug.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn get_list(
		&self,
		workspace_id: &WorkspaceId,
		id_or_slug: &str,
	) -> Result<Option<TodoList>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, workspace_id, display_name, slug, created_at, updated_at
			FROM todo_lists
			WHERE workspace_id = ? AND (id = ? OR slug = ?)
			ORDER BY CASE WHEN id = ? THEN 0 ELSE 1 END
			LIMIT 1
			"#,
		)
		.bind(workspace_id.as_str())
		.bind(id_or_slug)
		.bind(id_or_slug)
		.bind(id_or_slug)
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_list_row(&r)).transpose()
	}

	/// Every list of the workspace in creation order, with live item counts.
	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn list_lists(&self, workspace_id: &WorkspaceId) -> Result<Vec<TodoListSummary>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT l.id, l.workspace_id, l.display_name, l.slug, l.created_at, l.updated_at,
				   (SELECT COUNT(*) FROM todo_items i
					WHERE i.list_id = l.id AND i.deleted_at IS NULL) AS item_count
			FROM todo_lists l
			WHERE l.workspace_id = ?
			ORDER BY l.id
			"#,
		)
		.bind(workspace_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows
			.iter()
			.map(|row| {
				Ok(TodoListSummary {
					list: parse_list_row(row)?,
					item_count: row.get("item_count"),
				})
			})
			.collect()
	}

	#[tracing::instrument(skip(self), fields(workspace_id = %workspace_id))]
	pub async fn is_list_slug_taken(
		&self,
		workspace_id: &WorkspaceId,
		slug: &str,
		excluding: Option<&TodoListId>,
	) -> Result<bool, DbError> {
		let row = sqlx::query(
			r#"
			SELECT EXISTS(
				SELECT 1 FROM todo_lists
				WHERE workspace_id = ? AND slug = ? AND (? IS NULL OR id != ?)
			) AS taken
			"#,
		)
		.bind(workspace_id.as_str())
		.bind(slug)
		.bind(excluding.map(|id| id.as_str()))
		.bind(excluding.map(|id| id.as_str()))
		.fetch_one(&self.pool)
		.await?;
		Ok(row.get::<i64, _>("taken") != 0)
	}

	/// Persist a list's display name and slug.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the list is gone, `DbError::Conflict` if the
	/// slug is taken within the workspace.
	#[tracing::instrument(skip(self, list), fields(list_id = %list.id))]
	pub async fn update_list(&self, list: &TodoList) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE todo_lists
			SET display_name = ?, slug = ?, updated_at = ?
			WHERE id = ?
			"#,
		)
		.bind(&list.display_name)
		.bind(&list.slug)
		.bind(encode_ts(&list.updated_at))
		.bind(list.id.as_str())
		.execute(&self.pool)
		.await
		.map_err(|e| DbError::conflict_on_unique(e, "slug already in use"))?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound("todo list".to_string()));
		}
		tracing::debug!(list_id = %list.id, "todo list updated");
		Ok(())
	}

	/// Delete a list with its items and labels.
	#[tracing::instrument(skip(self), fields(list_id = %id))]
	pub async fn delete_list(&self, id: &TodoListId) -> Result<bool, DbError> {
		let result = sqlx::query("DELETE FROM todo_lists WHERE id = ?")
			.bind(id.as_str())
			.execute(&self.pool)
			.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(list_id = %id, deleted, "todo list delete");
		Ok(deleted)
	}

	#[tracing::instrument(skip(self), fields(list_id = %list_id))]
	pub async fn count_items(&self, list_id: &TodoListId) -> Result<i64, DbError> {
		let row = sqlx::query(
			"SELECT COUNT(*) AS n FROM todo_items WHERE list_id = ? AND deleted_at IS NULL",
		)
		.bind(list_id.as_str())
		.fetch_one(&self.pool)
		.await?;
		Ok(row.get("n"))
	}

	// =========================================================================
	// Items
	// =========================================================================

	#[tracing::instrument(skip(self, item), fields(item_id = %item.id, list_id = %item.list_id))]
	pub async fn create_item(&self, item: &TodoItem) -> Result<(), DbError> {
		sqlx::query(
			r#"
			INSERT INTO todo_items (
				id, list_id, title, description, due_date, priority, state,
				assignee_id, created_by_id, closed_at, created_at, updated_at, deleted_at
			) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL)
			"#,
		)
		.bind(item.id.as_str())
		.bind(item.list_id.as_str())
		.bind(&item.title)
		.bind(&item.description)
		.bind(item.due_date.as_ref().map(encode_ts))
		.bind(item.priority.as_str())
		.bind(item.state.as_str())
		.bind(item.assignee_id.as_ref().map(|id| id.as_str()))
		.bind(item.created_by_id.as_str())
		.bind(item.closed_at.as_ref().map(encode_ts))
		.bind(encode_ts(&item.created_at))
		.bind(encode_ts(&item.updated_at))
		.execute(&self.pool)
		.await?;

		tracing::debug!(item_id = %item.id, "todo item created");
		Ok(())
	}

	/// Fetch a live item, only if it belongs to `list_id`.
	#[tracing::instrument(skip(self), fields(list_id = %list_id, item_id = %item_id))]
	pub async fn get_item(
		&self,
		list_id: &TodoListId,
		item_id: &TodoItemId,
	) -> Result<Option<TodoItem>, DbError> {
		let row = sqlx::query(
			r#"
			SELECT id, list_id, title, description, due_date, priority, state,
				   assignee_id, created_by_id, closed_at, created_at, updated_at, deleted_at
			FROM todo_items
			WHERE id = ? AND list_id = ? AND deleted_at IS NULL
			"#,
		)
		.bind(item_id.as_str())
		.bind(list_id.as_str())
		.fetch_optional(&self.pool)
		.await?;

		row.map(|r| parse_item_row(&r)).transpose()
	}

	/// Live items of a list in creation order.
	#[tracing::instrument(skip(self), fields(list_id = %list_id))]
	pub async fn list_items(&self, list_id: &TodoListId) -> Result<Vec<TodoItem>, DbError> {
		let rows = sqlx::query(
			r#"
			SELECT id, list_id, title, description, due_date, priority, state,
				   assignee_id, created_by_id, closed_at, created_at, updated_at, deleted_at
			FROM todo_items
			WHERE list_id = ? AND deleted_at IS NULL
			ORDER BY id
			"#,
		)
		.bind(list_id.as_str())
		.fetch_all(&self.pool)
		.await?;

		rows.iter().map(parse_item_row).collect()
	}

	/// Persist every mutable field of an item.
	///
	/// # Errors
	/// Returns `DbError::NotFound` if the item is gone or deleted.
	#[tracing::instrument(skip(self, item), fields(item_id = %item.id))]
	pub async fn update_item(&self, item: &TodoItem) -> Result<(), DbError> {
		let result = sqlx::query(
			r#"
			UPDATE todo_items
			SET title = ?, description = ?, due_date = ?, priority = ?, state = ?,
				assignee_id = ?, closed_at = ?, updated_at = ?
			WHERE id = ? AND list_id = ? AND deleted_at IS NULL
			"#,
		)
		.bind(&item.title)
		.bind(&item.description)
		.bind(item.due_date.as_ref().map(encode_ts))
		.bind(item.priority.as_str())
		.bind(item.state.as_str())
		.bind(item.assignee_id.as_ref().map(|id| id.as_str()))
		.bind(item.closed_at.as_ref().map(encode_ts))
		.bind(encode_ts(&item.updated_at))
		.bind(item.id.as_str())
		.bind(item.list_id.as_str())
		.execute(&self.pool)
		.await?;

		if result.rows_affected() == 0 {
			return Err(DbError::NotFound("todo item".to_string()));
		}
		tracing::debug!(item_id = %item.id, state = %item.state, "todo item updated");
		Ok(())
	}

	/// Mark an item deleted. Returns `false` if it was absent or already deleted.
	#[tracing::instrument(skip(self), fields(list_id = %list_id, item_id = %item_id))]
	pub async fn delete_item(&self, list_id: &TodoListId, item_id: &TodoItemId) -> Result<bool, DbError> {
		let result = sqlx::query(
			r#"
			UPDATE todo_items
			SET deleted_at = ?
			WHERE id = ? AND list_id = ? AND deleted_at IS NULL
			"#,
		)
		.bind(encode_ts(&Utc::now()))
		.bind(item_id.as_str())
		.bind(list_id.as_str())
		.execute(&self.pool)
		.await?;

		let deleted = result.rows_affected() > 0;
		tracing::debug!(item_id = %item_id, deleted, "todo item delete");
		Ok(deleted)
	}
}

fn parse_list_row(row: &sqlx::sqlite::SqliteRow) -> Result<TodoList, DbError> {
	let id: String = row.get("id");
	let workspace_id: String = row.get("workspace_id");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(TodoList {
		id: TodoListId::new(id),
		workspace_id: WorkspaceId::new(workspace_id),
		display_name: row.get("display_name"),
		slug: row.get("slug"),
		created_at: decode_ts(&created_at, "created_at")?,
		updated_at: decode_ts(&updated_at, "updated_at")?,
	})
}

fn parse_item_row(row: &sqlx::sqlite::SqliteRow) -> Result<TodoItem, DbError> {
	let id: String = row.get("id");
	let list_id: String = row.get("list_id");
	let priority: String = row.get("priority");
	let state: String = row.get("state");
	let assignee_id: Option<String> = row.get("assignee_id");
	let created_by_id: String = row.get("created_by_id");
	let created_at: String = row.get("created_at");
	let updated_at: String = row.get("updated_at");

	Ok(TodoItem {
		id: TodoItemId::new(id),
		list_id: TodoListId::new(list_id),
		title: row.get("title"),
		description: row.get("description"),
		due_date: decode_opt_ts(row.get("due_date"), "due_date")?,
		priority: priority.parse().map_err(DbError::Internal)?,
		state: state.parse().map_err(DbError::Internal)?,
		assignee_id: assignee_id.map(UserId::new),
		created_by_id: UserId::new(created_by_id),
		closed_at: decode_opt_ts(row.get("closed_at"), "closed_at")?,
		created_at: decode_ts(&created_at, "created_at")?,
		updated_at: decode_ts(&updated_at, "updated_at")?,
		deleted_at: decode_opt_ts(row.get("deleted_at"), "deleted_at")?,
	})
}
