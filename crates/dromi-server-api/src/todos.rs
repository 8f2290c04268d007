// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use dromi_server_db::{TodoItem, TodoList, TodoListSummary, TodoPriority, TodoState};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::common::deserialize_some;

// =============================================================================
// Enums
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoPriorityApi {
	None,
	Low,
	Medium,
	High,
	Urgent,
}

impl From<TodoPriority> for TodoPriorityApi {
	fn from(p: TodoPriority) -> Self {
		match p {
			TodoPriority::None => Self::None,
			TodoPriority::Low => Self::Low,
			TodoPriority::Medium => Self::Medium,
			TodoPriority::High => Self::High,
			TodoPriority::Urgent => Self::Urgent,
		}
	}
}

impl From<TodoPriorityApi> for TodoPriority {
	fn from(p: TodoPriorityApi) -> Self {
		match p {
			TodoPriorityApi::None => Self::None,
			TodoPriorityApi::Low => Self::Low,
			TodoPriorityApi::Medium => Self::Medium,
			TodoPriorityApi::High => Self::High,
			TodoPriorityApi::Urgent => Self::Urgent,
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStateApi {
	Open,
	InProgress,
	Done,
	Cancelled,
}

impl From<TodoState> for TodoStateApi {
	fn from(s: TodoState) -> Self {
		match s {
			TodoState::Open => Self::Open,
			TodoState::InProgress => Self::InProgress,
			TodoState::Done => Self::Done,
			TodoState::Cancelled => Self::Cancelled,
		}
	}
}

impl From<TodoStateApi> for TodoState {
	fn from(s: TodoStateApi) -> Self {
		match s {
			TodoStateApi::Open => Self::Open,
			TodoStateApi::InProgress => Self::InProgress,
			TodoStateApi::Done => Self::Done,
			TodoStateApi::Cancelled => Self::Cancelled,
		}
	}
}

// =============================================================================
// Lists
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoListRequest {
	/// Defaults to `Untitled List`.
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub slug: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoListRequest {
	#[serde(default)]
	pub display_name: Option<String>,
	#[serde(default)]
	pub slug: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ItemCount {
	pub items: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TodoListResponse {
	pub id: String,
	pub workspace_id: String,
	pub display_name: String,
	pub slug: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	#[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
	pub count: Option<ItemCount>,
}

impl TodoListResponse {
	pub fn with_item_count(mut self, items: i64) -> Self {
		self.count = Some(ItemCount { items });
		self
	}
}

impl From<&TodoList> for TodoListResponse {
	fn from(list: &TodoList) -> Self {
		Self {
			id: list.id.to_string(),
			workspace_id: list.workspace_id.to_string(),
			display_name: list.display_name.clone(),
			slug: list.slug.clone(),
			created_at: list.created_at,
			updated_at: list.updated_at,
			count: None,
		}
	}
}

impl From<&TodoListSummary> for TodoListResponse {
	fn from(summary: &TodoListSummary) -> Self {
		Self::from(&summary.list).with_item_count(summary.item_count)
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ListTodoListsResponse {
	pub success: bool,
	pub todo_lists: Vec<TodoListResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TodoListEnvelope {
	pub success: bool,
	pub todo_list: TodoListResponse,
}

/// `PUT /workspace/{id}/todo/{todoId}` answers under `list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct UpdatedTodoListEnvelope {
	pub success: bool,
	pub list: TodoListResponse,
}

// =============================================================================
// Items
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoItemRequest {
	pub title: String,
	#[serde(default)]
	pub description: Option<String>,
	/// RFC 3339 timestamp.
	#[serde(default)]
	pub due_date: Option<DateTime<Utc>>,
	#[serde(default)]
	pub priority: Option<TodoPriorityApi>,
	#[serde(default)]
	pub state: Option<TodoStateApi>,
	#[serde(default)]
	pub assignee_id: Option<String>,
}

/// Every field is optional. For nullable fields, an explicit `null` clears the
/// value while an absent field leaves it unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoItemRequest {
	#[serde(default)]
	pub title: Option<String>,
	#[serde(default, deserialize_with = "deserialize_some")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub description: Option<Option<String>>,
	#[serde(default, deserialize_with = "deserialize_some")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = DateTime))]
	pub due_date: Option<Option<DateTime<Utc>>>,
	#[serde(default)]
	pub priority: Option<TodoPriorityApi>,
	#[serde(default)]
	pub state: Option<TodoStateApi>,
	#[serde(default, deserialize_with = "deserialize_some")]
	#[cfg_attr(feature = "openapi", schema(value_type = Option<String>))]
	pub assignee_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct TodoItemResponse {
	pub id: String,
	pub list_id: String,
	pub title: String,
	pub description: Option<String>,
	pub due_date: Option<DateTime<Utc>>,
	pub priority: TodoPriorityApi,
	pub state: TodoStateApi,
	pub assignee_id: Option<String>,
	pub created_by_id: String,
	pub closed_at: Option<DateTime<Utc>>,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub deleted_at: Option<DateTime<Utc>>,
}

impl From<&TodoItem> for TodoItemResponse {
	fn from(item: &TodoItem) -> Self {
		Self {
			id: item.id.to_string(),
			list_id: item.list_id.to_string(),
			title: item.title.clone(),
			description: item.description.clone(),
			due_date: item.due_date,
			priority: item.priority.into(),
			state: item.state.into(),
			assignee_id: item.assignee_id.as_ref().map(|id| id.to_string()),
			created_by_id: item.created_by_id.to_string(),
			closed_at: item.closed_at,
			created_at: item.created_at,
			updated_at: item.updated_at,
			deleted_at: item.deleted_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListTodoItemsResponse {
	pub success: bool,
	pub items: Vec<TodoItemResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct TodoItemEnvelope {
	pub success: bool,
	pub item: TodoItemResponse,
}
