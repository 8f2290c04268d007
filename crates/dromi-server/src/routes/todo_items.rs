// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Todo item HTTP handlers.
//!
//! Items are always looked up through the list named in the path. An item of
//! another list is not found.

use axum::{
	extract::{Path, State},
	Json,
};
use chrono::Utc;
use dromi_server_api::{
	CreateTodoItemRequest, ErrorResponse, ListTodoItemsResponse, MessageResponse,
	TodoItemEnvelope, TodoItemResponse, UpdateTodoItemRequest,
};
use dromi_server_auth::{PermissionFlags, TodoItemId, UserId, WorkspaceId};
use dromi_server_db::TodoItem;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	extract::ApiJson,
	routes::{load_item, load_list, require_list_permission},
	validation::validate_name,
};

/// Resolve an assignee id, which must name a member of the workspace.
async fn resolve_assignee(
	state: &AppState,
	workspace_id: &WorkspaceId,
	assignee_id: Option<String>,
) -> Result<Option<UserId>, ServerError> {
	let Some(assignee_id) = assignee_id else {
		return Ok(None);
	};
	let assignee_id = UserId::new(assignee_id);
	if !state
		.membership_repo
		.is_member(workspace_id, &assignee_id)
		.await?
	{
		return Err(ServerError::BadRequest(
			"Assignee must be a member of this workspace".to_string(),
		));
	}
	Ok(Some(assignee_id))
}

#[utoipa::path(
    get,
    path = "/workspace/{id}/todo/{todo_id}/items",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    responses(
        (status = 200, description = "Items of the list", body = ListTodoItemsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO VIEW permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse)
    ),
    tag = "todo-items"
)]
/// GET /workspace/{id}/todo/{todo_id}/items - Items of a list.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id))]
pub async fn list_todo_items(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
) -> Result<Json<ListTodoItemsResponse>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::VIEW,
		"You do not have permission to view todo lists",
	)
	.await?;

	let items = state.todo_repo.list_items(&list.id).await?;

	Ok(Json(ListTodoItemsResponse {
		success: true,
		items: items.iter().map(TodoItemResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/workspace/{id}/todo/{todo_id}/items",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    request_body = CreateTodoItemRequest,
    responses(
        (status = 200, description = "Item created", body = TodoItemEnvelope),
        (status = 400, description = "Invalid title or assignee", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO CREATE permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse)
    ),
    tag = "todo-items"
)]
/// POST /workspace/{id}/todo/{todo_id}/items - Add an item to a list.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id))]
pub async fn create_todo_item(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
	ApiJson(payload): ApiJson<CreateTodoItemRequest>,
) -> Result<Json<TodoItemEnvelope>, ServerError> {
	let (workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::CREATE,
		"You do not have permission to create todo items",
	)
	.await?;

	let title = payload.title.trim().to_string();
	validate_name("Title", &title)?;

	let mut item = TodoItem::new(list.id.clone(), title, current.user.id.clone());
	item.description = payload.description;
	item.due_date = payload.due_date;
	item.assignee_id = resolve_assignee(&state, &workspace.id, payload.assignee_id).await?;
	if let Some(priority) = payload.priority {
		item.priority = priority.into();
	}
	if let Some(state_api) = payload.state {
		item.set_state(state_api.into(), item.created_at);
	}

	state.todo_repo.create_item(&item).await?;
	tracing::info!(list_id = %list.id, item_id = %item.id, "todo item created");

	Ok(Json(TodoItemEnvelope {
		success: true,
		item: TodoItemResponse::from(&item),
	}))
}

#[utoipa::path(
    put,
    path = "/workspace/{id}/todo/{todo_id}/items/{item_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("item_id" = String, Path, description = "Todo item id")
    ),
    request_body = UpdateTodoItemRequest,
    responses(
        (status = 200, description = "The updated item", body = TodoItemEnvelope),
        (status = 400, description = "Invalid title or assignee", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace, list or item not found", body = ErrorResponse)
    ),
    tag = "todo-items"
)]
/// PUT /workspace/{id}/todo/{todo_id}/items/{item_id} - Update an item.
///
/// Absent fields are left alone. `null` clears description, due date and
/// assignee.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id, %item_id))]
pub async fn update_todo_item(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, item_id)): Path<(String, String, String)>,
	ApiJson(payload): ApiJson<UpdateTodoItemRequest>,
) -> Result<Json<TodoItemEnvelope>, ServerError> {
	let (workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		"You do not have permission to edit todo items",
	)
	.await?;

	let mut item = load_item(&state, &list, &item_id).await?;
	let now = Utc::now();

	if let Some(title) = payload.title {
		let title = title.trim().to_string();
		validate_name("Title", &title)?;
		item.title = title;
	}
	if let Some(description) = payload.description {
		item.description = description;
	}
	if let Some(due_date) = payload.due_date {
		item.due_date = due_date;
	}
	if let Some(priority) = payload.priority {
		item.priority = priority.into();
	}
	if let Some(assignee_id) = payload.assignee_id {
		item.assignee_id = resolve_assignee(&state, &workspace.id, assignee_id).await?;
	}
	if let Some(state_api) = payload.state {
		item.set_state(state_api.into(), now);
	}
	item.updated_at = now;

	state.todo_repo.update_item(&item).await?;
	tracing::info!(item_id = %item.id, state = item.state.as_str(), "todo item updated");

	Ok(Json(TodoItemEnvelope {
		success: true,
		item: TodoItemResponse::from(&item),
	}))
}

#[utoipa::path(
    delete,
    path = "/workspace/{id}/todo/{todo_id}/items/{item_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("item_id" = String, Path, description = "Todo item id")
    ),
    responses(
        (status = 200, description = "Item deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace, list or item not found", body = ErrorResponse)
    ),
    tag = "todo-items"
)]
/// DELETE /workspace/{id}/todo/{todo_id}/items/{item_id} - Delete an item.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id, %item_id))]
pub async fn delete_todo_item(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, item_id)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		"You do not have permission to edit todo items",
	)
	.await?;

	if !state
		.todo_repo
		.delete_item(&list.id, &TodoItemId::new(item_id.as_str()))
		.await?
	{
		return Err(ServerError::NotFound("Todo item not found".to_string()));
	}

	tracing::info!(list_id = %list.id, %item_id, "todo item deleted");
	Ok(Json(MessageResponse::ok("Todo item deleted successfully")))
}
