// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Todo list HTTP handlers.
//!
//! Lists are addressed by id or by a slug unique within their workspace. Every
//! check except create is scoped to the list instance, with workspace-wide
//! grants accepted as a fallback.

use axum::{
	extract::{Path, State},
	Json,
};
use chrono::Utc;
use dromi_server_api::{
	CreateTodoListRequest, ErrorResponse, ListTodoListsResponse, MessageResponse,
	TodoListEnvelope, TodoListResponse, UpdateTodoListRequest, UpdatedTodoListEnvelope,
};
use dromi_server_auth::{PermissionFlags, RequiredPermission, Resource, TodoListId, WorkspaceId};
use dromi_server_db::TodoList;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	authz::{check_workspace_permission, instance_grants, require_workspace_permission},
	error::ServerError,
	extract::ApiJson,
	routes::{generate_free_slug, load_list, load_workspace, require_list_permission},
	validation::{validate_name, validate_slug},
};

const DEFAULT_DISPLAY_NAME: &str = "Untitled List";

/// Fail with 409 when `slug` is used by another list of the workspace.
async fn ensure_slug_free(
	state: &AppState,
	workspace_id: &WorkspaceId,
	slug: &str,
	excluding: Option<&TodoListId>,
) -> Result<(), ServerError> {
	if state
		.todo_repo
		.is_list_slug_taken(workspace_id, slug, excluding)
		.await?
	{
		return Err(ServerError::Conflict("Slug already in use".to_string()));
	}
	Ok(())
}

fn slug_lock_key(workspace_id: &WorkspaceId, slug: &str) -> String {
	format!("todo-slug:{workspace_id}:{slug}")
}

#[utoipa::path(
    get,
    path = "/workspace/{id}/todo",
    params(
        ("id" = String, Path, description = "Workspace id or slug")
    ),
    responses(
        (status = 200, description = "Visible todo lists with item counts", body = ListTodoListsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO VIEW permission on any list", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "todo-lists"
)]
/// GET /workspace/{id}/todo - Todo lists the caller may view.
///
/// A workspace-wide TODO VIEW grant shows every list. Otherwise only lists named
/// by instance grants are returned.
#[tracing::instrument(skip(state, current), fields(%id))]
pub async fn list_todo_lists(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<ListTodoListsResponse>, ServerError> {
	let workspace = load_workspace(&state, &id).await?;

	let result = check_workspace_permission(
		state.membership_repo.as_ref(),
		&workspace.id,
		&current.user.id,
		&[RequiredPermission::new(Resource::Todo, PermissionFlags::VIEW)],
		false,
	)
	.await?;

	let lists = state.todo_repo.list_lists(&workspace.id).await?;
	let lists: Vec<_> = if result.has_permission {
		lists
	} else {
		let visible = instance_grants(&result, Resource::Todo, PermissionFlags::VIEW);
		if visible.is_empty() {
			return Err(ServerError::Forbidden(
				"You do not have permission to view todo lists in this workspace".to_string(),
			));
		}
		lists
			.into_iter()
			.filter(|summary| visible.iter().any(|id| id == summary.list.id.as_str()))
			.collect()
	};

	Ok(Json(ListTodoListsResponse {
		success: true,
		todo_lists: lists.iter().map(TodoListResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/workspace/{id}/todo",
    params(
        ("id" = String, Path, description = "Workspace id or slug")
    ),
    request_body = CreateTodoListRequest,
    responses(
        (status = 200, description = "Todo list created", body = TodoListEnvelope),
        (status = 400, description = "Invalid display name or slug", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No workspace-wide TODO CREATE permission", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse),
        (status = 409, description = "Slug already in use in this workspace", body = ErrorResponse)
    ),
    tag = "todo-lists"
)]
/// POST /workspace/{id}/todo - Create a todo list.
#[tracing::instrument(skip(state, current, payload), fields(%id))]
pub async fn create_todo_list(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
	ApiJson(payload): ApiJson<CreateTodoListRequest>,
) -> Result<Json<TodoListEnvelope>, ServerError> {
	let workspace = load_workspace(&state, &id).await?;

	require_workspace_permission(
		state.membership_repo.as_ref(),
		&workspace.id,
		&current.user.id,
		&[RequiredPermission::new(Resource::Todo, PermissionFlags::CREATE)],
		false,
		"You do not have permission to create todo lists in this workspace",
	)
	.await?;

	let display_name = payload
		.display_name
		.map(|name| name.trim().to_string())
		.unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());
	validate_name("Display name", &display_name)?;

	let slug = match payload.slug {
		Some(slug) => {
			validate_slug(&slug)?;
			slug
		}
		None => {
			let repo = state.todo_repo.clone();
			let workspace_id = workspace.id.clone();
			generate_free_slug(|slug| {
				let repo = repo.clone();
				let workspace_id = workspace_id.clone();
				async move { Ok(repo.is_list_slug_taken(&workspace_id, &slug, None).await?) }
			})
			.await?
		}
	};

	let _lock = state
		.lock_store
		.acquire(&slug_lock_key(&workspace.id, &slug))
		.await?;
	ensure_slug_free(&state, &workspace.id, &slug, None).await?;

	let list = TodoList::new(workspace.id.clone(), display_name, slug);
	state.todo_repo.create_list(&list).await?;

	tracing::info!(workspace_id = %workspace.id, list_id = %list.id, "todo list created");

	Ok(Json(TodoListEnvelope {
		success: true,
		todo_list: TodoListResponse::from(&list).with_item_count(0),
	}))
}

#[utoipa::path(
    get,
    path = "/workspace/{id}/todo/{todo_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    responses(
        (status = 200, description = "The todo list with its item count", body = TodoListEnvelope),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO VIEW permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse)
    ),
    tag = "todo-lists"
)]
/// GET /workspace/{id}/todo/{todo_id} - One todo list.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id))]
pub async fn get_todo_list(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
) -> Result<Json<TodoListEnvelope>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;

	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::VIEW,
		"You do not have permission to view todo list",
	)
	.await?;

	let item_count = state.todo_repo.count_items(&list.id).await?;

	Ok(Json(TodoListEnvelope {
		success: true,
		todo_list: TodoListResponse::from(&list).with_item_count(item_count),
	}))
}

#[utoipa::path(
    put,
    path = "/workspace/{id}/todo/{todo_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    request_body = UpdateTodoListRequest,
    responses(
        (status = 200, description = "The updated todo list", body = UpdatedTodoListEnvelope),
        (status = 400, description = "Invalid display name or slug", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse),
        (status = 409, description = "Slug already in use in this workspace", body = ErrorResponse)
    ),
    tag = "todo-lists"
)]
/// PUT /workspace/{id}/todo/{todo_id} - Rename a todo list or change its slug.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id))]
pub async fn update_todo_list(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
	ApiJson(payload): ApiJson<UpdateTodoListRequest>,
) -> Result<Json<UpdatedTodoListEnvelope>, ServerError> {
	let (workspace, mut list) = load_list(&state, &id, &todo_id).await?;

	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		"You do not have permission to edit todo lists",
	)
	.await?;

	if let Some(display_name) = payload.display_name {
		let display_name = display_name.trim().to_string();
		validate_name("Display name", &display_name)?;
		list.display_name = display_name;
	}

	let _lock = match payload.slug {
		Some(slug) if slug != list.slug => {
			validate_slug(&slug)?;
			let lock = state
				.lock_store
				.acquire(&slug_lock_key(&workspace.id, &slug))
				.await?;
			ensure_slug_free(&state, &workspace.id, &slug, Some(&list.id)).await?;
			list.slug = slug;
			Some(lock)
		}
		_ => None,
	};

	list.updated_at = Utc::now();
	state.todo_repo.update_list(&list).await?;

	tracing::info!(list_id = %list.id, "todo list updated");

	Ok(Json(UpdatedTodoListEnvelope {
		success: true,
		list: TodoListResponse::from(&list),
	}))
}

#[utoipa::path(
    delete,
    path = "/workspace/{id}/todo/{todo_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    responses(
        (status = 200, description = "Todo list and its items and labels deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO DELETE permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse)
    ),
    tag = "todo-lists"
)]
/// DELETE /workspace/{id}/todo/{todo_id} - Delete a todo list.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id))]
pub async fn delete_todo_list(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;

	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::DELETE,
		"You do not have permission to delete todo lists",
	)
	.await?;

	if !state.todo_repo.delete_list(&list.id).await? {
		return Err(ServerError::NotFound("Todo list not found".to_string()));
	}

	tracing::info!(list_id = %list.id, "todo list deleted");
	Ok(Json(MessageResponse::ok("Todo list deleted successfully")))
}
