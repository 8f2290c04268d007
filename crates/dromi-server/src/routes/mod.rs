// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod item_labels;
pub mod todo_items;
pub mod todo_labels;
pub mod todo_lists;
pub mod workspaces;

use dromi_server_auth::{
	generate_passphrase, PermissionFlags, RequiredPermission, Resource, TodoItemId, UserId,
	PASSPHRASE_WORDS,
};
use dromi_server_db::{TodoItem, TodoList, Workspace};

use crate::{api::AppState, authz::require_workspace_permission, error::ServerError};

/// Generated slugs that collide are retried this many times before giving up.
const SLUG_ATTEMPTS: usize = 5;

/// Resolve `{id}` (workspace id or slug).
pub(crate) async fn load_workspace(
	state: &AppState,
	id_or_slug: &str,
) -> Result<Workspace, ServerError> {
	state
		.workspace_repo
		.get_workspace(id_or_slug)
		.await?
		.ok_or_else(|| ServerError::NotFound("Workspace not found".to_string()))
}

/// Resolve `{id}` and `{todo_id}` (list id or slug within the workspace).
pub(crate) async fn load_list(
	state: &AppState,
	workspace_id_or_slug: &str,
	todo_id: &str,
) -> Result<(Workspace, TodoList), ServerError> {
	let workspace = load_workspace(state, workspace_id_or_slug).await?;
	let list = state
		.todo_repo
		.get_list(&workspace.id, todo_id)
		.await?
		.ok_or_else(|| ServerError::NotFound("Todo list not found".to_string()))?;
	Ok((workspace, list))
}

/// An item of `list`; items of other lists are not found.
pub(crate) async fn load_item(
	state: &AppState,
	list: &TodoList,
	item_id: &str,
) -> Result<TodoItem, ServerError> {
	state
		.todo_repo
		.get_item(&list.id, &TodoItemId::new(item_id))
		.await?
		.ok_or_else(|| ServerError::NotFound("Todo item not found".to_string()))
}

/// Require TODO `flag` on `list`, accepting workspace-wide grants too.
pub(crate) async fn require_list_permission(
	state: &AppState,
	list: &TodoList,
	user_id: &UserId,
	flag: PermissionFlags,
	message: &str,
) -> Result<(), ServerError> {
	require_workspace_permission(
		state.membership_repo.as_ref(),
		&list.workspace_id,
		user_id,
		&[RequiredPermission::new(Resource::Todo, flag).on(list.id.as_str())],
		false,
		message,
	)
	.await?;
	Ok(())
}

/// Generate a passphrase slug for which `is_taken` is false.
pub(crate) async fn generate_free_slug<F, Fut>(mut is_taken: F) -> Result<String, ServerError>
where
	F: FnMut(String) -> Fut,
	Fut: std::future::Future<Output = Result<bool, ServerError>>,
{
	for _ in 0..SLUG_ATTEMPTS {
		let slug = generate_passphrase(PASSPHRASE_WORDS);
		if !is_taken(slug.clone()).await? {
			return Ok(slug);
		}
		tracing::debug!(%slug, "generated slug already taken, retrying");
	}
	Err(ServerError::Internal(
		"could not generate a free slug".to_string(),
	))
}
