// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace HTTP handlers.
//!
//! `{id}` accepts either the workspace id or its slug.

use axum::{
	extract::{Path, State},
	Json,
};
use dromi_server_api::{
	CreateWorkspaceRequest, ErrorResponse, ListWorkspacesResponse, MessageResponse,
	WorkspaceEnvelope, WorkspaceResponse,
};
use dromi_server_auth::{PermissionFlags, RequiredPermission, Resource};
use dromi_server_db::{DbError, Workspace};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	authz::{check_workspace_permission, require_workspace_permission},
	error::ServerError,
	extract::ApiJson,
	routes::{generate_free_slug, load_workspace},
	validation::{validate_name, validate_slug},
};

const DEFAULT_DISPLAY_NAME: &str = "Untitled Workspace";

#[utoipa::path(
    get,
    path = "/workspace",
    responses(
        (status = 200, description = "Workspaces the caller belongs to", body = ListWorkspacesResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
/// GET /workspace - Every workspace the caller is a member of, with member counts.
#[tracing::instrument(skip_all, fields(user_id = tracing::field::Empty))]
pub async fn list_workspaces(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
) -> Result<Json<ListWorkspacesResponse>, ServerError> {
	tracing::Span::current().record("user_id", tracing::field::display(&current.user.id));

	let summaries = state
		.workspace_repo
		.list_workspaces_for_user(&current.user.id)
		.await?;

	Ok(Json(ListWorkspacesResponse {
		success: true,
		workspaces: summaries.iter().map(WorkspaceResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/workspace",
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 200, description = "Workspace created with the caller as owner", body = WorkspaceEnvelope),
        (status = 400, description = "Invalid display name or slug", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 409, description = "Slug already in use", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
/// POST /workspace - Create a workspace owned by the caller.
///
/// The slug defaults to a generated passphrase. The caller becomes the owner
/// with every flag on every resource kind.
#[tracing::instrument(skip(state, current, payload))]
pub async fn create_workspace(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	ApiJson(payload): ApiJson<CreateWorkspaceRequest>,
) -> Result<Json<WorkspaceEnvelope>, ServerError> {
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
			let repo = state.workspace_repo.clone();
			generate_free_slug(|slug| {
				let repo = repo.clone();
				async move { Ok(repo.is_slug_taken(&slug).await?) }
			})
			.await?
		}
	};

	let _lock = state
		.lock_store
		.acquire(&format!("workspace-slug:{slug}"))
		.await?;

	if state.workspace_repo.is_slug_taken(&slug).await? {
		return Err(ServerError::Conflict("Slug already in use".to_string()));
	}

	let workspace = Workspace::new(display_name, slug);
	match state
		.workspace_repo
		.create_workspace_with_owner(&workspace, &current.user.id)
		.await
	{
		Ok(_) => {}
		Err(DbError::Conflict(_)) => {
			return Err(ServerError::Conflict("Slug already in use".to_string()));
		}
		Err(e) => return Err(e.into()),
	}

	tracing::info!(
		workspace_id = %workspace.id,
		slug = %workspace.slug,
		owner_id = %current.user.id,
		"workspace created"
	);

	Ok(Json(WorkspaceEnvelope {
		success: true,
		workspace: WorkspaceResponse::from(&workspace),
	}))
}

#[utoipa::path(
    get,
    path = "/workspace/{id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug")
    ),
    responses(
        (status = 200, description = "The workspace, with members for editors", body = WorkspaceEnvelope),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No WORKSPACE VIEW permission", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
/// GET /workspace/{id} - One workspace.
///
/// Callers that also hold WORKSPACE EDIT see the member list.
#[tracing::instrument(skip(state, current), fields(%id))]
pub async fn get_workspace(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<WorkspaceEnvelope>, ServerError> {
	let workspace = load_workspace(&state, &id).await?;

	require_workspace_permission(
		state.membership_repo.as_ref(),
		&workspace.id,
		&current.user.id,
		&[RequiredPermission::new(
			Resource::Workspace,
			PermissionFlags::VIEW,
		)],
		false,
		"You do not have permission to view this workspace",
	)
	.await?;

	let can_edit = check_workspace_permission(
		state.membership_repo.as_ref(),
		&workspace.id,
		&current.user.id,
		&[RequiredPermission::new(
			Resource::Workspace,
			PermissionFlags::EDIT,
		)],
		false,
	)
	.await?
	.has_permission;

	let mut response = WorkspaceResponse::from(&workspace);
	if can_edit {
		let members = state.membership_repo.list_members(&workspace.id).await?;
		response = response.with_members(&members);
	}

	Ok(Json(WorkspaceEnvelope {
		success: true,
		workspace: response,
	}))
}

#[utoipa::path(
    delete,
    path = "/workspace/{id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug")
    ),
    responses(
        (status = 200, description = "Workspace and everything in it deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not the owner", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse)
    ),
    tag = "workspaces"
)]
/// DELETE /workspace/{id} - Delete a workspace. Owner only.
#[tracing::instrument(skip(state, current), fields(%id))]
pub async fn delete_workspace(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ServerError> {
	let workspace = load_workspace(&state, &id).await?;

	require_workspace_permission(
		state.membership_repo.as_ref(),
		&workspace.id,
		&current.user.id,
		&[RequiredPermission::new(
			Resource::Workspace,
			PermissionFlags::DELETE,
		)],
		true,
		"You don't have permission to perform this action",
	)
	.await?;

	if !state.workspace_repo.delete_workspace(&workspace.id).await? {
		return Err(ServerError::NotFound("Workspace not found".to_string()));
	}

	tracing::info!(workspace_id = %workspace.id, "workspace deleted");
	Ok(Json(MessageResponse::ok("Workspace deleted successfully")))
}
