// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Todo label HTTP handlers.
//!
//! Labels belong to one list. SELECT and MULTI_SELECT labels carry an ordered
//! set of values; other label types carry none.

use axum::{
	extract::{Path, State},
	Json,
};
use chrono::Utc;
use dromi_server_api::{
	CreateLabelRequest, ErrorResponse, LabelEnvelope, LabelResponse, LabelTypeApi,
	LabelValueInput, ListLabelsResponse, MessageResponse, ReplaceLabelValuesRequest,
	UpdateLabelRequest,
};
use dromi_server_auth::{PermissionFlags, TodoLabelId};
use dromi_server_db::{LabelType, LabelWithValues, NewLabelValue, TodoLabel, TodoList};

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	extract::ApiJson,
	routes::{load_list, require_list_permission},
	validation::{validate_color, validate_name},
};

const VIEW_DENIED: &str = "You do not have permission to view todo lists";
const EDIT_DENIED: &str = "You do not have permission to edit todo lists";
const VALUES_REQUIRED: &str = "SELECT type labels must have at least one value";
const VALUES_NOT_ALLOWED: &str = "Can only add values to SELECT or MULTI_SELECT labels";

/// Validate `inputs` for a label of `label_type`.
fn label_values(
	label_type: LabelType,
	inputs: Vec<LabelValueInput>,
) -> Result<Vec<NewLabelValue>, ServerError> {
	if !label_type.has_values() {
		if inputs.is_empty() {
			return Ok(Vec::new());
		}
		return Err(ServerError::BadRequest(VALUES_NOT_ALLOWED.to_string()));
	}
	if inputs.is_empty() {
		return Err(ServerError::BadRequest(VALUES_REQUIRED.to_string()));
	}

	inputs
		.into_iter()
		.map(|input| {
			let name = input.name.trim().to_string();
			validate_name("Value name", &name)?;
			validate_color(&input.color)?;
			Ok(NewLabelValue {
				name,
				..input.into()
			})
		})
		.collect()
}

async fn load_label(
	state: &AppState,
	list: &TodoList,
	label_id: &str,
) -> Result<LabelWithValues, ServerError> {
	state
		.label_repo
		.get_label(&list.id, &TodoLabelId::new(label_id))
		.await?
		.ok_or_else(|| ServerError::NotFound("Todo label not found".to_string()))
}

#[utoipa::path(
    get,
    path = "/workspace/{id}/todo/{todo_id}/labels",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    responses(
        (status = 200, description = "Labels of the list with their values", body = ListLabelsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO VIEW permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// GET /workspace/{id}/todo/{todo_id}/labels - Labels of a list.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id))]
pub async fn list_labels(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
) -> Result<Json<ListLabelsResponse>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::VIEW,
		VIEW_DENIED,
	)
	.await?;

	let labels = state.label_repo.list_labels(&list.id).await?;

	Ok(Json(ListLabelsResponse {
		success: true,
		labels: labels.iter().map(LabelResponse::from).collect(),
	}))
}

#[utoipa::path(
    post,
    path = "/workspace/{id}/todo/{todo_id}/labels",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug")
    ),
    request_body = CreateLabelRequest,
    responses(
        (status = 200, description = "Label created", body = LabelEnvelope),
        (status = 400, description = "Invalid name, type or values", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace or todo list not found", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// POST /workspace/{id}/todo/{todo_id}/labels - Create a label.
///
/// The type defaults to SELECT. Values are stored in request order.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id))]
pub async fn create_label(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id)): Path<(String, String)>,
	ApiJson(payload): ApiJson<CreateLabelRequest>,
) -> Result<Json<LabelEnvelope>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		EDIT_DENIED,
	)
	.await?;

	let name = payload.name.trim().to_string();
	validate_name("Name", &name)?;
	let label_type: LabelType = payload.label_type.unwrap_or(LabelTypeApi::Select).into();
	let values = label_values(label_type, payload.values.unwrap_or_default())?;

	let mut label = TodoLabel::new(list.id.clone(), name, label_type);
	label.description = payload.description;

	let created = state.label_repo.create_label(&label, &values).await?;
	tracing::info!(
		list_id = %list.id,
		label_id = %label.id,
		label_type = label_type.as_str(),
		values = created.values.len(),
		"todo label created"
	);

	Ok(Json(LabelEnvelope {
		success: true,
		label: LabelResponse::from(&created),
	}))
}

#[utoipa::path(
    put,
    path = "/workspace/{id}/todo/{todo_id}/labels/{label_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("label_id" = String, Path, description = "Label id")
    ),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "The updated label", body = LabelEnvelope),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace, list or label not found", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// PUT /workspace/{id}/todo/{todo_id}/labels/{label_id} - Rename or redescribe a label.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id, %label_id))]
pub async fn update_label(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, label_id)): Path<(String, String, String)>,
	ApiJson(payload): ApiJson<UpdateLabelRequest>,
) -> Result<Json<LabelEnvelope>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		EDIT_DENIED,
	)
	.await?;

	let mut label = load_label(&state, &list, &label_id).await?;

	if let Some(name) = payload.name {
		let name = name.trim().to_string();
		validate_name("Name", &name)?;
		label.label.name = name;
	}
	if let Some(description) = payload.description {
		label.label.description = Some(description);
	}
	label.label.updated_at = Utc::now();

	state.label_repo.update_label(&label.label).await?;

	Ok(Json(LabelEnvelope {
		success: true,
		label: LabelResponse::from(&label),
	}))
}

#[utoipa::path(
    delete,
    path = "/workspace/{id}/todo/{todo_id}/labels/{label_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("label_id" = String, Path, description = "Label id")
    ),
    responses(
        (status = 200, description = "Label and its values deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace, list or label not found", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// DELETE /workspace/{id}/todo/{todo_id}/labels/{label_id} - Delete a label.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id, %label_id))]
pub async fn delete_label(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, label_id)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		EDIT_DENIED,
	)
	.await?;

	let label = load_label(&state, &list, &label_id).await?;
	state.label_repo.delete_label(&label.label.id).await?;

	tracing::info!(label_id = %label.label.id, "todo label deleted");
	Ok(Json(MessageResponse::ok("Todo label deleted successfully")))
}

#[utoipa::path(
    put,
    path = "/workspace/{id}/todo/{todo_id}/labels/{label_id}/values",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("label_id" = String, Path, description = "Label id")
    ),
    request_body = ReplaceLabelValuesRequest,
    responses(
        (status = 200, description = "The label with its new values", body = LabelEnvelope),
        (status = 400, description = "Label type has no values, or values are invalid", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Workspace, list or label not found", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// PUT /workspace/{id}/todo/{todo_id}/labels/{label_id}/values - Replace every value of a label.
///
/// Positions are renumbered from zero in request order.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id, %label_id))]
pub async fn replace_label_values(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, label_id)): Path<(String, String, String)>,
	ApiJson(payload): ApiJson<ReplaceLabelValuesRequest>,
) -> Result<Json<LabelEnvelope>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		EDIT_DENIED,
	)
	.await?;

	let mut label = load_label(&state, &list, &label_id).await?;
	if !label.label.label_type.has_values() {
		return Err(ServerError::BadRequest(VALUES_NOT_ALLOWED.to_string()));
	}
	let values = label_values(label.label.label_type, payload.values)?;

	label.values = state
		.label_repo
		.replace_label_values(&label.label.id, &values)
		.await?;
	tracing::info!(label_id = %label.label.id, values = label.values.len(), "label values replaced");

	Ok(Json(LabelEnvelope {
		success: true,
		label: LabelResponse::from(&label),
	}))
}
