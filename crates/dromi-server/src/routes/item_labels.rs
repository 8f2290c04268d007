// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attaching label values to todo items.

use axum::{
	extract::{Path, State},
	Json,
};
use dromi_server_api::{
	ApplyLabelValueRequest, ErrorResponse, ItemLabelValueEnvelope, ItemLabelValueResponse,
	MessageResponse,
};
use dromi_server_auth::{PermissionFlags, TodoLabelValueId};
use dromi_server_db::DbError;

use crate::{
	api::AppState,
	auth_middleware::RequireAuth,
	error::ServerError,
	extract::ApiJson,
	routes::{load_item, load_list, require_list_permission},
};

const EDIT_DENIED: &str = "You don't have permission to edit this todo";

fn value_not_found() -> ServerError {
	ServerError::NotFound("Todo label value not found".to_string())
}

#[utoipa::path(
    post,
    path = "/workspace/{id}/todo/{todo_id}/items/{item_id}/labels",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("item_id" = String, Path, description = "Todo item id")
    ),
    request_body = ApplyLabelValueRequest,
    responses(
        (status = 200, description = "Label value attached", body = ItemLabelValueEnvelope),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Item or label value not found", body = ErrorResponse),
        (status = 409, description = "Label value already applied", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// POST /workspace/{id}/todo/{todo_id}/items/{item_id}/labels - Attach a label value.
///
/// The value must belong to a label of the same list. Attaching a value of a
/// SELECT label replaces the item's previous value of that label.
#[tracing::instrument(skip(state, current, payload), fields(%id, %todo_id, %item_id))]
pub async fn apply_label_value(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, item_id)): Path<(String, String, String)>,
	ApiJson(payload): ApiJson<ApplyLabelValueRequest>,
) -> Result<Json<ItemLabelValueEnvelope>, ServerError> {
	let (_workspace, list) = load_list(&state, &id, &todo_id).await?;
	require_list_permission(
		&state,
		&list,
		&current.user.id,
		PermissionFlags::EDIT,
		EDIT_DENIED,
	)
	.await?;
	let item = load_item(&state, &list, &item_id).await?;

	let value_id = TodoLabelValueId::new(payload.label_value_id);
	let (label, value) = state
		.label_repo
		.get_label_value_in_list(&list.id, &value_id)
		.await?
		.ok_or_else(value_not_found)?;

	let applied = match state
		.label_repo
		.apply_label_value(&item.id, &label, &value)
		.await
	{
		Ok(applied) => applied,
		Err(DbError::Conflict(_)) => {
			return Err(ServerError::Conflict("Label value already applied".to_string()));
		}
		Err(e) => return Err(e.into()),
	};

	tracing::info!(item_id = %item.id, value_id = %value.id, label_id = %label.id, "label value applied");

	Ok(Json(ItemLabelValueEnvelope {
		success: true,
		label_value: ItemLabelValueResponse::from(&applied),
	}))
}

#[utoipa::path(
    delete,
    path = "/workspace/{id}/todo/{todo_id}/items/{item_id}/labels/{label_value_id}",
    params(
        ("id" = String, Path, description = "Workspace id or slug"),
        ("todo_id" = String, Path, description = "Todo list id or slug"),
        ("item_id" = String, Path, description = "Todo item id"),
        ("label_value_id" = String, Path, description = "Label value id")
    ),
    responses(
        (status = 200, description = "Label value detached", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "No TODO EDIT permission on the list", body = ErrorResponse),
        (status = 404, description = "Item not found, or value not attached", body = ErrorResponse)
    ),
    tag = "labels"
)]
/// DELETE /workspace/{id}/todo/{todo_id}/items/{item_id}/labels/{label_value_id} - Detach a label value.
#[tracing::instrument(skip(state, current), fields(%id, %todo_id, %item_id, %label_value_id))]
pub async fn remove_label_value(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
	Path((id, todo_id, item_id, label_value_id)): Path<(String, String, String, String)>,
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
	let item = load_item(&state, &list, &item_id).await?;

	if !state
		.label_repo
		.remove_label_value(&item.id, &TodoLabelValueId::new(label_value_id.as_str()))
		.await?
	{
		return Err(value_not_found());
	}

	Ok(Json(MessageResponse::ok("Label value removed successfully")))
}
