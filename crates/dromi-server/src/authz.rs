// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workspace permission checks for handlers.
//!
//! Loads the caller's membership snapshot and runs the pure evaluator from
//! `dromi-server-auth` over it. A denial is a value, not an error; only
//! [`require_workspace_permission`] turns it into a 403.

use dromi_server_auth::{
	evaluate_permissions, PermissionFlags, PermissionResult, RequiredPermission, Resource, UserId,
	WorkspaceId,
};
use dromi_server_db::MembershipStore;
use tracing::instrument;

use crate::error::ServerError;

/// Evaluate `required` for `user_id` in `workspace_id`.
///
/// With `require_owner`, only an owner membership counts.
#[instrument(skip(store, required), fields(%workspace_id, %user_id))]
pub async fn check_workspace_permission(
	store: &dyn MembershipStore,
	workspace_id: &WorkspaceId,
	user_id: &UserId,
	required: &[RequiredPermission],
	require_owner: bool,
) -> Result<PermissionResult, ServerError> {
	let snapshot = store
		.get_member_snapshot(workspace_id, user_id, require_owner)
		.await?;
	let result = evaluate_permissions(snapshot.as_ref(), required, require_owner);

	if !result.has_permission {
		tracing::debug!(
			member = snapshot.is_some(),
			required = ?required,
			"permission denied"
		);
	}

	Ok(result)
}

/// [`check_workspace_permission`], with a denial mapped to 403 `message`.
pub async fn require_workspace_permission(
	store: &dyn MembershipStore,
	workspace_id: &WorkspaceId,
	user_id: &UserId,
	required: &[RequiredPermission],
	require_owner: bool,
	message: &str,
) -> Result<PermissionResult, ServerError> {
	let result =
		check_workspace_permission(store, workspace_id, user_id, required, require_owner).await?;
	if result.has_permission {
		Ok(result)
	} else {
		Err(ServerError::Forbidden(message.to_string()))
	}
}

/// Ids of `resource` instances that `result` grants `flag` on individually.
pub fn instance_grants(
	result: &PermissionResult,
	resource: Resource,
	flag: PermissionFlags,
) -> Vec<String> {
	result
		.flags
		.iter()
		.filter(|g| g.resource == resource && g.flags.intersects(flag))
		.filter_map(|g| g.resource_id.clone())
		.collect()
}
