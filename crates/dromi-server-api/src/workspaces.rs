// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use dromi_server_db::{MemberWithUser, Workspace, WorkspaceSummary};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::auth::UserResponse;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
	/// Defaults to `Untitled Workspace`.
	#[serde(default)]
	pub display_name: Option<String>,
	/// Lowercase words joined by `-`. A passphrase is generated when absent.
	#[serde(default)]
	pub slug: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MemberCount {
	pub members: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
	pub id: String,
	pub workspace_id: String,
	pub user_id: String,
	pub is_owner: bool,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	pub user: UserResponse,
}

impl From<&MemberWithUser> for MemberResponse {
	fn from(m: &MemberWithUser) -> Self {
		Self {
			id: m.member.id.to_string(),
			workspace_id: m.member.workspace_id.to_string(),
			user_id: m.member.user_id.to_string(),
			is_owner: m.member.is_owner,
			created_at: m.member.created_at,
			updated_at: m.member.updated_at,
			user: UserResponse::from(&m.user),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceResponse {
	pub id: String,
	pub display_name: String,
	pub slug: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
	/// Present only for callers allowed to edit the workspace.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub members: Option<Vec<MemberResponse>>,
	#[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
	pub count: Option<MemberCount>,
}

impl WorkspaceResponse {
	pub fn with_members(mut self, members: &[MemberWithUser]) -> Self {
		self.members = Some(members.iter().map(MemberResponse::from).collect());
		self
	}
}

impl From<&Workspace> for WorkspaceResponse {
	fn from(ws: &Workspace) -> Self {
		Self {
			id: ws.id.to_string(),
			display_name: ws.display_name.clone(),
			slug: ws.slug.clone(),
			created_at: ws.created_at,
			updated_at: ws.updated_at,
			members: None,
			count: None,
		}
	}
}

impl From<&WorkspaceSummary> for WorkspaceResponse {
	fn from(summary: &WorkspaceSummary) -> Self {
		Self {
			count: Some(MemberCount {
				members: summary.member_count,
			}),
			..Self::from(&summary.workspace)
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ListWorkspacesResponse {
	pub success: bool,
	pub workspaces: Vec<WorkspaceResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct WorkspaceEnvelope {
	pub success: bool,
	pub workspace: WorkspaceResponse,
}
