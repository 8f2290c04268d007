// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Wire types for the dromi HTTP API.
//!
//! Bodies are camelCase JSON. Every response carries `success`; failures add a
//! human-readable `message`. Counts follow the `_count: { ... }` shape clients
//! already consume.

pub mod auth;
pub mod common;
pub mod labels;
pub mod todos;
pub mod workspaces;

pub use auth::{MeResponse, SessionResponse, SigninRequest, SignupRequest, UserResponse};
pub use common::{ErrorResponse, HealthResponse, HealthStatus, MessageResponse};
pub use labels::{
	ApplyLabelValueRequest, CreateLabelRequest, ItemLabelValueEnvelope, ItemLabelValueResponse,
	LabelEnvelope, LabelResponse, LabelTypeApi, LabelValueInput, LabelValueResponse,
	ListLabelsResponse, ReplaceLabelValuesRequest, UpdateLabelRequest,
};
pub use todos::{
	CreateTodoItemRequest, CreateTodoListRequest, ItemCount, ListTodoItemsResponse,
	ListTodoListsResponse, TodoItemEnvelope, TodoItemResponse, TodoListEnvelope,
	TodoListResponse, TodoPriorityApi, TodoStateApi, UpdateTodoItemRequest,
	UpdateTodoListRequest, UpdatedTodoListEnvelope,
};
pub use workspaces::{
	CreateWorkspaceRequest, ListWorkspacesResponse, MemberCount, MemberResponse,
	WorkspaceEnvelope, WorkspaceResponse,
};
