// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! OpenAPI documentation for dromi-server.
//!
//! Generated from the handler annotations with utoipa. Served as Swagger UI at
//! `/docs` and as raw JSON at `/docs/openapi.json`.

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dromi API",
        version = "1.0.0",
        description = "Workspaces, todo lists, items and labels with cookie sessions and resource-scoped permissions.",
        license(name = "Proprietary")
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    tags(
        (name = "health", description = "Liveness and database health"),
        (name = "auth", description = "Signup, signin and session management"),
        (name = "workspaces", description = "Workspaces and their members"),
        (name = "todo-lists", description = "Todo lists within a workspace"),
        (name = "todo-items", description = "Items of a todo list"),
        (name = "labels", description = "Labels, label values and their attachment to items")
    ),
    paths(
        // Health
        crate::routes::health::root,
        crate::routes::health::health_check,
        // Auth
        crate::routes::auth::signup,
        crate::routes::auth::signin,
        crate::routes::auth::me,
        crate::routes::auth::signout,
        // Workspaces
        crate::routes::workspaces::list_workspaces,
        crate::routes::workspaces::create_workspace,
        crate::routes::workspaces::get_workspace,
        crate::routes::workspaces::delete_workspace,
        // Todo lists
        crate::routes::todo_lists::list_todo_lists,
        crate::routes::todo_lists::create_todo_list,
        crate::routes::todo_lists::get_todo_list,
        crate::routes::todo_lists::update_todo_list,
        crate::routes::todo_lists::delete_todo_list,
        // Todo items
        crate::routes::todo_items::list_todo_items,
        crate::routes::todo_items::create_todo_item,
        crate::routes::todo_items::update_todo_item,
        crate::routes::todo_items::delete_todo_item,
        // Labels
        crate::routes::todo_labels::list_labels,
        crate::routes::todo_labels::create_label,
        crate::routes::todo_labels::update_label,
        crate::routes::todo_labels::delete_label,
        crate::routes::todo_labels::replace_label_values,
        crate::routes::item_labels::apply_label_value,
        crate::routes::item_labels::remove_label_value,
    ),
    components(schemas(
        dromi_server_api::MessageResponse,
        dromi_server_api::ErrorResponse,
        dromi_server_api::HealthResponse,
        dromi_server_api::HealthStatus,
        dromi_server_api::SignupRequest,
        dromi_server_api::SigninRequest,
        dromi_server_api::UserResponse,
        dromi_server_api::SessionResponse,
        dromi_server_api::MeResponse,
        dromi_server_api::CreateWorkspaceRequest,
        dromi_server_api::MemberCount,
        dromi_server_api::MemberResponse,
        dromi_server_api::WorkspaceResponse,
        dromi_server_api::ListWorkspacesResponse,
        dromi_server_api::WorkspaceEnvelope,
        dromi_server_api::CreateTodoListRequest,
        dromi_server_api::UpdateTodoListRequest,
        dromi_server_api::ItemCount,
        dromi_server_api::TodoListResponse,
        dromi_server_api::ListTodoListsResponse,
        dromi_server_api::TodoListEnvelope,
        dromi_server_api::UpdatedTodoListEnvelope,
        dromi_server_api::TodoPriorityApi,
        dromi_server_api::TodoStateApi,
        dromi_server_api::CreateTodoItemRequest,
        dromi_server_api::UpdateTodoItemRequest,
        dromi_server_api::TodoItemResponse,
        dromi_server_api::ListTodoItemsResponse,
        dromi_server_api::TodoItemEnvelope,
        dromi_server_api::LabelTypeApi,
        dromi_server_api::LabelValueInput,
        dromi_server_api::CreateLabelRequest,
        dromi_server_api::UpdateLabelRequest,
        dromi_server_api::ReplaceLabelValuesRequest,
        dromi_server_api::LabelValueResponse,
        dromi_server_api::LabelResponse,
        dromi_server_api::ListLabelsResponse,
        dromi_server_api::LabelEnvelope,
        dromi_server_api::ApplyLabelValueRequest,
        dromi_server_api::ItemLabelValueResponse,
        dromi_server_api::ItemLabelValueEnvelope,
    ))
)]
pub struct ApiDoc;
