// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_todo_list_authorization() {
	let app = TestApp::new().await;
	let ws = app.workspace_path();
	let list_a = app.list_path(&app.fixtures.list_a);
	let list_b = app.list_path(&app.fixtures.list_b);

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_list_todo_lists",
			method: Method::GET,
			path: format!("{ws}/todo"),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "outsider_cannot_list_todo_lists",
			method: Method::GET,
			path: format!("{ws}/todo"),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_can_get_any_list",
			method: Method::GET,
			path: list_b.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_can_get_granted_list",
			method: Method::GET,
			path: list_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_cannot_get_other_list",
			method: Method::GET,
			path: list_b.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "outsider_cannot_get_list",
			method: Method::GET,
			path: list_a.clone(),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "missing_list_is_not_found",
			method: Method::GET,
			path: format!("{ws}/todo/no-such-list"),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_cannot_create_list",
			method: Method::POST,
			path: format!("{ws}/todo"),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "instance_create_grant_does_not_create_lists",
			method: Method::POST,
			path: format!("{ws}/todo"),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "owner_can_create_list",
			method: Method::POST,
			path: format!("{ws}/todo"),
			user: Some(app.fixtures.owner.clone()),
			body: Some(json!({"displayName": "Gamma", "slug": "list-gamma"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "viewer_cannot_edit_list",
			method: Method::PUT,
			path: list_a.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({"displayName": "Renamed"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_can_edit_granted_list",
			method: Method::PUT,
			path: list_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"displayName": "Renamed"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_cannot_edit_other_list",
			method: Method::PUT,
			path: list_b.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"displayName": "Renamed"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_cannot_delete_list",
			method: Method::DELETE,
			path: list_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "owner_can_delete_list",
			method: Method::DELETE,
			path: list_b.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "deleted_list_is_not_found",
			method: Method::GET,
			path: list_b.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn list_visibility_follows_grants() {
	let app = TestApp::new().await;
	let path = format!("{}/todo", app.workspace_path());

	let owner_view = json_body(app.get(&path, Some(&app.fixtures.owner)).await).await;
	assert_eq!(owner_view["todoLists"].as_array().unwrap().len(), 2);

	let viewer_view = json_body(app.get(&path, Some(&app.fixtures.viewer)).await).await;
	assert_eq!(viewer_view["todoLists"].as_array().unwrap().len(), 2);

	let editor_view = json_body(app.get(&path, Some(&app.fixtures.list_editor)).await).await;
	let lists = editor_view["todoLists"].as_array().unwrap();
	assert_eq!(lists.len(), 1);
	assert_eq!(lists[0]["id"], app.fixtures.list_a.id.as_str());
	assert_eq!(lists[0]["_count"]["items"], 1);
}

#[tokio::test]
async fn outsider_list_denial_message() {
	let app = TestApp::new().await;
	let response = app
		.get(
			&format!("{}/todo", app.workspace_path()),
			Some(&app.fixtures.outsider),
		)
		.await;
	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	let body = json_body(response).await;
	assert_eq!(body["success"], false);
	assert_eq!(
		body["message"],
		"You do not have permission to view todo lists in this workspace"
	);
}

#[tokio::test]
async fn list_is_addressable_by_slug() {
	let app = TestApp::new().await;
	let path = format!(
		"/workspace/{}/todo/{}",
		app.fixtures.workspace.slug, app.fixtures.list_a.slug
	);

	let body = json_body(app.get(&path, Some(&app.fixtures.owner)).await).await;
	assert_eq!(body["todoList"]["id"], app.fixtures.list_a.id.as_str());
	assert_eq!(body["todoList"]["_count"]["items"], 1);
}

#[tokio::test]
async fn list_slugs_are_unique_per_workspace() {
	let app = TestApp::new().await;
	let owner = &app.fixtures.owner;
	let ws = app.workspace_path();

	let response = app
		.post(&format!("{ws}/todo"), Some(owner), json!({"slug": "list-alpha"}))
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	let response = app
		.put(
			&app.list_path(&app.fixtures.list_b),
			Some(owner),
			json!({"slug": "list-alpha"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);

	// Keeping a list's own slug is not a conflict.
	let response = app
		.put(
			&app.list_path(&app.fixtures.list_a),
			Some(owner),
			json!({"slug": "list-alpha", "displayName": "Alpha Prime"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["list"]["displayName"], "Alpha Prime");

	// Another workspace may reuse the slug.
	app.post(
		"/workspace",
		Some(owner),
		json!({"slug": "second-space"}),
	)
	.await;
	let response = app
		.post(
			"/workspace/second-space/todo",
			Some(owner),
			json!({"slug": "list-alpha"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_list_defaults() {
	let app = TestApp::new().await;
	let body = json_body(
		app.post(
			&format!("{}/todo", app.workspace_path()),
			Some(&app.fixtures.owner),
			json!({}),
		)
		.await,
	)
	.await;

	assert_eq!(body["success"], true);
	assert_eq!(body["todoList"]["displayName"], "Untitled List");
	assert_eq!(body["todoList"]["workspaceId"], app.fixtures.workspace.id.as_str());
	let slug = body["todoList"]["slug"].as_str().unwrap();
	assert_eq!(slug.split('-').count(), 4);
}
