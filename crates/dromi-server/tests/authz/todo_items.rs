// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_todo_item_authorization() {
	let app = TestApp::new().await;
	let items_a = format!("{}/items", app.list_path(&app.fixtures.list_a));
	let items_b = format!("{}/items", app.list_path(&app.fixtures.list_b));
	let item_a = format!("{items_a}/{}", app.fixtures.item_a.id);
	let item_b = format!("{items_b}/{}", app.fixtures.item_b.id);

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_list_items",
			method: Method::GET,
			path: items_a.clone(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "viewer_can_list_items",
			method: Method::GET,
			path: items_b.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_cannot_list_other_items",
			method: Method::GET,
			path: items_b.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "outsider_cannot_list_items",
			method: Method::GET,
			path: items_a.clone(),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_cannot_create_item",
			method: Method::POST,
			path: items_a.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({"title": "Nope"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_can_create_item_in_granted_list",
			method: Method::POST,
			path: items_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"title": "Draft the outline"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "list_editor_cannot_create_item_in_other_list",
			method: Method::POST,
			path: items_b.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"title": "Nope"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "viewer_cannot_edit_item",
			method: Method::PUT,
			path: item_b.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: Some(json!({"title": "Nope"})),
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "list_editor_can_edit_item",
			method: Method::PUT,
			path: item_a.clone(),
			user: Some(app.fixtures.list_editor.clone()),
			body: Some(json!({"priority": "HIGH"})),
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "item_of_other_list_is_not_found",
			method: Method::PUT,
			path: format!("{items_a}/{}", app.fixtures.item_b.id),
			user: Some(app.fixtures.owner.clone()),
			body: Some(json!({"title": "Moved?"})),
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "missing_item_is_not_found",
			method: Method::DELETE,
			path: format!("{items_a}/no-such-item"),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_cannot_delete_item",
			method: Method::DELETE,
			path: item_b.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "owner_can_delete_item",
			method: Method::DELETE,
			path: item_b.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn create_item_records_creator_and_defaults() {
	let app = TestApp::new().await;
	let path = format!("{}/items", app.list_path(&app.fixtures.list_a));

	let response = app
		.post(
			&path,
			Some(&app.fixtures.list_editor),
			json!({
				"title": "  Ship it  ",
				"dueDate": "2030-01-02T03:04:05Z",
				"assigneeId": app.fixtures.viewer.user.id.as_str(),
			}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let item = json_body(response).await["item"].clone();

	assert_eq!(item["title"], "Ship it");
	assert_eq!(item["priority"], "NONE");
	assert_eq!(item["state"], "OPEN");
	assert_eq!(item["closedAt"], serde_json::Value::Null);
	assert_eq!(item["listId"], app.fixtures.list_a.id.as_str());
	assert_eq!(item["createdById"], app.fixtures.list_editor.user.id.as_str());
	assert_eq!(item["assigneeId"], app.fixtures.viewer.user.id.as_str());
	assert!(item["dueDate"].as_str().unwrap().starts_with("2030-01-02T03:04:05"));
}

#[tokio::test]
async fn assignee_must_be_a_member() {
	let app = TestApp::new().await;
	let path = format!("{}/items", app.list_path(&app.fixtures.list_a));

	let response = app
		.post(
			&path,
			Some(&app.fixtures.owner),
			json!({"title": "Delegate", "assigneeId": app.fixtures.outsider.user.id.as_str()}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(
		json_body(response).await["message"],
		"Assignee must be a member of this workspace"
	);
}

#[tokio::test]
async fn title_is_required() {
	let app = TestApp::new().await;
	let path = format!("{}/items", app.list_path(&app.fixtures.list_a));

	let response = app
		.post(&path, Some(&app.fixtures.owner), json!({"title": "   "}))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let response = app
		.post(&path, Some(&app.fixtures.owner), json!({"description": "no title"}))
		.await;
	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
	assert_eq!(json_body(response).await["success"], false);
}

#[tokio::test]
async fn state_changes_track_closed_at() {
	let app = TestApp::new().await;
	let path = format!(
		"{}/items/{}",
		app.list_path(&app.fixtures.list_a),
		app.fixtures.item_a.id
	);
	let owner = Some(&app.fixtures.owner);

	let done = json_body(app.put(&path, owner, json!({"state": "DONE"})).await).await;
	assert_eq!(done["item"]["state"], "DONE");
	let closed_at = done["item"]["closedAt"].clone();
	assert!(closed_at.is_string());

	let cancelled = json_body(app.put(&path, owner, json!({"state": "CANCELLED"})).await).await;
	assert_eq!(cancelled["item"]["closedAt"], closed_at);

	let reopened = json_body(app.put(&path, owner, json!({"state": "IN_PROGRESS"})).await).await;
	assert_eq!(reopened["item"]["state"], "IN_PROGRESS");
	assert_eq!(reopened["item"]["closedAt"], serde_json::Value::Null);
}

#[tokio::test]
async fn update_distinguishes_null_from_absent() {
	let app = TestApp::new().await;
	let path = format!(
		"{}/items/{}",
		app.list_path(&app.fixtures.list_a),
		app.fixtures.item_a.id
	);
	let owner = Some(&app.fixtures.owner);

	let body = json_body(
		app.put(
			&path,
			owner,
			json!({"description": "details", "assigneeId": app.fixtures.viewer.user.id.as_str()}),
		)
		.await,
	)
	.await;
	assert_eq!(body["item"]["description"], "details");

	let body = json_body(app.put(&path, owner, json!({"title": "Renamed"})).await).await;
	assert_eq!(body["item"]["title"], "Renamed");
	assert_eq!(body["item"]["description"], "details");
	assert_eq!(body["item"]["assigneeId"], app.fixtures.viewer.user.id.as_str());

	let body = json_body(
		app.put(&path, owner, json!({"description": null, "assigneeId": null}))
			.await,
	)
	.await;
	assert_eq!(body["item"]["description"], serde_json::Value::Null);
	assert_eq!(body["item"]["assigneeId"], serde_json::Value::Null);
	assert_eq!(body["item"]["title"], "Renamed");

	let listed = json_body(
		app.get(&format!("{}/items", app.list_path(&app.fixtures.list_a)), owner)
			.await,
	)
	.await;
	assert_eq!(listed["items"][0]["title"], "Renamed");
}
