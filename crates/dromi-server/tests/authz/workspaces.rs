// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::http::{Method, StatusCode};
use serde_json::json;

use super::support::{json_body, run_authz_cases, AuthzCase, TestApp};

#[tokio::test]
async fn test_workspace_authorization() {
	let app = TestApp::new().await;
	let ws = app.workspace_path();
	let by_slug = format!("/workspace/{}", app.fixtures.workspace.slug);

	let cases = vec![
		AuthzCase {
			name: "anonymous_cannot_list_workspaces",
			method: Method::GET,
			path: "/workspace".to_string(),
			user: None,
			body: None,
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "anonymous_cannot_create_workspace",
			method: Method::POST,
			path: "/workspace".to_string(),
			user: None,
			body: Some(json!({})),
			expected_status: StatusCode::UNAUTHORIZED,
		},
		AuthzCase {
			name: "outsider_can_list_own_workspaces",
			method: Method::GET,
			path: "/workspace".to_string(),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "owner_can_get_workspace",
			method: Method::GET,
			path: ws.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "owner_can_get_workspace_by_slug",
			method: Method::GET,
			path: by_slug.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "viewer_can_get_workspace",
			method: Method::GET,
			path: ws.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "outsider_cannot_get_workspace",
			method: Method::GET,
			path: ws.clone(),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "missing_workspace_is_not_found",
			method: Method::GET,
			path: "/workspace/no-such-workspace".to_string(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
		AuthzCase {
			name: "viewer_cannot_delete_workspace",
			method: Method::DELETE,
			path: ws.clone(),
			user: Some(app.fixtures.viewer.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "outsider_cannot_delete_workspace",
			method: Method::DELETE,
			path: ws.clone(),
			user: Some(app.fixtures.outsider.clone()),
			body: None,
			expected_status: StatusCode::FORBIDDEN,
		},
		AuthzCase {
			name: "owner_can_delete_workspace",
			method: Method::DELETE,
			path: ws.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::OK,
		},
		AuthzCase {
			name: "deleted_workspace_is_not_found",
			method: Method::GET,
			path: ws.clone(),
			user: Some(app.fixtures.owner.clone()),
			body: None,
			expected_status: StatusCode::NOT_FOUND,
		},
	];

	run_authz_cases(&app, &cases).await;
}

#[tokio::test]
async fn members_are_listed_only_for_editors() {
	let app = TestApp::new().await;
	let ws = app.workspace_path();

	let owner_view = json_body(app.get(&ws, Some(&app.fixtures.owner)).await).await;
	let members = owner_view["workspace"]["members"].as_array().unwrap();
	assert_eq!(members.len(), 3);
	assert!(members.iter().all(|m| m["user"].get("passwordHash").is_none()));
	assert!(members
		.iter()
		.any(|m| m["isOwner"] == true && m["userId"] == app.fixtures.owner.user.id.as_str()));

	let viewer_view = json_body(app.get(&ws, Some(&app.fixtures.viewer)).await).await;
	assert_eq!(viewer_view["success"], true);
	assert!(viewer_view["workspace"].get("members").is_none());
}

#[tokio::test]
async fn create_workspace_makes_caller_owner() {
	let app = TestApp::new().await;
	let outsider = &app.fixtures.outsider;

	let response = app
		.post(
			"/workspace",
			Some(outsider),
			json!({"displayName": "Side Project", "slug": "side-project"}),
		)
		.await;
	assert_eq!(response.status(), StatusCode::OK);
	let body = json_body(response).await;
	assert_eq!(body["workspace"]["slug"], "side-project");
	assert_eq!(body["workspace"]["displayName"], "Side Project");

	let listed = json_body(app.get("/workspace", Some(outsider)).await).await;
	let workspaces = listed["workspaces"].as_array().unwrap();
	assert_eq!(workspaces.len(), 1);
	assert_eq!(workspaces[0]["_count"]["members"], 1);

	// Owner flags cover every resource kind, so creating a list works at once.
	let response = app
		.post("/workspace/side-project/todo", Some(outsider), json!({}))
		.await;
	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_workspace_defaults_and_conflicts() {
	let app = TestApp::new().await;
	let owner = &app.fixtures.owner;

	let body = json_body(app.post("/workspace", Some(owner), json!({})).await).await;
	assert_eq!(body["workspace"]["displayName"], "Untitled Workspace");
	let slug = body["workspace"]["slug"].as_str().unwrap();
	assert_eq!(slug.split('-').count(), 4);

	let response = app
		.post("/workspace", Some(owner), json!({"slug": "team-space"}))
		.await;
	assert_eq!(response.status(), StatusCode::CONFLICT);
	assert_eq!(
		json_body(response).await["message"],
		"Conflict: Slug already in use"
	);

	for bad in ["ab", "Has-Caps", "trailing-", "two--dashes"] {
		let response = app
			.post("/workspace", Some(owner), json!({"slug": bad}))
			.await;
		assert_eq!(response.status(), StatusCode::BAD_REQUEST, "slug {bad}");
	}
}

#[tokio::test]
async fn concurrent_creates_with_one_slug_yield_one_workspace() {
	let app = TestApp::new().await;
	let owner = app.fixtures.owner.clone();

	let mut handles = Vec::new();
	for _ in 0..5 {
		let router = app.router.clone();
		let owner = owner.clone();
		handles.push(tokio::spawn(async move {
			use axum::body::Body;
			use axum::http::Request;
			use tower::ServiceExt;

			let (name, value) = owner.auth_header();
			let request = Request::builder()
				.method(Method::POST)
				.uri("/workspace")
				.header(name, value)
				.header("content-type", "application/json")
				.body(Body::from(r#"{"slug":"race-slug"}"#))
				.unwrap();
			router.oneshot(request).await.unwrap().status()
		}));
	}

	let mut created = 0;
	let mut conflicts = 0;
	for handle in handles {
		match handle.await.unwrap() {
			StatusCode::OK => created += 1,
			StatusCode::CONFLICT => conflicts += 1,
			other => panic!("unexpected status {other}"),
		}
	}
	assert_eq!(created, 1);
	assert_eq!(conflicts, 4);
}
