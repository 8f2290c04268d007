// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use axum::{
	body::Body,
	http::{header::HeaderName, header::HeaderValue, Method, Request, StatusCode},
	response::Response,
	Router,
};
use dromi_server_auth::{PermissionFlags, PermissionGrant, Resource, User};
use dromi_server_db::{
	LabelType, LabelWithValues, NewLabelValue, TodoItem, TodoLabel, TodoList, Workspace,
};
use serde::Serialize;
use tempfile::TempDir;
use tower::ServiceExt;

use dromi_server::{
	api::{create_app_state, create_router, AppState},
	ServerConfig,
};

#[derive(Clone)]
pub struct TestUser {
	pub user: User,
	pub session_token: String,
	cookie_name: String,
}

impl TestUser {
	pub fn auth_header(&self) -> (HeaderName, HeaderValue) {
		(
			HeaderName::from_static("cookie"),
			HeaderValue::from_str(&format!("{}={}", self.cookie_name, self.session_token)).unwrap(),
		)
	}
}

/// One workspace with two lists and four callers:
///
/// - `owner` created the workspace.
/// - `viewer` holds workspace-wide WORKSPACE VIEW and TODO VIEW.
/// - `list_editor` holds WORKSPACE VIEW and TODO VIEW, EDIT and CREATE on
///   `list_a` only.
/// - `outsider` is not a member.
#[derive(Clone)]
pub struct Fixtures {
	pub workspace: Workspace,
	pub owner: TestUser,
	pub viewer: TestUser,
	pub list_editor: TestUser,
	pub outsider: TestUser,
	pub list_a: TodoList,
	pub list_b: TodoList,
	pub item_a: TodoItem,
	pub item_b: TodoItem,
	/// SELECT label on `list_a` with values `High` and `Low`.
	pub label_a: LabelWithValues,
}

pub struct TestApp {
	pub router: Router,
	pub fixtures: Fixtures,
	pub state: AppState,
	_temp_dir: TempDir,
}

impl TestApp {
	pub async fn new() -> Self {
		let temp_dir = tempfile::tempdir().unwrap();
		let db_path = temp_dir.path().join("test_authz.db");
		let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
		let pool = dromi_server_db::create_pool(&db_url).await.unwrap();
		dromi_server_db::run_migrations(&pool).await.unwrap();
		let config = ServerConfig::default();
		let state = create_app_state(pool, &config).unwrap();

		let fixtures = create_fixtures(&state).await;
		let router = create_router(state.clone());

		Self {
			router,
			fixtures,
			state,
			_temp_dir: temp_dir,
		}
	}

	pub async fn get(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::GET, path, user, Option::<()>::None)
			.await
	}

	pub async fn post(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::POST, path, user, Some(body)).await
	}

	pub async fn put(
		&self,
		path: &str,
		user: Option<&TestUser>,
		body: impl Serialize,
	) -> Response<Body> {
		self.request(Method::PUT, path, user, Some(body)).await
	}

	pub async fn delete(&self, path: &str, user: Option<&TestUser>) -> Response<Body> {
		self
			.request(Method::DELETE, path, user, Option::<()>::None)
			.await
	}

	async fn request<T: Serialize>(
		&self,
		method: Method,
		path: &str,
		user: Option<&TestUser>,
		body: Option<T>,
	) -> Response<Body> {
		let mut builder = Request::builder().method(method).uri(path);

		if let Some(test_user) = user {
			let (name, value) = test_user.auth_header();
			builder = builder.header(name, value);
		}

		let request_body = match body {
			Some(b) => {
				builder = builder.header("content-type", "application/json");
				Body::from(serde_json::to_string(&b).unwrap())
			}
			None => Body::empty(),
		};

		let request = builder.body(request_body).unwrap();

		self.router.clone().oneshot(request).await.unwrap()
	}

	pub fn workspace_path(&self) -> String {
		format!("/workspace/{}", self.fixtures.workspace.id)
	}

	pub fn list_path(&self, list: &TodoList) -> String {
		format!("{}/todo/{}", self.workspace_path(), list.id)
	}
}

/// Read a response body as JSON.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
	let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
		.await
		.unwrap();
	serde_json::from_slice(&bytes).unwrap()
}

pub struct AuthzCase {
	pub name: &'static str,
	pub method: Method,
	pub path: String,
	pub user: Option<TestUser>,
	pub body: Option<serde_json::Value>,
	pub expected_status: StatusCode,
}

pub async fn run_authz_cases(app: &TestApp, cases: &[AuthzCase]) {
	for case in cases {
		let response = match (&case.method, &case.body) {
			(m, Some(body)) if *m == Method::POST => {
				app.post(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, Some(body)) if *m == Method::PUT => {
				app.put(&case.path, case.user.as_ref(), body.clone()).await
			}
			(m, _) if *m == Method::DELETE => app.delete(&case.path, case.user.as_ref()).await,
			_ => app.get(&case.path, case.user.as_ref()).await,
		};

		if response.status() != case.expected_status {
			let (parts, body) = response.into_parts();
			let body_bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
			let body_str = String::from_utf8_lossy(&body_bytes);
			panic!(
				"Case '{}': {} {} - expected {}, got {}\nResponse body: {}",
				case.name, case.method, case.path, case.expected_status, parts.status, body_str
			);
		}
	}
}

pub async fn create_test_user(state: &AppState, username: &str) -> TestUser {
	let user = User::new(format!("{username}@example.com"), username);
	state
		.user_repo
		.create_user(&user, "not-a-real-hash")
		.await
		.unwrap();
	let issued = state.session_service.issue_session(&user.id).await.unwrap();

	TestUser {
		user,
		session_token: issued.token,
		cookie_name: state.auth_config.session_cookie_name.clone(),
	}
}

async fn create_list(state: &AppState, workspace: &Workspace, name: &str, slug: &str) -> TodoList {
	let list = TodoList::new(workspace.id.clone(), name, slug);
	state.todo_repo.create_list(&list).await.unwrap();
	list
}

async fn create_item(state: &AppState, list: &TodoList, title: &str, owner: &TestUser) -> TodoItem {
	let item = TodoItem::new(list.id.clone(), title, owner.user.id.clone());
	state.todo_repo.create_item(&item).await.unwrap();
	item
}

async fn create_fixtures(state: &AppState) -> Fixtures {
	let owner = create_test_user(state, "owner").await;
	let viewer = create_test_user(state, "viewer").await;
	let list_editor = create_test_user(state, "editor").await;
	let outsider = create_test_user(state, "outsider").await;

	let workspace = Workspace::new("Team Space", "team-space");
	state
		.workspace_repo
		.create_workspace_with_owner(&workspace, &owner.user.id)
		.await
		.unwrap();

	let list_a = create_list(state, &workspace, "Alpha", "list-alpha").await;
	let list_b = create_list(state, &workspace, "Beta", "list-beta").await;
	let item_a = create_item(state, &list_a, "Write the report", &owner).await;
	let item_b = create_item(state, &list_b, "Book the venue", &owner).await;

	state
		.membership_repo
		.add_member(
			&workspace.id,
			&viewer.user.id,
			&[
				PermissionGrant::workspace_wide(Resource::Workspace, PermissionFlags::VIEW),
				PermissionGrant::workspace_wide(Resource::Todo, PermissionFlags::VIEW),
			],
		)
		.await
		.unwrap();

	state
		.membership_repo
		.add_member(
			&workspace.id,
			&list_editor.user.id,
			&[
				PermissionGrant::workspace_wide(Resource::Workspace, PermissionFlags::VIEW),
				PermissionGrant::instance(
					Resource::Todo,
					list_a.id.as_str(),
					PermissionFlags::VIEW | PermissionFlags::EDIT | PermissionFlags::CREATE,
				),
			],
		)
		.await
		.unwrap();

	let label_a = state
		.label_repo
		.create_label(
			&TodoLabel::new(list_a.id.clone(), "Priority", LabelType::Select),
			&[
				NewLabelValue {
					name: "High".to_string(),
					color: "#ff0000".to_string(),
					description: None,
				},
				NewLabelValue {
					name: "Low".to_string(),
					color: "#00ff00".to_string(),
					description: None,
				},
			],
		)
		.await
		.unwrap();

	Fixtures {
		workspace,
		owner,
		viewer,
		list_editor,
		outsider,
		list_a,
		list_b,
		item_a,
		item_b,
		label_a,
	}
}
