// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Application state and router assembly.

use axum::{
	http::{header, HeaderValue, Method},
	routing::{delete, get, post, put},
	Router,
};
use dromi_server_auth::{AuthConfig, SessionKey};
use dromi_server_config::ServerConfig;
use dromi_server_db::{
	LabelRepository, LabelStore, MembershipRepository, MembershipStore, SessionRepository,
	TodoRepository, TodoStore, UserRepository, UserStore, WorkspaceRepository, WorkspaceStore,
};
use dromi_server_session::SessionService;
use sqlx::sqlite::SqlitePool;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
	api_docs::ApiDoc,
	error::ServerError,
	locks::{LockStore, MemoryLockStore},
	routes,
	typed_router::{AuthedRouter, OptionalAuthRouter, PublicRouter},
};

/// Shared state handed to every handler.
///
/// Stores are trait objects so tests can substitute doubles.
#[derive(Clone)]
pub struct AppState {
	pub pool: SqlitePool,
	pub user_repo: Arc<dyn UserStore>,
	pub workspace_repo: Arc<dyn WorkspaceStore>,
	pub membership_repo: Arc<dyn MembershipStore>,
	pub todo_repo: Arc<dyn TodoStore>,
	pub label_repo: Arc<dyn LabelStore>,
	pub session_service: SessionService,
	pub auth_config: AuthConfig,
	pub lock_store: Arc<dyn LockStore>,
}

/// Build the state from a migrated pool and resolved configuration.
pub fn create_app_state(pool: SqlitePool, config: &ServerConfig) -> Result<AppState, ServerError> {
	let session_key = SessionKey::new(config.auth.session_secret_bytes())?;
	let session_service = SessionService::new(
		Arc::new(SessionRepository::new(pool.clone())),
		session_key,
	);

	let auth_config = AuthConfig::new()
		.with_session_cookie_name(config.auth.cookie_name.clone())
		.with_cookie_domain(config.auth.cookie_domain.clone())
		.with_secure_cookies(config.auth.secure_cookies())
		.with_signups_disabled(config.auth.signups_disabled);

	tracing::debug!(
		cookie_name = %auth_config.session_cookie_name,
		secure_cookies = auth_config.secure_cookies,
		signups_disabled = auth_config.signups_disabled,
		lock_store = %config.locks.store,
		"app state configured"
	);

	Ok(AppState {
		user_repo: Arc::new(UserRepository::new(pool.clone())),
		workspace_repo: Arc::new(WorkspaceRepository::new(pool.clone())),
		membership_repo: Arc::new(MembershipRepository::new(pool.clone())),
		todo_repo: Arc::new(TodoRepository::new(pool.clone())),
		label_repo: Arc::new(LabelRepository::new(pool.clone())),
		pool,
		session_service,
		auth_config,
		lock_store: Arc::new(MemoryLockStore::new(config.locks.acquire_timeout())),
	})
}

/// CORS for the configured front-end origins, with credentials so the session
/// cookie is sent.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
	let origins: Vec<HeaderValue> = origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(e) => {
				tracing::warn!(%origin, error = %e, "Ignoring invalid CORS origin");
				None
			}
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods([
			Method::GET,
			Method::POST,
			Method::PUT,
			Method::DELETE,
			Method::OPTIONS,
		])
		.allow_headers([header::CONTENT_TYPE, header::ACCEPT])
		.allow_credentials(true)
}

pub fn create_router(state: AppState) -> Router {
	// Public routes - no authentication required
	let public = PublicRouter::new()
		.route("/", get(routes::health::root))
		.route("/health", get(routes::health::health_check))
		.route("/auth/signup", post(routes::auth::signup))
		.route("/auth/signin", post(routes::auth::signin));

	// Session resolved if present; the handler decides
	let optional = OptionalAuthRouter::new().route("/auth/me", get(routes::auth::me));

	let authed = AuthedRouter::new()
		.route("/auth/signout", post(routes::auth::signout))
		// Workspaces
		.route(
			"/workspace",
			get(routes::workspaces::list_workspaces).post(routes::workspaces::create_workspace),
		)
		.route(
			"/workspace/{id}",
			get(routes::workspaces::get_workspace).delete(routes::workspaces::delete_workspace),
		)
		// Todo lists
		.route(
			"/workspace/{id}/todo",
			get(routes::todo_lists::list_todo_lists).post(routes::todo_lists::create_todo_list),
		)
		.route(
			"/workspace/{id}/todo/{todo_id}",
			get(routes::todo_lists::get_todo_list)
				.put(routes::todo_lists::update_todo_list)
				.delete(routes::todo_lists::delete_todo_list),
		)
		// Todo items
		.route(
			"/workspace/{id}/todo/{todo_id}/items",
			get(routes::todo_items::list_todo_items).post(routes::todo_items::create_todo_item),
		)
		.route(
			"/workspace/{id}/todo/{todo_id}/items/{item_id}",
			put(routes::todo_items::update_todo_item).delete(routes::todo_items::delete_todo_item),
		)
		.route(
			"/workspace/{id}/todo/{todo_id}/items/{item_id}/labels",
			post(routes::item_labels::apply_label_value),
		)
		.route(
			"/workspace/{id}/todo/{todo_id}/items/{item_id}/labels/{label_value_id}",
			delete(routes::item_labels::remove_label_value),
		)
		// Labels
		.route(
			"/workspace/{id}/todo/{todo_id}/labels",
			get(routes::todo_labels::list_labels).post(routes::todo_labels::create_label),
		)
		.route(
			"/workspace/{id}/todo/{todo_id}/labels/{label_id}",
			put(routes::todo_labels::update_label).delete(routes::todo_labels::delete_label),
		)
		.route(
			"/workspace/{id}/todo/{todo_id}/labels/{label_id}/values",
			put(routes::todo_labels::replace_label_values),
		);

	Router::new()
		.merge(public.build())
		.merge(optional.build(state.clone()))
		.merge(authed.build(state.clone()))
		.with_state(state)
		.merge(SwaggerUi::new("/docs").url("/docs/openapi.json", ApiDoc::openapi()))
}
