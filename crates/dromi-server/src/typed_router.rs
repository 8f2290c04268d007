// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Routers that carry their authentication requirement in their type.
//!
//! A route added to an [`AuthedRouter`] cannot be reached without a session, no
//! matter what its handler extracts.

use axum::{
	body::Body,
	extract::State,
	http::{Request, StatusCode},
	middleware::{from_fn_with_state, Next},
	response::{IntoResponse, Response},
	routing::MethodRouter,
	Json, Router,
};
use dromi_server_api::ErrorResponse;
use dromi_server_auth::AuthContext;
use tracing::instrument;

use crate::{api::AppState, auth_middleware::auth_layer, error::UNAUTHORIZED_MESSAGE};

#[instrument(
	name = "require_auth_layer",
	skip(_state, request, next),
	fields(authenticated = tracing::field::Empty)
)]
pub async fn require_auth_layer(
	State(_state): State<AppState>,
	request: Request<Body>,
	next: Next,
) -> Response {
	let authenticated = request
		.extensions()
		.get::<AuthContext>()
		.is_some_and(|ctx| ctx.current_user.is_some());

	tracing::Span::current().record("authenticated", authenticated);
	if !authenticated {
		return (
			StatusCode::UNAUTHORIZED,
			Json(ErrorResponse::new(UNAUTHORIZED_MESSAGE)),
		)
			.into_response();
	}

	next.run(request).await
}

pub struct AuthedRouter(Router<AppState>);

impl AuthedRouter {
	pub fn new() -> Self {
		Self(Router::new())
	}

	pub fn route(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
		Self(self.0.route(path, method_router))
	}

	pub fn nest(self, path: &str, router: AuthedRouter) -> Self {
		Self(self.0.nest(path, router.0))
	}

	pub fn build(self, state: AppState) -> Router<AppState> {
		self
			.0
			.layer(from_fn_with_state(state.clone(), require_auth_layer))
			.layer(from_fn_with_state(state, auth_layer))
	}
}

impl Default for AuthedRouter {
	fn default() -> Self {
		Self::new()
	}
}

pub struct PublicRouter(Router<AppState>);

impl PublicRouter {
	pub fn new() -> Self {
		Self(Router::new())
	}

	pub fn route(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
		Self(self.0.route(path, method_router))
	}

	pub fn build(self) -> Router<AppState> {
		self.0
	}
}

impl Default for PublicRouter {
	fn default() -> Self {
		Self::new()
	}
}

pub struct OptionalAuthRouter(Router<AppState>);

impl OptionalAuthRouter {
	pub fn new() -> Self {
		Self(Router::new())
	}

	pub fn route(self, path: &str, method_router: MethodRouter<AppState>) -> Self {
		Self(self.0.route(path, method_router))
	}

	pub fn build(self, state: AppState) -> Router<AppState> {
		self.0.layer(from_fn_with_state(state, auth_layer))
	}
}

impl Default for OptionalAuthRouter {
	fn default() -> Self {
		Self::new()
	}
}
