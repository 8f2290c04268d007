// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication middleware for Axum.
//!
//! [`auth_layer`] resolves the session cookie into an [`AuthContext`] request
//! extension. Handlers read it through the [`RequireAuth`] and [`OptionalAuth`]
//! extractors.
//!
//! # Security Properties
//!
//! - **Token Protection**: the cookie value is only ever passed to
//!   [`SessionService::validate_session_token`], which keys it into a session id.
//!   It is never logged.
//! - **Lazy Expiry**: an expired session is deleted when presented and the
//!   request continues anonymously.
//! - **Sliding Renewal**: when validation extends a session, the response
//!   re-issues the cookie with the new expiry.
//!
//! # Usage
//!
//! ```ignore
//! async fn handler(RequireAuth(current): RequireAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", current.user.username)
//! }
//! ```

use axum::{
	body::Body,
	extract::{FromRequestParts, State},
	http::{header::SET_COOKIE, request::Parts, HeaderValue, Request, StatusCode},
	middleware::Next,
	response::{IntoResponse, Response},
	Json,
};
use chrono::{DateTime, Utc};
use dromi_server_api::ErrorResponse;
use dromi_server_auth::{
	extract_session_cookie_with_name, AuthConfig, AuthContext, CurrentUser,
};
use dromi_server_session::{SessionError, SessionService, SessionValidation};
use tracing::instrument;

use crate::{
	api::AppState,
	error::{ServerError, UNAUTHORIZED_MESSAGE},
};

/// Resolve the session cookie and store an [`AuthContext`] for downstream
/// handlers.
///
/// A missing, unknown or expired cookie yields an unauthenticated context; it is
/// never rejected here. A session store failure ends the request with a 500 so
/// clients keep a login that may still be valid.
#[instrument(
	name = "auth_layer",
	skip(state, request, next),
	fields(
		auth_method = tracing::field::Empty,
		user_id = tracing::field::Empty,
	)
)]
pub async fn auth_layer(
	State(state): State<AppState>,
	mut request: Request<Body>,
	next: Next,
) -> Response {
	let span = tracing::Span::current();

	let token =
		extract_session_cookie_with_name(request.headers(), &state.auth_config.session_cookie_name);

	let validation = match token.as_deref() {
		Some(token) => match authenticate_session(token, &state.session_service).await {
			Ok(validation) => validation,
			Err(e) => return ServerError::Session(e).into_response(),
		},
		None => None,
	};

	let Some(validation) = validation else {
		span.record("auth_method", "none");
		request
			.extensions_mut()
			.insert(AuthContext::unauthenticated());
		return next.run(request).await;
	};

	span.record("auth_method", "session");
	span.record("user_id", tracing::field::display(&validation.user.id));

	let renewed_until = validation.renewed.then_some(validation.session.expires_at);
	request
		.extensions_mut()
		.insert(AuthContext::authenticated(CurrentUser::new(
			validation.user,
			validation.session,
		)));

	let mut response = next.run(request).await;

	if let (Some(expires_at), Some(token)) = (renewed_until, token) {
		reissue_cookie(&state.auth_config, &token, expires_at, &mut response);
	}

	response
}

#[instrument(skip_all)]
async fn authenticate_session(
	token: &str,
	session_service: &SessionService,
) -> Result<Option<SessionValidation>, SessionError> {
	let validation = session_service.validate_session_token(token).await?;
	if validation.is_none() {
		tracing::debug!("Session not found or expired");
	}
	Ok(validation)
}

/// Append a fresh session cookie unless the handler already set one.
fn reissue_cookie(
	auth_config: &AuthConfig,
	token: &str,
	expires_at: DateTime<Utc>,
	response: &mut Response,
) {
	if response.headers().contains_key(SET_COOKIE) {
		return;
	}

	let cookie = auth_config.session_cookie(token, expires_at, Utc::now());
	match HeaderValue::from_str(&cookie) {
		Ok(value) => {
			response.headers_mut().append(SET_COOKIE, value);
			tracing::debug!(%expires_at, "Re-issued renewed session cookie");
		}
		Err(e) => tracing::warn!(error = %e, "Renewed session cookie is not a valid header"),
	}
}

fn unauthorized() -> Response {
	(
		StatusCode::UNAUTHORIZED,
		Json(ErrorResponse::new(UNAUTHORIZED_MESSAGE)),
	)
		.into_response()
}

/// Extractor that requires authentication.
///
/// Rejects with 401 and the standard error envelope when the request carries
/// no valid session.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
	S: Send + Sync,
{
	type Rejection = Response;

	#[instrument(name = "RequireAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		match auth_ctx.current_user {
			Some(user) => {
				tracing::debug!(user_id = %user.user.id, "Authentication required: success");
				Ok(RequireAuth(user))
			}
			None => {
				tracing::debug!("Authentication required: no valid session");
				Err(unauthorized())
			}
		}
	}
}

/// Extractor for optional authentication. Always succeeds.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalAuth
where
	S: Send + Sync,
{
	type Rejection = std::convert::Infallible;

	#[instrument(name = "OptionalAuth::from_request_parts", skip_all)]
	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		let auth_ctx = parts
			.extensions
			.get::<AuthContext>()
			.cloned()
			.unwrap_or_else(AuthContext::unauthenticated);

		if let Some(ref user) = auth_ctx.current_user {
			tracing::debug!(user_id = %user.user.id, "Optional auth: authenticated");
		} else {
			tracing::debug!("Optional auth: unauthenticated");
		}

		Ok(OptionalAuth(auth_ctx.current_user))
	}
}
