// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Account HTTP handlers: signup, signin, current session and signout.

use axum::{extract::State, http::header::SET_COOKIE, response::IntoResponse, Json};
use chrono::Utc;
use dromi_server_api::{
	MeResponse, MessageResponse, SessionResponse, SigninRequest, SignupRequest, UserResponse,
};
use dromi_server_auth::{
	hash_password, verify_password, verify_password_unknown_user, AuthError, User, UserId,
};

use crate::{
	api::AppState,
	auth_middleware::{OptionalAuth, RequireAuth},
	error::{ServerError, UNAUTHORIZED_MESSAGE},
	extract::ApiJson,
	validation::{sanitize_email, validate_email, validate_password, validate_username},
};

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created, session cookie set", body = MessageResponse),
        (status = 400, description = "Invalid email, username or password", body = dromi_server_api::ErrorResponse),
        (status = 403, description = "Signups are disabled", body = dromi_server_api::ErrorResponse),
        (status = 409, description = "Email or username already in use", body = dromi_server_api::ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /auth/signup - Create an account and sign it in.
///
/// The uniqueness checks and the insert run while holding lock keys for the
/// email and the username, always taken in that order.
#[tracing::instrument(skip(state, payload))]
pub async fn signup(
	State(state): State<AppState>,
	ApiJson(payload): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ServerError> {
	if state.auth_config.signups_disabled {
		return Err(ServerError::Forbidden("Signups are disabled".to_string()));
	}

	let email = sanitize_email(&payload.email);
	validate_email(&email)?;
	validate_password(&payload.password)?;
	let username = match payload.username {
		Some(username) => username.trim().to_string(),
		None => User::username_from_email(&email).to_string(),
	};
	validate_username(&username)?;

	let _email_lock = state
		.lock_store
		.acquire(&format!("signup:email:{email}"))
		.await?;
	let _username_lock = state
		.lock_store
		.acquire(&format!("signup:username:{username}"))
		.await?;

	if state.user_repo.get_user_by_email(&email).await?.is_some() {
		return Err(ServerError::Conflict("Email already in use".to_string()));
	}
	if state
		.user_repo
		.get_user_by_username(&username)
		.await?
		.is_some()
	{
		return Err(ServerError::Conflict("Username already in use".to_string()));
	}

	let password = payload.password;
	let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
		.await
		.map_err(|e| ServerError::Internal(format!("password hashing task failed: {e}")))??;

	let user = User::new(email, username);
	state.user_repo.create_user(&user, &password_hash).await?;
	tracing::info!(user_id = %user.id, "account created");

	let issued = state.session_service.issue_session(&user.id).await?;
	let cookie =
		state
			.auth_config
			.session_cookie(&issued.token, issued.session.expires_at, Utc::now());

	Ok((
		[(SET_COOKIE, cookie)],
		Json(MessageResponse::ok("Successfully created account")),
	))
}

#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SigninRequest,
    responses(
        (status = 200, description = "Signed in, session cookie set", body = MessageResponse),
        (status = 400, description = "Invalid credentials", body = dromi_server_api::ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /auth/signin - Sign in with an email or username and a password.
#[tracing::instrument(skip(state, payload))]
pub async fn signin(
	State(state): State<AppState>,
	ApiJson(payload): ApiJson<SigninRequest>,
) -> Result<impl IntoResponse, ServerError> {
	let identifier = payload.identifier.trim();
	let identifier = if identifier.contains('@') {
		sanitize_email(identifier)
	} else {
		identifier.to_string()
	};

	let Some(credentials) = state
		.user_repo
		.get_credentials_by_identifier(&identifier)
		.await?
	else {
		tracing::debug!("signin for unknown identifier");
		let password = payload.password;
		tokio::task::spawn_blocking(move || verify_password_unknown_user(&password))
			.await
			.map_err(|e| ServerError::Internal(format!("password verification task failed: {e}")))?;
		return Err(AuthError::InvalidCredentials.into());
	};

	let password = payload.password;
	let hash = credentials.password_hash;
	let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
		.await
		.map_err(|e| ServerError::Internal(format!("password verification task failed: {e}")))?;
	if !verified {
		tracing::debug!(user_id = %credentials.user.id, "signin with wrong password");
		return Err(AuthError::InvalidCredentials.into());
	}

	let user_id: UserId = credentials.user.id;
	let issued = state.session_service.issue_session(&user_id).await?;
	let cookie =
		state
			.auth_config
			.session_cookie(&issued.token, issued.session.expires_at, Utc::now());
	tracing::info!(%user_id, "signed in");

	Ok((
		[(SET_COOKIE, cookie)],
		Json(MessageResponse::ok("Successfully logged in")),
	))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user and session", body = MeResponse),
        (status = 401, description = "Not authenticated", body = dromi_server_api::ErrorResponse)
    ),
    tag = "auth"
)]
/// GET /auth/me - The caller's user and session.
#[tracing::instrument(skip_all)]
pub async fn me(OptionalAuth(current): OptionalAuth) -> Result<Json<MeResponse>, ServerError> {
	let current =
		current.ok_or_else(|| ServerError::Unauthorized(UNAUTHORIZED_MESSAGE.to_string()))?;

	Ok(Json(MeResponse {
		success: true,
		user: UserResponse::from(&current.user),
		session: SessionResponse::from(&current.session),
	}))
}

#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Session invalidated, cookie cleared", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = dromi_server_api::ErrorResponse)
    ),
    tag = "auth"
)]
/// POST /auth/signout - Invalidate the current session.
#[tracing::instrument(skip_all)]
pub async fn signout(
	RequireAuth(current): RequireAuth,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
	state
		.session_service
		.invalidate_session(&current.session.id)
		.await?;

	Ok((
		[(SET_COOKIE, state.auth_config.clear_session_cookie())],
		Json(MessageResponse::ok("Successfully logged out")),
	))
}
