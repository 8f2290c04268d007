// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.
//!
//! Every failure renders as `{"success": false, "message": "..."}`. Database,
//! session, lock and internal failures are logged and rendered with a generic
//! message.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use dromi_server_api::ErrorResponse;
use dromi_server_auth::AuthError;
use dromi_server_db::DbError;
use dromi_server_session::SessionError;

use crate::locks::LockError;

/// Message for requests that reach an authenticated route without a session.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized Access: User or Session is missing";

/// Message for every 500 response.
pub const INTERNAL_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Malformed or invalid request body.
	#[error("Bad request: {0}")]
	BadRequest(String),

	/// No valid session.
	#[error("Unauthorized: {0}")]
	Unauthorized(String),

	/// Authenticated, but the permission check failed.
	#[error("Forbidden: {0}")]
	Forbidden(String),

	/// A referenced workspace, list, item or label does not exist.
	#[error("Not found: {0}")]
	NotFound(String),

	/// A unique field is already taken. Rendered as `Conflict: <message>`.
	#[error("Conflict: {0}")]
	Conflict(String),

	#[error("Internal error: {0}")]
	Internal(String),

	#[error("Database error: {0}")]
	Db(#[from] DbError),

	#[error("Session error: {0}")]
	Session(#[from] SessionError),

	#[error("Lock error: {0}")]
	Lock(#[from] LockError),

	#[error("Auth error: {0}")]
	Auth(#[from] AuthError),
}

impl ServerError {
	pub fn status_code(&self) -> StatusCode {
		match self {
			ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
			ServerError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
			ServerError::Forbidden(_) => StatusCode::FORBIDDEN,
			ServerError::NotFound(_) => StatusCode::NOT_FOUND,
			ServerError::Conflict(_) => StatusCode::CONFLICT,
			ServerError::Db(DbError::NotFound(_)) => StatusCode::NOT_FOUND,
			ServerError::Db(DbError::Conflict(_)) => StatusCode::CONFLICT,
			ServerError::Auth(e) => {
				StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
			}
			ServerError::Internal(_)
			| ServerError::Db(_)
			| ServerError::Session(_)
			| ServerError::Lock(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn message(&self) -> String {
		match self {
			ServerError::BadRequest(msg)
			| ServerError::Unauthorized(msg)
			| ServerError::Forbidden(msg)
			| ServerError::NotFound(msg) => msg.clone(),
			ServerError::Conflict(msg) => format!("Conflict: {msg}"),
			ServerError::Db(DbError::NotFound(_)) => "Not found".to_string(),
			ServerError::Db(DbError::Conflict(what)) => format!("Conflict: {what}"),
			ServerError::Auth(AuthError::AuthenticationRequired) => UNAUTHORIZED_MESSAGE.to_string(),
			ServerError::Auth(AuthError::InvalidCredentials) => {
				"Bad Request: Invalid credentials".to_string()
			}
			ServerError::Internal(_)
			| ServerError::Db(_)
			| ServerError::Session(_)
			| ServerError::Lock(_)
			| ServerError::Auth(_) => INTERNAL_MESSAGE.to_string(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let status = self.status_code();
		match &self {
			ServerError::Forbidden(msg) => tracing::debug!(error = %msg, "forbidden"),
			ServerError::Unauthorized(msg) => tracing::debug!(error = %msg, "unauthorized"),
			_ if status.is_server_error() => tracing::error!(error = %self, "request failed"),
			_ => {}
		}

		(status, Json(ErrorResponse::new(self.message()))).into_response()
	}
}
