// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication error types.

use thiserror::Error;

/// Errors raised by the credential and session primitives.
#[derive(Debug, Error)]
pub enum AuthError {
	// =========================================================================
	// Authentication Errors
	// =========================================================================
	/// No valid session accompanied the request.
	#[error("authentication required")]
	AuthenticationRequired,

	/// Identifier or password did not match.
	#[error("invalid credentials")]
	InvalidCredentials,

	// =========================================================================
	// Internal Errors
	// =========================================================================
	/// Argon2 refused to hash the password.
	#[error("password hashing failed: {0}")]
	PasswordHash(String),

	/// The configured session secret cannot key the token MAC.
	#[error("invalid session key: {0}")]
	InvalidSessionKey(String),
}

impl AuthError {
	/// Whether this error reflects a server-side fault rather than bad input.
	pub fn is_internal(&self) -> bool {
		matches!(self, AuthError::PasswordHash(_) | AuthError::InvalidSessionKey(_))
	}

	/// HTTP status code for this error.
	pub fn status_code(&self) -> u16 {
		match self {
			AuthError::AuthenticationRequired => 401,
			AuthError::InvalidCredentials => 400,
			AuthError::PasswordHash(_) | AuthError::InvalidSessionKey(_) => 500,
		}
	}
}
