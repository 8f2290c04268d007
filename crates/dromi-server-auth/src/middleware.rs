// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request authentication context and session cookie handling.
//!
//! This module provides:
//! - [`CurrentUser`] - the signed-in user and their session
//! - [`AuthContext`] - auth state attached to each request
//! - [`AuthConfig`] - cookie and signup settings
//! - Helpers to read the session cookie and render `Set-Cookie` values
//!
//! # Authentication Flow
//!
//! ```text
//! Request → Cookie header → token → SessionKey → session id → lookup → AuthContext
//!                                                                 │
//!                                                                 ├── missing/expired → unauthenticated
//!                                                                 └── near expiry     → renew + re-issue cookie
//! ```
//!
//! Token values are never logged.

use chrono::{DateTime, Utc};
use http::header::COOKIE;
use http::HeaderMap;
use serde::Serialize;

use crate::{AuthError, Session, User};

/// Default name for the session cookie.
pub const SESSION_COOKIE_NAME: &str = "session";

/// The authenticated user for a request, with the session that proved it.
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
	pub user: User,
	pub session: Session,
}

impl CurrentUser {
	pub fn new(user: User, session: Session) -> Self {
		Self { user, session }
	}
}

/// Authentication state carried through the request pipeline.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
	pub is_authenticated: bool,
	pub current_user: Option<CurrentUser>,
}

impl AuthContext {
	pub fn unauthenticated() -> Self {
		Self {
			is_authenticated: false,
			current_user: None,
		}
	}

	pub fn authenticated(current_user: CurrentUser) -> Self {
		Self {
			is_authenticated: true,
			current_user: Some(current_user),
		}
	}

	pub fn user(&self) -> Option<&CurrentUser> {
		self.current_user.as_ref()
	}

	/// The current user, or [`AuthError::AuthenticationRequired`].
	pub fn require_user(&self) -> Result<&CurrentUser, AuthError> {
		self
			.current_user
			.as_ref()
			.ok_or(AuthError::AuthenticationRequired)
	}
}

/// Cookie and signup settings for the auth layer.
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub session_cookie_name: String,
	pub cookie_domain: String,
	/// Adds the `Secure` attribute. Enabled in production.
	pub secure_cookies: bool,
	/// Reject new signups; existing users can still sign in.
	pub signups_disabled: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			session_cookie_name: SESSION_COOKIE_NAME.to_string(),
			cookie_domain: "localhost".to_string(),
			secure_cookies: false,
			signups_disabled: false,
		}
	}
}

impl AuthConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
		self.session_cookie_name = name.into();
		self
	}

	pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
		self.cookie_domain = domain.into();
		self
	}

	pub fn with_secure_cookies(mut self, secure: bool) -> Self {
		self.secure_cookies = secure;
		self
	}

	pub fn with_signups_disabled(mut self, disabled: bool) -> Self {
		self.signups_disabled = disabled;
		self
	}

	/// `Set-Cookie` value carrying `token` until `expires_at`.
	pub fn session_cookie(&self, token: &str, expires_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
		let max_age = (expires_at - now).num_seconds().max(0);
		self.render_cookie(token, max_age)
	}

	/// `Set-Cookie` value that makes the browser drop the session cookie.
	pub fn clear_session_cookie(&self) -> String {
		self.render_cookie("", 0)
	}

	fn render_cookie(&self, value: &str, max_age: i64) -> String {
		let mut cookie = format!(
			"{}={}; Path=/; Domain={}; Max-Age={}; HttpOnly; SameSite=Lax",
			self.session_cookie_name, value, self.cookie_domain, max_age
		);
		if self.secure_cookies {
			cookie.push_str("; Secure");
		}
		cookie
	}
}

/// Read the named cookie's value from the `Cookie` header.
///
/// Returns `None` when the header is missing, not ASCII, or lacks the cookie.
/// An empty value counts as missing.
pub fn extract_session_cookie_with_name(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
	headers
		.get_all(COOKIE)
		.iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(|value| value.split(';'))
		.find_map(|cookie| {
			let (name, value) = cookie.trim().split_once('=')?;
			(name == cookie_name && !value.is_empty()).then(|| value.to_string())
		})
}
