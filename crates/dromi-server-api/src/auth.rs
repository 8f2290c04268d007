// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use dromi_server_auth::{Session, User};
use serde::{Deserialize, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
	pub email: String,
	/// Defaults to the local part of `email`.
	#[serde(default)]
	pub username: Option<String>,
	pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SigninRequest {
	/// Email address or username.
	pub identifier: String,
	pub password: String,
}

/// A user as clients see it. Never carries credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
	pub id: String,
	pub email: String,
	pub username: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
	fn from(user: &User) -> Self {
		Self {
			id: user.id.to_string(),
			email: user.email.clone(),
			username: user.username.clone(),
			created_at: user.created_at,
			updated_at: user.updated_at,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
	pub id: String,
	pub user_id: String,
	pub expires_at: DateTime<Utc>,
	pub created_at: DateTime<Utc>,
}

impl From<&Session> for SessionResponse {
	fn from(session: &Session) -> Self {
		Self {
			id: session.id.to_string(),
			user_id: session.user_id.to_string(),
			expires_at: session.expires_at,
			created_at: session.created_at,
		}
	}
}

/// `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MeResponse {
	pub success: bool,
	pub user: UserResponse,
	pub session: SessionResponse,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn signup_username_is_optional() {
		let req: SignupRequest =
			serde_json::from_str(r#"{"email":"ada@example.com","password":"correct horse"}"#)
				.unwrap();
		assert!(req.username.is_none());
	}

	#[test]
	fn user_response_is_camel_case_without_password() {
		let user = User::new("ada@example.com", "ada");
		let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
		assert!(json.get("createdAt").is_some());
		assert!(json.get("password").is_none());
		assert_eq!(json["username"], "ada");
	}
}
