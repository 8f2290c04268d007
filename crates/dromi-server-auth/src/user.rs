// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! User accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

/// A user account.
///
/// Carries no password hash. Storage returns the hash separately, and only to
/// the sign-in path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: UserId,
	pub email: String,
	pub username: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

impl User {
	/// Create a new user with a freshly generated id.
	pub fn new(email: impl Into<String>, username: impl Into<String>) -> Self {
		let now = Utc::now();
		Self {
			id: UserId::generate(),
			email: email.into(),
			username: username.into(),
			created_at: now,
			updated_at: now,
		}
	}

	/// Default username for an email address: its local part.
	pub fn username_from_email(email: &str) -> &str {
		email.split('@').next().unwrap_or(email)
	}
}
