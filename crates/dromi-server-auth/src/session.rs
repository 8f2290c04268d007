// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Session records and the rules of their lifecycle.
//!
//! A session is identified by a keyed one-way hash of its bearer token (split-token
//! pattern): the database stores only [`SessionId`], the browser holds only the
//! token, and neither can be turned into the other without the server's
//! [`SessionKey`].
//!
//! Lifetime rules:
//! - a new session expires [`SESSION_EXPIRY_DAYS`] after creation
//! - a session is expired once `now >= expires_at`
//! - a live session seen within [`SESSION_RENEWAL_THRESHOLD_DAYS`] of its expiry is
//!   pushed out to a full [`SESSION_EXPIRY_DAYS`] from `now`

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

use crate::{AuthError, SessionId, UserId};

/// Days a session lives after creation or renewal.
pub const SESSION_EXPIRY_DAYS: i64 = 30;

/// A session this close to expiry is renewed when validated.
pub const SESSION_RENEWAL_THRESHOLD_DAYS: i64 = 15;

/// Random bytes in a session token (before base32 encoding).
pub const SESSION_TOKEN_BYTES: usize = 20;

type HmacSha256 = Hmac<Sha256>;

/// A persisted session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
	pub id: SessionId,
	pub user_id: UserId,
	pub expires_at: DateTime<Utc>,
	pub created_at: DateTime<Utc>,
}

/// Where a session stands at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
	/// Past its expiry; must be deleted.
	Expired,
	/// Live, but inside the renewal window.
	NeedsRenewal,
	/// Live and outside the renewal window.
	Active,
}

impl Session {
	/// Create a session that expires [`SESSION_EXPIRY_DAYS`] after `now`.
	pub fn new(id: SessionId, user_id: UserId, now: DateTime<Utc>) -> Self {
		Self {
			id,
			user_id,
			expires_at: now + Duration::days(SESSION_EXPIRY_DAYS),
			created_at: now,
		}
	}

	pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at
	}

	pub fn needs_renewal_at(&self, now: DateTime<Utc>) -> bool {
		now >= self.expires_at - Duration::days(SESSION_RENEWAL_THRESHOLD_DAYS)
	}

	pub fn state_at(&self, now: DateTime<Utc>) -> SessionState {
		if self.is_expired_at(now) {
			SessionState::Expired
		} else if self.needs_renewal_at(now) {
			SessionState::NeedsRenewal
		} else {
			SessionState::Active
		}
	}

	/// Push expiry to [`SESSION_EXPIRY_DAYS`] after `now`.
	pub fn renew(&mut self, now: DateTime<Utc>) {
		self.expires_at = now + Duration::days(SESSION_EXPIRY_DAYS);
	}

	/// Whole seconds until expiry, floored at zero. Used for cookie `Max-Age`.
	pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
		(self.expires_at - now).num_seconds().max(0)
	}
}

/// Generate a new session token: 20 random bytes as lowercase unpadded base32.
pub fn generate_session_token() -> String {
	let mut bytes = [0u8; SESSION_TOKEN_BYTES];
	rand::thread_rng().fill_bytes(&mut bytes);
	base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &bytes).to_ascii_lowercase()
}

/// Server key that maps session tokens to session ids.
///
/// The id is the lowercase hex HMAC-SHA256 of the token under this key. The
/// mapping is deterministic, so the same token always finds the same row, and a
/// leaked sessions table yields neither tokens nor a way to test guesses offline.
#[derive(Clone)]
pub struct SessionKey {
	mac: HmacSha256,
}

impl SessionKey {
	/// Build a key from secret bytes. The secret must not be empty.
	pub fn new(secret: &[u8]) -> Result<Self, AuthError> {
		if secret.is_empty() {
			return Err(AuthError::InvalidSessionKey(
				"session secret must not be empty".to_string(),
			));
		}
		let mac = HmacSha256::new_from_slice(secret)
			.map_err(|e| AuthError::InvalidSessionKey(e.to_string()))?;
		Ok(Self { mac })
	}

	/// Derive the session id for a token.
	pub fn derive_session_id(&self, token: &str) -> SessionId {
		let mut mac = self.mac.clone();
		mac.update(token.as_bytes());
		SessionId::new(hex::encode(mac.finalize().into_bytes()))
	}
}

impl fmt::Debug for SessionKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SessionKey").field("mac", &"[REDACTED]").finish()
	}
}
