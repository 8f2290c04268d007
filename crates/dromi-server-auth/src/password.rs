// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password hashing with Argon2id.
//!
//! Hashes are stored in PHC string format (`$argon2id$v=19$m=19456,t=2,p=1$...`),
//! so parameters travel with the hash and verification needs no configuration.

use argon2::password_hash::{
	rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};

use crate::argon2_config::argon2_instance;
use crate::AuthError;

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
	let salt = SaltString::generate(&mut OsRng);
	argon2_instance()
		.hash_password(password.as_bytes(), &salt)
		.map(|hash| hash.to_string())
		.map_err(|e| AuthError::PasswordHash(e.to_string()))
}

/// Check a password against a stored PHC hash.
///
/// A malformed stored hash verifies as `false`.
pub fn verify_password(password: &str, hash: &str) -> bool {
	let parsed = match PasswordHash::new(hash) {
		Ok(parsed) => parsed,
		Err(e) => {
			tracing::warn!(error = %e, "stored password hash is not a valid PHC string");
			return false;
		}
	};
	argon2_instance()
		.verify_password(password.as_bytes(), &parsed)
		.is_ok()
}

/// Well-formed Argon2id hash with production parameters that no password matches.
const DUMMY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Spend the same Argon2 work as [`verify_password`] when there is no stored
/// hash, so unknown accounts answer as slowly as wrong passwords. Always `false`.
pub fn verify_password_unknown_user(password: &str) -> bool {
	verify_password(password, DUMMY_PASSWORD_HASH);
	false
}
