// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared validation utilities for API handlers.
//!
//! Each check returns [`ServerError::BadRequest`] with a message naming the
//! offending field, so handlers can apply them with `?`.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ServerError;

static SLUG_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex"));

static USERNAME_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_.\-]+$").expect("valid username regex"));

static COLOR_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("valid color regex"));

pub const SLUG_MIN_LEN: usize = 3;
pub const SLUG_MAX_LEN: usize = 64;
pub const EMAIL_MIN_LEN: usize = 3;
pub const EMAIL_MAX_LEN: usize = 255;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 16;
pub const PASSWORD_MIN_LEN: usize = 8;
pub const PASSWORD_MAX_LEN: usize = 256;
pub const NAME_MAX_LEN: usize = 255;

fn char_len_between(value: &str, min: usize, max: usize) -> bool {
	let len = value.chars().count();
	len >= min && len <= max
}

/// Slugs are lowercase alphanumeric runs joined by single hyphens.
pub fn is_valid_slug(slug: &str) -> bool {
	char_len_between(slug, SLUG_MIN_LEN, SLUG_MAX_LEN) && SLUG_REGEX.is_match(slug)
}

pub fn validate_slug(slug: &str) -> Result<(), ServerError> {
	if !char_len_between(slug, SLUG_MIN_LEN, SLUG_MAX_LEN) {
		return Err(ServerError::BadRequest(format!(
			"Slug must be between {SLUG_MIN_LEN} and {SLUG_MAX_LEN} characters"
		)));
	}
	if !SLUG_REGEX.is_match(slug) {
		return Err(ServerError::BadRequest(
			"Slug may only contain lowercase letters, numbers and single hyphens".to_string(),
		));
	}
	Ok(())
}

/// Trim and lowercase an email address.
pub fn sanitize_email(email: &str) -> String {
	email.trim().to_lowercase()
}

pub fn validate_email(email: &str) -> Result<(), ServerError> {
	if !char_len_between(email, EMAIL_MIN_LEN, EMAIL_MAX_LEN) {
		return Err(ServerError::BadRequest(format!(
			"Email must be between {EMAIL_MIN_LEN} and {EMAIL_MAX_LEN} characters"
		)));
	}
	if !email.contains('@') {
		return Err(ServerError::BadRequest(
			"Email must be a valid email address".to_string(),
		));
	}
	Ok(())
}

pub fn validate_username(username: &str) -> Result<(), ServerError> {
	if !char_len_between(username, USERNAME_MIN_LEN, USERNAME_MAX_LEN) {
		return Err(ServerError::BadRequest(format!(
			"Username must be between {USERNAME_MIN_LEN} and {USERNAME_MAX_LEN} characters"
		)));
	}
	if !USERNAME_REGEX.is_match(username) {
		return Err(ServerError::BadRequest(
			"Username may only contain letters, numbers, '_', '.' and '-'".to_string(),
		));
	}
	Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ServerError> {
	if !char_len_between(password, PASSWORD_MIN_LEN, PASSWORD_MAX_LEN) {
		return Err(ServerError::BadRequest(format!(
			"Password must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"
		)));
	}
	Ok(())
}

/// Non-empty, at most 255 characters. `field` names the value in the message.
pub fn validate_name(field: &str, value: &str) -> Result<(), ServerError> {
	if !char_len_between(value.trim(), 1, NAME_MAX_LEN) {
		return Err(ServerError::BadRequest(format!(
			"{field} must be between 1 and {NAME_MAX_LEN} characters"
		)));
	}
	Ok(())
}

/// `#rrggbb`.
pub fn validate_color(color: &str) -> Result<(), ServerError> {
	if !COLOR_REGEX.is_match(color) {
		return Err(ServerError::BadRequest(
			"Color must be a hex color like #1a2b3c".to_string(),
		));
	}
	Ok(())
}
