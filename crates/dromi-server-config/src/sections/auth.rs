// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication configuration.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::secret::SecretString;

/// Signing material used outside production when no secret is configured.
pub const DEV_SESSION_SECRET: &str = "dromi-development-session-secret-not-for-production";

/// Shortest session secret accepted in production, in bytes.
pub const MIN_PRODUCTION_SECRET_BYTES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
	#[default]
	Development,
	Test,
	Production,
}

impl Environment {
	pub fn as_str(&self) -> &'static str {
		match self {
			Environment::Development => "development",
			Environment::Test => "test",
			Environment::Production => "production",
		}
	}

	pub fn is_production(&self) -> bool {
		matches!(self, Environment::Production)
	}
}

impl fmt::Display for Environment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for Environment {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"development" | "dev" => Ok(Environment::Development),
			"test" => Ok(Environment::Test),
			"production" | "prod" => Ok(Environment::Production),
			other => Err(format!(
				"unknown environment '{other}' (expected development, test or production)"
			)),
		}
	}
}

/// Authentication configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct AuthConfig {
	pub environment: Environment,
	pub cookie_name: String,
	pub cookie_domain: String,
	/// `None` means the development fallback is in use.
	pub session_secret: Option<SecretString>,
	pub signups_disabled: bool,
}

impl Default for AuthConfig {
	fn default() -> Self {
		Self {
			environment: Environment::Development,
			cookie_name: "session".to_string(),
			cookie_domain: "localhost".to_string(),
			session_secret: None,
			signups_disabled: false,
		}
	}
}

impl AuthConfig {
	/// Bytes that key session id derivation.
	pub fn session_secret_bytes(&self) -> &[u8] {
		match &self.session_secret {
			Some(secret) => secret.expose().as_bytes(),
			None => DEV_SESSION_SECRET.as_bytes(),
		}
	}

	/// Session cookies carry `Secure` exactly in production.
	pub fn secure_cookies(&self) -> bool {
		self.environment.is_production()
	}
}

/// Authentication configuration layer (partial, for merging).
///
/// The session secret is never read from the TOML file, only from the
/// environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfigLayer {
	#[serde(default)]
	pub environment: Option<String>,
	#[serde(default)]
	pub cookie_name: Option<String>,
	#[serde(default)]
	pub cookie_domain: Option<String>,
	#[serde(skip)]
	pub session_secret: Option<SecretString>,
	#[serde(default)]
	pub signups_disabled: Option<bool>,
}

impl AuthConfigLayer {
	pub fn merge(&mut self, other: AuthConfigLayer) {
		if other.environment.is_some() {
			self.environment = other.environment;
		}
		if other.cookie_name.is_some() {
			self.cookie_name = other.cookie_name;
		}
		if other.cookie_domain.is_some() {
			self.cookie_domain = other.cookie_domain;
		}
		if other.session_secret.is_some() {
			self.session_secret = other.session_secret;
		}
		if other.signups_disabled.is_some() {
			self.signups_disabled = other.signups_disabled;
		}
	}

	pub fn finalize(self) -> Result<AuthConfig, ConfigError> {
		let environment = match self.environment {
			Some(raw) => raw
				.parse()
				.map_err(|message: String| ConfigError::invalid("auth.environment", message))?,
			None => Environment::default(),
		};

		Ok(AuthConfig {
			environment,
			cookie_name: self.cookie_name.unwrap_or_else(|| "session".to_string()),
			cookie_domain: self
				.cookie_domain
				.unwrap_or_else(|| "localhost".to_string()),
			session_secret: self.session_secret,
			signups_disabled: self.signups_disabled.unwrap_or(false),
		})
	}
}
