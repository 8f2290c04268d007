// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: environment variables and TOML files.

use std::path::PathBuf;

use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::secret::SecretString;
use crate::sections::http::parse_origin_list;
use crate::sections::{
	AuthConfigLayer, DatabaseConfigLayer, HttpConfigLayer, LocksConfigLayer, LoggingConfigLayer,
};

/// Env var naming an alternative config file.
pub const CONFIG_PATH_ENV: &str = "DROMI_SERVER_CONFIG";

/// Config file read when [`CONFIG_PATH_ENV`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/dromi/server.toml";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// The file named by `DROMI_SERVER_CONFIG`, or `/etc/dromi/server.toml`.
	pub fn system() -> Self {
		Self::new(env_var(CONFIG_PATH_ENV).unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string()))
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: DROMI_SERVER_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			database: Some(load_database_from_env()),
			auth: Some(load_auth_from_env()?),
			locks: Some(load_locks_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_u16(name: &str) -> Result<Option<u16>, ConfigError> {
	match env_var(name) {
		Some(v) => v
			.parse()
			.map(Some)
			.map_err(|_| ConfigError::invalid(name, format!("invalid u16 value '{v}'"))),
		None => Ok(None),
	}
}

fn env_u64(name: &str) -> Result<Option<u64>, ConfigError> {
	match env_var(name) {
		Some(v) => v
			.parse()
			.map(Some)
			.map_err(|_| ConfigError::invalid(name, format!("invalid u64 value '{v}'"))),
		None => Ok(None),
	}
}

/// Load a secret using the `VAR` / `VAR_FILE` convention.
///
/// `VAR_FILE` wins when both are set. One trailing newline is stripped from file
/// contents.
pub fn load_secret_env(var: &str) -> Result<Option<SecretString>, ConfigError> {
	let file_var = format!("{var}_FILE");

	if let Ok(path_str) = std::env::var(&file_var) {
		if path_str.is_empty() {
			return Err(ConfigError::Secret(format!("secret file path in {file_var} is empty")));
		}

		let path = PathBuf::from(&path_str);
		let content = std::fs::read_to_string(&path).map_err(|e| {
			ConfigError::Secret(format!("failed to read secret file at {}: {e}", path.display()))
		})?;

		let secret = SecretString::new(content.strip_suffix('\n').unwrap_or(&content));
		return Ok(Some(secret));
	}

	Ok(env_var(var).map(SecretString::new))
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("DROMI_SERVER_HOST"),
		port: env_u16("DROMI_SERVER_PORT")?,
		base_url: env_var("DROMI_SERVER_BASE_URL"),
		cors_origins: env_var("DROMI_SERVER_CORS_ORIGINS").map(|raw| parse_origin_list(&raw)),
	})
}

fn load_database_from_env() -> DatabaseConfigLayer {
	DatabaseConfigLayer {
		url: env_var("DROMI_SERVER_DATABASE_URL"),
	}
}

fn load_auth_from_env() -> Result<AuthConfigLayer, ConfigError> {
	Ok(AuthConfigLayer {
		environment: env_var("DROMI_SERVER_ENV"),
		cookie_name: env_var("DROMI_SERVER_COOKIE_NAME"),
		cookie_domain: env_var("DROMI_SERVER_COOKIE_DOMAIN"),
		session_secret: load_secret_env("DROMI_SERVER_SESSION_SECRET")?,
		signups_disabled: env_bool("DROMI_SERVER_SIGNUPS_DISABLED"),
	})
}

fn load_locks_from_env() -> Result<LocksConfigLayer, ConfigError> {
	Ok(LocksConfigLayer {
		store: env_var("DROMI_SERVER_LOCK_STORE"),
		acquire_timeout_ms: env_u64("DROMI_SERVER_LOCK_TIMEOUT_MS")?,
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("DROMI_SERVER_LOG_LEVEL"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[test]
	fn precedence_orders_sources() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}

	#[test]
	fn empty_env_var_is_unset() {
		std::env::set_var("DROMI_TEST_EMPTY_VAR_5127", "");
		assert!(env_var("DROMI_TEST_EMPTY_VAR_5127").is_none());
		std::env::remove_var("DROMI_TEST_EMPTY_VAR_5127");
	}

	#[test]
	fn env_bool_accepts_true_and_one() {
		std::env::set_var("DROMI_TEST_BOOL_VAR_5127", "TRUE");
		assert_eq!(env_bool("DROMI_TEST_BOOL_VAR_5127"), Some(true));
		std::env::set_var("DROMI_TEST_BOOL_VAR_5127", "no");
		assert_eq!(env_bool("DROMI_TEST_BOOL_VAR_5127"), Some(false));
		std::env::remove_var("DROMI_TEST_BOOL_VAR_5127");
	}

	#[test]
	fn env_u16_rejects_garbage() {
		std::env::set_var("DROMI_TEST_PORT_VAR_5127", "eighty");
		let err = env_u16("DROMI_TEST_PORT_VAR_5127").unwrap_err();
		assert!(err.to_string().contains("DROMI_TEST_PORT_VAR_5127"));
		std::env::remove_var("DROMI_TEST_PORT_VAR_5127");
	}

	#[test]
	fn secret_from_direct_var() {
		let var = "DROMI_TEST_SECRET_DIRECT_5127";
		std::env::set_var(var, "direct-secret");
		std::env::remove_var(format!("{var}_FILE"));
		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "direct-secret");
		std::env::remove_var(var);
	}

	#[test]
	fn secret_file_wins_and_strips_newline() {
		let var = "DROMI_TEST_SECRET_FILE_5127";
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "file-secret").unwrap();

		std::env::set_var(var, "direct-secret");
		std::env::set_var(format!("{var}_FILE"), file.path().to_str().unwrap());
		let secret = load_secret_env(var).unwrap().unwrap();
		assert_eq!(secret.expose(), "file-secret");

		std::env::remove_var(var);
		std::env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn missing_secret_file_is_an_error() {
		let var = "DROMI_TEST_SECRET_MISSING_5127";
		std::env::set_var(format!("{var}_FILE"), "/nonexistent/dromi/secret");
		assert!(matches!(load_secret_env(var), Err(ConfigError::Secret(_))));
		std::env::remove_var(format!("{var}_FILE"));
	}

	#[test]
	fn missing_toml_file_is_skipped() {
		let source = TomlSource::new("/nonexistent/dromi/server.toml");
		let layer = source.load().unwrap();
		assert!(layer.http.is_none());
	}

	#[test]
	fn malformed_toml_is_reported_with_path() {
		let mut file = NamedTempFile::new().unwrap();
		writeln!(file, "[http\nport = ").unwrap();
		let err = TomlSource::new(file.path()).load().unwrap_err();
		assert!(matches!(err, ConfigError::TomlParse { .. }));
	}
}
