// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration management for the dromi server.
//!
//! This crate provides:
//! - Layered configuration from multiple sources (defaults, TOML file, environment)
//! - Type-safe configuration with validation
//! - Consistent environment variable naming (`DROMI_SERVER_*`)
//! - Secrets that redact themselves in logs ([`SecretString`])
//!
//! # Usage
//!
//! ```ignore
//! use dromi_server_config::load_config;
//!
//! let config = load_config()?;
//! println!("Server listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod secret;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use secret::SecretString;
pub use sections::*;
pub use sources::{
	load_secret_env, ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource,
	CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};

use tracing::{debug, info, warn};

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub locks: LocksConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	/// Get the socket address string for binding.
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`DROMI_SERVER_*`)
/// 2. Config file (`DROMI_SERVER_CONFIG`, default `/etc/dromi/server.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		let layer = source.load()?;
		merged.merge(layer);
	}

	finalize(merged)
}

/// Finalize configuration layer into resolved config.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize()?;
	let locks = layer.locks.unwrap_or_default().finalize()?;
	let logging = layer.logging.unwrap_or_default().finalize();

	validate_config(&auth, &locks)?;

	info!(
		host = %http.host,
		port = http.port,
		database = %database.url,
		environment = %auth.environment,
		signups_disabled = auth.signups_disabled,
		lock_store = %locks.store,
		"Server configuration loaded"
	);

	Ok(ServerConfig {
		http,
		database,
		auth,
		locks,
		logging,
	})
}

/// Validate cross-field configuration rules.
fn validate_config(auth: &AuthConfig, locks: &LocksConfig) -> Result<(), ConfigError> {
	if locks.store == LockStoreKind::Redis {
		return Err(ConfigError::Validation(
			"DROMI_SERVER_LOCK_STORE=redis is not supported; use memory".to_string(),
		));
	}

	match (&auth.session_secret, auth.environment.is_production()) {
		(None, true) => {
			return Err(ConfigError::MissingEnvVar(
				"DROMI_SERVER_SESSION_SECRET (or DROMI_SERVER_SESSION_SECRET_FILE) is required in production"
					.to_string(),
			));
		}
		(Some(secret), true) if secret.len() < MIN_PRODUCTION_SECRET_BYTES => {
			return Err(ConfigError::Validation(format!(
				"DROMI_SERVER_SESSION_SECRET must be at least {MIN_PRODUCTION_SECRET_BYTES} bytes in production"
			)));
		}
		(None, false) => {
			warn!(
				environment = %auth.environment,
				"no session secret configured, using the development secret"
			);
		}
		_ => {}
	}

	Ok(())
}
