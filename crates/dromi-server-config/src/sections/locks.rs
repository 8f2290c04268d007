// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lock store configuration.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5000;

/// Lock store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockStoreKind {
	#[default]
	Memory,
	/// Recognised so configuration can name it; rejected at validation.
	Redis,
}

impl LockStoreKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			LockStoreKind::Memory => "memory",
			LockStoreKind::Redis => "redis",
		}
	}
}

impl fmt::Display for LockStoreKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for LockStoreKind {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"memory" => Ok(LockStoreKind::Memory),
			"redis" => Ok(LockStoreKind::Redis),
			other => Err(format!("unknown lock store '{other}' (expected memory)")),
		}
	}
}

/// Lock configuration (runtime, fully resolved).
#[derive(Debug, Clone)]
pub struct LocksConfig {
	pub store: LockStoreKind,
	pub acquire_timeout_ms: u64,
}

impl Default for LocksConfig {
	fn default() -> Self {
		Self {
			store: LockStoreKind::Memory,
			acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT_MS,
		}
	}
}

impl LocksConfig {
	pub fn acquire_timeout(&self) -> Duration {
		Duration::from_millis(self.acquire_timeout_ms)
	}
}

/// Lock configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocksConfigLayer {
	#[serde(default)]
	pub store: Option<String>,
	#[serde(default)]
	pub acquire_timeout_ms: Option<u64>,
}

impl LocksConfigLayer {
	pub fn merge(&mut self, other: LocksConfigLayer) {
		if other.store.is_some() {
			self.store = other.store;
		}
		if other.acquire_timeout_ms.is_some() {
			self.acquire_timeout_ms = other.acquire_timeout_ms;
		}
	}

	pub fn finalize(self) -> Result<LocksConfig, ConfigError> {
		let store = match self.store {
			Some(raw) => raw
				.parse()
				.map_err(|message: String| ConfigError::invalid("locks.store", message))?,
			None => LockStoreKind::default(),
		};

		Ok(LocksConfig {
			store,
			acquire_timeout_ms: self
				.acquire_timeout_ms
				.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_MS),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_defaults() {
		let config = LocksConfigLayer::default().finalize().unwrap();
		assert_eq!(config.store, LockStoreKind::Memory);
		assert_eq!(config.acquire_timeout(), Duration::from_secs(5));
	}

	#[test]
	fn test_redis_parses() {
		let layer = LocksConfigLayer {
			store: Some("REDIS".to_string()),
			..Default::default()
		};
		assert_eq!(layer.finalize().unwrap().store, LockStoreKind::Redis);
	}

	#[test]
	fn test_unknown_store_is_invalid() {
		let layer = LocksConfigLayer {
			store: Some("etcd".to_string()),
			..Default::default()
		};
		assert!(matches!(
			layer.finalize(),
			Err(ConfigError::InvalidValue { .. })
		));
	}
}
