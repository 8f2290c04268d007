// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Keyed mutual exclusion for check-then-insert sequences.
//!
//! Handlers take a lock on the unique value they are about to claim (an email, a
//! workspace slug) before checking whether it is free, and hold it until the
//! insert commits. The guard releases on drop.
//!
//! ```ignore
//! let _guard = state.lock_store.acquire(&format!("workspace-slug:{slug}")).await?;
//! if state.workspace_repo.is_slug_taken(&slug).await? { ... }
//! state.workspace_repo.create_workspace_with_owner(&ws, &user_id).await?;
//! ```

use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum LockError {
	#[error("timed out acquiring lock {key}")]
	Timeout { key: String },
}

/// A held lock. Dropping it releases the key.
pub struct LockGuard {
	key: String,
	_held: Box<dyn Any + Send + Sync>,
}

impl LockGuard {
	/// Wrap backend-specific state whose drop releases `key`.
	pub fn new(key: impl Into<String>, held: impl Any + Send + Sync) -> Self {
		Self {
			key: key.into(),
			_held: Box::new(held),
		}
	}

	pub fn key(&self) -> &str {
		&self.key
	}
}

impl std::fmt::Debug for LockGuard {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LockGuard").field("key", &self.key).finish()
	}
}

#[async_trait]
pub trait LockStore: Send + Sync {
	/// Wait for `key`, bounded by the store's acquire timeout.
	async fn acquire(&self, key: &str) -> Result<LockGuard, LockError>;
}

type KeyMap = Arc<Mutex<HashMap<String, Arc<AsyncMutex<()>>>>>;

/// In-process lock store: one `tokio::sync::Mutex` per live key.
#[derive(Clone)]
pub struct MemoryLockStore {
	keys: KeyMap,
	acquire_timeout: Duration,
}

impl MemoryLockStore {
	pub fn new(acquire_timeout: Duration) -> Self {
		Self {
			keys: Arc::new(Mutex::new(HashMap::new())),
			acquire_timeout,
		}
	}

	/// Keys currently held or waited on.
	pub fn active_keys(&self) -> usize {
		self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	fn entry(&self, key: &str) -> Arc<AsyncMutex<()>> {
		let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
		keys
			.entry(key.to_string())
			.or_insert_with(|| Arc::new(AsyncMutex::new(())))
			.clone()
	}
}

/// Releases the mutex, then drops the map entry if nobody else references it.
struct MemoryRelease {
	guard: Option<OwnedMutexGuard<()>>,
	key: String,
	keys: KeyMap,
}

impl Drop for MemoryRelease {
	fn drop(&mut self) {
		drop(self.guard.take());
		prune_if_idle(&self.keys, &self.key);
	}
}

fn prune_if_idle(keys: &KeyMap, key: &str) {
	let mut keys = keys.lock().unwrap_or_else(PoisonError::into_inner);
	if let Some(entry) = keys.get(key) {
		// Only the map still holds it.
		if Arc::strong_count(entry) == 1 {
			keys.remove(key);
		}
	}
}

#[async_trait]
impl LockStore for MemoryLockStore {
	#[tracing::instrument(skip(self), fields(timeout_ms = self.acquire_timeout.as_millis() as u64))]
	async fn acquire(&self, key: &str) -> Result<LockGuard, LockError> {
		let mutex = self.entry(key);
		let release = |guard| MemoryRelease {
			guard: Some(guard),
			key: key.to_string(),
			keys: self.keys.clone(),
		};

		// The timed-out future must be dropped before pruning, or its handle on
		// the entry keeps it alive.
		let acquired = tokio::time::timeout(self.acquire_timeout, mutex.lock_owned()).await;
		match acquired {
			Ok(guard) => {
				tracing::debug!("lock acquired");
				Ok(LockGuard::new(key, release(guard)))
			}
			Err(_) => {
				tracing::warn!("lock acquire timed out");
				prune_if_idle(&self.keys, key);
				Err(LockError::Timeout {
					key: key.to_string(),
				})
			}
		}
	}
}
