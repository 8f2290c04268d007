// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for dromi-server.

pub mod auth;
pub mod database;
pub mod http;
pub mod locks;
pub mod logging;

pub use auth::{
	AuthConfig, AuthConfigLayer, Environment, DEV_SESSION_SECRET, MIN_PRODUCTION_SECRET_BYTES,
};
pub use database::{DatabaseConfig, DatabaseConfigLayer};
pub use http::{HttpConfig, HttpConfigLayer};
pub use locks::{LockStoreKind, LocksConfig, LocksConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
