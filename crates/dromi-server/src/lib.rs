// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! dromi HTTP server.
//!
//! Serves the workspace, todo list, item and label API over SQLite, with
//! session-cookie authentication and per-workspace permission checks.

pub mod api;
pub mod api_docs;
pub mod auth_middleware;
pub mod authz;
pub mod error;
pub mod extract;
pub mod locks;
pub mod routes;
pub mod typed_router;
pub mod validation;

pub use api::{cors_layer, create_app_state, create_router, AppState};
pub use api_docs::ApiDoc;
pub use dromi_server_config::ServerConfig;
pub use error::ServerError;
pub use locks::{LockError, LockGuard, LockStore, MemoryLockStore};
pub use typed_router::{AuthedRouter, OptionalAuthRouter, PublicRouter};
