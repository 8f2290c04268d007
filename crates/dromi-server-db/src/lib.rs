// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! # dromi-server-db
//!
//! Persistence layer for the dromi server using SQLite via sqlx.
//!
//! ## Repository Pattern
//!
//! Each domain has two components:
//! - **`*Store` trait**: the interface handlers and services depend on
//! - **`*Repository` struct**: the implementation holding a `SqlitePool`
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait FooStore: Send + Sync {
//!     async fn get_foo(&self, id: &FooId) -> Result<Option<Foo>, DbError>;
//! }
//!
//! #[async_trait]
//! impl FooStore for FooRepository { /* delegate to inherent methods */ }
//! ```
//!
//! ## Error Handling
//!
//! | Variant | When to use |
//! |---------|-------------|
//! | `NotFound` | An update targeted a row that must exist |
//! | `Conflict` | Unique constraint violation (slug, email, username, applied label) |
//! | `Sqlx` | Anything else from the driver, propagated via `?` |
//! | `Internal` | Stored data that does not parse (timestamps, enums) |
//!
//! Lookups where absence is normal return `Result<Option<T>>`. Deletes return
//! `Result<bool>`.
//!
//! ## Timestamps
//!
//! All timestamps are stored as RFC 3339 strings with microsecond precision.
//!
//! ## Testing
//!
//! Tests run against in-memory SQLite with the real migrations applied. Enable the
//! `testing` feature to reach the same helpers from other crates:
//!
//! ```rust,ignore
//! let pool = dromi_server_db::testing::create_migrated_test_pool().await;
//! let repo = WorkspaceRepository::new(pool);
//! ```

mod error;
pub mod label;
pub mod membership;
pub mod migrate;
pub mod pool;
pub mod session;
pub mod todo;
mod types;
pub mod user;
pub mod workspace;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{DbError, Result};
pub use label::{
	ItemLabelValue, LabelRepository, LabelStore, LabelType, LabelWithValues, NewLabelValue,
	TodoLabel, TodoLabelValue,
};
pub use membership::{MemberWithUser, MembershipRepository, MembershipStore};
pub use migrate::run_migrations;
pub use pool::{create_pool, ping};
pub use session::{SessionRepository, SessionStore};
pub use todo::{
	TodoItem, TodoList, TodoListSummary, TodoPriority, TodoRepository, TodoState, TodoStore,
};
pub use user::{UserCredentials, UserRepository, UserStore};
pub use workspace::{
	Workspace, WorkspaceMember, WorkspaceRepository, WorkspaceStore, WorkspaceSummary,
};
