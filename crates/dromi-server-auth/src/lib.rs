// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authentication and authorization primitives for dromi.
//!
//! This crate has no storage dependency. It provides:
//!
//! - **Identifiers**: [`UserId`], [`WorkspaceId`], [`TodoListId`] and friends, plus the
//!   generators behind them ([`generate_public_id`], [`generate_ordered_id`],
//!   [`generate_passphrase`])
//! - **Sessions**: the [`Session`] record, its 30-day lifetime with a 15-day sliding
//!   renewal window, token generation and keyed token-to-id derivation ([`SessionKey`])
//! - **Permissions**: [`PermissionFlags`], [`Resource`] and the pure evaluator
//!   [`evaluate_permissions`] over a [`MemberSnapshot`]
//! - **Credentials**: Argon2id password hashing
//! - **Cookies**: session cookie extraction and rendering ([`AuthConfig`])

mod argon2_config;
pub mod error;
pub mod generate;
pub mod middleware;
pub mod password;
pub mod permission;
pub mod session;
pub mod types;
pub mod user;

pub use error::AuthError;
pub use generate::{
	generate_ordered_id, generate_passphrase, generate_public_id, PASSPHRASE_WORDS,
	PUBLIC_ID_ALPHABET, PUBLIC_ID_LENGTH,
};
pub use middleware::{
	extract_session_cookie_with_name, AuthConfig, AuthContext, CurrentUser, SESSION_COOKIE_NAME,
};
pub use password::{hash_password, verify_password, verify_password_unknown_user};
pub use permission::{
	evaluate_permissions, MemberSnapshot, PermissionFlags, PermissionGrant, PermissionResult,
	RequiredPermission, Resource,
};
pub use session::{
	generate_session_token, Session, SessionKey, SessionState, SESSION_EXPIRY_DAYS,
	SESSION_RENEWAL_THRESHOLD_DAYS, SESSION_TOKEN_BYTES,
};
pub use types::{
	ItemLabelValueId, MemberId, PermissionId, SessionId, TodoItemId, TodoLabelId,
	TodoLabelValueId, TodoListId, UserId, WorkspaceId,
};
pub use user::User;
