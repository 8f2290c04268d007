// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Identifier newtypes.
//!
//! Two id families exist:
//!
//! - **Public ids** ([`UserId`], [`WorkspaceId`], [`MemberId`], [`PermissionId`]) are
//!   21-character strings over an unambiguous alphabet, safe to show in URLs.
//! - **Ordered ids** ([`TodoListId`], [`TodoItemId`], [`TodoLabelId`],
//!   [`TodoLabelValueId`], [`ItemLabelValueId`]) are UUID v7 strings that sort by
//!   creation time.
//!
//! [`SessionId`] is neither: it is derived from the session token and never
//! generated on its own.
//!
//! All ids serialize transparently as strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::generate::{generate_ordered_id, generate_public_id};

macro_rules! define_id_type {
	($name:ident, generated_by $generator:path, $doc:expr) => {
		define_id_type!($name, $doc);

		impl $name {
			/// Generate a fresh id.
			pub fn generate() -> Self {
				Self($generator())
			}
		}
	};
	($name:ident, $doc:expr) => {
		#[doc = $doc]
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(String);

		impl $name {
			/// Wrap an existing id string.
			pub fn new(id: impl Into<String>) -> Self {
				Self(id.into())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn into_inner(self) -> String {
				self.0
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl From<String> for $name {
			fn from(id: String) -> Self {
				Self(id)
			}
		}

		impl From<&str> for $name {
			fn from(id: &str) -> Self {
				Self(id.to_string())
			}
		}

		impl From<$name> for String {
			fn from(id: $name) -> Self {
				id.0
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}
	};
}

// =============================================================================
// Public ids
// =============================================================================

define_id_type!(UserId, generated_by generate_public_id, "Unique identifier for a user.");
define_id_type!(WorkspaceId, generated_by generate_public_id, "Unique identifier for a workspace.");
define_id_type!(
	MemberId,
	generated_by generate_public_id,
	"Unique identifier for a workspace membership."
);
define_id_type!(
	PermissionId,
	generated_by generate_public_id,
	"Unique identifier for a stored permission row."
);

// =============================================================================
// Ordered ids
// =============================================================================

define_id_type!(TodoListId, generated_by generate_ordered_id, "Unique identifier for a todo list.");
define_id_type!(TodoItemId, generated_by generate_ordered_id, "Unique identifier for a todo item.");
define_id_type!(TodoLabelId, generated_by generate_ordered_id, "Unique identifier for a todo label.");
define_id_type!(
	TodoLabelValueId,
	generated_by generate_ordered_id,
	"Unique identifier for one selectable value of a label."
);
define_id_type!(
	ItemLabelValueId,
	generated_by generate_ordered_id,
	"Unique identifier for a label value applied to an item."
);

// =============================================================================
// Derived ids
// =============================================================================

define_id_type!(
	SessionId,
	"Session identifier: the keyed hash of a session token, never the token itself."
);
