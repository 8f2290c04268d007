// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Redacting wrapper for secret configuration values.
//!
//! [`SecretString`] never prints its contents through `Debug` or `Display`, so a
//! config struct can be logged whole. The buffer is zeroed on drop. Reading the
//! value requires an explicit [`SecretString::expose`].

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The placeholder printed instead of a secret.
pub const REDACTED: &str = "[REDACTED]";

#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretString {
	inner: String,
}

impl SecretString {
	pub fn new(inner: impl Into<String>) -> Self {
		Self {
			inner: inner.into(),
		}
	}

	pub fn expose(&self) -> &str {
		&self.inner
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}
}

impl fmt::Debug for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("SecretString").field(&REDACTED).finish()
	}
}

impl fmt::Display for SecretString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	#[test]
	fn expose_returns_value() {
		let secret = SecretString::new("hunter2");
		assert_eq!(secret.expose(), "hunter2");
		assert_eq!(secret.len(), 7);
	}

	proptest! {
		#[test]
		fn formatting_never_leaks(value in "[a-z0-9]{8,64}") {
			let secret = SecretString::new(value.clone());
			let debug = format!("{secret:?}");
			let display = format!("{secret}");
			prop_assert!(!debug.contains(&value));
			prop_assert_eq!(display, REDACTED);
		}
	}
}
