// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use serde::{Deserialize, Deserializer, Serialize};

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// A bare `{ success, message }` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct MessageResponse {
	pub success: bool,
	pub message: String,
}

impl MessageResponse {
	pub fn ok(message: impl Into<String>) -> Self {
		Self {
			success: true,
			message: message.into(),
		}
	}
}

/// Body of every failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ErrorResponse {
	/// Always `false`.
	pub success: bool,
	pub message: String,
}

impl ErrorResponse {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			success: false,
			message: message.into(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
	Healthy,
	Unhealthy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
	pub status: HealthStatus,
}

/// Deserialize a present field (including `null`) as `Some`, so
/// `Option<Option<T>>` can tell "absent" from "cleared".
pub(crate) fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
	T: Deserialize<'de>,
	D: Deserializer<'de>,
{
	T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn error_response_shape() {
		let json = serde_json::to_value(ErrorResponse::new("Workspace not found")).unwrap();
		assert_eq!(
			json,
			serde_json::json!({"success": false, "message": "Workspace not found"})
		);
	}

	#[test]
	fn health_status_is_lowercase() {
		let json = serde_json::to_value(HealthResponse {
			status: HealthStatus::Unhealthy,
		})
		.unwrap();
		assert_eq!(json, serde_json::json!({"status": "unhealthy"}));
	}
}
