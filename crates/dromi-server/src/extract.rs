// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request extractors.

use axum::{
	extract::{FromRequest, Request},
	Json,
};
use serde::de::DeserializeOwned;

use crate::error::ServerError;

/// JSON body extractor whose rejection is a [`ServerError::BadRequest`].
///
/// Malformed bodies render in the same `{success, message}` envelope as every
/// other failure instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
	T: DeserializeOwned,
	S: Send + Sync,
{
	type Rejection = ServerError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		match Json::<T>::from_request(req, state).await {
			Ok(Json(value)) => Ok(ApiJson(value)),
			Err(rejection) => {
				tracing::debug!(error = %rejection.body_text(), "rejected request body");
				Err(ServerError::BadRequest(format!(
					"Bad Request: {}",
					rejection.body_text()
				)))
			}
		}
	}
}
