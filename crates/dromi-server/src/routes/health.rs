// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Root and health HTTP handlers.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use dromi_server_api::{HealthResponse, HealthStatus, MessageResponse};

use crate::api::AppState;

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Server is up", body = MessageResponse)
    ),
    tag = "health"
)]
/// GET / - Liveness greeting.
pub async fn root() -> Json<MessageResponse> {
	Json(MessageResponse::ok("Hello World"))
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
/// GET /health - Database connectivity check.
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
	match dromi_server_db::ping(&state.pool).await {
		Ok(()) => (
			StatusCode::OK,
			Json(HealthResponse {
				status: HealthStatus::Healthy,
			}),
		),
		Err(e) => {
			tracing::error!(error = %e, "health check failed");
			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(HealthResponse {
					status: HealthStatus::Unhealthy,
				}),
			)
		}
	}
}
