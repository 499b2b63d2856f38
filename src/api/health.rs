// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::providers::quidax::QuidaxClient;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status.
    pub status: String,
    /// Individual health checks and their results.
    pub checks: HealthChecks,
}

/// Individual health check results.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// Whether the upstream exchange credentials are configured.
    pub exchange: String,
}

/// Simple liveness response.
#[derive(Debug, Serialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
}

/// Health check endpoint handler.
///
/// Reports `degraded` (still 200) when exchange credentials are missing so
/// a misconfigured deployment is visible without failing probes.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    let exchange_configured = QuidaxClient::is_configured();
    Json(HealthResponse {
        status: if exchange_configured { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            exchange: if exchange_configured {
                "ok"
            } else {
                "unconfigured"
            }
            .to_string(),
        },
    })
}

/// Liveness probe handler.
///
/// Always returns 200 if the process is running; does not check
/// dependencies.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = LivenessResponse)
    )
)]
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
    })
}
