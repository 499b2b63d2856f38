// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Indicative rate endpoint.
//!
//! The figure served here is for display only; the price a trade actually
//! executes at is the quotation's own `quoted_price`.

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::models::CurrencyCode;
use crate::state::AppState;

/// Query parameters for a rate lookup.
#[derive(Debug, Deserialize, IntoParams)]
pub struct RateQuery {
    /// Source currency code (case-insensitive).
    pub from: String,
    /// Destination currency code (case-insensitive).
    pub to: String,
}

/// Indicative market rate for an ordered pair.
#[derive(Debug, Serialize, ToSchema)]
pub struct RateResponse {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    /// Destination units per source unit.
    pub rate: f64,
    /// When the rate was last fetched successfully.
    pub fetched_at: DateTime<Utc>,
    /// True when the most recent refresh failed and this is the last known
    /// value.
    pub stale: bool,
}

/// Get the current indicative rate for a currency pair.
#[utoipa::path(
    get,
    path = "/v1/rates",
    tag = "Rates",
    params(RateQuery),
    responses(
        (status = 200, description = "Current indicative rate", body = RateResponse),
        (status = 400, description = "Missing or empty currency code"),
        (status = 503, description = "Rate unavailable and no cached value")
    )
)]
pub async fn get_rate(
    State(state): State<AppState>,
    Query(query): Query<RateQuery>,
) -> Result<Json<RateResponse>, ApiError> {
    let from: CurrencyCode = query.from.into();
    let to: CurrencyCode = query.to.into();
    if from.is_empty() || to.is_empty() {
        return Err(ApiError::bad_request("from and to must be non-empty"));
    }

    let cached = state
        .rates
        .rate(&from, &to)
        .await
        .map_err(|e| ApiError::service_unavailable(e.to_string()))?;

    Ok(Json(RateResponse {
        from,
        to,
        rate: cached.rate,
        fetched_at: cached.fetched_at,
        stale: cached.stale,
    }))
}
