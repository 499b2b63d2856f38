// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Swap quotation endpoints: the discrete quote -> countdown -> confirm
//! path of the instant-swap flow.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::{Denomination, TradeResult};
use crate::state::AppState;
use crate::swap::quote::SwapSnapshot;

use super::map_swap_error;

/// Request body for creating a swap quotation.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSwapQuoteRequest {
    /// Source currency code.
    pub from_currency: String,
    /// Destination currency code.
    pub to_currency: String,
    /// Raw amount string as entered.
    pub amount: String,
    /// Unit of the amount; defaults to the source crypto.
    #[serde(default)]
    pub denomination: Denomination,
    /// Whether the referral discount applies.
    #[serde(default)]
    pub referred: bool,
}

/// Request a time-bounded quotation and start its countdown.
#[utoipa::path(
    post,
    path = "/v1/swap/quotes",
    tag = "Swap",
    request_body = CreateSwapQuoteRequest,
    responses(
        (status = 201, description = "Quotation issued, countdown running", body = SwapSnapshot),
        (status = 400, description = "Invalid input or trade-size limit violated"),
        (status = 422, description = "Amount too small after fees"),
        (status = 502, description = "Upstream quote request failed"),
        (status = 503, description = "Rate unavailable")
    )
)]
pub async fn create_swap_quote(
    State(state): State<AppState>,
    Json(request): Json<CreateSwapQuoteRequest>,
) -> Result<(StatusCode, Json<SwapSnapshot>), ApiError> {
    let snapshot = state
        .engine
        .request_quote(
            request.from_currency.into(),
            request.to_currency.into(),
            &request.amount,
            request.denomination,
            request.referred,
        )
        .await
        .map_err(map_swap_error)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

/// Get the countdown status of a swap flow.
///
/// After expiry the flow stays queryable for a retention window with the
/// entered amount preserved and the quotation cleared.
#[utoipa::path(
    get,
    path = "/v1/swap/quotes/{swap_id}",
    tag = "Swap",
    params(
        ("swap_id" = String, Path, description = "Swap flow ID")
    ),
    responses(
        (status = 200, description = "Current swap state", body = SwapSnapshot),
        (status = 404, description = "Swap not found")
    )
)]
pub async fn get_swap_quote(
    State(state): State<AppState>,
    Path(swap_id): Path<String>,
) -> Result<Json<SwapSnapshot>, ApiError> {
    state
        .engine
        .status(&swap_id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Swap not found"))
}

/// Confirm the quotation while its countdown is live.
#[utoipa::path(
    post,
    path = "/v1/swap/quotes/{swap_id}/confirm",
    tag = "Swap",
    params(
        ("swap_id" = String, Path, description = "Swap flow ID")
    ),
    responses(
        (status = 200, description = "Trade executed", body = TradeResult),
        (status = 404, description = "Swap not found"),
        (status = 409, description = "Confirmation already in progress"),
        (status = 410, description = "Quotation expired"),
        (status = 502, description = "Upstream confirmation failed")
    )
)]
pub async fn confirm_swap_quote(
    State(state): State<AppState>,
    Path(swap_id): Path<String>,
) -> Result<Json<TradeResult>, ApiError> {
    let result = state
        .engine
        .confirm(&swap_id)
        .await
        .map_err(map_swap_error)?;
    Ok(Json(result))
}

/// Cancel the quotation; identical cleanup to expiry without the expired
/// messaging.
#[utoipa::path(
    delete,
    path = "/v1/swap/quotes/{swap_id}",
    tag = "Swap",
    params(
        ("swap_id" = String, Path, description = "Swap flow ID")
    ),
    responses(
        (status = 204, description = "Swap cancelled"),
        (status = 404, description = "Swap not found")
    )
)]
pub async fn cancel_swap_quote(
    State(state): State<AppState>,
    Path(swap_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state
        .engine
        .cancel(&swap_id)
        .await
        .map_err(map_swap_error)?;
    Ok(StatusCode::NO_CONTENT)
}
