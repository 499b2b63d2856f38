// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Fee configuration and estimation endpoints (the continuous display
//! path of the swap form).

use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::models::Denomination;
use crate::state::AppState;
use crate::swap::fees::{FeeBreakdown, FeeConfig};

use super::map_swap_error;

/// Request body for a fee estimate.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FeeEstimateRequest {
    /// Raw amount string as entered in the form.
    pub amount: String,
    /// Asset being traded away.
    pub currency: String,
    /// Unit of the amount; defaults to the crypto itself.
    #[serde(default)]
    pub denomination: Denomination,
    /// Whether the referral discount applies.
    #[serde(default)]
    pub referred: bool,
}

/// Get the hoisted fee configuration (volume tiers, network fees, referral
/// discount).
#[utoipa::path(
    get,
    path = "/v1/fees/config",
    tag = "Fees",
    responses(
        (status = 200, description = "Shared fee configuration", body = FeeConfig)
    )
)]
pub async fn get_fee_config(State(state): State<AppState>) -> Json<FeeConfig> {
    Json(state.engine.fee_config().clone())
}

/// Estimate the fee for an amount as typed.
///
/// Unparsable or non-positive amounts return an all-zero breakdown rather
/// than an error, matching the live form behavior.
#[utoipa::path(
    post,
    path = "/v1/fees/estimate",
    tag = "Fees",
    request_body = FeeEstimateRequest,
    responses(
        (status = 200, description = "Fee breakdown for the amount", body = FeeBreakdown),
        (status = 503, description = "Rate unavailable for conversion")
    )
)]
pub async fn estimate_fee(
    State(state): State<AppState>,
    Json(request): Json<FeeEstimateRequest>,
) -> Result<Json<FeeBreakdown>, ApiError> {
    let breakdown = state
        .engine
        .estimate_fee(
            &request.amount,
            &request.currency.into(),
            request.denomination,
            request.referred,
        )
        .await
        .map_err(map_swap_error)?;
    Ok(Json(breakdown))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::MockExchange;
    use std::sync::Arc;

    #[tokio::test]
    async fn estimate_matches_the_worked_example() {
        let exchange = Arc::new(MockExchange::default().with_rate("usdt", "ngn", 1585.23));
        let state = AppState::for_tests(exchange);

        let response = estimate_fee(
            State(state),
            Json(FeeEstimateRequest {
                amount: "100".to_string(),
                currency: "usdt".to_string(),
                denomination: Denomination::Crypto,
                referred: false,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0.fee_percentage, 4.0);
        assert!((response.0.service_fee - 6_340.92).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_amount_estimates_to_zero_without_error() {
        let exchange = Arc::new(MockExchange::default().with_rate("usdt", "ngn", 1585.23));
        let state = AppState::for_tests(exchange);

        let response = estimate_fee(
            State(state),
            Json(FeeEstimateRequest {
                amount: String::new(),
                currency: "usdt".to_string(),
                denomination: Denomination::Crypto,
                referred: false,
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.0, FeeBreakdown::zero());
    }
}
