// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Wallet balance endpoint, proxying the upstream exchange through the
//! read-mostly cache.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::balances::BalanceSnapshot;
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for the balance listing.
#[derive(Debug, Deserialize, IntoParams)]
pub struct BalanceQuery {
    /// Force a wholesale refresh instead of serving the cached snapshot.
    #[serde(default)]
    pub refresh: bool,
}

/// List wallet balances for the account.
#[utoipa::path(
    get,
    path = "/v1/balances",
    tag = "Balances",
    params(BalanceQuery),
    responses(
        (status = 200, description = "Wallet balances", body = BalanceSnapshot),
        (status = 503, description = "Exchange unavailable and no cached snapshot")
    )
)]
pub async fn list_balances(
    State(state): State<AppState>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<BalanceSnapshot>, ApiError> {
    let snapshot = state
        .balances
        .get(query.refresh)
        .await
        .map_err(|e| ApiError::service_unavailable(format!("Failed to fetch balances: {e}")))?;
    Ok(Json(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::MockExchange;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn lists_balances_from_the_exchange() {
        let exchange = Arc::new(
            MockExchange::default()
                .with_balance("ngn", 50_000.0)
                .with_balance("usdt", 12.5),
        );
        let state = AppState::for_tests(exchange);

        let response = list_balances(State(state), Query(BalanceQuery { refresh: false }))
            .await
            .unwrap();
        assert_eq!(response.0.balances.len(), 2);
    }

    #[tokio::test]
    async fn outage_without_cache_is_service_unavailable() {
        let exchange = Arc::new(MockExchange::default());
        exchange.fail_balances();
        let state = AppState::for_tests(exchange);

        let error = list_balances(State(state), Query(BalanceQuery { refresh: false }))
            .await
            .unwrap_err();
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
