// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    balances::BalanceSnapshot,
    error::ApiError,
    models::{AccountBalance, CurrencyCode, Denomination, TradeResult},
    state::AppState,
    swap::engine::SwapError,
    swap::fees::{FeeBreakdown, FeeConfig, VolumeTier},
    swap::form::SwapFormState,
    swap::quote::{Quotation, SwapSnapshot, SwapStatus},
};

pub mod balances;
pub mod fees;
pub mod health;
pub mod rates;
pub mod swap;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/rates", get(rates::get_rate))
        .route("/fees/config", get(fees::get_fee_config))
        .route("/fees/estimate", post(fees::estimate_fee))
        .route("/balances", get(balances::list_balances))
        .route("/swap/quotes", post(swap::create_swap_quote))
        .route(
            "/swap/quotes/{swap_id}",
            get(swap::get_swap_quote).delete(swap::cancel_swap_quote),
        )
        .route(
            "/swap/quotes/{swap_id}/confirm",
            post(swap::confirm_swap_quote),
        )
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

/// Map swap-core failures onto HTTP statuses.
///
/// Validation stays client-side (400), expiry is 410 so the UI can show the
/// "quote expired" notice, double confirms are 409, and upstream failures
/// split into 502 (rejected) versus 503 (unreachable rate source).
pub(crate) fn map_swap_error(error: SwapError) -> ApiError {
    match error {
        SwapError::Validation(message) => ApiError::bad_request(message),
        SwapError::RateUnavailable(message) => ApiError::service_unavailable(message),
        SwapError::QuoteRequestFailed(message) => ApiError::bad_gateway(message),
        SwapError::ConfirmFailed(message) => ApiError::bad_gateway(message),
        SwapError::QuoteExpired => ApiError::gone(error.to_string()),
        SwapError::AlreadyConfirming => ApiError::conflict(error.to_string()),
        SwapError::NotFound => ApiError::not_found(error.to_string()),
        SwapError::AmountTooSmallAfterFees => ApiError::unprocessable(error.to_string()),
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        rates::get_rate,
        fees::get_fee_config,
        fees::estimate_fee,
        balances::list_balances,
        swap::create_swap_quote,
        swap::get_swap_quote,
        swap::confirm_swap_quote,
        swap::cancel_swap_quote
    ),
    components(
        schemas(
            CurrencyCode,
            Denomination,
            AccountBalance,
            TradeResult,
            FeeConfig,
            VolumeTier,
            FeeBreakdown,
            SwapFormState,
            Quotation,
            SwapStatus,
            SwapSnapshot,
            BalanceSnapshot,
            rates::RateResponse,
            fees::FeeEstimateRequest,
            swap::CreateSwapQuoteRequest,
            health::HealthResponse,
            health::HealthChecks,
            health::LivenessResponse
        )
    ),
    tags(
        (name = "Health", description = "Service health probes"),
        (name = "Rates", description = "Indicative market rates"),
        (name = "Fees", description = "Fee configuration and estimates"),
        (name = "Balances", description = "Wallet balances"),
        (name = "Swap", description = "Instant swap quotations")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::MockExchange;
    use axum::http::StatusCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let state = AppState::for_tests(Arc::new(MockExchange::default()));
        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }

    #[tokio::test]
    async fn every_response_carries_a_request_id() {
        use tower::ServiceExt;

        let state = AppState::for_tests(Arc::new(MockExchange::default()));
        let app = router(state);

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health/live")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn swap_errors_map_to_the_documented_statuses() {
        assert_eq!(
            map_swap_error(SwapError::Validation("bad".into())).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            map_swap_error(SwapError::QuoteExpired).status,
            StatusCode::GONE
        );
        assert_eq!(
            map_swap_error(SwapError::AlreadyConfirming).status,
            StatusCode::CONFLICT
        );
        assert_eq!(
            map_swap_error(SwapError::AmountTooSmallAfterFees).status,
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            map_swap_error(SwapError::ConfirmFailed("down".into())).status,
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            map_swap_error(SwapError::RateUnavailable("down".into())).status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
