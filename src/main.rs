// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

use std::{env, net::SocketAddr, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use trustbank_server::api::router;
use trustbank_server::config::SwapConfig;
use trustbank_server::providers::{quidax::QuidaxClient, ExchangeApi};
use trustbank_server::quote_sweeper::QuoteSweeper;
use trustbank_server::rate_poller::RatePoller;
use trustbank_server::state::AppState;
use trustbank_server::swap::fees::FeeConfig;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = SwapConfig::from_env();
    let exchange: Arc<dyn ExchangeApi> =
        Arc::new(QuidaxClient::from_env().expect("Failed to build exchange HTTP client"));
    if !QuidaxClient::is_configured() {
        warn!("QUIDAX_API_KEY is not set; upstream exchange calls will fail until it is provided");
    }

    // Hoist the fee configuration once; every component reads this object.
    let fee_config = match exchange.fetch_fee_config().await {
        Ok(fee_config) => fee_config,
        Err(error) => {
            warn!(error = %error, "fee-config fetch failed; using built-in defaults");
            FeeConfig::default()
        }
    };

    let state = AppState::new(exchange, fee_config, config);

    let shutdown = CancellationToken::new();
    tokio::spawn(
        RatePoller::new(state.rates.clone(), config.rate_poll_interval).run(shutdown.clone()),
    );
    tokio::spawn(QuoteSweeper::new(state.quotes.clone()).run(shutdown.clone()));

    let app = router(state);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    info!(
        %addr,
        quote_ttl_secs = config.quote_ttl_secs,
        "trustBank swap server listening (docs at /docs)"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to listen for shutdown signal");
            info!("Shutdown signal received");
            shutdown.cancel();
        })
        .await
        .expect("HTTP server failed");
}
