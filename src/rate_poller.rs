// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # Indicative Rate Poller
//!
//! Background task that refreshes every tracked currency pair in the
//! [`RateCache`] on a fixed interval, keeping the displayed rate current
//! while a swap form is open. There is no retry-with-backoff: a failed
//! sweep leaves the previous rate in place until the next tick.
//!
//! ## Shutdown
//!
//! Uses `tokio_util::sync::CancellationToken` for graceful shutdown.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::rates::RateCache;

/// Background rate poller refreshing tracked pairs from the exchange.
pub struct RatePoller {
    rates: Arc<RateCache>,
    poll_interval: Duration,
}

impl RatePoller {
    pub fn new(rates: Arc<RateCache>, poll_interval: Duration) -> Self {
        Self {
            rates,
            poll_interval,
        }
    }

    /// Run the poller loop until the cancellation token is triggered.
    ///
    /// Should be spawned as a background task:
    /// ```rust,ignore
    /// tokio::spawn(poller.run(shutdown.clone()));
    /// ```
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_secs = self.poll_interval.as_secs(),
            "Rate poller starting"
        );

        loop {
            if shutdown.is_cancelled() {
                info!("Rate poller shutting down");
                return;
            }

            self.rates.refresh_all().await;

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {},
                _ = shutdown.cancelled() => {
                    info!("Rate poller shutting down");
                    return;
                }
            }
        }
    }
}
