// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # Quote Countdown Sweeper
//!
//! Background task driving every live quotation's countdown at 1 Hz. Each
//! sweep decrements the active countdowns; quotations that reach zero are
//! expired (amount preserved, quotation discarded) and logged so the event
//! is visible server-side as well as in the UI.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::swap::quote::QuoteStore;

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Background sweeper expiring stale quotations.
pub struct QuoteSweeper {
    quotes: Arc<QuoteStore>,
}

impl QuoteSweeper {
    pub fn new(quotes: Arc<QuoteStore>) -> Self {
        Self { quotes }
    }

    /// Run the 1 Hz sweep loop until the cancellation token is triggered.
    pub async fn run(self, shutdown: CancellationToken) {
        info!("Quote sweeper starting");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(TICK_INTERVAL) => {},
                _ = shutdown.cancelled() => {
                    info!("Quote sweeper shutting down");
                    return;
                }
            }

            for swap_id in self.quotes.sweep().await {
                info!(swap_id = %swap_id, "quotation expired before confirmation");
            }
        }
    }
}
