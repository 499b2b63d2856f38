// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Read-mostly cache of wallet balances.
//!
//! Balances are read by several parts of the flow (form display, max-amount
//! lookup, post-confirm refresh) and refreshed wholesale after a confirmed
//! trade; there is no partial or optimistic update.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::warn;
use utoipa::ToSchema;

use crate::models::AccountBalance;
use crate::providers::{ExchangeApi, ExchangeError};

/// One wholesale fetch of the account's balances.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct BalanceSnapshot {
    pub balances: Vec<AccountBalance>,
    pub fetched_at: DateTime<Utc>,
}

pub struct BalanceCache {
    exchange: Arc<dyn ExchangeApi>,
    snapshot: RwLock<Option<BalanceSnapshot>>,
}

impl BalanceCache {
    pub fn new(exchange: Arc<dyn ExchangeApi>) -> Self {
        Self {
            exchange,
            snapshot: RwLock::new(None),
        }
    }

    /// Current snapshot, fetching on first use or when a refresh is forced.
    pub async fn get(&self, force_refresh: bool) -> Result<BalanceSnapshot, ExchangeError> {
        if !force_refresh {
            if let Some(snapshot) = self.snapshot.read().await.as_ref() {
                return Ok(snapshot.clone());
            }
        }
        self.refresh().await
    }

    /// Wholesale refresh from the exchange.
    ///
    /// On failure the previous snapshot stays in place and the error is
    /// returned to the caller.
    pub async fn refresh(&self) -> Result<BalanceSnapshot, ExchangeError> {
        let balances = self.exchange.fetch_balances().await?;
        let snapshot = BalanceSnapshot {
            balances,
            fetched_at: Utc::now(),
        };
        *self.snapshot.write().await = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Post-trade refresh; a failure here must not fail the trade, so it is
    /// logged and swallowed.
    pub async fn refresh_after_trade(&self) {
        if let Err(error) = self.refresh().await {
            warn!(error = %error, "balance refresh after trade failed; keeping previous snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::MockExchange;

    #[tokio::test]
    async fn get_fetches_once_then_serves_from_cache() {
        let exchange = Arc::new(MockExchange::default().with_balance("ngn", 50_000.0));
        let cache = BalanceCache::new(exchange.clone());

        let first = cache.get(false).await.unwrap();
        assert_eq!(first.balances.len(), 1);
        let second = cache.get(false).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(exchange.balance_calls(), 1);
    }

    #[tokio::test]
    async fn forced_refresh_replaces_the_snapshot_wholesale() {
        let exchange = Arc::new(MockExchange::default().with_balance("ngn", 50_000.0));
        let cache = BalanceCache::new(exchange.clone());
        cache.get(false).await.unwrap();

        exchange.set_balances(vec![
            AccountBalance {
                currency: "ngn".into(),
                balance: 10_000.0,
            },
            AccountBalance {
                currency: "usdt".into(),
                balance: 25.0,
            },
        ]);

        let refreshed = cache.get(true).await.unwrap();
        assert_eq!(refreshed.balances.len(), 2);
    }

    #[tokio::test]
    async fn failed_post_trade_refresh_keeps_previous_snapshot() {
        let exchange = Arc::new(MockExchange::default().with_balance("ngn", 50_000.0));
        let cache = BalanceCache::new(exchange.clone());
        let before = cache.get(false).await.unwrap();

        exchange.fail_balances();
        cache.refresh_after_trade().await;

        let after = cache.get(false).await.unwrap();
        assert_eq!(before, after);
    }
}
