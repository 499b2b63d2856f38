// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! In-memory cache of indicative market rates.
//!
//! A pair becomes tracked the first time it is requested; the rate poller
//! then refreshes every tracked pair on its interval. A failed refresh
//! keeps the previous rate in place, marked stale, so callers degrade to
//! "last known" rather than zero.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use crate::models::CurrencyCode;
use crate::providers::{ExchangeApi, ExchangeError};

/// A cached market rate for one ordered pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CachedRate {
    /// Destination units per source unit.
    pub rate: f64,
    /// When this value was last fetched successfully.
    pub fetched_at: DateTime<Utc>,
    /// Set when the most recent refresh attempt failed.
    pub stale: bool,
}

pub struct RateCache {
    exchange: Arc<dyn ExchangeApi>,
    pairs: RwLock<HashMap<(CurrencyCode, CurrencyCode), CachedRate>>,
}

impl RateCache {
    pub fn new(exchange: Arc<dyn ExchangeApi>) -> Self {
        Self {
            exchange,
            pairs: RwLock::new(HashMap::new()),
        }
    }

    /// Current rate for a pair, fetching once if the pair is not yet
    /// tracked.
    ///
    /// An identity pair is 1 by convention. Failure means "rate unknown":
    /// callers must not substitute zero.
    pub async fn rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<CachedRate, ExchangeError> {
        if from == to {
            return Ok(CachedRate {
                rate: 1.0,
                fetched_at: Utc::now(),
                stale: false,
            });
        }

        let key = (from.clone(), to.clone());
        if let Some(cached) = self.pairs.read().await.get(&key) {
            return Ok(*cached);
        }

        let rate = self.exchange.fetch_rate(from, to).await?;
        let cached = CachedRate {
            rate,
            fetched_at: Utc::now(),
            stale: false,
        };
        self.pairs.write().await.insert(key, cached);
        Ok(cached)
    }

    /// Refresh every tracked pair once.
    ///
    /// Invoked by the rate poller on its interval. Failures leave the
    /// previous value in place until the next tick.
    pub async fn refresh_all(&self) {
        let tracked: Vec<(CurrencyCode, CurrencyCode)> =
            self.pairs.read().await.keys().cloned().collect();

        for (from, to) in tracked {
            match self.exchange.fetch_rate(&from, &to).await {
                Ok(rate) => {
                    self.pairs.write().await.insert(
                        (from, to),
                        CachedRate {
                            rate,
                            fetched_at: Utc::now(),
                            stale: false,
                        },
                    );
                }
                Err(error) => {
                    warn!(
                        from = %from,
                        to = %to,
                        error = %error,
                        "rate refresh failed; keeping last known rate"
                    );
                    if let Some(cached) = self.pairs.write().await.get_mut(&(from, to)) {
                        cached.stale = true;
                    }
                }
            }
        }
    }

    #[cfg(test)]
    pub async fn tracked_pairs(&self) -> usize {
        self.pairs.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::test_support::MockExchange;

    #[tokio::test]
    async fn identity_pair_is_one_without_a_network_call() {
        let exchange = Arc::new(MockExchange::default());
        let cache = RateCache::new(exchange.clone());

        let cached = cache.rate(&"ngn".into(), &"ngn".into()).await.unwrap();
        assert_eq!(cached.rate, 1.0);
        assert_eq!(exchange.rate_calls(), 0);
    }

    #[tokio::test]
    async fn first_request_fetches_and_tracks_the_pair() {
        let exchange = Arc::new(MockExchange::default().with_rate("usdt", "ngn", 1585.23));
        let cache = RateCache::new(exchange.clone());

        let cached = cache.rate(&"USDT".into(), &"ngn".into()).await.unwrap();
        assert_eq!(cached.rate, 1585.23);
        assert!(!cached.stale);
        assert_eq!(cache.tracked_pairs().await, 1);

        // Second request served from cache.
        cache.rate(&"usdt".into(), &"ngn".into()).await.unwrap();
        assert_eq!(exchange.rate_calls(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_known_rate_marked_stale() {
        let exchange = Arc::new(MockExchange::default().with_rate("btc", "ngn", 9.9e7));
        let cache = RateCache::new(exchange.clone());
        cache.rate(&"btc".into(), &"ngn".into()).await.unwrap();

        exchange.fail_rates();
        cache.refresh_all().await;

        let cached = cache.rate(&"btc".into(), &"ngn".into()).await.unwrap();
        assert_eq!(cached.rate, 9.9e7);
        assert!(cached.stale);
    }

    #[tokio::test]
    async fn unknown_pair_fetch_failure_is_rate_unavailable() {
        let exchange = Arc::new(MockExchange::default());
        exchange.fail_rates();
        let cache = RateCache::new(exchange);

        let result = cache.rate(&"btc".into(), &"ngn".into()).await;
        assert!(matches!(result, Err(ExchangeError::RateUnavailable(_))));
    }
}
