// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

use std::sync::Arc;

use crate::balances::BalanceCache;
use crate::config::SwapConfig;
use crate::providers::ExchangeApi;
use crate::rates::RateCache;
use crate::swap::engine::SwapEngine;
use crate::swap::fees::FeeConfig;
use crate::swap::quote::QuoteStore;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SwapEngine>,
    pub rates: Arc<RateCache>,
    pub quotes: Arc<QuoteStore>,
    pub balances: Arc<BalanceCache>,
}

impl AppState {
    /// Wire the swap core around an exchange implementation.
    ///
    /// The fee configuration is hoisted here once; every component reads
    /// from the same object.
    pub fn new(
        exchange: Arc<dyn ExchangeApi>,
        fee_config: FeeConfig,
        config: SwapConfig,
    ) -> Self {
        let rates = Arc::new(RateCache::new(exchange.clone()));
        let quotes = Arc::new(QuoteStore::new());
        let balances = Arc::new(BalanceCache::new(exchange.clone()));
        let engine = Arc::new(SwapEngine::new(
            exchange,
            rates.clone(),
            quotes.clone(),
            balances.clone(),
            fee_config,
            config,
        ));

        Self {
            engine,
            rates,
            quotes,
            balances,
        }
    }
}

#[cfg(test)]
impl AppState {
    pub fn for_tests(exchange: Arc<dyn ExchangeApi>) -> Self {
        Self::new(exchange, FeeConfig::default(), SwapConfig::default())
    }
}
