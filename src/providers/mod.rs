// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Upstream exchange integrations.
//!
//! The swap core talks to the exchange through the [`ExchangeApi`] trait so
//! the quotation flow can be driven by a mock in tests. The production
//! implementation is [`quidax::QuidaxClient`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AccountBalance, CurrencyCode, TradeResult};
use crate::swap::fees::FeeConfig;

pub mod quidax;

/// Errors returned by upstream exchange calls.
///
/// The variants mirror the failure taxonomy of the swap flow: rate lookups
/// degrade gracefully, quote and confirm failures are surfaced to the user
/// for manual retry.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("exchange configuration missing: {0}")]
    MissingConfig(String),

    #[error("rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("quote request failed: {0}")]
    QuoteRequestFailed(String),

    #[error("trade confirmation failed: {0}")]
    ConfirmFailed(String),

    #[error("exchange request failed: {0}")]
    Request(String),

    #[error("exchange response was invalid: {0}")]
    InvalidResponse(String),
}

/// A time-bounded price commitment issued by the upstream exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteResponse {
    /// Upstream quotation identifier.
    pub id: String,
    /// Destination units per source unit, as committed by the exchange.
    pub quoted_price: f64,
    /// Source amount the quote covers.
    pub from_amount: f64,
    /// Destination amount the exchange will deliver.
    pub to_amount: f64,
    /// Upstream expiry timestamp, when provided.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Interface to the upstream exchange consumed by the swap core.
#[async_trait]
pub trait ExchangeApi: Send + Sync {
    /// Fetch the current market rate for an ordered currency pair.
    ///
    /// A failure means "rate unknown", never zero; callers keep the last
    /// known rate in place.
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ExchangeError>;

    /// Request a time-bounded quotation for a swap.
    async fn request_quote(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        from_amount: f64,
    ) -> Result<QuoteResponse, ExchangeError>;

    /// Execute a previously issued quotation.
    ///
    /// The idempotency key is generated client-side per quotation so a
    /// retried confirm on network ambiguity cannot double-submit.
    async fn confirm_quote(
        &self,
        quotation_id: &str,
        idempotency_key: Uuid,
    ) -> Result<TradeResult, ExchangeError>;

    /// Fetch all wallet balances for the account.
    async fn fetch_balances(&self) -> Result<Vec<AccountBalance>, ExchangeError>;

    /// Fetch the hoisted fee configuration (volume tiers, network fees,
    /// referral discount).
    async fn fetch_fee_config(&self) -> Result<FeeConfig, ExchangeError>;
}
