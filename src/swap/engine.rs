// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # Swap Engine
//!
//! Composes the swap flow end to end: input validation, denomination
//! conversion, trade-size limits, fee calculation, quotation request,
//! countdown registration, and guarded confirmation.
//!
//! The continuous path (indicative rate + fee estimate, recomputed as the
//! user types) never talks to the quotation endpoint; the discrete path
//! (quote -> countdown -> confirm) uses the quotation's own price as the
//! authoritative preview figure.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::balances::BalanceCache;
use crate::config::SwapConfig;
use crate::models::{CurrencyCode, Denomination, TradeResult};
use crate::providers::{ExchangeApi, ExchangeError};
use crate::rates::RateCache;
use crate::swap::fees::{compute_fee, FeeBreakdown, FeeConfig};
use crate::swap::form::SwapFormState;
use crate::swap::quote::{ConfirmGuardError, Quotation, QuoteStore, SwapSnapshot};

/// Minimum NGN-equivalent value accepted for any swap.
const MIN_NGN_TRADE_VALUE: f64 = 1_000.0;

/// Per-asset trade-size bounds in native crypto units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetLimit {
    pub min: f64,
    pub max: f64,
}

/// Static per-asset minimum/maximum trade sizes.
///
/// Hoisted into one table; the source product re-declared these per screen.
/// Assets absent from the table are bounded only by the NGN minimum.
#[derive(Debug, Clone)]
pub struct TradeLimits {
    limits: HashMap<&'static str, AssetLimit>,
}

impl Default for TradeLimits {
    fn default() -> Self {
        let mut limits = HashMap::new();
        limits.insert("btc", AssetLimit { min: 0.0001, max: 5.0 });
        limits.insert("eth", AssetLimit { min: 0.001, max: 100.0 });
        limits.insert(
            "usdt",
            AssetLimit {
                min: 1.0,
                max: 100_000.0,
            },
        );
        limits.insert(
            "ngn",
            AssetLimit {
                min: 100.0,
                max: 100_000_000.0,
            },
        );
        Self { limits }
    }
}

impl TradeLimits {
    pub fn for_asset(&self, asset: &CurrencyCode) -> Option<AssetLimit> {
        self.limits.get(asset.as_str()).copied()
    }
}

/// Failure taxonomy of the swap flow.
///
/// Validation failures never reach the network; upstream failures are
/// surfaced for manual retry.
#[derive(Debug, thiserror::Error)]
pub enum SwapError {
    #[error("{0}")]
    Validation(String),

    #[error("rate unavailable: {0}")]
    RateUnavailable(String),

    #[error("quote request failed: {0}")]
    QuoteRequestFailed(String),

    #[error("trade confirmation failed: {0}")]
    ConfirmFailed(String),

    #[error("quotation has expired; request a fresh quote")]
    QuoteExpired,

    #[error("confirmation already in progress for this quotation")]
    AlreadyConfirming,

    #[error("swap not found")]
    NotFound,

    #[error("amount too small after fees")]
    AmountTooSmallAfterFees,
}

// =============================================================================
// Denomination Conversion
// =============================================================================

/// Convert an entered amount to units of the source crypto.
///
/// `crypto_ngn_rate` is NGN per source-crypto unit; `usd_ngn_rate` is NGN
/// per USD (via the USDT cross).
pub fn to_crypto_amount(
    amount: f64,
    denomination: Denomination,
    crypto_ngn_rate: f64,
    usd_ngn_rate: f64,
) -> f64 {
    match denomination {
        Denomination::Crypto => amount,
        Denomination::Ngn => amount / crypto_ngn_rate,
        Denomination::Usd => amount * usd_ngn_rate / crypto_ngn_rate,
    }
}

/// NGN-equivalent of a crypto amount at the current rate.
pub fn crypto_to_ngn(amount: f64, crypto_ngn_rate: f64) -> f64 {
    amount * crypto_ngn_rate
}

// =============================================================================
// Engine
// =============================================================================

pub struct SwapEngine {
    exchange: Arc<dyn ExchangeApi>,
    rates: Arc<RateCache>,
    quotes: Arc<QuoteStore>,
    balances: Arc<BalanceCache>,
    fee_config: FeeConfig,
    limits: TradeLimits,
    config: SwapConfig,
}

impl SwapEngine {
    pub fn new(
        exchange: Arc<dyn ExchangeApi>,
        rates: Arc<RateCache>,
        quotes: Arc<QuoteStore>,
        balances: Arc<BalanceCache>,
        fee_config: FeeConfig,
        config: SwapConfig,
    ) -> Self {
        Self {
            exchange,
            rates,
            quotes,
            balances,
            fee_config,
            limits: TradeLimits::default(),
            config,
        }
    }

    pub fn fee_config(&self) -> &FeeConfig {
        &self.fee_config
    }

    /// Fee estimate for the continuous display path.
    ///
    /// An unparsable or non-positive amount is not an error here: the form
    /// simply shows a zero fee until the input becomes a real number.
    pub async fn estimate_fee(
        &self,
        raw_amount: &str,
        from_currency: &CurrencyCode,
        denomination: Denomination,
        referred: bool,
    ) -> Result<FeeBreakdown, SwapError> {
        let Some(amount) = parse_positive_amount(raw_amount) else {
            return Ok(FeeBreakdown::zero());
        };

        let usd_ngn = self.reference_rate().await?;
        let crypto_ngn = self.pair_ngn_rate(from_currency).await?;

        let crypto_amount = to_crypto_amount(amount, denomination, crypto_ngn, usd_ngn);
        let ngn_value = crypto_to_ngn(crypto_amount, crypto_ngn);
        let usd_notional = ngn_value / usd_ngn;

        Ok(compute_fee(
            &self.fee_config,
            ngn_value,
            usd_notional,
            from_currency,
            referred,
        ))
    }

    /// Discrete path step one: validate, convert, check limits and fees,
    /// request an upstream quotation, and start its countdown.
    pub async fn request_quote(
        &self,
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        raw_amount: &str,
        denomination: Denomination,
        referred: bool,
    ) -> Result<SwapSnapshot, SwapError> {
        let amount = validate_request(&from_currency, &to_currency, raw_amount)?;

        let usd_ngn = self.reference_rate().await?;
        let crypto_ngn = self.pair_ngn_rate(&from_currency).await?;

        let crypto_amount = to_crypto_amount(amount, denomination, crypto_ngn, usd_ngn);
        let ngn_value = crypto_to_ngn(crypto_amount, crypto_ngn);

        self.check_limits(&from_currency, crypto_amount, ngn_value)?;

        let usd_notional = ngn_value / usd_ngn;
        let fee = compute_fee(
            &self.fee_config,
            ngn_value,
            usd_notional,
            &from_currency,
            referred,
        );
        if fee.total_fee >= ngn_value {
            return Err(SwapError::AmountTooSmallAfterFees);
        }

        let response = self
            .exchange
            .request_quote(&from_currency, &to_currency, crypto_amount)
            .await
            .map_err(map_quote_error)?;

        let quotation = Quotation::from_response(
            response,
            from_currency.clone(),
            to_currency.clone(),
            self.config.quote_ttl_secs,
        );

        let mut form = SwapFormState::new(from_currency, to_currency, raw_amount, denomination);
        form.attach_quotation(quotation);

        let snapshot = self
            .quotes
            .insert(form, fee, self.config.quote_ttl_secs)
            .await;

        info!(
            swap_id = %snapshot.swap_id,
            seconds_remaining = snapshot.seconds_remaining,
            "swap quotation issued"
        );
        Ok(snapshot)
    }

    /// Countdown status for UI polling.
    pub async fn status(&self, swap_id: &str) -> Option<SwapSnapshot> {
        self.quotes.snapshot(swap_id).await
    }

    /// Discrete path step two: guarded confirmation.
    ///
    /// The countdown guard runs before any network call, so an expired
    /// quotation never reaches the exchange. On upstream failure the
    /// quotation is cleared (a retry must fetch a fresh quote) and balances
    /// are left untouched; on success balances are refreshed wholesale.
    pub async fn confirm(&self, swap_id: &str) -> Result<TradeResult, SwapError> {
        let quotation = self
            .quotes
            .begin_confirm(swap_id)
            .await
            .map_err(map_guard_error)?;

        match self
            .exchange
            .confirm_quote(&quotation.id, quotation.idempotency_key)
            .await
        {
            Ok(result) => {
                self.quotes.clear(swap_id).await;
                self.balances.refresh_after_trade().await;
                info!(
                    swap_id = %swap_id,
                    quotation_id = %quotation.id,
                    status = %result.status,
                    "swap confirmed"
                );
                Ok(result)
            }
            Err(error) => {
                self.quotes.clear(swap_id).await;
                Err(SwapError::ConfirmFailed(error.to_string()))
            }
        }
    }

    /// User-initiated cancel; identical cleanup to expiry without the
    /// expired messaging.
    pub async fn cancel(&self, swap_id: &str) -> Result<(), SwapError> {
        if self.quotes.cancel(swap_id).await {
            Ok(())
        } else {
            Err(SwapError::NotFound)
        }
    }

    async fn reference_rate(&self) -> Result<f64, SwapError> {
        let usdt: CurrencyCode = "usdt".into();
        let ngn: CurrencyCode = "ngn".into();
        Ok(self
            .rates
            .rate(&usdt, &ngn)
            .await
            .map_err(map_rate_error)?
            .rate)
    }

    async fn pair_ngn_rate(&self, from: &CurrencyCode) -> Result<f64, SwapError> {
        let ngn: CurrencyCode = "ngn".into();
        Ok(self
            .rates
            .rate(from, &ngn)
            .await
            .map_err(map_rate_error)?
            .rate)
    }

    fn check_limits(
        &self,
        asset: &CurrencyCode,
        crypto_amount: f64,
        ngn_value: f64,
    ) -> Result<(), SwapError> {
        if let Some(limit) = self.limits.for_asset(asset) {
            if crypto_amount < limit.min {
                return Err(SwapError::Validation(format!(
                    "amount is below the minimum trade size of {} {asset}",
                    limit.min
                )));
            }
            if crypto_amount > limit.max {
                return Err(SwapError::Validation(format!(
                    "amount exceeds the maximum trade size of {} {asset}",
                    limit.max
                )));
            }
        }

        if ngn_value < MIN_NGN_TRADE_VALUE {
            return Err(SwapError::Validation(format!(
                "trade value must be at least {MIN_NGN_TRADE_VALUE} NGN"
            )));
        }
        Ok(())
    }
}

/// Validate the user's input before anything touches the network.
fn validate_request(
    from_currency: &CurrencyCode,
    to_currency: &CurrencyCode,
    raw_amount: &str,
) -> Result<f64, SwapError> {
    if from_currency.is_empty() || to_currency.is_empty() {
        return Err(SwapError::Validation(
            "both currencies must be selected".into(),
        ));
    }
    if from_currency == to_currency {
        return Err(SwapError::Validation(
            "source and destination currencies must differ".into(),
        ));
    }
    parse_positive_amount(raw_amount)
        .ok_or_else(|| SwapError::Validation("amount must be a positive number".into()))
}

fn parse_positive_amount(raw: &str) -> Option<f64> {
    let amount = raw.trim().parse::<f64>().ok()?;
    (amount.is_finite() && amount > 0.0).then_some(amount)
}

fn map_rate_error(error: ExchangeError) -> SwapError {
    SwapError::RateUnavailable(error.to_string())
}

fn map_quote_error(error: ExchangeError) -> SwapError {
    SwapError::QuoteRequestFailed(error.to_string())
}

fn map_guard_error(error: ConfirmGuardError) -> SwapError {
    match error {
        ConfirmGuardError::NotFound => SwapError::NotFound,
        ConfirmGuardError::Expired => SwapError::QuoteExpired,
        ConfirmGuardError::AlreadyConfirming => SwapError::AlreadyConfirming,
    }
}
