// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # API Data Models
//!
//! Shared request/response data structures used across the REST API. All
//! types derive `Serialize`, `Deserialize`, and `ToSchema` for automatic
//! JSON handling and OpenAPI documentation.
//!
//! ## Currency Code Type
//!
//! The [`CurrencyCode`] newtype wraps exchange ticker symbols (`"btc"`,
//! `"usdt"`, `"ngn"`, ...). Codes are normalized to lowercase on
//! construction so pair lookups are case-insensitive.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Currency Code Type
// =============================================================================

/// Exchange ticker symbol wrapper, normalized to lowercase.
///
/// # Example
///
/// ```rust,ignore
/// let code = CurrencyCode::from("USDT");
/// assert_eq!(code.as_str(), "usdt");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(from = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the code is empty after trimming (rejected by validation).
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for CurrencyCode {
    fn from(value: String) -> Self {
        CurrencyCode(value.trim().to_ascii_lowercase())
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        CurrencyCode(value.trim().to_ascii_lowercase())
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.0
    }
}

// =============================================================================
// Amount Denomination
// =============================================================================

/// The unit in which the user typed the swap amount.
///
/// The swap form lets users enter an amount in the source crypto itself or
/// in one of the two fiat references; the engine converts to the base
/// crypto amount before quoting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Denomination {
    /// Amount is already in units of the source crypto.
    #[default]
    Crypto,
    /// Amount is in Nigerian Naira.
    Ngn,
    /// Amount is in US Dollars.
    Usd,
}

// =============================================================================
// Wallet Balances
// =============================================================================

/// A single wallet balance entry as reported by the upstream exchange.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct AccountBalance {
    /// Ticker symbol for the balance.
    pub currency: CurrencyCode,
    /// Available balance in native units.
    pub balance: f64,
}

// =============================================================================
// Trade Result
// =============================================================================

/// Outcome of a confirmed swap as reported by the upstream exchange.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TradeResult {
    /// Quotation that was executed.
    pub quotation_id: String,
    /// Upstream status string (`"success"` on completion).
    pub status: String,
    /// Amount debited in the source currency.
    pub from_amount: f64,
    /// Amount credited in the destination currency.
    pub to_amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_code_normalizes_case_and_whitespace() {
        let code: CurrencyCode = " USDT ".into();
        assert_eq!(code.as_str(), "usdt");

        let from_string: CurrencyCode = String::from("Ngn").into();
        assert_eq!(from_string.as_str(), "ngn");

        let back: String = CurrencyCode::from("btc").into();
        assert_eq!(back, "btc");
    }

    #[test]
    fn deserialized_code_is_normalized_like_constructed_ones() {
        let code: CurrencyCode = serde_json::from_str(r#"" USDT ""#).unwrap();
        assert_eq!(code.as_str(), "usdt");
        assert_eq!(code, CurrencyCode::from("usdt"));
    }

    #[test]
    fn empty_code_detected_after_trim() {
        let code: CurrencyCode = "   ".into();
        assert!(code.is_empty());
    }
}
