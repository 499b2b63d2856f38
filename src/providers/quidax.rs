// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Quidax exchange integration for rates, quotations, and balances.
//!
//! All responses are parsed defensively at this boundary: a payload missing
//! a required field fails fast with [`ExchangeError`] instead of letting
//! nulls propagate into swap arithmetic.

use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::models::{AccountBalance, CurrencyCode, TradeResult};
use crate::providers::{ExchangeApi, ExchangeError, QuoteResponse};
use crate::swap::fees::{FeeConfig, VolumeTier};

const DEFAULT_BASE_URL: &str = "https://app.quidax.io/api/v1";

#[derive(Debug, Clone)]
pub struct QuidaxClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl QuidaxClient {
    pub fn is_configured() -> bool {
        required_env_present("QUIDAX_API_KEY")
    }

    /// Build the client from the environment.
    ///
    /// A missing API key does not fail construction: the service boots and
    /// reports itself degraded, and every upstream call returns
    /// [`ExchangeError::MissingConfig`] until the key is provided.
    pub fn from_env() -> Result<Self, ExchangeError> {
        let base_url = env_or_default("QUIDAX_BASE_URL", DEFAULT_BASE_URL);
        let api_key = env_optional("QUIDAX_API_KEY");

        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ExchangeError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            api_key,
            http,
        })
    }

    fn api_key(&self) -> Result<&str, ExchangeError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ExchangeError::MissingConfig("QUIDAX_API_KEY".to_string()))
    }

    async fn get_json(&self, path: &str) -> Result<Value, ExchangeError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .send()
            .await
            .map_err(|e| ExchangeError::Request(format!("GET {path}: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(format!("GET {path}: {e}")))?;

        if !status.is_success() {
            return Err(ExchangeError::Request(format!(
                "GET {path} returned {status}: {}",
                upstream_message(&body)
            )));
        }

        unwrap_data(body, path)
    }

    async fn post_json(
        &self,
        path: &str,
        payload: &Value,
        idempotency_key: Option<Uuid>,
    ) -> Result<(reqwest::StatusCode, Value), ExchangeError> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url).bearer_auth(api_key).json(payload);
        if let Some(key) = idempotency_key {
            request = request.header("Idempotency-Key", key.to_string());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ExchangeError::Request(format!("POST {path}: {e}")))?;

        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| ExchangeError::InvalidResponse(format!("POST {path}: {e}")))?;

        Ok((status, body))
    }
}

#[async_trait]
impl ExchangeApi for QuidaxClient {
    async fn fetch_rate(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, ExchangeError> {
        let data = self
            .get_json(&format!("/markets/rate?from={from}&to={to}"))
            .await
            .map_err(|e| ExchangeError::RateUnavailable(e.to_string()))?;

        let rate = extract_number(&data, "rate")
            .ok_or_else(|| ExchangeError::RateUnavailable("non-numeric rate in response".into()))?;

        if !rate.is_finite() || rate <= 0.0 {
            return Err(ExchangeError::RateUnavailable(format!(
                "upstream returned unusable rate {rate} for {from}/{to}"
            )));
        }

        Ok(rate)
    }

    async fn request_quote(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        from_amount: f64,
    ) -> Result<QuoteResponse, ExchangeError> {
        let payload = json!({
            "from_currency": from.as_str(),
            "to_currency": to.as_str(),
            "from_amount": format!("{from_amount}"),
        });

        let (status, body) = self
            .post_json("/users/me/swap_quotation", &payload, None)
            .await
            .map_err(|e| ExchangeError::QuoteRequestFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ExchangeError::QuoteRequestFailed(format!(
                "upstream returned {status}: {}",
                upstream_message(&body)
            )));
        }

        let data = unwrap_data(body, "/users/me/swap_quotation")
            .map_err(|e| ExchangeError::QuoteRequestFailed(e.to_string()))?;

        let id = data
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| ExchangeError::QuoteRequestFailed("missing quotation id".into()))?
            .to_string();
        let quoted_price = extract_number(&data, "quoted_price")
            .ok_or_else(|| ExchangeError::QuoteRequestFailed("missing quoted_price".into()))?;
        let to_amount = extract_number(&data, "to_amount")
            .ok_or_else(|| ExchangeError::QuoteRequestFailed("missing to_amount".into()))?;
        let from_amount = extract_number(&data, "from_amount").unwrap_or(from_amount);

        let expires_at = data
            .get("expires_at")
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|ts| ts.with_timezone(&Utc));

        info!(
            quotation_id = %id,
            from = %from,
            to = %to,
            quoted_price,
            "Quidax issued swap quotation"
        );

        Ok(QuoteResponse {
            id,
            quoted_price,
            from_amount,
            to_amount,
            expires_at,
        })
    }

    async fn confirm_quote(
        &self,
        quotation_id: &str,
        idempotency_key: Uuid,
    ) -> Result<TradeResult, ExchangeError> {
        let (status, body) = self
            .post_json(
                &format!("/users/me/swap_quotation/{quotation_id}/confirm"),
                &json!({}),
                Some(idempotency_key),
            )
            .await
            .map_err(|e| ExchangeError::ConfirmFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ExchangeError::ConfirmFailed(format!(
                "upstream returned {status}: {}",
                upstream_message(&body)
            )));
        }

        let data = unwrap_data(body, "confirm")
            .map_err(|e| ExchangeError::ConfirmFailed(e.to_string()))?;

        let trade_status = data
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| ExchangeError::ConfirmFailed("missing status in response".into()))?
            .to_string();
        let from_amount = extract_number(&data, "from_amount").unwrap_or(0.0);
        let to_amount = extract_number(&data, "to_amount").unwrap_or(0.0);

        Ok(TradeResult {
            quotation_id: quotation_id.to_string(),
            status: trade_status,
            from_amount,
            to_amount,
        })
    }

    async fn fetch_balances(&self) -> Result<Vec<AccountBalance>, ExchangeError> {
        let data = self.get_json("/users/me/wallets").await?;

        let entries = data
            .as_array()
            .ok_or_else(|| ExchangeError::InvalidResponse("wallet list is not an array".into()))?;

        let mut balances = Vec::with_capacity(entries.len());
        for entry in entries {
            let currency = entry
                .get("currency")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ExchangeError::InvalidResponse("wallet entry missing currency".into())
                })?;
            let balance = extract_number(entry, "balance").ok_or_else(|| {
                ExchangeError::InvalidResponse("wallet entry missing balance".into())
            })?;
            balances.push(AccountBalance {
                currency: currency.into(),
                balance,
            });
        }

        Ok(balances)
    }

    async fn fetch_fee_config(&self) -> Result<FeeConfig, ExchangeError> {
        let data = self.get_json("/users/me/fee_config").await?;
        Ok(parse_fee_config(&data))
    }
}

/// Parse the fee-config payload, falling back to built-in defaults for any
/// missing section so a partial response never strands the fee calculator.
fn parse_fee_config(data: &Value) -> FeeConfig {
    let defaults = FeeConfig::default();

    let tiers = data
        .get("tiers")
        .and_then(Value::as_array)
        .map(|raw_tiers| {
            raw_tiers
                .iter()
                .filter_map(|tier| {
                    let min = extract_number(tier, "min")?;
                    let fee_percentage = extract_number(tier, "fee_percentage")?;
                    let max = match tier.get("max") {
                        None | Some(Value::Null) => None,
                        Some(_) => Some(extract_number(tier, "max")?),
                    };
                    Some(VolumeTier {
                        min,
                        max,
                        fee_percentage,
                    })
                })
                .collect::<Vec<_>>()
        })
        .filter(|tiers| !tiers.is_empty())
        // Some accounts get a single personal rate under `user_tier` instead
        // of a full schedule; treat it as one unbounded tier.
        .or_else(|| {
            let pct = data
                .get("user_tier")
                .and_then(|tier| extract_number(tier, "fee_percentage"))?;
            Some(vec![VolumeTier {
                min: 0.0,
                max: None,
                fee_percentage: pct,
            }])
        })
        .unwrap_or(defaults.tiers);

    let network_fees = data
        .get("network_fees")
        .and_then(Value::as_object)
        .map(|fees| {
            fees.iter()
                .filter_map(|(asset, fee)| Some((asset.to_ascii_lowercase(), value_as_f64(fee)?)))
                .collect::<HashMap<_, _>>()
        })
        .unwrap_or(defaults.network_fees);

    let referral_discount_points = data
        .get("referral_discount")
        .and_then(value_as_f64)
        .unwrap_or(defaults.referral_discount_points);

    FeeConfig {
        tiers,
        network_fees,
        referral_discount_points,
        min_fee_percentage: defaults.min_fee_percentage,
    }
}

/// Quidax wraps payloads as `{ "status": ..., "message": ..., "data": ... }`.
fn unwrap_data(body: Value, context: &str) -> Result<Value, ExchangeError> {
    match body {
        Value::Object(mut map) => map
            .remove("data")
            .ok_or_else(|| ExchangeError::InvalidResponse(format!("{context}: missing data"))),
        _ => Err(ExchangeError::InvalidResponse(format!(
            "{context}: response is not an object"
        ))),
    }
}

fn upstream_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .unwrap_or("no message")
        .to_string()
}

/// Numbers arrive either as JSON numbers or decimal strings depending on the
/// endpoint; accept both.
fn extract_number(value: &Value, field: &str) -> Option<f64> {
    value.get(field).and_then(value_as_f64)
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required_env_present(name: &str) -> bool {
    std::env::var(name)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}
