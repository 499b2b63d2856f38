// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # Tiered Fee Calculation
//!
//! Trading fees are a percentage of the trade value, selected from a
//! volume-tiered schedule, plus a fixed per-asset network fee. The tier is
//! looked up by the trade's notional value in the reference currency (USD);
//! the percentage is then applied to the settlement-currency value of the
//! trade, not to the USD figure.
//!
//! The tier table, network fee table, and referral discount are hoisted into
//! one shared [`FeeConfig`] fetched from the upstream fee-config endpoint at
//! startup; the source product duplicated these tables per screen.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::CurrencyCode;

/// One `[min, max) -> fee_percentage` band of the volume schedule.
///
/// `max == None` marks the final, unbounded tier. A notional exactly at a
/// tier's `max` belongs to the next tier.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct VolumeTier {
    /// Inclusive lower bound of the band, in reference-currency units.
    pub min: f64,
    /// Exclusive upper bound; `None` for the last tier.
    pub max: Option<f64>,
    /// Fee percentage applied within the band.
    pub fee_percentage: f64,
}

impl VolumeTier {
    fn contains(&self, notional: f64) -> bool {
        notional >= self.min && self.max.map_or(true, |max| notional < max)
    }
}

/// Shared fee configuration: tier schedule, per-asset network fees, and the
/// referral discount.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FeeConfig {
    /// Ascending, non-overlapping volume tiers; last tier unbounded.
    pub tiers: Vec<VolumeTier>,
    /// Fixed network fee per asset in settlement-currency units, keyed by
    /// lowercase ticker. Assets absent from the table cost nothing.
    pub network_fees: HashMap<String, f64>,
    /// Percentage points subtracted from the tier rate for referred users.
    pub referral_discount_points: f64,
    /// Hard floor on the effective fee percentage after discounts.
    ///
    /// Policy: the floor is 0.0 — a discount may make a trade free but never
    /// produces a negative fee.
    pub min_fee_percentage: f64,
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                VolumeTier {
                    min: 0.0,
                    max: Some(1_000.0),
                    fee_percentage: 4.0,
                },
                VolumeTier {
                    min: 1_000.0,
                    max: Some(10_000.0),
                    fee_percentage: 3.5,
                },
                VolumeTier {
                    min: 10_000.0,
                    max: Some(50_000.0),
                    fee_percentage: 3.0,
                },
                VolumeTier {
                    min: 50_000.0,
                    max: None,
                    fee_percentage: 2.5,
                },
            ],
            network_fees: HashMap::new(),
            referral_discount_points: 0.0,
            min_fee_percentage: 0.0,
        }
    }
}

impl FeeConfig {
    /// Select the tier containing the USD notional.
    ///
    /// Every notional >= 0 matches exactly one tier; negative or NaN values
    /// match none and callers fall back to a zero fee.
    pub fn tier_for(&self, usd_notional: f64) -> Option<&VolumeTier> {
        self.tiers.iter().find(|tier| tier.contains(usd_notional))
    }

    /// Fixed network fee for an asset, zero when unlisted.
    pub fn network_fee(&self, asset: &CurrencyCode) -> f64 {
        self.network_fees.get(asset.as_str()).copied().unwrap_or(0.0)
    }

    /// Effective fee percentage for a notional, with the referral discount
    /// applied and floored.
    pub fn effective_percentage(&self, usd_notional: f64, referred: bool) -> f64 {
        let Some(tier) = self.tier_for(usd_notional) else {
            return 0.0;
        };
        let mut pct = tier.fee_percentage;
        if referred {
            pct -= self.referral_discount_points;
        }
        pct.max(self.min_fee_percentage).max(0.0)
    }
}

/// Derived cost breakdown for one quoted trade. Recomputed on every amount
/// or currency change; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct FeeBreakdown {
    /// Percentage applied, after any referral discount.
    pub fee_percentage: f64,
    /// `notional * fee_percentage / 100`, in settlement-currency units.
    pub service_fee: f64,
    /// Fixed per-asset network fee, in settlement-currency units.
    pub network_fee: f64,
    /// `service_fee + network_fee`.
    pub total_fee: f64,
    /// Reference-currency notional used for the tier lookup.
    pub usd_notional: f64,
}

impl FeeBreakdown {
    /// All-zero breakdown used for non-positive or unparsable amounts.
    pub fn zero() -> Self {
        Self {
            fee_percentage: 0.0,
            service_fee: 0.0,
            network_fee: 0.0,
            total_fee: 0.0,
            usd_notional: 0.0,
        }
    }
}

/// Compute the fee for one trade.
///
/// `notional` is the settlement-currency value the percentage applies to;
/// `usd_notional` is the reference-currency value used only for the tier
/// lookup. A non-positive or NaN notional yields the zero breakdown without
/// touching the tier table.
pub fn compute_fee(
    config: &FeeConfig,
    notional: f64,
    usd_notional: f64,
    asset: &CurrencyCode,
    referred: bool,
) -> FeeBreakdown {
    if !(notional > 0.0) || !(usd_notional >= 0.0) {
        return FeeBreakdown::zero();
    }

    let fee_percentage = config.effective_percentage(usd_notional, referred);
    let service_fee = notional * fee_percentage / 100.0;
    let network_fee = config.network_fee(asset);

    FeeBreakdown {
        fee_percentage,
        service_fee,
        network_fee,
        total_fee: service_fee + network_fee,
        usd_notional,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a} (tol {tol})");
    }

    fn usdt() -> CurrencyCode {
        "usdt".into()
    }

    #[test]
    fn every_nonnegative_notional_matches_exactly_one_tier() {
        let config = FeeConfig::default();
        for notional in [0.0, 0.01, 999.99, 1_000.0, 9_999.9, 10_000.0, 50_000.0, 1e9] {
            let matching = config
                .tiers
                .iter()
                .filter(|tier| tier.contains(notional))
                .count();
            assert_eq!(matching, 1, "notional {notional} matched {matching} tiers");
        }
    }

    #[test]
    fn boundary_notional_belongs_to_higher_tier() {
        let config = FeeConfig::default();
        assert_eq!(config.tier_for(999.99).unwrap().fee_percentage, 4.0);
        assert_eq!(config.tier_for(1_000.0).unwrap().fee_percentage, 3.5);
        assert_eq!(config.tier_for(50_000.0).unwrap().fee_percentage, 2.5);
    }

    #[test]
    fn fee_percentage_never_increases_with_volume() {
        let config = FeeConfig::default();
        let mut previous = f64::INFINITY;
        for notional in [0.0, 500.0, 1_000.0, 5_000.0, 10_000.0, 50_000.0, 1e8] {
            let pct = config.effective_percentage(notional, false);
            assert!(
                pct <= previous,
                "fee rose from {previous} to {pct} at notional {notional}"
            );
            previous = pct;
        }
    }

    #[test]
    fn worked_example_100_usdt_to_ngn() {
        // 100 USDT at 1585.23 NGN/USDT: tier [0,1000) at 4.0% on the NGN value.
        let config = FeeConfig::default();
        let ngn_value = 100.0 * 1585.23;
        assert_close(ngn_value, 158_523.0, 1e-9);

        let breakdown = compute_fee(&config, ngn_value, 100.0, &usdt(), false);
        assert_eq!(breakdown.fee_percentage, 4.0);
        assert_close(breakdown.service_fee, 6_340.92, 1e-9);
        assert_eq!(breakdown.network_fee, 0.0);
        assert_close(breakdown.total_fee, 6_340.92, 1e-9);
    }

    #[test]
    fn non_positive_and_unparsable_amounts_cost_nothing() {
        let config = FeeConfig::default();
        for notional in [0.0, -5.0, f64::NAN] {
            let breakdown = compute_fee(&config, notional, 0.0, &usdt(), false);
            assert_eq!(breakdown, FeeBreakdown::zero());
        }
    }

    #[test]
    fn network_fee_defaults_to_zero_for_unlisted_asset() {
        let mut config = FeeConfig::default();
        config.network_fees.insert("usdt".to_string(), 150.0);

        let with_fee = compute_fee(&config, 10_000.0, 10.0, &usdt(), false);
        assert_eq!(with_fee.network_fee, 150.0);
        assert_eq!(with_fee.total_fee, with_fee.service_fee + 150.0);

        let without = compute_fee(&config, 10_000.0, 10.0, &"trx".into(), false);
        assert_eq!(without.network_fee, 0.0);
    }

    #[test]
    fn referral_discount_is_floored_at_zero() {
        let mut config = FeeConfig::default();
        config.referral_discount_points = 10.0; // exceeds every tier rate

        let pct = config.effective_percentage(100.0, true);
        assert_eq!(pct, 0.0);

        let breakdown = compute_fee(&config, 1_000.0, 100.0, &usdt(), true);
        assert_eq!(breakdown.service_fee, 0.0);
    }

    #[test]
    fn referral_discount_subtracts_percentage_points() {
        let mut config = FeeConfig::default();
        config.referral_discount_points = 0.5;

        assert_eq!(config.effective_percentage(100.0, true), 3.5);
        assert_eq!(config.effective_percentage(100.0, false), 4.0);
    }
}
