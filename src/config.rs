// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # Runtime Configuration
//!
//! This module defines environment variable names, default values, and the
//! loaded [`SwapConfig`] used throughout the application. Configuration is
//! read from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `QUIDAX_BASE_URL` | Upstream exchange base URL | sandbox URL |
//! | `QUIDAX_API_KEY` | Bearer token for upstream calls | Required for live use |
//! | `SWAP_QUOTE_TTL_SECS` | Quotation countdown window in seconds | `14` |
//! | `RATE_POLL_INTERVAL_SECS` | Indicative rate refresh interval | `20` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

/// Environment variable name for the quotation countdown window.
///
/// The source product shipped with two divergent windows (14 s and 30 s) in
/// different screens; this service uses one injected constant for every
/// quotation.
pub const QUOTE_TTL_ENV: &str = "SWAP_QUOTE_TTL_SECS";

/// Environment variable name for the indicative rate refresh interval.
pub const RATE_POLL_INTERVAL_ENV: &str = "RATE_POLL_INTERVAL_SECS";

/// Default countdown window for a quotation, in seconds.
pub const DEFAULT_QUOTE_TTL_SECS: u32 = 14;

/// Default interval between indicative rate refreshes, in seconds.
pub const DEFAULT_RATE_POLL_INTERVAL_SECS: u64 = 20;

/// Reference fiat currency used for volume-tier lookup.
pub const REFERENCE_CURRENCY: &str = "USD";

/// Settlement fiat currency for fee display and minimum-value checks.
pub const SETTLEMENT_CURRENCY: &str = "NGN";

/// Loaded swap-core configuration.
#[derive(Debug, Clone, Copy)]
pub struct SwapConfig {
    /// Countdown window applied to every quotation.
    pub quote_ttl_secs: u32,
    /// Interval between rate poller sweeps.
    pub rate_poll_interval: Duration,
}

impl Default for SwapConfig {
    fn default() -> Self {
        Self {
            quote_ttl_secs: DEFAULT_QUOTE_TTL_SECS,
            rate_poll_interval: Duration::from_secs(DEFAULT_RATE_POLL_INTERVAL_SECS),
        }
    }
}

impl SwapConfig {
    /// Load configuration from the environment, falling back to defaults for
    /// unset or unparsable values.
    pub fn from_env() -> Self {
        let quote_ttl_secs = std::env::var(QUOTE_TTL_ENV)
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&ttl| ttl > 0)
            .unwrap_or(DEFAULT_QUOTE_TTL_SECS);

        let rate_poll_secs = std::env::var(RATE_POLL_INTERVAL_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .unwrap_or(DEFAULT_RATE_POLL_INTERVAL_SECS);

        Self {
            quote_ttl_secs,
            rate_poll_interval: Duration::from_secs(rate_poll_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_unified_quote_window() {
        let config = SwapConfig::default();
        assert_eq!(config.quote_ttl_secs, 14);
        assert_eq!(config.rate_poll_interval, Duration::from_secs(20));
    }
}
