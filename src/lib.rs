// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! trustBank Swap Server - Instant Swap Quotation Service
//!
//! Thin REST layer over the upstream exchange implementing the instant-swap
//! flow: indicative rates, tiered fee calculation, time-bounded quotations
//! with a countdown lifecycle, and guarded trade confirmation.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `swap` - Quotation core: fees, countdown state machine, engine
//! - `providers` - Upstream exchange client (Quidax)
//! - `rates` / `rate_poller` - Indicative rate cache and refresh loop
//! - `balances` - Read-mostly wallet balance cache
//! - `quote_sweeper` - 1 Hz countdown driver

pub mod api;
pub mod balances;
pub mod config;
pub mod error;
pub mod models;
pub mod providers;
pub mod quote_sweeper;
pub mod rate_poller;
pub mod rates;
pub mod state;
pub mod swap;
