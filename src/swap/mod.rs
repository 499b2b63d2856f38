// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Swap quotation core: fee calculation, quote countdown lifecycle, and the
//! orchestrating engine.

pub mod countdown;
pub mod engine;
pub mod fees;
pub mod form;
pub mod quote;
