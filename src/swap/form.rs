// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Ephemeral swap-form state.
//!
//! Holds what the user has entered (pair, raw amount, denomination) plus the
//! currently active quotation, if any. Mutated only by user input and by the
//! countdown's expiry/reset events; destroyed on cancel or successful
//! confirm.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{CurrencyCode, Denomination};
use crate::swap::quote::Quotation;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SwapFormState {
    /// Source currency for the swap.
    pub from_currency: CurrencyCode,
    /// Destination currency for the swap.
    pub to_currency: CurrencyCode,
    /// Raw amount string exactly as entered.
    pub amount: String,
    /// Unit the raw amount is denominated in.
    pub denomination: Denomination,
    /// The live quotation, when one has been fetched and not yet
    /// confirmed, cancelled, or expired.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quotation: Option<Quotation>,
}

impl SwapFormState {
    pub fn new(
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        amount: impl Into<String>,
        denomination: Denomination,
    ) -> Self {
        Self {
            from_currency,
            to_currency,
            amount: amount.into(),
            denomination,
            quotation: None,
        }
    }

    /// Attach a freshly issued quotation, replacing any previous one.
    pub fn attach_quotation(&mut self, quotation: Quotation) {
        self.quotation = Some(quotation);
    }

    /// Drop the quotation but keep the entered amount, returning the form
    /// to its pre-quote state. Used on expiry and cancel.
    pub fn clear_quotation(&mut self) {
        self.quotation = None;
    }

    /// Reset everything: amount empty, quotation gone. Idempotent.
    pub fn reset(&mut self) {
        self.amount.clear();
        self.quotation = None;
    }
}
