// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! Quotation model and the in-memory store of live swap flows.
//!
//! Each entry pairs the user's form state with the countdown state machine
//! guarding its quotation. A one-second sweeper (see `quote_sweeper`) drives
//! the countdowns; expired entries keep the entered amount but lose the
//! quotation, then get reaped after a retention window.

use std::collections::HashMap;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::CurrencyCode;
use crate::providers::QuoteResponse;
use crate::swap::countdown::{QuoteCountdown, Tick};
use crate::swap::fees::FeeBreakdown;
use crate::swap::form::SwapFormState;

/// How long an expired entry stays queryable (amount preserved, quotation
/// cleared) before the store reaps it.
const EXPIRED_RETENTION_SECS: i64 = 600;

/// A time-bounded price commitment held while its countdown is live.
///
/// Discarded, never persisted, on confirm, cancel, or expiry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct Quotation {
    /// Upstream quotation identifier.
    pub id: String,
    /// Client-side token attached to the confirm call so a retry cannot
    /// double-submit.
    pub idempotency_key: Uuid,
    pub from_currency: CurrencyCode,
    pub to_currency: CurrencyCode,
    pub from_amount: f64,
    /// Destination units per source unit. Authoritative for the preview;
    /// the last polled display rate is only indicative.
    pub quoted_price: f64,
    pub to_amount: f64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quotation {
    /// Build a quotation from the upstream response, stamping the local
    /// countdown window and a fresh idempotency token.
    ///
    /// When upstream supplies its own earlier expiry, that one wins so we
    /// never show a countdown longer than the commitment actually lasts.
    pub fn from_response(
        response: QuoteResponse,
        from_currency: CurrencyCode,
        to_currency: CurrencyCode,
        window_secs: u32,
    ) -> Self {
        let created_at = Utc::now();
        let local_expiry = created_at + ChronoDuration::seconds(i64::from(window_secs));
        let expires_at = match response.expires_at {
            Some(upstream) if upstream < local_expiry => upstream,
            _ => local_expiry,
        };

        Self {
            id: response.id,
            idempotency_key: Uuid::new_v4(),
            from_currency,
            to_currency,
            from_amount: response.from_amount,
            quoted_price: response.quoted_price,
            to_amount: response.to_amount,
            created_at,
            expires_at,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Client-visible lifecycle of a swap flow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    /// Quotation live, countdown running.
    Active,
    /// Confirm accepted locally, upstream call in flight.
    Confirming,
    /// Countdown reached zero; a fresh quote is required.
    Expired,
}

/// Why a confirm was refused by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmGuardError {
    #[error("swap not found")]
    NotFound,
    #[error("quotation has expired")]
    Expired,
    #[error("confirmation already in progress for this quotation")]
    AlreadyConfirming,
}

#[derive(Debug)]
struct SwapEntry {
    form: SwapFormState,
    countdown: QuoteCountdown,
    status: SwapStatus,
    fee: FeeBreakdown,
    expired_at: Option<DateTime<Utc>>,
}

/// Point-in-time view of one swap flow.
#[derive(Debug, Clone, Serialize, ToSchema, PartialEq)]
pub struct SwapSnapshot {
    /// Service-local identifier for the flow (not the upstream quote id).
    pub swap_id: String,
    pub status: SwapStatus,
    /// Whole seconds left on the countdown; zero once expired.
    pub seconds_remaining: u32,
    #[serde(flatten)]
    pub form: SwapFormState,
    pub fee: FeeBreakdown,
}

/// In-memory store of live swap flows, keyed by a service-local swap id.
///
/// All durable state lives with the upstream exchange; this store only
/// tracks countdowns and confirm guards.
#[derive(Default)]
pub struct QuoteStore {
    entries: RwLock<HashMap<String, SwapEntry>>,
}

impl QuoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new flow with a live quotation and start its countdown.
    ///
    /// The countdown window never exceeds the quotation's own expiry: a
    /// shorter upstream commitment shortens the visible countdown so the
    /// status endpoint cannot report `Active` for a quotation that confirm
    /// would already refuse.
    pub async fn insert(
        &self,
        form: SwapFormState,
        fee: FeeBreakdown,
        window_secs: u32,
    ) -> SwapSnapshot {
        let window_secs = form
            .quotation
            .as_ref()
            .map(|quote| {
                let ms = (quote.expires_at - Utc::now()).num_milliseconds().max(0);
                ((ms + 999) / 1000).min(i64::from(window_secs)) as u32
            })
            .unwrap_or(window_secs);

        let swap_id = Uuid::new_v4().to_string();
        let mut countdown = QuoteCountdown::new(window_secs);
        let seconds_remaining = countdown.start();

        let snapshot = SwapSnapshot {
            swap_id: swap_id.clone(),
            status: SwapStatus::Active,
            seconds_remaining,
            form: form.clone(),
            fee: fee.clone(),
        };

        let entry = SwapEntry {
            form,
            countdown,
            status: SwapStatus::Active,
            fee,
            expired_at: None,
        };
        self.entries.write().await.insert(swap_id, entry);
        snapshot
    }

    pub async fn snapshot(&self, swap_id: &str) -> Option<SwapSnapshot> {
        let entries = self.entries.read().await;
        let entry = entries.get(swap_id)?;
        Some(SwapSnapshot {
            swap_id: swap_id.to_string(),
            status: entry.status,
            seconds_remaining: entry.countdown.seconds_remaining().unwrap_or(0),
            form: entry.form.clone(),
            fee: entry.fee.clone(),
        })
    }

    /// Guarded transition into `Confirming`.
    ///
    /// Refuses expired or unknown flows and flows already confirming (the
    /// double-click case); on success returns the quotation to send
    /// upstream. The countdown check runs before any network call, so the
    /// trade confirmer is never invoked for a dead quotation.
    pub async fn begin_confirm(&self, swap_id: &str) -> Result<Quotation, ConfirmGuardError> {
        let mut entries = self.entries.write().await;
        let entry = entries.get_mut(swap_id).ok_or(ConfirmGuardError::NotFound)?;

        match entry.status {
            SwapStatus::Expired => return Err(ConfirmGuardError::Expired),
            SwapStatus::Confirming => return Err(ConfirmGuardError::AlreadyConfirming),
            SwapStatus::Active => {}
        }

        let quotation = entry
            .form
            .quotation
            .as_ref()
            .ok_or(ConfirmGuardError::Expired)?
            .clone();

        // Wall-clock double check; the sweeper runs at 1 Hz so the countdown
        // alone can lag slightly behind the quotation's real expiry.
        if quotation.is_expired(Utc::now()) {
            return Err(ConfirmGuardError::Expired);
        }

        entry
            .countdown
            .confirm()
            .map_err(|_| ConfirmGuardError::Expired)?;
        entry.status = SwapStatus::Confirming;
        Ok(quotation)
    }

    /// Destroy a flow once its upstream confirm has concluded.
    ///
    /// Called on success and on failure alike: a failed confirm clears the
    /// quotation so a retry must fetch a fresh quote.
    pub async fn clear(&self, swap_id: &str) -> bool {
        self.entries.write().await.remove(swap_id).is_some()
    }

    /// User-initiated cancel. Identical cleanup to expiry without the
    /// expired messaging; the flow is removed entirely.
    pub async fn cancel(&self, swap_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(swap_id) {
            Some(entry) if entry.status != SwapStatus::Confirming => {
                entry.countdown.cancel();
                entries.remove(swap_id);
                true
            }
            _ => false,
        }
    }

    /// Advance every live countdown by one second.
    ///
    /// Newly expired flows keep their entered amount but lose the
    /// quotation; flows expired longer than the retention window are
    /// reaped. Returns the swap ids that expired on this sweep.
    pub async fn sweep(&self) -> Vec<String> {
        let now = Utc::now();
        let mut expired = Vec::new();
        let mut entries = self.entries.write().await;

        for (swap_id, entry) in entries.iter_mut() {
            if entry.status != SwapStatus::Active {
                continue;
            }
            if let Tick::Expired = entry.countdown.tick() {
                entry.status = SwapStatus::Expired;
                entry.form.clear_quotation();
                entry.expired_at = Some(now);
                expired.push(swap_id.clone());
            }
        }

        let retention = ChronoDuration::seconds(EXPIRED_RETENTION_SECS);
        entries.retain(|_, entry| match entry.expired_at {
            Some(expired_at) => now - expired_at < retention,
            None => true,
        });

        expired
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Denomination;

    fn quotation(secs_ahead: i64) -> Quotation {
        let now = Utc::now();
        Quotation {
            id: "q-1".to_string(),
            idempotency_key: Uuid::new_v4(),
            from_currency: "usdt".into(),
            to_currency: "ngn".into(),
            from_amount: 100.0,
            quoted_price: 1585.23,
            to_amount: 158_523.0,
            created_at: now,
            expires_at: now + ChronoDuration::seconds(secs_ahead),
        }
    }

    fn form(quote: Option<Quotation>) -> SwapFormState {
        let mut form = SwapFormState::new("usdt".into(), "ngn".into(), "100", Denomination::Crypto);
        if let Some(quote) = quote {
            form.attach_quotation(quote);
        }
        form
    }

    #[tokio::test]
    async fn insert_starts_countdown_at_full_window() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(14))), FeeBreakdown::zero(), 14)
            .await;

        assert_eq!(snapshot.status, SwapStatus::Active);
        assert_eq!(snapshot.seconds_remaining, 14);

        let fetched = store.snapshot(&snapshot.swap_id).await.unwrap();
        assert_eq!(fetched, snapshot);
    }

    #[tokio::test]
    async fn sweep_expires_after_window_and_preserves_amount() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(60))), FeeBreakdown::zero(), 3)
            .await;

        assert!(store.sweep().await.is_empty());
        assert!(store.sweep().await.is_empty());
        let expired = store.sweep().await;
        assert_eq!(expired, vec![snapshot.swap_id.clone()]);

        let after = store.snapshot(&snapshot.swap_id).await.unwrap();
        assert_eq!(after.status, SwapStatus::Expired);
        assert_eq!(after.seconds_remaining, 0);
        assert_eq!(after.form.amount, "100");
        assert!(after.form.quotation.is_none());

        // Expires exactly once.
        assert!(store.sweep().await.is_empty());
    }

    #[tokio::test]
    async fn countdown_never_outlives_the_quotation_expiry() {
        let store = QuoteStore::new();

        // Upstream committed to 1 second; the 14 second window must not
        // keep the flow visibly Active after that commitment lapses.
        let snapshot = store
            .insert(form(Some(quotation(1))), FeeBreakdown::zero(), 14)
            .await;
        assert!(snapshot.seconds_remaining <= 1);

        let expired = store.sweep().await;
        assert_eq!(expired, vec![snapshot.swap_id.clone()]);

        let after = store.snapshot(&snapshot.swap_id).await.unwrap();
        assert_eq!(after.status, SwapStatus::Expired);
        assert_eq!(after.seconds_remaining, 0);
    }

    #[tokio::test]
    async fn already_expired_quotation_starts_at_zero() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(-1))), FeeBreakdown::zero(), 14)
            .await;

        assert_eq!(snapshot.seconds_remaining, 0);
        let result = store.begin_confirm(&snapshot.swap_id).await;
        assert_eq!(result, Err(ConfirmGuardError::Expired));
    }

    #[tokio::test]
    async fn begin_confirm_rejects_expired_flow() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(60))), FeeBreakdown::zero(), 1)
            .await;
        store.sweep().await;

        let result = store.begin_confirm(&snapshot.swap_id).await;
        assert_eq!(result, Err(ConfirmGuardError::Expired));
    }

    #[tokio::test]
    async fn begin_confirm_rejects_wall_clock_expired_quotation() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(-1))), FeeBreakdown::zero(), 14)
            .await;

        let result = store.begin_confirm(&snapshot.swap_id).await;
        assert_eq!(result, Err(ConfirmGuardError::Expired));
    }

    #[tokio::test]
    async fn double_confirm_is_rejected_not_resubmitted() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(60))), FeeBreakdown::zero(), 14)
            .await;

        let first = store.begin_confirm(&snapshot.swap_id).await;
        assert!(first.is_ok());

        let second = store.begin_confirm(&snapshot.swap_id).await;
        assert_eq!(second, Err(ConfirmGuardError::AlreadyConfirming));
    }

    #[tokio::test]
    async fn cancel_removes_active_flow_but_not_confirming_one() {
        let store = QuoteStore::new();
        let active = store
            .insert(form(Some(quotation(60))), FeeBreakdown::zero(), 14)
            .await;
        assert!(store.cancel(&active.swap_id).await);
        assert!(store.snapshot(&active.swap_id).await.is_none());

        let confirming = store
            .insert(form(Some(quotation(60))), FeeBreakdown::zero(), 14)
            .await;
        store.begin_confirm(&confirming.swap_id).await.unwrap();
        assert!(!store.cancel(&confirming.swap_id).await);
    }

    #[tokio::test]
    async fn clear_destroys_flow_after_confirm_outcome() {
        let store = QuoteStore::new();
        let snapshot = store
            .insert(form(Some(quotation(60))), FeeBreakdown::zero(), 14)
            .await;
        store.begin_confirm(&snapshot.swap_id).await.unwrap();

        assert!(store.clear(&snapshot.swap_id).await);
        assert!(store.snapshot(&snapshot.swap_id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[test]
    fn upstream_expiry_wins_when_shorter_than_local_window() {
        let upstream_expiry = Utc::now() + ChronoDuration::seconds(5);
        let response = QuoteResponse {
            id: "q-9".to_string(),
            quoted_price: 2.0,
            from_amount: 1.0,
            to_amount: 2.0,
            expires_at: Some(upstream_expiry),
        };

        let quotation = Quotation::from_response(response, "usdt".into(), "ngn".into(), 14);
        assert_eq!(quotation.expires_at, upstream_expiry);

        let response_long = QuoteResponse {
            id: "q-10".to_string(),
            quoted_price: 2.0,
            from_amount: 1.0,
            to_amount: 2.0,
            expires_at: Some(Utc::now() + ChronoDuration::seconds(120)),
        };
        let quotation =
            Quotation::from_response(response_long, "usdt".into(), "ngn".into(), 14);
        assert!(quotation.expires_at <= quotation.created_at + ChronoDuration::seconds(14));
    }
}
