// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 trustBank

//! # Quote Countdown State Machine
//!
//! Owns the lifecycle of a fetched quotation from creation to expiry or
//! confirmation: `Idle -> Active(seconds_remaining) -> {Confirmed |
//! Cancelled | Expired} -> Idle`. Terminal transitions reset to `Idle`
//! immediately, so the machine is only ever observed as `Idle` or `Active`.
//!
//! The machine is pure and tick-driven; the quote sweeper drives `tick()`
//! once per second. The window is injected (one configurable constant for
//! the whole service).

/// Observable state of the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownState {
    /// No live quotation.
    Idle,
    /// A quotation is live with this many whole seconds left.
    Active { seconds_remaining: u32 },
}

/// Outcome of one timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to count down.
    Idle,
    /// Still live after decrementing.
    Active { seconds_remaining: u32 },
    /// The countdown reached zero; the quotation must be discarded.
    Expired,
}

/// Why a confirm was refused by the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CountdownError {
    #[error("no active quotation to confirm")]
    NotActive,
    #[error("quotation countdown has reached zero")]
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteCountdown {
    state: CountdownState,
    window_secs: u32,
}

impl QuoteCountdown {
    /// Create an idle countdown with the injected window.
    pub fn new(window_secs: u32) -> Self {
        Self {
            state: CountdownState::Idle,
            window_secs,
        }
    }

    pub fn state(&self) -> CountdownState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, CountdownState::Active { .. })
    }

    /// Seconds left on the live quotation, `None` when idle.
    pub fn seconds_remaining(&self) -> Option<u32> {
        match self.state {
            CountdownState::Idle => None,
            CountdownState::Active { seconds_remaining } => Some(seconds_remaining),
        }
    }

    /// Start (or restart) the countdown for a freshly issued quotation.
    pub fn start(&mut self) -> u32 {
        self.state = CountdownState::Active {
            seconds_remaining: self.window_secs,
        };
        self.window_secs
    }

    /// Advance the countdown by one second.
    ///
    /// Reaching zero is the `Expired` terminal transition: the machine
    /// resets to `Idle` and never goes negative or re-enters `Active`
    /// without a new `start()`.
    pub fn tick(&mut self) -> Tick {
        match self.state {
            CountdownState::Idle => Tick::Idle,
            CountdownState::Active { seconds_remaining } => {
                let remaining = seconds_remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state = CountdownState::Idle;
                    Tick::Expired
                } else {
                    self.state = CountdownState::Active {
                        seconds_remaining: remaining,
                    };
                    Tick::Active {
                        seconds_remaining: remaining,
                    }
                }
            }
        }
    }

    /// Accept the quotation while the countdown is live.
    ///
    /// Refusing a confirm at zero is enforced here, not delegated to
    /// upstream rejection. The `Confirmed` terminal transition resets to
    /// `Idle`.
    pub fn confirm(&mut self) -> Result<(), CountdownError> {
        match self.state {
            CountdownState::Idle => Err(CountdownError::NotActive),
            CountdownState::Active { seconds_remaining } if seconds_remaining == 0 => {
                Err(CountdownError::Expired)
            }
            CountdownState::Active { .. } => {
                self.state = CountdownState::Idle;
                Ok(())
            }
        }
    }

    /// Abandon the quotation. Identical cleanup to expiry, without the
    /// expired messaging. Idempotent.
    pub fn cancel(&mut self) {
        self.state = CountdownState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_activates_with_full_window() {
        let mut countdown = QuoteCountdown::new(14);
        assert_eq!(countdown.state(), CountdownState::Idle);
        assert_eq!(countdown.seconds_remaining(), None);

        assert_eq!(countdown.start(), 14);
        assert_eq!(countdown.seconds_remaining(), Some(14));
    }

    #[test]
    fn n_ticks_from_n_always_expires_exactly_once() {
        let mut countdown = QuoteCountdown::new(14);
        countdown.start();

        for expected in (1..14).rev() {
            assert_eq!(
                countdown.tick(),
                Tick::Active {
                    seconds_remaining: expected
                }
            );
        }
        assert_eq!(countdown.tick(), Tick::Expired);

        // After expiry the machine is idle; further ticks are no-ops and it
        // never re-enters Active without a new start.
        assert_eq!(countdown.state(), CountdownState::Idle);
        assert_eq!(countdown.tick(), Tick::Idle);
        assert_eq!(countdown.tick(), Tick::Idle);
    }

    #[test]
    fn confirm_succeeds_only_while_active() {
        let mut countdown = QuoteCountdown::new(3);
        assert_eq!(countdown.confirm(), Err(CountdownError::NotActive));

        countdown.start();
        assert!(countdown.confirm().is_ok());

        // Confirmed is terminal; a second confirm finds the machine idle.
        assert_eq!(countdown.confirm(), Err(CountdownError::NotActive));
    }

    #[test]
    fn confirm_after_expiry_is_rejected() {
        let mut countdown = QuoteCountdown::new(2);
        countdown.start();
        countdown.tick();
        assert_eq!(countdown.tick(), Tick::Expired);

        assert_eq!(countdown.confirm(), Err(CountdownError::NotActive));
    }

    #[test]
    fn cancel_resets_and_is_idempotent() {
        let mut countdown = QuoteCountdown::new(5);
        countdown.start();
        countdown.cancel();
        assert_eq!(countdown.state(), CountdownState::Idle);

        countdown.cancel();
        assert_eq!(countdown.state(), CountdownState::Idle);
    }

    #[test]
    fn restart_replaces_the_running_window() {
        let mut countdown = QuoteCountdown::new(10);
        countdown.start();
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.seconds_remaining(), Some(8));

        countdown.start();
        assert_eq!(countdown.seconds_remaining(), Some(10));
    }
}
