//! Countdown engine implementation.
//!
//! The engine is a wall-clock-reconciled state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()` once per
//! second. Every tick writes through to the injected store, so a crash loses
//! at most the second in flight.
//!
//! ## State Transitions
//!
//! ```text
//! Uninitialized -> Running
//! ```
//!
//! There is no expired state: zero is the floor of `Running`.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = CountdownEngine::open(store, SystemClock, &mut generator)?;
//! // Once per second:
//! engine.tick()?; // Returns Some(Event::Expired) on the tick that reaches zero
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::remaining::RemainingDuration;
use crate::clock::Clock;
use crate::error::{CoreError, StoreError};
use crate::events::Event;
use crate::generator::DurationSource;
use crate::storage::{KeyValueStore, PersistedState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownState {
    /// Nothing persisted yet; the next open draws a fresh duration.
    Uninitialized,
    Running,
}

impl<S: KeyValueStore> PersistedState<S> {
    /// Which branch the next [`CountdownEngine::open`] will take.
    pub fn countdown_state(&self) -> Result<CountdownState, StoreError> {
        if self.time_remaining()?.is_zero() {
            Ok(CountdownState::Uninitialized)
        } else {
            Ok(CountdownState::Running)
        }
    }
}

/// Core countdown engine.
///
/// Owns the in-memory remaining time; the store only mirrors it.
#[derive(Debug)]
pub struct CountdownEngine<S, C> {
    persisted: PersistedState<S>,
    clock: C,
    remaining: RemainingDuration,
    /// Last pair known to be in the store. Resync measures from here and
    /// saves are stamped relative to it.
    anchor_remaining: RemainingDuration,
    anchor_at: DateTime<Utc>,
    /// A write failed (or resync moved the value) and the store is behind.
    dirty: bool,
    opened: Event,
}

impl<S: KeyValueStore, C: Clock> CountdownEngine<S, C> {
    /// Construct the engine from whatever the store holds.
    ///
    /// An empty store (or a persisted zero) draws one duration from
    /// `generator` and persists it. Otherwise the persisted value is reduced by
    /// the wall time since it was saved, clamped at zero.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read, holds corrupt values, or
    /// the freshly drawn duration cannot be written.
    pub fn open<G>(store: S, clock: C, generator: &mut G) -> Result<Self, CoreError>
    where
        G: DurationSource + ?Sized,
    {
        let mut persisted = PersistedState::new(store);
        let now = clock.now();

        match persisted.countdown_state()? {
            CountdownState::Uninitialized => {
                let total = generator.generate();
                persisted.save_countdown(total, now)?;
                info!(total_secs = total.as_secs(), "seeded new countdown");
                Ok(Self {
                    persisted,
                    clock,
                    remaining: total,
                    anchor_remaining: total,
                    anchor_at: now,
                    dirty: false,
                    opened: Event::CountdownSeeded { total, at: now },
                })
            }
            CountdownState::Running => {
                let saved = persisted.time_remaining()?;
                let saved_at = persisted.last_saved_at()?.unwrap_or(now);
                let elapsed = elapsed_secs(saved_at, now);
                let remaining = saved.saturating_sub_secs(elapsed);
                debug!(
                    saved_secs = saved.as_secs(),
                    elapsed_secs = elapsed,
                    remaining_secs = remaining.as_secs(),
                    "resumed countdown"
                );
                Ok(Self {
                    persisted,
                    clock,
                    remaining,
                    anchor_remaining: saved,
                    anchor_at: saved_at,
                    dirty: false,
                    opened: Event::CountdownResumed {
                        remaining,
                        elapsed_secs: elapsed,
                        at: now,
                    },
                })
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn current_remaining(&self) -> RemainingDuration {
        self.remaining
    }

    pub fn state(&self) -> CountdownState {
        CountdownState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.remaining.is_zero()
    }

    /// Whether construction drew a fresh duration.
    pub fn was_seeded(&self) -> bool {
        matches!(self.opened, Event::CountdownSeeded { .. })
    }

    /// Seeded or resumed, as decided at construction.
    pub fn opening_event(&self) -> &Event {
        &self.opened
    }

    /// True while the store lags the in-memory value.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Timestamp of the last successful save.
    pub fn last_saved_at(&self) -> DateTime<Utc> {
        self.anchor_at
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn persisted(&self) -> &PersistedState<S> {
        &self.persisted
    }

    pub fn into_store(self) -> S {
        self.persisted.into_inner()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state(),
            remaining: self.remaining,
            breakdown: self.remaining.breakdown(),
            last_saved_at: self.anchor_at,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call once per second. Decrements by exactly one second and saves.
    ///
    /// Returns `None` at zero, `Some(Event::Expired)` on the tick that reaches
    /// zero and `Some(Event::Ticked)` otherwise. A failed save is returned as
    /// an error after the decrement; the next tick saves again.
    pub fn tick(&mut self) -> Result<Option<Event>, CoreError> {
        if self.remaining.is_zero() {
            if self.dirty {
                self.persist()?;
            }
            return Ok(None);
        }

        self.remaining = self.remaining.saturating_sub_secs(1);
        let at = self.persist()?;

        if self.remaining.is_zero() {
            info!("countdown expired");
            Ok(Some(Event::Expired { at }))
        } else {
            Ok(Some(Event::Ticked {
                remaining: self.remaining,
                at,
            }))
        }
    }

    /// Re-derive remaining time from the last save and the clock.
    ///
    /// For hosts that were suspended between ticks. Never increases the
    /// remaining time. The new value is saved by the next tick.
    pub fn resync(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let elapsed = elapsed_secs(self.anchor_at, now);
        let reconciled = self
            .anchor_remaining
            .saturating_sub_secs(elapsed)
            .min(self.remaining);

        if reconciled == self.remaining {
            return None;
        }

        let skipped_secs = self.remaining.as_secs() - reconciled.as_secs();
        debug!(skipped_secs, remaining_secs = reconciled.as_secs(), "resynced countdown");
        self.remaining = reconciled;
        self.dirty = true;
        Some(Event::Resynced {
            remaining: reconciled,
            skipped_secs,
            at: now,
        })
    }

    /// Save the current value now.
    pub fn flush(&mut self) -> Result<(), CoreError> {
        self.persist()?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Save the current value stamped on the anchor's whole-second timeline.
    ///
    /// The stamp is `anchor_at` plus the seconds consumed since the anchor, not
    /// the raw clock, so the sub-second part of a resume carries forward
    /// instead of being dropped at every relaunch.
    fn persist(&mut self) -> Result<DateTime<Utc>, StoreError> {
        let consumed = self.anchor_remaining.as_secs().saturating_sub(self.remaining.as_secs());
        let at = self.anchor_at + Duration::seconds(consumed as i64);
        match self.persisted.save_countdown(self.remaining, at) {
            Ok(()) => {
                self.dirty = false;
                self.anchor_remaining = self.remaining;
                self.anchor_at = at;
                Ok(at)
            }
            Err(e) => {
                self.dirty = true;
                warn!(
                    error = %e,
                    remaining_secs = self.remaining.as_secs(),
                    "failed to save countdown, retrying next tick"
                );
                Err(e)
            }
        }
    }
}

/// Whole seconds from `from` to `to`. A clock that went backwards yields 0.
fn elapsed_secs(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let secs = (to - from).num_seconds();
    if secs < 0 {
        warn!(skew_secs = -secs, "clock is behind last save, treating elapsed time as zero");
        0
    } else {
        secs as u64
    }
}
