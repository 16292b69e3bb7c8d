use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::countdown::{Breakdown, CountdownState, RemainingDuration};

/// Every state change of the countdown produces an Event.
/// Hosts print or render them; tests match on them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// First launch: a fresh duration was drawn and persisted.
    CountdownSeeded {
        total: RemainingDuration,
        at: DateTime<Utc>,
    },
    /// Later launch: remaining time was reconciled against the clock.
    CountdownResumed {
        remaining: RemainingDuration,
        elapsed_secs: u64,
        at: DateTime<Utc>,
    },
    Ticked {
        remaining: RemainingDuration,
        at: DateTime<Utc>,
    },
    /// The tick that reached zero.
    Expired {
        at: DateTime<Utc>,
    },
    /// A host resynced after oversleeping.
    Resynced {
        remaining: RemainingDuration,
        skipped_secs: u64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: CountdownState,
        remaining: RemainingDuration,
        breakdown: Breakdown,
        last_saved_at: DateTime<Utc>,
        at: DateTime<Utc>,
    },
}
