//! Typed view over the four persisted keys.

use chrono::{DateTime, Utc};

use super::KeyValueStore;
use crate::countdown::RemainingDuration;
use crate::error::StoreError;

pub const TIME_REMAINING_KEY: &str = "timeRemainingSeconds";
pub const LAST_SAVED_AT_KEY: &str = "lastSavedAt";
pub const LAUNCH_COUNT_KEY: &str = "launchCount";
pub const HAS_ACCEPTED_TERMS_KEY: &str = "hasAcceptedTerms";

/// Typed accessors over a [`KeyValueStore`].
///
/// Absent keys read as their zero value: no remaining time, no save
/// timestamp, no launches, terms not accepted.
#[derive(Debug)]
pub struct PersistedState<S> {
    store: S,
}

impl<S: KeyValueStore> PersistedState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    // ── Countdown ────────────────────────────────────────────────────

    /// Last saved remaining time. Zero means the countdown was never seeded.
    ///
    /// Fractional values written by older hosts truncate toward zero.
    pub fn time_remaining(&self) -> Result<RemainingDuration, StoreError> {
        let Some(raw) = self.store.get(TIME_REMAINING_KEY)? else {
            return Ok(RemainingDuration::ZERO);
        };
        let trimmed = raw.trim();
        if let Ok(secs) = trimmed.parse::<u64>() {
            return Ok(RemainingDuration::from_secs(secs));
        }
        match trimmed.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs >= 0.0 => {
                Ok(RemainingDuration::from_secs(secs.trunc() as u64))
            }
            _ => Err(corrupt(TIME_REMAINING_KEY, raw)),
        }
    }

    pub fn last_saved_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        match self.store.get(LAST_SAVED_AT_KEY)? {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(raw.trim())
                .map(|at| Some(at.with_timezone(&Utc)))
                .map_err(|_| corrupt(LAST_SAVED_AT_KEY, raw)),
        }
    }

    /// Write remaining time and its timestamp as one unit.
    pub fn save_countdown(
        &mut self,
        remaining: RemainingDuration,
        at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let secs = remaining.as_secs().to_string();
        let at = at.to_rfc3339();
        self.store.set_many(&[
            (TIME_REMAINING_KEY, secs.as_str()),
            (LAST_SAVED_AT_KEY, at.as_str()),
        ])
    }

    // ── Launch bookkeeping ───────────────────────────────────────────

    pub fn launch_count(&self) -> Result<u64, StoreError> {
        match self.store.get(LAUNCH_COUNT_KEY)? {
            None => Ok(0),
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| corrupt(LAUNCH_COUNT_KEY, raw)),
        }
    }

    pub fn set_launch_count(&mut self, count: u64) -> Result<(), StoreError> {
        self.store.set(LAUNCH_COUNT_KEY, &count.to_string())
    }

    pub fn has_accepted_terms(&self) -> Result<bool, StoreError> {
        match self.store.get(HAS_ACCEPTED_TERMS_KEY)? {
            None => Ok(false),
            Some(raw) => match raw.trim() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                _ => Err(corrupt(HAS_ACCEPTED_TERMS_KEY, raw)),
            },
        }
    }

    pub fn set_accepted_terms(&mut self, accepted: bool) -> Result<(), StoreError> {
        self.store
            .set(HAS_ACCEPTED_TERMS_KEY, if accepted { "true" } else { "false" })
    }
}

fn corrupt(key: &str, value: String) -> StoreError {
    StoreError::Corrupt {
        key: key.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    #[test]
    fn empty_store_reads_zero_values() {
        let state = PersistedState::new(MemoryStore::new());
        assert_eq!(state.time_remaining().unwrap(), RemainingDuration::ZERO);
        assert!(state.last_saved_at().unwrap().is_none());
        assert_eq!(state.launch_count().unwrap(), 0);
        assert!(!state.has_accepted_terms().unwrap());
    }

    #[test]
    fn countdown_roundtrip() {
        let mut state = PersistedState::new(MemoryStore::new());
        let at = Utc.with_ymd_and_hms(2024, 12, 25, 8, 30, 0).unwrap();
        state
            .save_countdown(RemainingDuration::from_secs(604_801), at)
            .unwrap();
        assert_eq!(state.time_remaining().unwrap().as_secs(), 604_801);
        assert_eq!(state.last_saved_at().unwrap(), Some(at));
    }

    #[test]
    fn fractional_seconds_truncate() {
        let state: PersistedState<MemoryStore> =
            PersistedState::new([(TIME_REMAINING_KEY, "99.75")].into_iter().collect());
        assert_eq!(state.time_remaining().unwrap().as_secs(), 99);
    }

    #[test]
    fn negative_remaining_is_corrupt() {
        let state: PersistedState<MemoryStore> =
            PersistedState::new([(TIME_REMAINING_KEY, "-5")].into_iter().collect());
        assert!(matches!(
            state.time_remaining(),
            Err(StoreError::Corrupt { ref key, .. }) if key == TIME_REMAINING_KEY
        ));
    }

    #[test]
    fn garbage_timestamp_is_corrupt() {
        let state: PersistedState<MemoryStore> =
            PersistedState::new([(LAST_SAVED_AT_KEY, "yesterday")].into_iter().collect());
        assert!(state.last_saved_at().is_err());
    }

    #[test]
    fn terms_flag_roundtrip() {
        let mut state = PersistedState::new(MemoryStore::new());
        state.set_accepted_terms(true).unwrap();
        assert!(state.has_accepted_terms().unwrap());
        assert_eq!(
            state.store().get(HAS_ACCEPTED_TERMS_KEY).unwrap().as_deref(),
            Some("true")
        );
    }
}
