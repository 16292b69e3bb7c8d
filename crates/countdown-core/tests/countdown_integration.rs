//! Integration tests for the countdown engine across restarts, store failures
//! and the weighted generator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use countdown_core::generator::{LONG_MAX_SECS, SHORT_MAX_SECS};
use countdown_core::storage::state::{LAST_SAVED_AT_KEY, TIME_REMAINING_KEY};
use countdown_core::{
    Clock, CountdownEngine, CoreError, DurationGenerator, DurationSource, Event, KeyValueStore,
    LaunchTracker, ManualClock, MemoryStore, PersistedState, RemainingDuration, SqliteStore,
    StoreError,
};
use proptest::prelude::*;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 25, 9, 0, 0).unwrap()
}

fn saved(remaining: u64, at: DateTime<Utc>) -> MemoryStore {
    [
        (TIME_REMAINING_KEY, remaining.to_string()),
        (LAST_SAVED_AT_KEY, at.to_rfc3339()),
    ]
    .into_iter()
    .collect()
}

/// Panics if asked for a duration.
struct NeverDraw;

impl DurationSource for NeverDraw {
    fn generate(&mut self) -> RemainingDuration {
        panic!("generator must not be called for a seeded store");
    }
}

/// Always draws the same duration.
struct Fixed(u64);

impl DurationSource for Fixed {
    fn generate(&mut self) -> RemainingDuration {
        RemainingDuration::from_secs(self.0)
    }
}

/// Store whose writes can be switched off from outside.
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: Arc<AtomicBool>,
}

impl FlakyStore {
    fn new(inner: MemoryStore) -> (Self, Arc<AtomicBool>) {
        let switch = Arc::new(AtomicBool::new(false));
        let store = Self {
            inner,
            fail_writes: switch.clone(),
        };
        (store, switch)
    }
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Locked);
        }
        self.inner.set(key, value)
    }
}

proptest! {
    #[test]
    fn reconstruction_matches_wall_clock(
        saved_secs in 1u64..=LONG_MAX_SECS,
        elapsed in 0i64..=1_000_000_000,
    ) {
        let clock = ManualClock::new(t0() + Duration::seconds(elapsed));
        let engine =
            CountdownEngine::open(saved(saved_secs, t0()), clock, &mut NeverDraw).unwrap();
        let expected = saved_secs.saturating_sub(elapsed as u64);
        prop_assert_eq!(engine.current_remaining().as_secs(), expected);
    }

    #[test]
    fn backwards_clock_never_adds_time(
        saved_secs in 1u64..=LONG_MAX_SECS,
        skew in 1i64..=100_000_000,
    ) {
        let clock = ManualClock::new(t0() - Duration::seconds(skew));
        let engine =
            CountdownEngine::open(saved(saved_secs, t0()), clock, &mut NeverDraw).unwrap();
        prop_assert_eq!(engine.current_remaining().as_secs(), saved_secs);
    }
}

#[test]
fn ticking_exactly_remaining_times_reaches_zero() {
    let clock = ManualClock::new(t0());
    let mut engine =
        CountdownEngine::open(saved(250, t0()), clock.clone(), &mut NeverDraw).unwrap();

    for _ in 0..250 {
        clock.advance_secs(1);
        engine.tick().unwrap();
    }

    assert_eq!(engine.current_remaining(), RemainingDuration::ZERO);
    assert_eq!(
        engine.persisted().time_remaining().unwrap(),
        RemainingDuration::ZERO
    );
    assert!(engine.tick().unwrap().is_none());
}

#[test]
fn restart_resumes_where_wall_clock_says() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("countdown.db");
    let clock = ManualClock::new(t0());

    {
        let store = SqliteStore::open_at(&path).unwrap();
        let mut engine =
            CountdownEngine::open(store, clock.clone(), &mut Fixed(100_000)).unwrap();
        assert!(engine.was_seeded());
        for _ in 0..10 {
            clock.advance_secs(1);
            engine.tick().unwrap();
        }
        assert_eq!(engine.current_remaining().as_secs(), 99_990);
    }

    // Process is gone for an hour.
    clock.advance_secs(3_600);

    let store = SqliteStore::open_at(&path).unwrap();
    let engine = CountdownEngine::open(store, clock, &mut NeverDraw).unwrap();
    assert!(!engine.was_seeded());
    assert_eq!(engine.current_remaining().as_secs(), 99_990 - 3_600);
}

#[test]
fn frequent_relaunches_track_wall_clock() {
    let clock = ManualClock::new(t0());
    let mut store = saved(1_000, t0());

    // Relaunch 900 ms after each save, tick once a second later.
    for _ in 0..10 {
        clock.advance_millis(900);
        let mut engine = CountdownEngine::open(store, clock.clone(), &mut NeverDraw).unwrap();
        clock.advance_millis(1_000);
        engine.tick().unwrap();
        store = engine.into_store();
    }

    let wall_secs = (clock.now() - t0()).num_seconds();
    assert_eq!(wall_secs, 19);
    let engine = CountdownEngine::open(store, clock, &mut NeverDraw).unwrap();
    let remaining = engine.current_remaining().as_secs();
    assert!(
        (1_000 - 19 - 1..=1_000 - 19 + 1).contains(&remaining),
        "remaining {remaining} after {wall_secs}s of wall time"
    );
}

#[test]
fn seeding_persists_exactly_what_it_holds() {
    let clock = ManualClock::new(t0());
    let mut generator = DurationGenerator::seeded(3);
    let engine = CountdownEngine::open(MemoryStore::new(), clock, &mut generator).unwrap();

    let persisted = engine.persisted().time_remaining().unwrap();
    assert!(!persisted.is_zero());
    assert_eq!(persisted, engine.current_remaining());
    assert_eq!(engine.persisted().last_saved_at().unwrap(), Some(t0()));
    assert!(matches!(engine.opening_event(), Event::CountdownSeeded { .. }));
}

#[test]
fn expired_countdown_reseeds_on_next_launch() {
    let clock = ManualClock::new(t0());
    let mut engine =
        CountdownEngine::open(saved(1, t0()), clock.clone(), &mut NeverDraw).unwrap();
    clock.advance_secs(1);
    assert!(matches!(engine.tick().unwrap(), Some(Event::Expired { .. })));

    let store = engine.into_store();
    let engine = CountdownEngine::open(store, clock, &mut DurationGenerator::seeded(5)).unwrap();
    assert!(engine.was_seeded());
    assert!(!engine.current_remaining().is_zero());
}

#[test]
fn failed_write_is_retried_on_next_tick() {
    let clock = ManualClock::new(t0());
    let (store, fail_writes) = FlakyStore::new(saved(100, t0()));
    let mut engine = CountdownEngine::open(store, clock.clone(), &mut NeverDraw).unwrap();

    fail_writes.store(true, Ordering::SeqCst);
    clock.advance_secs(1);
    let err = engine.tick().unwrap_err();
    assert!(matches!(err, CoreError::Store(StoreError::Locked)));
    assert_eq!(engine.current_remaining().as_secs(), 99);
    assert!(engine.is_dirty());

    fail_writes.store(false, Ordering::SeqCst);
    clock.advance_secs(1);
    engine.tick().unwrap();
    assert!(!engine.is_dirty());
    assert_eq!(engine.persisted().time_remaining().unwrap().as_secs(), 98);
}

#[test]
fn failed_seed_write_fails_construction() {
    let (store, fail_writes) = FlakyStore::new(MemoryStore::new());
    fail_writes.store(true, Ordering::SeqCst);
    let result = CountdownEngine::open(store, ManualClock::new(t0()), &mut Fixed(60));
    assert!(matches!(result, Err(CoreError::Store(StoreError::Locked))));
}

#[test]
fn corrupt_remaining_fails_construction() {
    let store: MemoryStore = [(TIME_REMAINING_KEY, "soon")].into_iter().collect();
    let result = CountdownEngine::open(store, ManualClock::new(t0()), &mut NeverDraw);
    assert!(matches!(
        result,
        Err(CoreError::Store(StoreError::Corrupt { .. }))
    ));
}

#[test]
fn generator_distribution_over_ten_thousand_draws() {
    let mut generator = DurationGenerator::seeded(0xC0FFEE);
    let draws: Vec<u64> = (0..10_000).map(|_| generator.generate().as_secs()).collect();

    assert!(draws.iter().all(|s| (1..=LONG_MAX_SECS).contains(s)));
    let short = draws.iter().filter(|&&s| s <= SHORT_MAX_SECS).count();
    let ratio = short as f64 / draws.len() as f64;
    assert!((0.72..=0.78).contains(&ratio), "short ratio was {ratio}");
}

#[test]
fn launch_bookkeeping_shares_the_store_with_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("countdown.db");
    let tracker = LaunchTracker::default();

    for expected in 1..=3 {
        let mut state = PersistedState::new(SqliteStore::open_at(&path).unwrap());
        let info = tracker.record_launch(&mut state).unwrap();
        assert_eq!(info.launch_count, expected);
        let engine = CountdownEngine::open(
            state.into_inner(),
            ManualClock::new(t0()),
            &mut DurationGenerator::seeded(expected),
        )
        .unwrap();
        assert_eq!(engine.was_seeded(), expected == 1);
    }
}
