//! Once-per-second driver for a shared [`CountdownEngine`].
//!
//! The engine has no loop of its own. `Ticker` is one host for it: it ticks on
//! a tokio interval, holds the engine mutex only for the duration of a tick so
//! saves never interleave, and resyncs instead of ticking when the wall clock
//! jumped further than the configured threshold (e.g. after a laptop sleep).

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::engine::CountdownEngine;
use super::remaining::RemainingDuration;
use crate::clock::Clock;
use crate::events::Event;
use crate::storage::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// A beat arriving later than this after the previous one resyncs.
    #[serde(default = "default_resync_threshold_ms")]
    pub resync_threshold_ms: u64,
}

fn default_interval_ms() -> u64 {
    1_000
}
fn default_resync_threshold_ms() -> u64 {
    2_000
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            resync_threshold_ms: default_resync_threshold_ms(),
        }
    }
}

pub struct Ticker<S, C> {
    engine: Arc<Mutex<CountdownEngine<S, C>>>,
    config: TickerConfig,
}

impl<S, C> Ticker<S, C>
where
    S: KeyValueStore + Send + 'static,
    C: Clock + Send + 'static,
{
    pub fn new(engine: Arc<Mutex<CountdownEngine<S, C>>>, config: TickerConfig) -> Self {
        Self { engine, config }
    }

    /// Drive the engine until it expires or `shutdown` flips to `true`.
    ///
    /// `on_event` sees every event outside the engine lock. Failed saves are
    /// logged and retried on the next beat. A pending save is flushed on exit.
    /// Returns the remaining time when the loop stopped.
    pub async fn run<F>(
        self,
        mut shutdown: watch::Receiver<bool>,
        mut on_event: F,
    ) -> RemainingDuration
    where
        F: FnMut(&Event),
    {
        let period = Duration::from_millis(self.config.interval_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first tick of a tokio interval completes immediately.
        interval.tick().await;

        let mut last_beat = lock(&self.engine).now();

        loop {
            if lock(&self.engine).is_expired() {
                break;
            }

            tokio::select! {
                _ = interval.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("ticker shutting down");
                        break;
                    }
                    continue;
                }
            }

            let outcome = {
                let mut engine = lock(&self.engine);
                let now = engine.now();
                let gap_ms = (now - last_beat).num_milliseconds();
                last_beat = now;

                if gap_ms > self.config.resync_threshold_ms as i64 {
                    // Nothing to catch up on still owes this beat its second.
                    match engine.resync() {
                        Some(event) => Ok(Some(event)),
                        None => engine.tick(),
                    }
                } else {
                    engine.tick()
                }
            };

            match outcome {
                Ok(Some(event)) => {
                    let expired = matches!(event, Event::Expired { .. });
                    on_event(&event);
                    if expired {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "tick failed"),
            }
        }

        let mut engine = lock(&self.engine);
        if engine.is_dirty() {
            if let Err(e) = engine.flush() {
                warn!(error = %e, "final save failed");
            }
        }
        engine.current_remaining()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic mid-tick leaves the engine in a consistent state; keep going.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}
