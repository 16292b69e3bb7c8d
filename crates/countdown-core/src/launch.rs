//! Per-launch bookkeeping.
//!
//! Each process start bumps `launchCount`. Hosts use the returned
//! [`LaunchInfo`] to decide whether to show the periodic notice and whether
//! the user agreement still needs accepting; rendering those is up to them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;
use crate::storage::{KeyValueStore, PersistedState};

/// Default spacing of the periodic notice, in launches.
pub const DEFAULT_NOTICE_EVERY: u64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchInfo {
    /// This launch's number, starting at 1.
    pub launch_count: u64,
    pub show_notice: bool,
    pub needs_terms: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct LaunchTracker {
    notice_every: u64,
}

impl Default for LaunchTracker {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_EVERY)
    }
}

impl LaunchTracker {
    /// `notice_every == 0` disables the notice.
    pub fn new(notice_every: u64) -> Self {
        Self { notice_every }
    }

    /// Count this process start. Call once per launch.
    pub fn record_launch<S: KeyValueStore>(
        &self,
        state: &mut PersistedState<S>,
    ) -> Result<LaunchInfo, StoreError> {
        let launch_count = state.launch_count()?.saturating_add(1);
        state.set_launch_count(launch_count)?;
        let needs_terms = !state.has_accepted_terms()?;
        let show_notice = self.notice_every != 0 && launch_count % self.notice_every == 0;
        debug!(launch_count, show_notice, needs_terms, "recorded launch");
        Ok(LaunchInfo {
            launch_count,
            show_notice,
            needs_terms,
        })
    }

    pub fn accept_terms<S: KeyValueStore>(
        &self,
        state: &mut PersistedState<S>,
    ) -> Result<(), StoreError> {
        state.set_accepted_terms(true)
    }
}
