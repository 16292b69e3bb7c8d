//! # Countdown Core Library
//!
//! This library provides the core logic for the Countdown display: a single
//! countdown whose total length is drawn at random on first launch and which
//! keeps running in wall-clock time across restarts. The CLI is a thin host
//! over the same core library.
//!
//! ## Architecture
//!
//! - **Countdown Engine**: A wall-clock-reconciled state machine that requires
//!   the caller to invoke `tick()` once per second
//! - **Duration Generator**: Weighted random draw of the initial duration
//! - **Storage**: Key-value persistence (SQLite or in-memory) and TOML-based
//!   configuration
//! - **Launch**: Launch counting and terms-acceptance bookkeeping
//!
//! ## Key Components
//!
//! - [`CountdownEngine`]: Core countdown state machine
//! - [`DurationGenerator`]: Initial duration draw
//! - [`KeyValueStore`]: Trait for the persistence collaborator
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod countdown;
pub mod error;
pub mod events;
pub mod generator;
pub mod launch;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use countdown::{
    Breakdown, CountdownEngine, CountdownState, DisplayRow, RemainingDuration, Ticker,
    TickerConfig,
};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use generator::{DurationGenerator, DurationSource};
pub use launch::{LaunchInfo, LaunchTracker};
pub use storage::{Config, KeyValueStore, MemoryStore, PersistedState, SqliteStore};
