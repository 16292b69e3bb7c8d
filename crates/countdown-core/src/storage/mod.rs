pub mod config;
pub mod memory;
pub mod sqlite;
pub mod state;

pub use config::Config;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use state::PersistedState;

use std::path::PathBuf;

use crate::error::StoreError;

/// Scalar key-value persistence the engine writes through.
///
/// Values are strings; typing is layered on top by [`PersistedState`].
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several values as one unit.
    ///
    /// The default writes them one by one; stores that can fail halfway
    /// override it so either every entry lands or none does.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Returns the data directory.
///
/// `COUNTDOWN_DATA_DIR` wins when set. Otherwise `~/.config/countdown[-dev]/`
/// based on `COUNTDOWN_ENV` (set `COUNTDOWN_ENV=dev` for the development
/// directory).
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("COUNTDOWN_DATA_DIR") {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("COUNTDOWN_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("countdown-dev")
            } else {
                base_dir.join("countdown")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
