mod engine;
mod remaining;
mod ticker;

pub use engine::{CountdownEngine, CountdownState};
pub use remaining::{Breakdown, DisplayRow, RemainingDuration};
pub use ticker::{Ticker, TickerConfig};
