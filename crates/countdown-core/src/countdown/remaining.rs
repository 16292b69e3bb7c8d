//! Whole-second remaining duration and its display projections.

use std::fmt;

use serde::{Deserialize, Serialize};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * 60;
const SECS_PER_DAY: u64 = 24 * 60 * 60;
/// Fixed 365-day year, no leap adjustment.
const SECS_PER_YEAR: u64 = 365 * SECS_PER_DAY;

/// Seconds left before the countdown reaches zero. Never negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RemainingDuration(u64);

impl RemainingDuration {
    pub const ZERO: Self = Self(0);

    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Subtract elapsed seconds, clamping at zero.
    pub const fn saturating_sub_secs(self, secs: u64) -> Self {
        Self(self.0.saturating_sub(secs))
    }

    // ── Projections ──────────────────────────────────────────────────
    //
    // Each one is taken from the total independently; they do not cascade.

    pub const fn years(self) -> u64 {
        self.0 / SECS_PER_YEAR
    }

    pub const fn days(self) -> u64 {
        (self.0 / SECS_PER_DAY) % 365
    }

    pub const fn hours(self) -> u64 {
        (self.0 / SECS_PER_HOUR) % 24
    }

    pub const fn minutes(self) -> u64 {
        (self.0 / SECS_PER_MINUTE) % 60
    }

    pub const fn seconds(self) -> u64 {
        self.0 % 60
    }

    pub fn breakdown(self) -> Breakdown {
        Breakdown {
            years: self.years(),
            days: self.days(),
            hours: self.hours(),
            minutes: self.minutes(),
            seconds: self.seconds(),
        }
    }
}

impl fmt::Display for RemainingDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

/// The five values shown on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdown {
    pub years: u64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl Breakdown {
    /// Rows in display order, top to bottom.
    pub fn rows(&self) -> [DisplayRow; 5] {
        [
            DisplayRow::new(self.years, "YRS"),
            DisplayRow::new(self.days, "DAY"),
            DisplayRow::new(self.hours, "HRS"),
            DisplayRow::new(self.minutes, "MIN"),
            DisplayRow::new(self.seconds, "SEC"),
        ]
    }
}

/// One labelled line of the countdown display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DisplayRow {
    pub value: u64,
    pub label: &'static str,
    /// Rows at zero are rendered muted.
    pub dimmed: bool,
}

impl DisplayRow {
    fn new(value: u64, label: &'static str) -> Self {
        Self {
            value,
            label,
            dimmed: value == 0,
        }
    }

    /// Two digits, or three once the value reaches 100.
    pub fn padded_value(&self) -> String {
        if self.value >= 100 {
            format!("{:03}", self.value)
        } else {
            format!("{:02}", self.value)
        }
    }
}

impl fmt::Display for DisplayRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.padded_value(), self.label)
    }
}
