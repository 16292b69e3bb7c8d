//! Terminal rendering of the five countdown rows.

use std::io::{IsTerminal, Write};

use countdown_core::storage::config::DisplayConfig;
use countdown_core::RemainingDuration;

const CLEAR: &str = "\x1b[2J\x1b[H";
const DIM_RED: &str = "\x1b[2;31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

pub struct Renderer {
    display: DisplayConfig,
    color: bool,
}

impl Renderer {
    pub fn new(display: DisplayConfig) -> Self {
        Self {
            display,
            color: std::io::stdout().is_terminal(),
        }
    }

    /// Rows as plain text, one per line.
    pub fn lines(&self, remaining: RemainingDuration) -> Vec<String> {
        remaining
            .breakdown()
            .rows()
            .iter()
            .map(|row| {
                let text = if self.display.show_labels {
                    format!("{:>3} {}", row.padded_value(), row.label)
                } else {
                    format!("{:>3}", row.padded_value())
                };
                match (self.color, row.dimmed) {
                    (false, _) => text,
                    (true, true) => format!("{DIM_RED}{text}{RESET}"),
                    (true, false) => format!("{BOLD}{text}{RESET}"),
                }
            })
            .collect()
    }

    /// Print once, scrolling.
    pub fn print(&self, remaining: RemainingDuration) -> std::io::Result<()> {
        let mut out = std::io::stdout().lock();
        for line in self.lines(remaining) {
            writeln!(out, "{line}")?;
        }
        out.flush()
    }

    /// Redraw in place when the terminal allows it.
    pub fn redraw(&self, remaining: RemainingDuration) -> std::io::Result<()> {
        if self.color && self.display.clear_screen {
            let mut out = std::io::stdout().lock();
            write!(out, "{CLEAR}")?;
            drop(out);
        }
        self.print(remaining)
    }
}
