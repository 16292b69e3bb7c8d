pub mod completions;
pub mod config;
pub mod countdown;
pub mod terms;
