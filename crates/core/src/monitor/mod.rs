//! Episode monitor.
//!
//! Drives one episode through locate -> extract -> submit -> advance, retrying
//! the whole cycle on a fixed interval until it succeeds or shutdown is
//! requested. The cursor only advances after a successful submission.

mod config;
mod runner;
mod types;

pub use config::MonitorConfig;
pub use runner::EpisodeMonitor;
pub use types::{CycleOutcome, MonitorError, MonitorOutcome, MonitorState};
