//! Progress reporting for long-running transfers.
//!
//! Acquisitions and uploads emit high-frequency [`ProgressEvent`] samples
//! (every few hundred kilobytes). The control channel that displays them can
//! only absorb a few updates per second before being throttled, so the
//! [`ProgressReporter`] sits between the two: it forwards at most one update
//! per interval, always forwards phase transitions and terminal events, and
//! drops everything else. Only the most recent text matters; nothing is
//! queued.

mod reporter;
mod types;

pub use reporter::{
    human_size, human_size_opt, ProgressReporter, StatusSink, DEFAULT_MIN_INTERVAL,
};
pub use types::{ProgressEvent, ProgressPhase};
