//! Types for the progress module.

use serde::{Deserialize, Serialize};

/// Phase of a long-running transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    /// The acquisition is downloading bytes from the source.
    Downloading,
    /// The artifact is being uploaded to a remote host.
    Uploading,
    /// The transfer completed and post-processing may be running.
    Finished,
    /// The transfer failed.
    Error,
}

impl ProgressPhase {
    /// Whether this phase ends the transfer.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Error)
    }
}

/// A single progress sample from an acquisition or upload.
///
/// Transient by design: events supersede each other, and the reporter drops
/// samples it cannot forward rather than queueing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    /// Current phase.
    pub phase: ProgressPhase,
    /// Bytes transferred so far.
    pub transferred: u64,
    /// Total bytes, when the source reports one.
    pub total: Option<u64>,
    /// Instantaneous rate in bytes per second, when known.
    pub rate: Option<u64>,
    /// Estimated seconds remaining, when known.
    pub eta_secs: Option<u64>,
}

impl ProgressEvent {
    /// A download sample.
    pub fn downloading(
        transferred: u64,
        total: Option<u64>,
        rate: Option<u64>,
        eta_secs: Option<u64>,
    ) -> Self {
        Self {
            phase: ProgressPhase::Downloading,
            transferred,
            total,
            rate,
            eta_secs,
        }
    }

    /// An upload sample.
    pub fn uploading(transferred: u64, total: Option<u64>) -> Self {
        Self {
            phase: ProgressPhase::Uploading,
            transferred,
            total,
            rate: None,
            eta_secs: None,
        }
    }

    /// Terminal success event.
    pub fn finished() -> Self {
        Self {
            phase: ProgressPhase::Finished,
            transferred: 0,
            total: None,
            rate: None,
            eta_secs: None,
        }
    }

    /// Terminal failure event.
    pub fn error() -> Self {
        Self {
            phase: ProgressPhase::Error,
            transferred: 0,
            total: None,
            rate: None,
            eta_secs: None,
        }
    }

    /// Completion as a percentage, when the total is known.
    pub fn percent(&self) -> Option<f64> {
        self.total
            .filter(|t| *t > 0)
            .map(|t| self.transferred as f64 / t as f64 * 100.0)
    }
}
