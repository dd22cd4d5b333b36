//! Error types for the extractor module.

use thiserror::Error;

/// Errors from the non-downloading probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The extractor binary could not be launched.
    #[error("Failed to launch extractor: {0}")]
    Spawn(#[source] std::io::Error),

    /// The extractor exited with an error.
    #[error("Probe failed: {reason}")]
    Failed { reason: String },

    /// The extractor produced output we could not parse.
    #[error("Failed to parse probe output: {reason}")]
    Parse { reason: String },

    /// The source listed no downloadable formats.
    #[error("No downloadable formats found")]
    NoFormats,
}

impl ProbeError {
    /// Creates a probe failure from the extractor's own error output.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }

    /// Creates a parse failure.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }
}

/// Errors from the downloading acquisition.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The extractor binary could not be launched.
    #[error("Failed to launch extractor: {0}")]
    Spawn(#[source] std::io::Error),

    /// The download or transcode failed; carries the underlying cause.
    #[error("Download failed: {reason}")]
    Failed { reason: String },
}

impl AcquisitionError {
    /// Creates an acquisition failure from the extractor's error output.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed {
            reason: reason.into(),
        }
    }
}
