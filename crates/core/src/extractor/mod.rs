//! Boundary to the media-extraction tool.
//!
//! This module owns the only seam through which the rest of the system talks
//! to the extractor: a non-downloading [`MediaExtractor::probe`] that yields
//! strongly-typed [`FormatDescriptor`]s, and a long-running
//! [`MediaExtractor::acquire`] that downloads into an exclusive working
//! directory while pushing [`ProgressEvent`](crate::progress::ProgressEvent)s
//! into a bounded channel.
//!
//! The extractor's raw JSON is mapped into these types immediately at the
//! boundary; missing or renamed fields never leak past it.

mod error;
mod traits;
mod types;
mod ytdlp;

pub use error::{AcquisitionError, ProbeError};
pub use traits::MediaExtractor;
pub use types::{AcquisitionRequest, FormatDescriptor, FormatSelection, ProbeInfo};
pub use ytdlp::YtDlpExtractor;
