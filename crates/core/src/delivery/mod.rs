//! Delivery routing: direct hand-off vs. staged remote upload.
//!
//! The [`DeliveryRouter`] owns the single routing decision of the pipeline:
//! artifacts at or under the configured ceiling go through the chat
//! platform's own attachment mechanism, larger ones go straight to the
//! remote uploader. A failed direct hand-off falls back to remote upload
//! exactly once; a failed remote upload is terminal.

mod error;
mod router;
mod types;

pub use error::DeliveryError;
pub use router::DeliveryRouter;
pub use types::DeliveryOutcome;
