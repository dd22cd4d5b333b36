//! The per-request delivery pipeline.
//!
//! Each user selection spawns one [`Pipeline::run`]: a strict sequential
//! state machine (acquire, locate, deliver) with its own working directory,
//! its own status message and its own progress reporter. Instances for
//! different requests run fully independently; nothing mutable is shared
//! between them.
//!
//! The working directory is a scoped resource: it is removed on success,
//! on every handled failure, and (via the [`WorkDir`] drop backstop) when
//! the task is cancelled mid-flight.

mod runner;
mod workdir;

pub use runner::{Pipeline, PipelineRequest};
pub use workdir::WorkDir;
