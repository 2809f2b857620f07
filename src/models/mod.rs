//! Shared types used across all modules.
//!
//! The inbound [`Submission`] and the outbound [`Envelope`] live here so
//! the server and the forwarder never reach into each other's internals.

pub mod envelope;
pub mod submission;

pub use envelope::{Embed, EmbedField, Envelope, build_envelope};
pub use submission::{Submission, SubmissionError};
