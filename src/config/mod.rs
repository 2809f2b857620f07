//! Configuration loading and layering.
//!
//! Resolves the destination webhook and listener address from CLI flags
//! and environment variables, failing fast when the destination is missing.

pub mod loader;

pub use loader::{ConfigError, ConfigOverrides, RelayConfig, redact_url};
