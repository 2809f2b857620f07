//! formrelay — relay browser form submissions to a chat webhook (library crate).
//!
//! Re-exports public modules for integration tests and the binary.

pub mod config;
pub mod constants;
pub mod env;
pub mod models;
pub mod relay;
pub mod server;
