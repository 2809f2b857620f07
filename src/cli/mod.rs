//! CLI argument parsing.

pub mod args;
