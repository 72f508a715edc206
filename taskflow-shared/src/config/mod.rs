//! # Configuration
//!
//! Client configuration: where the API lives, how to log, and where the
//! session token is persisted.

pub mod client;

pub use client::{ClientConfig, ConfigError, LogFormat};
