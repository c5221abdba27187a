//! Configuration module for the relay.
//!
//! Supports JSON configuration files, inline JSON, per-field environment
//! overrides and compiled-in defaults. Command-line flags are applied on top
//! by the binary.
//!
//! # Module Structure
//!
//! - [`crate::config::types`]: Root `Config` struct
//! - [`relay`]: Fan-out, timeout and datagram settings
//! - [`logging`]: Logging configuration
//! - [`crate::config::loader`]: Configuration loading functions
//! - [`crate::config::validation`]: Configuration validation functions
//! - [`crate::config::defaults`]: Default value functions

pub mod defaults;
pub mod loader;
pub mod logging;
pub mod relay;
pub mod types;
pub mod validation;

pub use loader::load;

pub use logging::{LogFormat, LogLevel, LoggingConfig};

pub use relay::RelayConfig;

pub use types::Config;

pub use validation::validate_config;
