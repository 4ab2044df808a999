//! Application configuration for Pageturn.
//!
//! [`AppConfig`] is loaded once at startup (TOML file, then environment
//! overrides) and handed to the pieces that need it by reference.

mod config;
mod error;

pub use config::*;
pub use error::ConfigError;
