//! Observability for Pageturn.
//!
//! Binaries call [`init_logging`] once at startup; libraries only emit
//! `tracing` events and spans.

mod logging;

pub use logging::*;
pub use pageturn_core::{LogFormat, LoggingConfig};
