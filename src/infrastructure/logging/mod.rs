//! Logging infrastructure
//!
//! Structured logging using tracing and tracing-subscriber:
//! - JSON or pretty formatting on stderr
//! - Optional rolling log files
//! - Token scrubbing for transport diagnostics
pub mod config;
pub mod logger;
pub mod token_scrubber;

pub use config::{LogConfig, LogFormat, RotationPolicy};
pub use logger::LoggerImpl;
pub use token_scrubber::{scrub, TokenScrubber};
