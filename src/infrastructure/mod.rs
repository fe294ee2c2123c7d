//! Infrastructure layer module
//!
//! This module contains the process-level plumbing:
//! - Configuration management
//! - Logging infrastructure
//! - Credentials storage
//!
//! Storage implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod credentials;
pub mod logging;
