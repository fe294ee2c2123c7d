//! Domain layer for the studyfeed client
//!
//! This module contains the feed data model and the ports the services
//! depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
