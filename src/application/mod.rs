//! Wiring of services into a running client.

pub mod context;
pub mod dashboard;

pub use context::{ClientContext, ClientPorts};
pub use dashboard::Dashboard;
