//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces that infrastructure adapters implement:
//! - FeedbackClient: snapshot, detail and visibility endpoints
//! - LoginClient: identity and token exchange endpoints
//! - TokenStorage: durable slot for the bearer token
//! - ChannelConnector / Channel: persistent push channel transport
//!
//! Services depend only on these traits, which keeps them testable with
//! in-process fakes.
pub mod channel;
pub mod feedback_client;
pub mod login_client;
pub mod token_storage;

pub use channel::{Channel, ChannelConnector};
pub use feedback_client::{FeedbackClient, LogQuery, VisibilityRequest};
pub use login_client::LoginClient;
pub use token_storage::TokenStorage;
