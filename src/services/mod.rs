//! Client services: credentials, event bus, push channel, session and live list.

pub mod connection_manager;
pub mod credential_store;
pub mod event_bus;
pub mod live_list_reconciler;
pub mod session_controller;

pub use connection_manager::{ConnectionConfig, ConnectionManager};
pub use credential_store::CredentialStore;
pub use event_bus::{
    BusEvent, EventBus, EventHandler, FeedEvent, SequenceNumber, Subscription, SubscriptionId,
};
pub use live_list_reconciler::{
    LiveListReconciler, LiveViewSnapshot, ReconcileCommand, ReconcileOutcome, ReconcilerConfig,
};
pub use session_controller::SessionController;
