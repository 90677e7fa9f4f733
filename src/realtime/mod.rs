//! In-process change feed and presence tracking.
//!
//! Writes publish [`ChangeEvent`]s on the [`EventHub`]; HTTP subscribers
//! receive the events of their own workspace as server-sent events.

pub mod events;
pub mod presence;
pub mod sse;

pub use events::{ChangeAction, ChangeEvent, EventHub};
pub use presence::PresenceTracker;
