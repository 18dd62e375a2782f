//! # hookable
//!
//! Named, typed, in-process event channels with synchronous fan-out.
//!
//! - [`EventChannel`]: one broadcast point with its own lock and listeners
//! - [`EventHook`]: the handle returned by `register`; dropping it unregisters
//! - [`ChannelRegistry`]: resolves `(name, argument type)` to a channel
//! - [`HookableEvent`] / [`hookable_event!`]: declare an event once, use it anywhere
//!
//! See [`channel`] for delivery ordering and the reentrancy constraint.

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod hook;
pub mod registry;

// Re-exports
pub use channel::EventChannel;
pub use error::*;
pub use event::HookableEvent;
pub use hook::{EventHook, ListenerId};
pub use registry::{ChannelKey, ChannelRegistry};
