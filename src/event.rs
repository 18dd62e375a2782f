//! # Declared events
//!
//! A [`HookableEvent`] names a channel in the global
//! [`ChannelRegistry`] once, so that every call site registering on or
//! triggering that event talks to the same channel.
//!
//! Declare events with [`hookable_event!`](crate::hookable_event):
//!
//! ```rust
//! use hookable::{hookable_event, HookableEvent};
//!
//! hookable_event!(pub MyLovelyEvent = "My lovely event", String, u32);
//!
//! let _hook = MyLovelyEvent::register(
//!     |(foo, bar)| println!("I've been triggered with {foo} and {bar}"),
//!     "NameOfHook",
//! );
//! MyLovelyEvent::trigger(&("Hello world".to_string(), 42));
//! ```
//!
//! The identity of an event is its `NAME` plus its `Args` type. Two marker
//! types declaring the same name with the same arguments share a channel;
//! changing either the name or the argument list yields an unrelated channel
//! that silently never hears the other. Declare each event in one place and
//! import it everywhere else.

use std::sync::Arc;

use crate::channel::EventChannel;
use crate::error::HookResult;
use crate::hook::EventHook;
use crate::registry::ChannelRegistry;

pub trait HookableEvent {
    /// Human-readable event name, part of the channel identity.
    const NAME: &'static str;

    /// Argument bundle passed to every listener, usually a tuple.
    type Args: 'static;

    fn channel() -> Arc<EventChannel<Self::Args>> {
        ChannelRegistry::global().channel::<Self::Args>(Self::NAME)
    }

    fn register<F>(callback: F, name: impl Into<String>) -> EventHook
    where
        F: Fn(&Self::Args) + Send + Sync + 'static,
    {
        Self::channel().register(callback, name)
    }

    fn trigger(args: &Self::Args) {
        Self::channel().trigger(args)
    }

    fn try_trigger(args: &Self::Args) -> HookResult<usize> {
        Self::channel().try_trigger(args)
    }

    fn listener_count() -> usize {
        Self::channel().listener_count()
    }
}

/// Declares a unit type implementing [`HookableEvent`].
///
/// `hookable_event!(pub Name = "display name", T1, T2);` sets `Args` to
/// `(T1, T2)`. With no types `Args` is `()`.
#[macro_export]
macro_rules! hookable_event {
    ($(#[$meta:meta])* $vis:vis $event:ident = $name:literal $(, $arg:ty)* $(,)?) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $event;

        impl $crate::HookableEvent for $event {
            const NAME: &'static str = $name;
            type Args = ($($arg,)*);
        }
    };
}
