//! # Registration handles
//!
//! An [`EventHook`] is returned by every `register` call and is the only way
//! to unregister a listener: dropping it removes the listener from its
//! channel. Handles are type-erased so that a subsystem can keep hooks for
//! unrelated channels side by side, e.g. in a `Vec<EventHook>`.
//!
//! ```rust
//! # use hookable::EventChannel;
//! let channel = EventChannel::<(u32,)>::new("Frame");
//! let hook = channel.register(|(frame,)| println!("frame {frame}"), "printer");
//! assert_eq!(channel.listener_count(), 1);
//!
//! drop(hook);
//! assert_eq!(channel.listener_count(), 0);
//! ```

use std::fmt;
use std::sync::Arc;

/// Identity of a listener inside its channel.
///
/// Assigned from a per-channel counter, never reused. Removal goes by this
/// id, not by label or callback equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Removal side of a channel, erased over its argument type.
pub(crate) trait Unhook: Send + Sync {
    fn remove(&self, id: ListenerId);
    fn event_name(&self) -> &str;
}

/// Ownership handle for one registered listener.
///
/// Not `Clone`. Dropping the handle unregisters the listener; once the drop
/// returns, no later trigger will call it. A trigger already running on
/// another thread finishes first, because removal waits for the channel lock.
///
/// Dropping a handle from inside a callback of the *same* channel deadlocks.
#[must_use = "dropping the hook immediately unregisters the listener"]
pub struct EventHook {
    channel: Option<Arc<dyn Unhook>>,
    id: ListenerId,
    name: String,
    event: String,
}

impl EventHook {
    pub(crate) fn new(channel: Arc<dyn Unhook>, id: ListenerId, name: String) -> Self {
        let event = channel.event_name().to_string();
        Self {
            channel: Some(channel),
            id,
            name,
            event,
        }
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Diagnostic label given at registration.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn event_name(&self) -> &str {
        &self.event
    }

    /// Unregisters the listener now. Same as dropping the handle.
    pub fn release(self) {
        drop(self);
    }

    /// Gives up the handle without unregistering: the listener stays
    /// registered for as long as its channel lives.
    pub fn leak(mut self) {
        tracing::debug!(
            event = %self.event,
            listener = %self.name,
            id = %self.id,
            "Leaking hook, listener stays registered"
        );
        self.channel = None;
    }
}

impl Drop for EventHook {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.take() {
            channel.remove(self.id);
        }
    }
}

impl fmt::Debug for EventHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHook")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("event", &self.event)
            .field("attached", &self.channel.is_some())
            .finish()
    }
}
