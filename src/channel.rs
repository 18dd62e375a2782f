//! # Event Channel
//!
//! An [`EventChannel`] is one broadcast point: a name, a fixed argument type
//! `A`, and the insertion-ordered list of listeners currently registered on
//! it, guarded by a mutex private to this channel.
//!
//! ## Delivery
//!
//! ```text
//! register ──┐                    ┌──▶ listener 1 ─┐
//! register ──┼──▶ Mutex<entries> ─┤                ├─ in registration order,
//! drop hook ─┘        ▲           └──▶ listener N ─┘  on the triggering thread
//!                     │
//!              trigger(&args) holds the lock for the whole loop
//! ```
//!
//! - Listeners run synchronously on the thread that calls `trigger`.
//! - The lock is held for the full delivery, so triggers on the same channel
//!   never interleave, and a listener registered while a trigger is running
//!   is only seen by the next trigger.
//! - A panic inside a listener unwinds out of `trigger` and the remaining
//!   listeners are skipped for that call. [`EventChannel::try_trigger`]
//!   reports the same situation as a [`HookError`] instead.
//!
//! ## Reentrancy
//!
//! A listener must not call `register`, `trigger`, `listener_count`, or drop
//! an [`EventHook`] of the channel it is being called from. All of these take
//! the same lock and the calling thread deadlocks on itself. Operations on
//! *other* channels are fine.

use std::any::type_name;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use crate::error::{HookError, HookResult};
use crate::hook::{EventHook, ListenerId, Unhook};

type Callback<A> = Box<dyn Fn(&A) + Send + Sync>;

struct Listener<A> {
    id: ListenerId,
    name: String,
    callback: Callback<A>,
}

struct Listeners<A> {
    entries: Vec<Listener<A>>,
    next_id: u64,
}

pub struct EventChannel<A> {
    name: String,
    args_type: &'static str,
    listeners: Mutex<Listeners<A>>,
}

impl<A: 'static> EventChannel<A> {
    /// Creates a standalone channel that is not reachable through any
    /// [`ChannelRegistry`](crate::ChannelRegistry).
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            args_type: type_name::<A>(),
            listeners: Mutex::new(Listeners {
                entries: Vec::new(),
                next_id: 0,
            }),
        })
    }

    /// Registers `callback` and returns the handle that owns it.
    ///
    /// The listener is appended after every listener already present. It is
    /// not called by a trigger that is already running.
    pub fn register<F>(self: &Arc<Self>, callback: F, name: impl Into<String>) -> EventHook
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        let name = name.into();
        let id = {
            let mut listeners = self.lock();
            debug!(event = %self.name, listener = %name, "Registering handler at event hook");

            let id = ListenerId(listeners.next_id);
            listeners.next_id += 1;
            listeners.entries.push(Listener {
                id,
                name: name.clone(),
                callback: Box::new(callback),
            });
            id
        };

        let channel: Arc<dyn Unhook> = self.clone();
        EventHook::new(channel, id, name)
    }

    /// Calls every registered listener with `args`, in registration order.
    ///
    /// # Panics
    ///
    /// Propagates a panic raised by any listener; listeners after it are not
    /// called for this trigger.
    pub fn trigger(&self, args: &A) {
        let listeners = self.lock();
        trace!(event = %self.name, listeners = listeners.entries.len(), "Triggering event");

        for listener in listeners.entries.iter() {
            (listener.callback)(args);
        }
    }

    /// Like [`trigger`](Self::trigger), but a panicking listener is returned
    /// as [`HookError::ListenerPanicked`].
    ///
    /// Delivery still stops at the failing listener. On success returns the
    /// number of listeners called.
    pub fn try_trigger(&self, args: &A) -> HookResult<usize> {
        let listeners = self.lock();
        trace!(event = %self.name, listeners = listeners.entries.len(), "Triggering event");

        for listener in listeners.entries.iter() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| (listener.callback)(args)));
            if let Err(payload) = result {
                let err = HookError::from_panic(&self.name, &listener.name, payload.as_ref());
                warn!(
                    event = %self.name,
                    listener = %listener.name,
                    error = %err,
                    "Listener panicked, remaining listeners skipped"
                );
                return Err(err);
            }
        }

        Ok(listeners.entries.len())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `std::any::type_name` of the argument type.
    pub fn args_type(&self) -> &'static str {
        self.args_type
    }

    pub fn listener_count(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listener_count() == 0
    }

    /// Labels of the registered listeners, in delivery order.
    pub fn listener_names(&self) -> Vec<String> {
        self.lock()
            .entries
            .iter()
            .map(|listener| listener.name.clone())
            .collect()
    }

    // A listener that panicked mid-trigger poisons the mutex, but the entry
    // list is never mutated while callbacks run, so the data is still valid.
    fn lock(&self) -> MutexGuard<'_, Listeners<A>> {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: 'static> Unhook for EventChannel<A> {
    fn remove(&self, id: ListenerId) {
        let removed = {
            let mut listeners = self.lock();
            let position = listeners.entries.iter().position(|l| l.id == id);
            position.map(|index| listeners.entries.remove(index))
        };

        // Dropped outside the lock: the callback may own hooks of this channel.
        match removed {
            Some(listener) => {
                debug!(event = %self.name, listener = %listener.name, id = %id, "Removed handler from event hook");
            }
            None => {
                warn!(event = %self.name, id = %id, "Hook removal for unknown listener");
            }
        }
    }

    fn event_name(&self) -> &str {
        &self.name
    }
}

impl<A> fmt::Debug for EventChannel<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("name", &self.name)
            .field("args_type", &self.args_type)
            .finish_non_exhaustive()
    }
}
