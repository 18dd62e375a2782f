//! # Channel Registry
//!
//! Maps a channel identity, the event name plus its argument type, to the one
//! [`EventChannel`] serving it. Channels are created on first lookup and are
//! never removed; a channel whose last listener went away stays in place,
//! empty.
//!
//! The process-wide instance behind [`ChannelRegistry::global`] is what
//! [`HookableEvent`](crate::HookableEvent) uses. Separate instances from
//! [`ChannelRegistry::new`] share nothing with it.
//!
//! Each channel keeps its own lock. The registry map is only touched while
//! resolving a channel, never while a channel delivers.

use std::any::{type_name, Any, TypeId};
use std::borrow::Cow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use dashmap::DashMap;
use lazy_static::lazy_static;
use tracing::debug;

use crate::channel::EventChannel;
use crate::error::{HookError, HookResult};

lazy_static! {
    static ref GLOBAL_REGISTRY: ChannelRegistry = ChannelRegistry::new();
}

/// Identity of a channel: name and argument type.
///
/// `args_type` is the readable type name and takes no part in equality.
#[derive(Clone)]
pub struct ChannelKey {
    name: Cow<'static, str>,
    args: TypeId,
    args_type: &'static str,
}

impl ChannelKey {
    pub fn of<A: 'static>(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            args: TypeId::of::<A>(),
            args_type: type_name::<A>(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args_type(&self) -> &'static str {
        self.args_type
    }
}

impl PartialEq for ChannelKey {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args
    }
}

impl Eq for ChannelKey {}

impl Hash for ChannelKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.args.hash(state);
    }
}

impl fmt::Debug for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.args_type)
    }
}

type ErasedChannel = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct ChannelRegistry {
    channels: DashMap<ChannelKey, ErasedChannel>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// The registry shared by the whole process. Initialized once, on first
    /// use, and never torn down.
    pub fn global() -> &'static ChannelRegistry {
        &GLOBAL_REGISTRY
    }

    /// Returns the channel for `name` and `A`, creating it if needed.
    ///
    /// Concurrent first lookups of the same identity all get the same channel.
    pub fn channel<A: 'static>(&self, name: impl Into<Cow<'static, str>>) -> Arc<EventChannel<A>> {
        match self.try_channel(name) {
            Ok(channel) => channel,
            // The key carries `TypeId::of::<A>()`, so a stored channel always
            // downcasts to `EventChannel<A>`.
            Err(err) => unreachable!("{err}"),
        }
    }

    pub fn try_channel<A: 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> HookResult<Arc<EventChannel<A>>> {
        let key = ChannelKey::of::<A>(name);
        let erased = self
            .channels
            .entry(key.clone())
            .or_insert_with(|| {
                debug!(event = %key.name(), args = key.args_type(), "Creating event channel");
                let channel: ErasedChannel = EventChannel::<A>::new(key.name().to_string());
                channel
            })
            .clone();

        downcast(&key, erased)
    }

    /// Looks up an existing channel without creating it.
    pub fn get<A: 'static>(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> Option<Arc<EventChannel<A>>> {
        let key = ChannelKey::of::<A>(name);
        let erased = self.channels.get(&key)?.clone();
        downcast(&key, erased).ok()
    }

    pub fn contains<A: 'static>(&self, name: impl Into<Cow<'static, str>>) -> bool {
        self.channels.contains_key(&ChannelKey::of::<A>(name))
    }

    /// Number of channels created so far.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn keys(&self) -> Vec<ChannelKey> {
        self.channels.iter().map(|entry| entry.key().clone()).collect()
    }
}

fn downcast<A: 'static>(key: &ChannelKey, erased: ErasedChannel) -> HookResult<Arc<EventChannel<A>>> {
    erased
        .downcast::<EventChannel<A>>()
        .map_err(|_| HookError::ChannelTypeMismatch {
            event: key.name().to_string(),
            expected: key.args_type().to_string(),
        })
}

impl fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("channels", &self.keys())
            .finish()
    }
}
