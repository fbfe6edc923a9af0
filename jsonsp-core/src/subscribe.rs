//! Synchronous publish/subscribe registry.
//!
//! Subscribers are plain closures, called in registration order on the
//! publisher's thread before `notify` returns.

use std::fmt;

/// Which notification stream a subscription belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Value,
    Error,
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId {
    channel: Channel,
    seq: u64,
}

impl SubscriptionId {
    pub fn channel(&self) -> Channel {
        self.channel
    }
}

/// An ordered set of callbacks for payloads of type `T`.
pub struct Subscribers<'a, T: ?Sized> {
    channel: Channel,
    next_seq: u64,
    entries: Vec<(SubscriptionId, Box<dyn FnMut(&T) + 'a>)>,
}

impl<'a, T: ?Sized> Subscribers<'a, T> {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            next_seq: 0,
            entries: Vec::new(),
        }
    }

    /// Register a callback; it runs after every callback registered before it.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'a,
    {
        let id = SubscriptionId {
            channel: self.channel,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.entries.push((id, Box::new(callback)));
        id
    }

    /// Remove a callback. Returns false if `id` is unknown here.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Call every subscriber with `payload`, in registration order.
    pub fn notify(&mut self, payload: &T) {
        for (_, callback) in self.entries.iter_mut() {
            callback(payload);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T: ?Sized> fmt::Debug for Subscribers<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscribers")
            .field("channel", &self.channel)
            .field("len", &self.entries.len())
            .finish()
    }
}
