//! Event-to-tree accumulator.
//!
//! The builder turns a flat stream of [`Event`]s back into nested
//! [`Value`]s. It never sees bytes: whatever continuation state a chunk
//! boundary needs lives in the event source. All it keeps is a stack of
//! open containers and the member name waiting for its value.
//!
//! # Architecture
//!
//! ```text
//!   Event ──▶ handle_event ──▶ on_map_start / on_key / on_scalar / ...
//!                                   │
//!                 ┌─────────────────┴──────────────────┐
//!                 ▼                                    ▼
//!     stack non-empty: insert into top frame   stack empty: emit
//!     (parent kind decides append vs. keyed)   to value subscribers
//! ```
//!
//! Each `ContextFrame` records the key under which its container will
//! be stored once closed. Insertion always looks at the *parent's* kind,
//! never at whether a key happens to be present.

use crate::error::{Error, LexError, ProtocolError};
use crate::event::Event;
use crate::subscribe::{Channel, Subscribers, SubscriptionId};
use crate::value::{ContainerKind, Map, Value};

// ============================================================================
// Context Stack
// ============================================================================

/// A container under construction.
#[derive(Debug)]
enum Container {
    Array(Vec<Value>),
    Object(Map),
}

impl Container {
    fn empty(kind: ContainerKind) -> Self {
        match kind {
            ContainerKind::Array => Container::Array(Vec::new()),
            ContainerKind::Object => Container::Object(Map::new()),
        }
    }

    #[inline]
    fn kind(&self) -> ContainerKind {
        match self {
            Container::Array(_) => ContainerKind::Array,
            Container::Object(_) => ContainerKind::Object,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Container::Array(items) => Value::Array(items),
            Container::Object(map) => Value::Object(map),
        }
    }
}

/// One open container and the key it will be stored under.
#[derive(Debug)]
struct ContextFrame {
    key: Option<String>,
    container: Container,
}

// ============================================================================
// Builder
// ============================================================================

/// Rebuilds top-level values from lexical events and publishes them.
///
/// Values go to `on_value` subscribers, failures to `on_error`
/// subscribers. Neither is ever returned from a handler.
pub struct TreeBuilder<'a> {
    stack: Vec<ContextFrame>,
    pending_key: Option<String>,
    emitted: u64,
    values: Subscribers<'a, Value>,
    errors: Subscribers<'a, Error>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new() -> Self {
        Self {
            stack: Vec::new(),
            pending_key: None,
            emitted: 0,
            values: Subscribers::new(Channel::Value),
            errors: Subscribers::new(Channel::Error),
        }
    }

    // ========== Subscriptions ==========

    /// Register a callback for every completed top-level value.
    pub fn on_value<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Value) + 'a,
    {
        self.values.subscribe(callback)
    }

    /// Register a callback for every reported failure.
    pub fn on_error<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Error) + 'a,
    {
        self.errors.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        match id.channel() {
            Channel::Value => self.values.unsubscribe(id),
            Channel::Error => self.errors.unsubscribe(id),
        }
    }

    // ========== Introspection ==========

    /// Number of open containers.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True between top-level values: nothing open, no key waiting.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.stack.is_empty() && self.pending_key.is_none()
    }

    /// Top-level values published since construction.
    #[inline]
    pub fn values_emitted(&self) -> u64 {
        self.emitted
    }

    /// Drop any partial value. Subscribers stay registered.
    pub fn reset(&mut self) {
        if !self.is_idle() {
            tracing::debug!(depth = self.stack.len(), "discarding partial value");
        }
        self.stack.clear();
        self.pending_key = None;
    }

    // ========== Event Handlers ==========

    /// Dispatch one event to its handler.
    pub fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::MapStart => self.on_map_start(),
            Event::MapEnd => self.on_map_end(),
            Event::ArrayStart => self.on_array_start(),
            Event::ArrayEnd => self.on_array_end(),
            Event::Key(name) => self.on_key(name),
            Event::Error(err) => self.on_lex_error(err),
            Event::Number(text) => match event.to_scalar() {
                Some(value) => self.on_scalar(value),
                None => self.report(ProtocolError::InvalidNumber(text.to_owned()).into()),
            },
            scalar => {
                if let Some(value) = scalar.to_scalar() {
                    self.on_scalar(value);
                }
            }
        }
    }

    pub fn on_map_start(&mut self) {
        self.open(ContainerKind::Object);
    }

    pub fn on_map_end(&mut self) {
        self.close(ContainerKind::Object);
    }

    pub fn on_array_start(&mut self) {
        self.open(ContainerKind::Array);
    }

    pub fn on_array_end(&mut self) {
        self.close(ContainerKind::Array);
    }

    /// Remember a member name for the next value.
    pub fn on_key(&mut self, name: &str) {
        if self.top_kind() == Some(ContainerKind::Object) {
            self.pending_key = Some(name.to_owned());
        } else {
            self.report(ProtocolError::KeyOutsideObject(name.to_owned()).into());
        }
    }

    /// A complete scalar: a top-level value on its own, or a member/element.
    pub fn on_scalar(&mut self, value: Value) {
        if self.stack.is_empty() {
            self.emit(value);
        } else {
            let key = self.pending_key.take();
            self.insert(key, value);
        }
    }

    /// Forward a source error. Partial state is left as it is.
    pub fn on_lex_error(&mut self, err: LexError) {
        self.report(Error::from_lex(err));
    }

    // ========== Internals ==========

    #[inline]
    fn top_kind(&self) -> Option<ContainerKind> {
        self.stack.last().map(|frame| frame.container.kind())
    }

    fn open(&mut self, kind: ContainerKind) {
        self.stack.push(ContextFrame {
            key: self.pending_key.take(),
            container: Container::empty(kind),
        });
    }

    fn close(&mut self, kind: ContainerKind) {
        let Some(open) = self.top_kind() else {
            return self.report(ProtocolError::UnbalancedEnd(kind).into());
        };
        if open != kind {
            return self.report(
                ProtocolError::MismatchedEnd {
                    expected: open,
                    found: kind,
                }
                .into(),
            );
        }

        let Some(frame) = self.stack.pop() else {
            return;
        };
        let value = frame.container.into_value();
        if self.stack.is_empty() {
            self.emit(value);
        } else {
            self.insert(frame.key, value);
        }
    }

    /// Store `value` in the top frame. The frame's own kind decides how.
    fn insert(&mut self, key: Option<String>, value: Value) {
        let Some(top) = self.stack.last_mut() else {
            return self.emit(value);
        };
        let stored = match (&mut top.container, key) {
            (Container::Array(items), _) => {
                items.push(value);
                true
            }
            (Container::Object(map), Some(key)) => {
                map.insert(key, value);
                true
            }
            (Container::Object(_), None) => false,
        };
        if !stored {
            self.report(ProtocolError::MissingKey.into());
        }
    }

    fn emit(&mut self, value: Value) {
        self.emitted += 1;
        tracing::trace!(index = self.emitted, kind = value.kind_name(), "value complete");
        self.values.notify(&value);
    }

    fn report(&mut self, err: Error) {
        tracing::debug!(error = %err, "reporting failure");
        self.errors.notify(&err);
    }
}

impl Default for TreeBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TreeBuilder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeBuilder")
            .field("depth", &self.stack.len())
            .field("pending_key", &self.pending_key)
            .field("emitted", &self.emitted)
            .field("values", &self.values)
            .field("errors", &self.errors)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
