//! The public facade: feed chunks in, get top-level values out.
//!
//! ```
//! use jsonsp_core::{Parser, ParserOptions, Value};
//! use std::cell::RefCell;
//!
//! let seen = RefCell::new(Vec::new());
//! let mut parser = Parser::new(ParserOptions::default());
//! parser.on_value(|v| seen.borrow_mut().push(v.clone()));
//!
//! parser.feed(r#"{"method": "ec"#);
//! parser.feed(r#"ho", "id": 1}"#);
//! drop(parser);
//!
//! let seen = seen.into_inner();
//! assert_eq!(seen.len(), 1);
//! assert_eq!(seen[0]["method"], Value::from("echo"));
//! ```

use crate::error::Error;
use crate::event::{Event, EventSource};
use crate::lexer::Lexer;
use crate::options::ParserOptions;
use crate::subscribe::SubscriptionId;
use crate::tree::TreeBuilder;
use crate::value::Value;

/// Incremental JSON stream parser.
///
/// Generic over its event source so the builder can be driven by anything
/// that speaks [`Event`]; the default is the crate's own [`Lexer`].
#[derive(Debug)]
pub struct Parser<'a, S: EventSource = Lexer> {
    source: S,
    builder: TreeBuilder<'a>,
}

impl<'a> Parser<'a, Lexer> {
    pub fn new(options: ParserOptions) -> Self {
        Self::with_source(Lexer::new(options))
    }

    /// Create a parser with one value subscriber already registered.
    ///
    /// The listener behaves exactly like one added later with
    /// [`Parser::on_value`].
    pub fn with_listener<F>(options: ParserOptions, listener: F) -> Self
    where
        F: FnMut(&Value) + 'a,
    {
        let mut parser = Self::new(options);
        parser.on_value(listener);
        parser
    }

    pub fn options(&self) -> &ParserOptions {
        self.source.options()
    }
}

impl<'a, S: EventSource> Parser<'a, S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            builder: TreeBuilder::new(),
        }
    }

    // ========== Subscriptions ==========

    /// Subscribe to completed top-level values.
    pub fn on_value<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Value) + 'a,
    {
        self.builder.on_value(callback)
    }

    /// Subscribe to failures.
    pub fn on_error<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Error) + 'a,
    {
        self.builder.on_error(callback)
    }

    /// Returns false if `id` was already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.builder.unsubscribe(id)
    }

    // ========== Input ==========

    /// Consume the next chunk of the stream.
    ///
    /// Chunks may split anywhere, including inside a UTF-8 sequence. Every
    /// value completed by this chunk is published before `feed` returns.
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) {
        let chunk = chunk.as_ref();
        tracing::trace!(len = chunk.len(), "feed");
        let builder = &mut self.builder;
        self.source
            .feed_raw(chunk, &mut |event: Event<'_>| builder.handle_event(event));
    }

    /// Signal end of input.
    ///
    /// Publishes a trailing top-level number still waiting for its
    /// terminator, reports anything left unterminated, and leaves the
    /// parser ready for a new stream.
    pub fn finish(&mut self) {
        let builder = &mut self.builder;
        self.source
            .finish(&mut |event: Event<'_>| builder.handle_event(event));
        self.builder.reset();
    }

    /// Discard partial input and any failed state. Subscribers are kept.
    pub fn reset(&mut self) {
        tracing::debug!("parser reset");
        self.source.reset();
        self.builder.reset();
    }

    // ========== Introspection ==========

    /// Containers currently open in the value under construction.
    pub fn depth(&self) -> usize {
        self.builder.depth()
    }

    /// True between top-level values.
    pub fn is_idle(&self) -> bool {
        self.builder.is_idle()
    }

    pub fn values_emitted(&self) -> u64 {
        self.builder.values_emitted()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl Default for Parser<'_, Lexer> {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}
