//! Lexical events - the contract between an event source and the builder.
//!
//! This is a SAX-style event model: events are emitted as the lexer
//! recognizes tokens, with no accumulation. Structure is represented by
//! start/end event pairs; object members are a `Key` followed by exactly
//! one value (a scalar, or a whole start..end container).
//!
//! `{"a": [1, true]}` emits:
//! ```text
//! MapStart
//! Key("a")
//! ArrayStart
//! Integer(1)
//! Bool(true)
//! ArrayEnd
//! MapEnd
//! ```

use crate::error::LexError;
use crate::value::Value;

/// Events delivered by an [`EventSource`].
///
/// The lifetime `'a` borrows from the source's internal token buffer, so
/// a handler must copy whatever it keeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event<'a> {
    // ========== Structure Events ==========

    /// Object start: `{`
    MapStart,

    /// Object end: `}`
    MapEnd,

    /// Array start: `[`
    ArrayStart,

    /// Array end: `]`
    ArrayEnd,

    /// Object member name; the next value event belongs to it.
    Key(&'a str),

    // ========== Value Events ==========

    /// `null`
    Null,

    /// `true` or `false`
    Bool(bool),

    /// Number without fraction or exponent that fits an `i64`
    Integer(i64),

    /// Any other number
    Float(f64),

    /// Raw number text, for sources that do not classify numbers.
    /// Classified with [`Value::from_number_text`].
    Number(&'a str),

    /// Decoded string value
    String(&'a str),

    // ========== Error Events ==========

    /// Malformed input. A source emits at most one of these per run.
    Error(LexError),
}

impl<'a> Event<'a> {
    /// Check if this is an error event.
    pub fn is_error(&self) -> bool {
        matches!(self, Event::Error(_))
    }

    /// Convert a scalar event into an owned value.
    ///
    /// Returns `None` for structure and error events, and for `Number`
    /// text that is not a number.
    pub fn to_scalar(&self) -> Option<Value> {
        match *self {
            Event::Null => Some(Value::Null),
            Event::Bool(b) => Some(Value::Bool(b)),
            Event::Integer(i) => Some(Value::Integer(i)),
            Event::Float(f) => Some(Value::Float(f)),
            Event::Number(text) => Value::from_number_text(text),
            Event::String(s) => Some(Value::String(s.to_owned())),
            _ => None,
        }
    }
}

/// A producer of lexical events from raw chunks.
///
/// Implementations keep whatever partial-token state they need between
/// calls; every event for a byte is delivered during the call that fed it
/// (or during `finish` for tokens only the end of input can terminate).
/// Events are never re-emitted for input already processed.
pub trait EventSource {
    /// Consume one chunk, delivering events synchronously to `sink`.
    fn feed_raw(&mut self, chunk: &[u8], sink: &mut dyn FnMut(Event<'_>));

    /// Signal end of input, flushing or rejecting any unfinished token.
    fn finish(&mut self, sink: &mut dyn FnMut(Event<'_>));

    /// Discard all state and accept input as if newly created.
    fn reset(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_conversion() {
        assert_eq!(Event::Null.to_scalar(), Some(Value::Null));
        assert_eq!(Event::Bool(false).to_scalar(), Some(Value::Bool(false)));
        assert_eq!(Event::Integer(32).to_scalar(), Some(Value::Integer(32)));
        assert_eq!(Event::Float(3.14).to_scalar(), Some(Value::Float(3.14)));
        assert_eq!(Event::Number("32").to_scalar(), Some(Value::Integer(32)));
        assert_eq!(Event::Number("3.14").to_scalar(), Some(Value::Float(3.14)));
        assert_eq!(Event::String("hi").to_scalar(), Some(Value::from("hi")));
        assert_eq!(Event::MapStart.to_scalar(), None);
        assert_eq!(Event::Key("k").to_scalar(), None);
    }
}
