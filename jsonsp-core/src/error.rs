//! Failure taxonomy for the stream parser.
//!
//! Nothing in this crate returns these from `feed()`. They are published
//! through the failure channel of [`crate::Parser`], exactly once each.

use thiserror::Error;

use crate::span::Span;
use crate::value::ContainerKind;

/// Lexical error codes.
///
/// A plain enum keeps `LexError` `Copy` and allocation-free; the message
/// table lives in [`ErrorCode::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCode {
    /// Input ended inside a token or an open container
    UnexpectedEof = 0,
    /// Byte that cannot start or continue anything at this position
    UnexpectedCharacter,
    /// Bare word other than `null`, `true` or `false`
    InvalidKeyword,
    /// Malformed number literal, or one that does not fit an f64
    InvalidNumber,
    /// Backslash followed by an unknown escape letter
    InvalidEscape,
    /// Bad `\uXXXX` digits or an unpaired surrogate
    InvalidUnicodeEscape,
    /// String bytes are not valid UTF-8
    InvalidUtf8,
    /// Unescaped control character inside a string
    ControlCharacter,
    /// A second top-level value when only one is allowed
    TrailingValue,
    /// Containers nested deeper than the configured limit
    DepthLimitExceeded,
}

impl ErrorCode {
    /// Get a human-readable message for this error code.
    pub fn message(self) -> &'static str {
        match self {
            Self::UnexpectedEof => "unexpected end of input",
            Self::UnexpectedCharacter => "unexpected character",
            Self::InvalidKeyword => "invalid keyword",
            Self::InvalidNumber => "invalid number",
            Self::InvalidEscape => "invalid escape sequence",
            Self::InvalidUnicodeEscape => "invalid unicode escape",
            Self::InvalidUtf8 => "invalid UTF-8 in string",
            Self::ControlCharacter => "control character in string",
            Self::TrailingValue => "trailing top-level value",
            Self::DepthLimitExceeded => "nesting too deep",
        }
    }
}

/// Error reported by the lexical event source.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{} at {span}", code.message())]
pub struct LexError {
    pub code: ErrorCode,
    pub span: Span,
}

impl LexError {
    pub fn new(code: ErrorCode, span: Span) -> Self {
        Self { code, span }
    }

    /// Byte offset where the error was detected.
    pub fn offset(&self) -> u64 {
        self.span.start
    }
}

/// Event sequences a well-behaved source never produces.
///
/// The builder drops the offending event and reports one of these rather
/// than guessing at a repair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("key {0:?} received outside an object")]
    KeyOutsideObject(String),

    #[error("value received in an object without a preceding key")]
    MissingKey,

    #[error("{0} end received with no open container")]
    UnbalancedEnd(ContainerKind),

    #[error("{found} end received while {expected} is open")]
    MismatchedEnd {
        expected: ContainerKind,
        found: ContainerKind,
    },

    #[error("number text {0:?} is not a number")]
    InvalidNumber(String),
}

/// Any failure published by [`crate::Parser`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Malformed JSON text, detected by the lexer.
    #[error("syntax error: {0}")]
    Lex(#[from] LexError),

    /// A second top-level value arrived while only one is allowed.
    #[error("multiple top-level values are not allowed (second value at byte {offset})")]
    MultipleValues { offset: u64 },

    /// The event source broke the builder's assumptions.
    #[error("event protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Classify a lexer error, lifting multiplicity violations into their
    /// own variant.
    pub fn from_lex(err: LexError) -> Self {
        match err.code {
            ErrorCode::TrailingValue => Error::MultipleValues { offset: err.offset() },
            _ => Error::Lex(err),
        }
    }

    /// Byte offset of the failure, when the source knows it.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Error::Lex(err) => Some(err.offset()),
            Error::MultipleValues { offset } => Some(*offset),
            Error::Protocol(_) => None,
        }
    }
}
