//! jsonsp core
//!
//! Incremental JSON stream parser. Text arrives in arbitrary chunks; every
//! complete top-level value is rebuilt as a [`Value`] and published to
//! subscribers as soon as its last byte has been fed.
//!
//! # Architecture
//!
//! - **lexer.rs** - Resumable byte-level state machine producing events
//! - **event.rs** - `Event` enum and the `EventSource` trait
//! - **tree.rs** - Context stack that folds events back into values
//! - **parser.rs** - `Parser` facade tying a source to a builder
//! - **subscribe.rs** - Ordered callback registry with removable handles
//! - **value.rs** - `Value` and the insertion-ordered `Map`
//! - **error.rs** - Lexical, multiplicity and protocol failures
//! - **options.rs** - `ParserOptions`
//! - **span.rs** - Byte spans for error reporting

pub mod error;
pub mod event;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod span;
pub mod subscribe;
pub mod tree;
pub mod value;

pub use error::{Error, ErrorCode, LexError, ProtocolError};
pub use event::{Event, EventSource};
pub use lexer::Lexer;
pub use options::{ParserOptions, DEFAULT_MAX_DEPTH};
pub use parser::Parser;
pub use span::Span;
pub use subscribe::{Channel, SubscriptionId};
pub use tree::TreeBuilder;
pub use value::{ContainerKind, Map, Value};

/// Crate version, as published.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
