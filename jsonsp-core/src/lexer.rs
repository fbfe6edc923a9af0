//! Chunk-resumable JSON lexer.
//!
//! Turns raw bytes into [`Event`]s. Input may be split at any byte,
//! including inside a multi-byte UTF-8 sequence, an escape, a number or a
//! keyword: all partial-token state lives here, so the consumer only ever
//! sees whole tokens.
//!
//! # Architecture
//!
//! ```text
//!  chunk bytes ──▶ token state machine ──▶ grammar position ──▶ Event
//!                  (string/number/keyword)  (stack of open containers)
//! ```
//!
//! The grammar is enforced here, not in the tree builder: after the first
//! violation the lexer emits one `Event::Error` and ignores further input
//! until [`EventSource::reset`].

use memchr::memchr2;
use phf::phf_map;

use crate::error::{ErrorCode, LexError};
use crate::event::{Event, EventSource};
use crate::options::ParserOptions;
use crate::span::Span;
use crate::value::ContainerKind;

/// Keywords a bare word can resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Null,
    True,
    False,
}

static KEYWORDS: phf::Map<&'static str, Keyword> = phf_map! {
    "null" => Keyword::Null,
    "true" => Keyword::True,
    "false" => Keyword::False,
};

/// Longest keyword; anything longer is rejected without waiting for its end.
const MAX_KEYWORD_LEN: usize = 5;

/// What the grammar allows at the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// Between top-level values
    TopValue,
    /// After `:` or after `,` in an array
    Value,
    /// Right after `[`
    ValueOrEnd,
    /// Right after `{`
    KeyOrEnd,
    /// After `,` in an object
    Key,
    Colon,
    /// After a member or element value
    CommaOrEnd,
}

/// Progress through a string body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrState {
    Normal,
    Escape,
    /// `\u` digits; `high` holds a lead surrogate awaiting its trail.
    Unicode { high: Option<u32>, digits: u8, value: u32 },
    /// Lead surrogate seen, `\` of the trail escape expected
    TrailBackslash { high: u32 },
    /// Lead surrogate seen, `u` of the trail escape expected
    TrailU { high: u32 },
}

/// Progress through a number literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NumState {
    Minus,
    Zero,
    Int,
    Dot,
    Frac,
    Exp,
    ExpSign,
    ExpDigits,
}

impl NumState {
    /// States in which the literal read so far is a complete number.
    fn is_terminal(self) -> bool {
        matches!(self, NumState::Zero | NumState::Int | NumState::Frac | NumState::ExpDigits)
    }

    fn is_float(self) -> bool {
        matches!(self, NumState::Frac | NumState::ExpDigits)
    }
}

/// The token currently being accumulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    None,
    String { key: bool, state: StrState },
    Number(NumState),
    Keyword,
}

/// Streaming JSON lexer implementing [`EventSource`].
#[derive(Debug)]
pub struct Lexer {
    options: ParserOptions,
    /// Kinds of the currently open containers, innermost last.
    stack: Vec<ContainerKind>,
    expect: Expect,
    token: Token,
    /// Token bytes: decoded string bytes, number text or keyword text.
    buf: Vec<u8>,
    token_start: u64,
    /// Absolute offset of the next byte to be processed.
    offset: u64,
    /// At least one top-level value has been completed.
    seen_value: bool,
    /// The previous byte completed a keyword; an identifier byte now would
    /// make it a longer word.
    after_keyword: bool,
    failed: bool,
}

type Step = Result<usize, LexError>;

impl Lexer {
    pub fn new(options: ParserOptions) -> Self {
        Self {
            options,
            stack: Vec::new(),
            expect: Expect::TopValue,
            token: Token::None,
            buf: Vec::new(),
            token_start: 0,
            offset: 0,
            seen_value: false,
            after_keyword: false,
            failed: false,
        }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Number of containers currently open.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Total bytes consumed since creation or the last reset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// True once an error has been reported; input is ignored until reset.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// True while a token is split across a chunk boundary.
    pub fn in_token(&self) -> bool {
        self.token != Token::None
    }

    fn error_here(&self, code: ErrorCode) -> LexError {
        LexError::new(code, Span::new(self.offset, self.offset + 1))
    }

    fn error_token(&self, code: ErrorCode) -> LexError {
        LexError::new(code, Span::new(self.token_start, self.offset))
    }

    fn fail(&mut self, err: LexError, sink: &mut dyn FnMut(Event<'_>)) {
        tracing::debug!(code = ?err.code, offset = err.span.start, "lexer error");
        self.failed = true;
        sink(Event::Error(err));
    }

    fn start_token(&mut self, token: Token) {
        self.token = token;
        self.token_start = self.offset;
        self.buf.clear();
    }

    fn end_token(&mut self) {
        self.token = Token::None;
        self.buf.clear();
    }

    /// Grammar bookkeeping after a value (scalar or closed container).
    fn value_done(&mut self) {
        if self.stack.is_empty() {
            self.seen_value = true;
            self.expect = Expect::TopValue;
        } else {
            self.expect = Expect::CommaOrEnd;
        }
    }

    // ========================================================================
    // Structural bytes
    // ========================================================================

    fn step_structural(&mut self, b: u8, sink: &mut dyn FnMut(Event<'_>)) -> Step {
        if std::mem::take(&mut self.after_keyword) && is_word_byte(b) {
            return Err(LexError::new(
                ErrorCode::InvalidKeyword,
                Span::new(self.token_start, self.offset + 1),
            ));
        }
        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            return Ok(1);
        }

        match self.expect {
            Expect::TopValue => {
                if self.seen_value && !self.options.allow_multiple_values {
                    return Err(self.error_here(ErrorCode::TrailingValue));
                }
                self.begin_value(b, sink)
            }
            Expect::Value => self.begin_value(b, sink),
            Expect::ValueOrEnd => match b {
                b']' => self.close(ContainerKind::Array, sink),
                _ => self.begin_value(b, sink),
            },
            Expect::KeyOrEnd => match b {
                b'}' => self.close(ContainerKind::Object, sink),
                b'"' => self.begin_key(),
                _ => Err(self.error_here(ErrorCode::UnexpectedCharacter)),
            },
            Expect::Key => match b {
                b'"' => self.begin_key(),
                _ => Err(self.error_here(ErrorCode::UnexpectedCharacter)),
            },
            Expect::Colon => match b {
                b':' => {
                    self.expect = Expect::Value;
                    Ok(1)
                }
                _ => Err(self.error_here(ErrorCode::UnexpectedCharacter)),
            },
            Expect::CommaOrEnd => match (b, self.stack.last().copied()) {
                (b',', Some(ContainerKind::Object)) => {
                    self.expect = Expect::Key;
                    Ok(1)
                }
                (b',', Some(ContainerKind::Array)) => {
                    self.expect = Expect::Value;
                    Ok(1)
                }
                (b']', Some(ContainerKind::Array)) => self.close(ContainerKind::Array, sink),
                (b'}', Some(ContainerKind::Object)) => self.close(ContainerKind::Object, sink),
                _ => Err(self.error_here(ErrorCode::UnexpectedCharacter)),
            },
        }
    }

    fn begin_key(&mut self) -> Step {
        self.start_token(Token::String { key: true, state: StrState::Normal });
        Ok(1)
    }

    fn begin_value(&mut self, b: u8, sink: &mut dyn FnMut(Event<'_>)) -> Step {
        match b {
            b'{' => self.open(ContainerKind::Object, sink),
            b'[' => self.open(ContainerKind::Array, sink),
            b'"' => {
                self.start_token(Token::String { key: false, state: StrState::Normal });
                Ok(1)
            }
            b'-' => {
                self.start_token(Token::Number(NumState::Minus));
                self.buf.push(b);
                Ok(1)
            }
            b'0' => {
                self.start_token(Token::Number(NumState::Zero));
                self.buf.push(b);
                Ok(1)
            }
            b'1'..=b'9' => {
                self.start_token(Token::Number(NumState::Int));
                self.buf.push(b);
                Ok(1)
            }
            b if b.is_ascii_alphabetic() => {
                self.start_token(Token::Keyword);
                self.buf.push(b);
                Ok(1)
            }
            _ => Err(self.error_here(ErrorCode::UnexpectedCharacter)),
        }
    }

    fn open(&mut self, kind: ContainerKind, sink: &mut dyn FnMut(Event<'_>)) -> Step {
        if let Some(max) = self.options.max_depth {
            if self.stack.len() >= max {
                return Err(self.error_here(ErrorCode::DepthLimitExceeded));
            }
        }
        self.stack.push(kind);
        match kind {
            ContainerKind::Object => {
                self.expect = Expect::KeyOrEnd;
                sink(Event::MapStart);
            }
            ContainerKind::Array => {
                self.expect = Expect::ValueOrEnd;
                sink(Event::ArrayStart);
            }
        }
        Ok(1)
    }

    fn close(&mut self, kind: ContainerKind, sink: &mut dyn FnMut(Event<'_>)) -> Step {
        // Callers only get here with `kind` on top of the stack.
        self.stack.pop();
        sink(match kind {
            ContainerKind::Object => Event::MapEnd,
            ContainerKind::Array => Event::ArrayEnd,
        });
        self.value_done();
        Ok(1)
    }

    // ========================================================================
    // Strings
    // ========================================================================

    fn step_string(
        &mut self,
        rest: &[u8],
        key: bool,
        state: StrState,
        sink: &mut dyn FnMut(Event<'_>),
    ) -> Step {
        let b = rest[0];
        let next = match state {
            StrState::Normal => {
                let end = memchr2(b'"', b'\\', rest);
                let run = &rest[..end.unwrap_or(rest.len())];
                if let Some(pos) = run.iter().position(|&c| c < 0x20) {
                    return Err(LexError::new(
                        ErrorCode::ControlCharacter,
                        Span::at(self.offset + pos as u64),
                    ));
                }
                self.buf.extend_from_slice(run);
                return match end {
                    None => Ok(run.len()),
                    Some(pos) if rest[pos] == b'"' => {
                        let quote = self.offset + pos as u64;
                        self.finish_string(key, quote, sink)?;
                        Ok(pos + 1)
                    }
                    Some(pos) => {
                        self.token = Token::String { key, state: StrState::Escape };
                        Ok(pos + 1)
                    }
                };
            }
            StrState::Escape => {
                let decoded = match b {
                    b'"' | b'\\' | b'/' => b,
                    b'b' => 0x08,
                    b'f' => 0x0c,
                    b'n' => b'\n',
                    b'r' => b'\r',
                    b't' => b'\t',
                    b'u' => {
                        self.token = Token::String {
                            key,
                            state: StrState::Unicode { high: None, digits: 0, value: 0 },
                        };
                        return Ok(1);
                    }
                    _ => return Err(self.error_here(ErrorCode::InvalidEscape)),
                };
                self.buf.push(decoded);
                StrState::Normal
            }
            StrState::Unicode { high, digits, value } => {
                let digit = match (b as char).to_digit(16) {
                    Some(d) => d,
                    None => return Err(self.error_here(ErrorCode::InvalidUnicodeEscape)),
                };
                let value = (value << 4) | digit;
                if digits < 3 {
                    StrState::Unicode { high, digits: digits + 1, value }
                } else {
                    self.finish_unicode(high, value)?
                }
            }
            StrState::TrailBackslash { high } => match b {
                b'\\' => StrState::TrailU { high },
                _ => return Err(self.error_here(ErrorCode::InvalidUnicodeEscape)),
            },
            StrState::TrailU { high } => match b {
                b'u' => StrState::Unicode { high: Some(high), digits: 0, value: 0 },
                _ => return Err(self.error_here(ErrorCode::InvalidUnicodeEscape)),
            },
        };
        self.token = Token::String { key, state: next };
        Ok(1)
    }

    /// Complete a `\uXXXX` escape whose fourth digit was just read.
    fn finish_unicode(&mut self, high: Option<u32>, code: u32) -> Result<StrState, LexError> {
        let ch = match (high, code) {
            (None, 0xD800..=0xDBFF) => return Ok(StrState::TrailBackslash { high: code }),
            (None, 0xDC00..=0xDFFF) => None,
            (None, _) => char::from_u32(code),
            (Some(high), 0xDC00..=0xDFFF) => {
                char::from_u32(0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00))
            }
            (Some(_), _) => None,
        };
        match ch {
            Some(ch) => {
                let mut tmp = [0u8; 4];
                self.buf.extend_from_slice(ch.encode_utf8(&mut tmp).as_bytes());
                Ok(StrState::Normal)
            }
            None => Err(self.error_here(ErrorCode::InvalidUnicodeEscape)),
        }
    }

    /// Emit the accumulated string closed by the quote at `quote`.
    fn finish_string(
        &mut self,
        key: bool,
        quote: u64,
        sink: &mut dyn FnMut(Event<'_>),
    ) -> Result<(), LexError> {
        let span = Span::new(self.token_start, quote + 1);
        match std::str::from_utf8(&self.buf) {
            Ok(text) if key => sink(Event::Key(text)),
            Ok(text) => sink(Event::String(text)),
            Err(_) => return Err(LexError::new(ErrorCode::InvalidUtf8, span)),
        }
        self.end_token();
        if key {
            self.expect = Expect::Colon;
        } else {
            self.value_done();
        }
        Ok(())
    }

    // ========================================================================
    // Numbers and keywords
    // ========================================================================

    /// Returns 0 when `b` terminates the number; it is then reprocessed as
    /// a structural byte.
    fn step_number(&mut self, b: u8, state: NumState, sink: &mut dyn FnMut(Event<'_>)) -> Step {
        let next = match (state, b) {
            (NumState::Minus, b'0') => NumState::Zero,
            (NumState::Minus, b'1'..=b'9') => NumState::Int,
            (NumState::Zero, b'0'..=b'9') => return Err(self.error_here(ErrorCode::InvalidNumber)),
            (NumState::Int, b'0'..=b'9') => NumState::Int,
            (NumState::Zero | NumState::Int, b'.') => NumState::Dot,
            (NumState::Dot | NumState::Frac, b'0'..=b'9') => NumState::Frac,
            (NumState::Zero | NumState::Int | NumState::Frac, b'e' | b'E') => NumState::Exp,
            (NumState::Exp, b'+' | b'-') => NumState::ExpSign,
            (NumState::Exp | NumState::ExpSign | NumState::ExpDigits, b'0'..=b'9') => {
                NumState::ExpDigits
            }
            (state, _) if state.is_terminal() => {
                self.finish_number(state, sink)?;
                return Ok(0);
            }
            _ => return Err(self.error_here(ErrorCode::InvalidNumber)),
        };
        self.buf.push(b);
        self.token = Token::Number(next);
        Ok(1)
    }

    fn finish_number(&mut self, state: NumState, sink: &mut dyn FnMut(Event<'_>)) -> Result<(), LexError> {
        let invalid = self.error_token(ErrorCode::InvalidNumber);
        // The buffer only ever holds ASCII digits, signs, `.` and `e`.
        let text = std::str::from_utf8(&self.buf).map_err(|_| invalid)?;
        let event = if state.is_float() {
            Event::Float(parse_finite(text).ok_or(invalid)?)
        } else {
            match text.parse::<i64>() {
                Ok(i) => Event::Integer(i),
                Err(_) => Event::Float(parse_finite(text).ok_or(invalid)?),
            }
        };
        sink(event);
        self.end_token();
        self.value_done();
        Ok(())
    }

    /// No keyword is a prefix of another, so a keyword is emitted on its
    /// last letter. A word byte right after it is caught in
    /// `step_structural`.
    fn step_keyword(&mut self, b: u8, sink: &mut dyn FnMut(Event<'_>)) -> Step {
        if is_word_byte(b) {
            if self.buf.len() >= MAX_KEYWORD_LEN {
                return Err(LexError::new(
                    ErrorCode::InvalidKeyword,
                    Span::new(self.token_start, self.offset + 1),
                ));
            }
            self.buf.push(b);
            if is_keyword(&self.buf) {
                self.finish_keyword(sink)?;
                self.after_keyword = true;
            }
            return Ok(1);
        }
        self.finish_keyword(sink)?;
        Ok(0)
    }

    fn finish_keyword(&mut self, sink: &mut dyn FnMut(Event<'_>)) -> Result<(), LexError> {
        let keyword = std::str::from_utf8(&self.buf)
            .ok()
            .and_then(|word| KEYWORDS.get(word))
            .copied()
            .ok_or_else(|| self.error_token(ErrorCode::InvalidKeyword))?;
        sink(match keyword {
            Keyword::Null => Event::Null,
            Keyword::True => Event::Bool(true),
            Keyword::False => Event::Bool(false),
        });
        self.end_token();
        self.value_done();
        Ok(())
    }

    // ========================================================================
    // Driver
    // ========================================================================

    fn step(&mut self, rest: &[u8], sink: &mut dyn FnMut(Event<'_>)) -> Step {
        match self.token {
            Token::None => self.step_structural(rest[0], sink),
            Token::String { key, state } => self.step_string(rest, key, state, sink),
            Token::Number(state) => self.step_number(rest[0], state, sink),
            Token::Keyword => self.step_keyword(rest[0], sink),
        }
    }

    fn finish_input(&mut self, sink: &mut dyn FnMut(Event<'_>)) -> Result<(), LexError> {
        match self.token {
            Token::None => {}
            Token::Number(state) if state.is_terminal() => self.finish_number(state, sink)?,
            Token::Keyword if is_partial_keyword(&self.buf) => {
                return Err(self.error_token(ErrorCode::UnexpectedEof));
            }
            Token::Keyword => self.finish_keyword(sink)?,
            Token::Number(_) | Token::String { .. } => {
                return Err(self.error_token(ErrorCode::UnexpectedEof));
            }
        }
        if !self.stack.is_empty() {
            return Err(LexError::new(ErrorCode::UnexpectedEof, Span::at(self.offset)));
        }
        Ok(())
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}

impl EventSource for Lexer {
    fn feed_raw(&mut self, chunk: &[u8], sink: &mut dyn FnMut(Event<'_>)) {
        if self.failed {
            return;
        }
        tracing::trace!(len = chunk.len(), offset = self.offset, "lexer chunk");

        let mut i = 0;
        while i < chunk.len() {
            match self.step(&chunk[i..], sink) {
                Ok(consumed) => {
                    i += consumed;
                    self.offset += consumed as u64;
                }
                Err(err) => {
                    self.fail(err, sink);
                    return;
                }
            }
        }
    }

    /// Flushes a trailing top-level number or keyword, reports anything
    /// left unterminated, then resets so the lexer can take a new stream.
    fn finish(&mut self, sink: &mut dyn FnMut(Event<'_>)) {
        if !self.failed {
            if let Err(err) = self.finish_input(sink) {
                self.fail(err, sink);
            }
        }
        self.reset();
    }

    fn reset(&mut self) {
        let options = self.options;
        *self = Lexer {
            buf: std::mem::take(&mut self.buf),
            stack: std::mem::take(&mut self.stack),
            ..Lexer::new(options)
        };
        self.buf.clear();
        self.stack.clear();
    }
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_keyword(word: &[u8]) -> bool {
    std::str::from_utf8(word).map_or(false, |w| KEYWORDS.contains_key(w))
}

/// A strict prefix of some keyword, e.g. `tru`.
fn is_partial_keyword(word: &[u8]) -> bool {
    KEYWORDS
        .keys()
        .any(|k| k.len() > word.len() && k.as_bytes().starts_with(word))
}

fn parse_finite(text: &str) -> Option<f64> {
    text.parse::<f64>().ok().filter(|f| f.is_finite())
}
