//! Byte positions within the logical input stream.
//!
//! Offsets are absolute: they count bytes over the concatenation of every
//! chunk fed so far, not positions within the current chunk.

use std::fmt;

/// A half-open byte range `start..end` in the input stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: u64,
    pub end: u64,
}

impl Span {
    #[inline]
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Zero-width span at a single offset.
    #[inline]
    pub fn at(offset: u64) -> Self {
        Self { start: offset, end: offset }
    }

    #[inline]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "byte {}", self.start)
        } else {
            write!(f, "bytes {}..{}", self.start, self.end)
        }
    }
}
