//! Parser configuration.

/// Default nesting limit for arrays and objects.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options fixed at construction time.
///
/// Options are passed through to the lexer unchanged; the lexer is the one
/// that enforces them.
///
/// # Nesting limit
///
/// The defaults reject valid JSON nested deeper than [`DEFAULT_MAX_DEPTH`]
/// containers: the container that would open level 513 is reported as
/// [`ErrorCode::DepthLimitExceeded`](crate::ErrorCode::DepthLimitExceeded)
/// and nothing from that value is published. This bounds the memory one
/// peer can pin with a stream of `[`. Use `max_depth(None)` to accept any
/// depth, or `max_depth(Some(n))` for another limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "camelCase"))]
pub struct ParserOptions {
    /// Accept any number of top-level values on one stream. When false,
    /// the first byte of a second value is a failure.
    pub allow_multiple_values: bool,

    /// Maximum container nesting, `Some(512)` by default. `None` disables
    /// the check.
    pub max_depth: Option<usize>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_multiple_values: true,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl ParserOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that accept exactly one top-level value.
    pub fn single_value() -> Self {
        Self::default().allow_multiple_values(false)
    }

    pub fn allow_multiple_values(mut self, allow: bool) -> Self {
        self.allow_multiple_values = allow;
        self
    }

    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_allow_multiple_values() {
        let opts = ParserOptions::default();
        assert!(opts.allow_multiple_values);
        assert_eq!(opts.max_depth, Some(DEFAULT_MAX_DEPTH));
    }

    #[test]
    fn test_builder_setters() {
        let opts = ParserOptions::new().allow_multiple_values(false).max_depth(None);
        assert!(!opts.allow_multiple_values);
        assert_eq!(opts.max_depth, None);
        assert_eq!(ParserOptions::single_value().allow_multiple_values, false);
    }
}
