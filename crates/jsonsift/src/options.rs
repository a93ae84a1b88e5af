/// Configuration for [`parse_with`](crate::parse_with) and
/// [`parse_safe_with`](crate::parse_safe_with).
///
/// # Examples
///
/// ```rust
/// use jsonsift::{ParseError, ParserOptions, parse_with};
///
/// let options = ParserOptions {
///     max_depth: Some(2),
///     ..Default::default()
/// };
/// assert!(parse_with(b"[[1]]", options).is_ok());
/// assert!(matches!(
///     parse_with(b"[[[1]]]", options),
///     Err(ParseError::DepthLimitExceeded { depth: 2, .. })
/// ));
/// ```
///
/// # Default
///
/// Nesting is capped at [`ParserOptions::DEFAULT_MAX_DEPTH`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    /// Maximum nesting of arrays and objects. Opening a container beyond this
    /// depth fails with [`DepthLimitExceeded`](crate::ParseError::DepthLimitExceeded).
    ///
    /// `None` lifts the cap. Decoding, rendering and copying a subtree
    /// recurse once per level, so an unlimited document must fit the
    /// caller's stack.
    ///
    /// # Default
    ///
    /// `Some(DEFAULT_MAX_DEPTH)`
    pub max_depth: Option<usize>,
}

impl ParserOptions {
    /// Nesting cap used by [`parse`](crate::parse) and
    /// [`parse_safe`](crate::parse_safe).
    pub const DEFAULT_MAX_DEPTH: usize = 128;
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_depth: Some(Self::DEFAULT_MAX_DEPTH),
        }
    }
}
