use thiserror::Error;

/// Errors returned by [`SegTree`](crate::SegTree) operations.
///
/// Every variant is a caller-input error. Calls are validated before any node
/// is touched, so a failed call leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegTreeError {
    #[error("cannot build a segment tree from an empty sequence")]
    EmptyInput,

    #[error("index {index} is out of range for a tree of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// The inclusive range `[start, end]` is reversed, empty or exceeds the
    /// tree bounds. `end` may be `None` when a half-open range ends at zero.
    #[error("invalid range [{start}, {}] for a tree of length {len}", fmt_end(.end))]
    InvalidRange {
        start: usize,
        end: Option<usize>,
        len: usize,
    },

    #[error("range update expects {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

fn fmt_end(end: &Option<usize>) -> String {
    match end {
        Some(end) => end.to_string(),
        None => "-1".to_string(),
    }
}
