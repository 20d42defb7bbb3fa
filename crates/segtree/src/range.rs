use std::ops::{Bound, RangeBounds};

use crate::SegTreeError;

/// Normalises `range` to an inclusive `[start, end]` lying inside `0..len`.
///
/// Half-open ranges that select nothing (`2..2`, `..0`) are rejected rather
/// than clamped: every accepted range covers at least one leaf.
pub(crate) fn inclusive_bounds<R: RangeBounds<usize>>(
    range: &R,
    len: usize,
) -> Result<(usize, usize), SegTreeError> {
    let start = match range.start_bound() {
        Bound::Included(&s) => Some(s),
        Bound::Excluded(&s) => s.checked_add(1),
        Bound::Unbounded => Some(0),
    };
    let end = match range.end_bound() {
        Bound::Included(&e) => Some(e),
        Bound::Excluded(&e) => e.checked_sub(1),
        Bound::Unbounded => len.checked_sub(1),
    };

    match (start, end) {
        (Some(start), Some(end)) if start <= end && end < len => Ok((start, end)),
        (start, end) => Err(SegTreeError::InvalidRange {
            start: start.unwrap_or(usize::MAX),
            end,
            len,
        }),
    }
}

#[inline(always)]
pub(crate) fn check_index(index: usize, len: usize) -> Result<(), SegTreeError> {
    if index < len {
        Ok(())
    } else {
        Err(SegTreeError::IndexOutOfRange { index, len })
    }
}
