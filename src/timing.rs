//! Per-keyframe on-screen durations.

use crate::foundation::error::{ReelResult, ValidationError};
use crate::model::FrameDuration;

/// A lone keyframe stays up this long.
pub const SOLO_SECS: f64 = 6.0;
/// Each keyframe of a pair.
pub const PAIR_SECS: f64 = 3.0;
/// First keyframe of a sequence of three or more.
pub const LEAD_SECS: f64 = 2.5;
/// Every later keyframe of a sequence of three or more.
pub const FOLLOW_SECS: f64 = 3.0;

/// Durations for `n` keyframes, in order.
///
/// `1 => [6.0]`, `2 => [3.0, 3.0]`, `n >= 3 => [2.5, 3.0, ..., 3.0]`. Zero is rejected.
pub fn allocate(n: usize) -> ReelResult<Vec<FrameDuration>> {
    let secs = match n {
        0 => return Err(ValidationError::InvalidFrameCount(n).into()),
        1 => vec![SOLO_SECS],
        2 => vec![PAIR_SECS; 2],
        _ => std::iter::once(LEAD_SECS)
            .chain(std::iter::repeat_n(FOLLOW_SECS, n - 1))
            .collect(),
    };
    Ok(secs.into_iter().map(FrameDuration::from_secs).collect())
}

/// Sum of `allocate(n)`, or `0.0` for zero keyframes.
pub fn total_secs(n: usize) -> f64 {
    match n {
        0 => 0.0,
        1 => SOLO_SECS,
        2 => 2.0 * PAIR_SECS,
        _ => LEAD_SECS + FOLLOW_SECS * (n - 1) as f64,
    }
}

#[cfg(test)]
#[path = "../tests/unit/timing.rs"]
mod tests;
