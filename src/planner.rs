//! Loop count planning
//!
//! Turns a source duration and a target duration into the number of whole
//! copies of the source needed to reach the target.

use std::fmt;

use serde::Serialize;

use crate::duration::MediaDuration;
use crate::error::{LooperError, Result};

/// Upper bound on copies; keeps every count exactly representable as f64
/// and every power table comfortably small.
pub const MAX_LOOP_COUNT: u64 = 1 << 32;

/// Number of whole copies of the source. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct LoopCount(u64);

impl LoopCount {
    /// Returns `None` for zero
    pub fn new(count: u64) -> Option<Self> {
        (count >= 1).then_some(Self(count))
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// Whether the count is itself a single power of two
    pub fn is_power_of_two(self) -> bool {
        self.0.is_power_of_two()
    }
}

impl fmt::Display for LoopCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of planning: how many copies and what that adds up to
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoopPlan {
    pub loop_count: LoopCount,
    pub source_secs: f64,
    pub target_secs: f64,
    /// `loop_count × source_secs`, for display only
    pub final_secs: f64,
}

impl LoopPlan {
    pub fn final_hours(&self) -> f64 {
        self.final_secs / 3600.0
    }

    pub fn target_hours(&self) -> f64 {
        self.target_secs / 3600.0
    }
}

/// Smallest `L ≥ 1` with `L × source ≥ target`.
///
/// The float ceiling of the ratio is only a starting guess: it is corrected
/// against the product so that rounding in the division can neither
/// undercount nor overcount.
pub fn plan_loop_count(source: MediaDuration, target_secs: f64) -> Result<LoopPlan> {
    if !target_secs.is_finite() || target_secs <= 0.0 {
        return Err(LooperError::InvalidTarget { value: target_secs });
    }

    let source_secs = source.as_secs();
    let ratio = target_secs / source_secs;
    if ratio > MAX_LOOP_COUNT as f64 {
        return Err(LooperError::LoopCountTooLarge {
            loops: ratio.ceil(),
            max: MAX_LOOP_COUNT,
        });
    }

    let mut count = (ratio.ceil() as u64).max(1);
    while (count as f64) * source_secs < target_secs {
        count += 1;
    }
    while count > 1 && ((count - 1) as f64) * source_secs >= target_secs {
        count -= 1;
    }

    if count > MAX_LOOP_COUNT {
        return Err(LooperError::LoopCountTooLarge {
            loops: count as f64,
            max: MAX_LOOP_COUNT,
        });
    }

    Ok(LoopPlan {
        loop_count: LoopCount(count),
        source_secs,
        target_secs,
        final_secs: count as f64 * source_secs,
    })
}

/// Convenience wrapper for targets given in hours
pub fn plan_for_hours(source: MediaDuration, target_hours: f64) -> Result<LoopPlan> {
    if !target_hours.is_finite() || target_hours <= 0.0 {
        return Err(LooperError::InvalidTarget {
            value: target_hours,
        });
    }
    plan_loop_count(source, target_hours * 3600.0)
}
