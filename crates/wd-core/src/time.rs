//! Time ranges on the timeline
//!
//! All timeline positions are seconds (`f64`) measured from project start.

use serde::{Deserialize, Serialize};

use crate::{WdError, WdResult};

/// Shortest visible clip a trim is allowed to produce (seconds)
pub const MIN_CLIP_DURATION: f64 = 0.01;

/// Half-open range `[start_time, end_time)` in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_time: f64,
    pub end_time: f64,
}

impl TimeRange {
    /// Validated constructor: rejects empty, inverted and non-finite ranges
    pub fn new(start_time: f64, end_time: f64) -> WdResult<Self> {
        if !start_time.is_finite() || !end_time.is_finite() || start_time >= end_time {
            return Err(WdError::InvalidTimeRange {
                start: start_time,
                end: end_time,
            });
        }
        Ok(Self {
            start_time,
            end_time,
        })
    }

    /// Range spanning two arbitrary points, in either order.
    ///
    /// May be degenerate (`start_time == end_time`), e.g. for point labels.
    pub fn ordered(a: f64, b: f64) -> Self {
        Self {
            start_time: a.min(b),
            end_time: a.max(b),
        }
    }

    #[inline]
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end_time <= self.start_time
    }

    /// `start_time <= t < end_time`
    #[inline]
    pub fn contains(&self, t: f64) -> bool {
        t >= self.start_time && t < self.end_time
    }

    /// True when the two half-open ranges share any time
    #[inline]
    pub fn overlaps(&self, start_time: f64, end_time: f64) -> bool {
        self.start_time < end_time && self.end_time > start_time
    }

    /// Same range moved by `delta` seconds
    pub fn shifted(&self, delta: f64) -> Self {
        Self {
            start_time: self.start_time + delta,
            end_time: self.end_time + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_degenerate() {
        assert!(TimeRange::new(1.0, 1.0).is_err());
        assert!(TimeRange::new(2.0, 1.0).is_err());
        assert!(TimeRange::new(f64::NAN, 1.0).is_err());
        assert!(TimeRange::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn test_ordered_and_overlap() {
        let r = TimeRange::ordered(6.0, 4.0);
        assert_eq!(r.start_time, 4.0);
        assert_eq!(r.end_time, 6.0);
        assert!(r.overlaps(5.0, 10.0));
        assert!(!r.overlaps(6.0, 10.0));
        assert!(r.contains(4.0));
        assert!(!r.contains(6.0));
    }
}
