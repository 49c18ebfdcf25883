//! Clip volume envelopes
//!
//! An envelope is a list of `(time, dB)` control points ordered by time,
//! with times relative to the owning clip's start. The display curve is a
//! cubic power mapping over `[ENVELOPE_DB_MIN, ENVELOPE_DB_MAX]`, with
//! `-∞ dB` as a separate sentinel (silence).

use serde::{Deserialize, Serialize};

/// Lowest finite envelope value
pub const ENVELOPE_DB_MIN: f64 = -60.0;

/// Highest envelope value
pub const ENVELOPE_DB_MAX: f64 = 12.0;

/// Envelope control point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    /// Seconds relative to clip start
    pub time: f64,
    /// Level in decibels, `f64::NEG_INFINITY` for silence
    #[serde(with = "db_serde")]
    pub db: f64,
}

impl EnvelopePoint {
    pub fn new(time: f64, db: f64) -> Self {
        Self {
            time,
            db: clamp_db(db),
        }
    }

    /// Silence sentinel point
    pub fn silent(time: f64) -> Self {
        Self {
            time,
            db: f64::NEG_INFINITY,
        }
    }

    #[inline]
    pub fn is_silent(&self) -> bool {
        self.db == f64::NEG_INFINITY
    }
}

// JSON has no infinity; silence is written as `null`.
mod db_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(db: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = if db.is_finite() { Some(*db) } else { None };
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<f64>::deserialize(deserializer)?;
        Ok(value.unwrap_or(f64::NEG_INFINITY))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEVEL MAPPING
// ═══════════════════════════════════════════════════════════════════════════════

/// Clamp into the editable domain, keeping the silence sentinel intact
pub fn clamp_db(db: f64) -> f64 {
    if db == f64::NEG_INFINITY || db.is_nan() {
        return f64::NEG_INFINITY;
    }
    db.clamp(ENVELOPE_DB_MIN, ENVELOPE_DB_MAX)
}

/// Map dB to a display position in `[0, 1]` (0 = bottom, 1 = top).
///
/// Cubic curve: `((db - min) / range)^3`. Silence maps to 0.
pub fn db_to_normalized(db: f64) -> f64 {
    if db == f64::NEG_INFINITY {
        return 0.0;
    }
    let linear = (clamp_db(db) - ENVELOPE_DB_MIN) / (ENVELOPE_DB_MAX - ENVELOPE_DB_MIN);
    linear.powi(3)
}

/// Inverse of [`db_to_normalized`] for finite levels (`cbrt`)
pub fn normalized_to_db(position: f64) -> f64 {
    let linear = position.clamp(0.0, 1.0).cbrt();
    ENVELOPE_DB_MIN + linear * (ENVELOPE_DB_MAX - ENVELOPE_DB_MIN)
}

/// Linear gain for a dB value (`-∞` → 0)
#[inline]
pub fn db_to_gain(db: f64) -> f64 {
    if db == f64::NEG_INFINITY {
        0.0
    } else {
        10f64.powf(db / 20.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// POINT LISTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Envelope level in dB at `time`, linear in dB between neighbours.
///
/// Flat 0 dB when there are no points; holds the first/last value outside
/// the point range. A silent endpoint makes the whole segment silent.
pub fn db_at(points: &[EnvelopePoint], time: f64) -> f64 {
    let Some(first) = points.first() else {
        return 0.0;
    };
    if time <= first.time {
        return first.db;
    }
    let idx = points.partition_point(|p| p.time <= time);
    if idx >= points.len() {
        return points[points.len() - 1].db;
    }

    let p1 = &points[idx - 1];
    let p2 = &points[idx];
    if p1.is_silent() || p2.is_silent() {
        return f64::NEG_INFINITY;
    }
    let span = p2.time - p1.time;
    if span <= 0.0 {
        return p2.db;
    }
    let t = (time - p1.time) / span;
    p1.db + (p2.db - p1.db) * t
}

/// Linear gain at `time`
pub fn gain_at(points: &[EnvelopePoint], time: f64) -> f64 {
    db_to_gain(db_at(points, time))
}

/// Insert keeping time order; returns the index of the new point
pub fn insert_point(points: &mut Vec<EnvelopePoint>, point: EnvelopePoint) -> usize {
    let idx = points.partition_point(|p| p.time <= point.time);
    points.insert(idx, point);
    idx
}

/// Move every point by `delta` seconds, dropping the ones that land before 0
pub fn shift_points(points: &[EnvelopePoint], delta: f64) -> Vec<EnvelopePoint> {
    points
        .iter()
        .map(|p| EnvelopePoint {
            time: p.time + delta,
            db: p.db,
        })
        .filter(|p| p.time >= 0.0)
        .collect()
}

/// Restore time order after an arbitrary edit
pub fn sort_points(points: &mut [EnvelopePoint]) {
    points.sort_by(|a, b| a.time.total_cmp(&b.time));
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_curve_roundtrip() {
        for db in [-60.0, -24.0, -6.0, 0.0, 6.0, 12.0] {
            let n = db_to_normalized(db);
            assert_abs_diff_eq!(normalized_to_db(n), db, epsilon = 1e-9);
        }
        assert_eq!(db_to_normalized(f64::NEG_INFINITY), 0.0);
        assert_eq!(db_to_normalized(12.0), 1.0);
    }

    #[test]
    fn test_zero_db_is_off_the_linear_position() {
        // Cubic: (60 / 72)^3 from the floor, well below the linear 60 / 72
        assert_abs_diff_eq!(db_to_normalized(0.0), 0.5787, epsilon = 1e-4);
        assert!(db_to_normalized(0.0) < 60.0 / 72.0 - 0.25);
    }

    #[test]
    fn test_db_at_interpolates() {
        let points = vec![EnvelopePoint::new(0.0, -12.0), EnvelopePoint::new(2.0, 0.0)];
        assert_abs_diff_eq!(db_at(&points, 1.0), -6.0, epsilon = 1e-9);
        assert_eq!(db_at(&points, -1.0), -12.0);
        assert_eq!(db_at(&points, 5.0), 0.0);
        assert_eq!(db_at(&[], 3.0), 0.0);
        assert_abs_diff_eq!(gain_at(&[], 3.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_insert_keeps_order() {
        let mut points = vec![EnvelopePoint::new(0.0, 0.0), EnvelopePoint::new(2.0, 0.0)];
        let idx = insert_point(&mut points, EnvelopePoint::new(1.0, -6.0));
        assert_eq!(idx, 1);
        assert!(points.windows(2).all(|w| w[0].time <= w[1].time));
    }

    #[test]
    fn test_shift_drops_negative() {
        let points = vec![EnvelopePoint::new(0.5, 0.0), EnvelopePoint::new(3.0, -3.0)];
        let shifted = shift_points(&points, -1.0);
        assert_eq!(shifted.len(), 1);
        assert_abs_diff_eq!(shifted[0].time, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_silence_serializes_as_null() {
        let json = serde_json::to_string(&EnvelopePoint::silent(1.0)).unwrap();
        assert!(json.contains("null"));
        let back: EnvelopePoint = serde_json::from_str(&json).unwrap();
        assert!(back.is_silent());
    }
}
