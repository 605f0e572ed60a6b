//! The waypoint record and the numeric conventions it carries.

use serde::{Deserialize, Serialize};

/// The first waypoint of one input file, normalised for output.
///
/// Created once by the extractor and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Input file name without its extension. Becomes the output `<name>`.
    pub basename: String,
    /// Text of the source point's `<name>`. Becomes the output `<desc>`.
    pub name: String,
    /// Decimal degrees, rounded to the configured precision.
    pub latitude: f64,
    /// Decimal degrees, rounded to the configured precision.
    pub longitude: f64,
    /// Whole metres, truncated toward zero.
    pub elevation: Option<i64>,
}

/// Minimal latitude/longitude rectangle enclosing a set of waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Round `value` to `digits` fractional decimal digits.
///
/// The decimal formatter rounds the exact binary value (ties to even), and
/// the result is parsed back to the nearest double. Rounding an already
/// rounded value returns it unchanged.
pub fn round_to(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", digits as usize, value)
        .parse()
        .unwrap_or(value)
}

/// Truncate a parsed elevation toward zero.
///
/// Returns `None` for NaN, infinities and values outside the `i64` range.
pub fn truncate_elevation(value: f64) -> Option<i64> {
    let t = value.trunc();
    // `i64::MAX as f64` rounds up to 2^63, which is already out of range.
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

/// Render a double as plain decimal text for GPX attributes.
///
/// Uses the shortest representation that parses back to the same double,
/// never scientific notation, and always keeps a fractional part
/// (`1.0`, not `1`).
pub fn format_decimal(value: f64) -> String {
    let mut s = value.to_string();
    if value.is_finite() && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_nine_digit_value_is_identity() {
        assert_eq!(round_to(48.123456789, 9), 48.123456789);
        assert_eq!(round_to(11.123456789, 9), 11.123456789);
    }

    #[test]
    fn rounding_drops_extra_digits() {
        assert_eq!(round_to(48.1234567894, 9), 48.123456789);
        assert_eq!(round_to(48.1234567896, 9), 48.12345679);
        assert_eq!(round_to(-122.00000000049, 9), -122.0);
        assert_eq!(round_to(0.123456, 2), 0.12);
    }

    #[test]
    fn rounding_is_idempotent() {
        for v in [0.1, 12.3456789012345, -45.000000001, 179.999999999999] {
            let once = round_to(v, 9);
            assert_eq!(round_to(once, 9), once);
        }
    }

    #[test]
    fn elevation_truncates_toward_zero() {
        assert_eq!(truncate_elevation(123.9), Some(123));
        assert_eq!(truncate_elevation(-4.7), Some(-4));
        assert_eq!(truncate_elevation(0.99), Some(0));
        assert_eq!(truncate_elevation(f64::NAN), None);
        assert_eq!(truncate_elevation(f64::INFINITY), None);
    }

    #[test]
    fn elevation_out_of_i64_range_is_rejected() {
        assert_eq!(truncate_elevation(1e30), None);
        assert_eq!(truncate_elevation(-1e30), None);
        assert_eq!(truncate_elevation(9.3e18), None);
        assert_eq!(truncate_elevation(-9.223372036854775808e18), Some(i64::MIN));
        assert_eq!(truncate_elevation(8848.86), Some(8848));
    }

    #[test]
    fn decimal_text_keeps_fraction() {
        assert_eq!(format_decimal(1.0), "1.0");
        assert_eq!(format_decimal(-0.0), "-0.0");
        assert_eq!(format_decimal(48.123456789), "48.123456789");
        assert_eq!(format_decimal(0.1), "0.1");
        assert_eq!(format_decimal(-122.5), "-122.5");
    }

    #[test]
    fn decimal_text_is_never_scientific() {
        assert_eq!(format_decimal(0.00001), "0.00001");
        assert_eq!(format_decimal(0.000000001), "0.000000001");
    }
}
