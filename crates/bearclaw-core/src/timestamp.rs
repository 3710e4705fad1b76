//! Core Data timestamp conversion.
//!
//! Bear stores `ZCREATIONDATE` and `ZMODIFICATIONDATE` as floating-point
//! seconds since the Core Data reference date, 2001-01-01T00:00:00Z, not the
//! Unix epoch. Every conversion in the workspace goes through this module so
//! the 31-year offset is applied in exactly one place.

use chrono::{DateTime, TimeZone, Utc};

/// Seconds between the Unix epoch and the Core Data reference date
/// (2001-01-01T00:00:00Z).
pub const CORE_DATA_EPOCH_UNIX_SECS: i64 = 978_307_200;

/// Converts a Core Data timestamp to a UTC datetime.
///
/// Sub-second precision is kept to the millisecond. Non-finite and
/// out-of-range inputs clamp to the representable range instead of
/// panicking; Bear itself never writes such values.
pub fn to_datetime(core_data_secs: f64) -> DateTime<Utc> {
    let unix_millis =
        (CORE_DATA_EPOCH_UNIX_SECS * 1000).saturating_add((core_data_secs * 1000.0) as i64);
    Utc.timestamp_millis_opt(unix_millis)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Converts a UTC datetime back to Core Data seconds, the form Bear expects
/// in date comparisons against its timestamp columns.
pub fn to_native_seconds(datetime: DateTime<Utc>) -> f64 {
    (datetime.timestamp_millis() - CORE_DATA_EPOCH_UNIX_SECS * 1000) as f64 / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_date_is_2001() {
        let dt = to_datetime(0.0);
        assert_eq!(dt.to_rfc3339(), "2001-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_known_timestamp() {
        // 700_000_000 seconds after the reference date.
        let dt = to_datetime(700_000_000.0);
        assert_eq!(dt.to_rfc3339(), "2023-03-08T20:26:40+00:00");
    }

    #[test]
    fn test_negative_timestamp_predates_reference() {
        let dt = to_datetime(-86_400.0);
        assert_eq!(dt.to_rfc3339(), "2000-12-31T00:00:00+00:00");
    }

    #[test]
    fn test_fractional_seconds_keep_millis() {
        let dt = to_datetime(0.5);
        assert_eq!(dt.timestamp_millis(), CORE_DATA_EPOCH_UNIX_SECS * 1000 + 500);
    }

    #[test]
    fn test_round_trip() {
        let native = to_native_seconds(to_datetime(700_000_000.25));
        assert_eq!(native, 700_000_000.25);
    }

    #[test]
    fn test_round_trip_from_datetime() {
        let dt = Utc.with_ymd_and_hms(2024, 6, 15, 12, 30, 0).unwrap();
        assert_eq!(to_datetime(to_native_seconds(dt)), dt);
    }

    #[test]
    fn test_non_finite_input_does_not_panic() {
        let _ = to_datetime(f64::NAN);
        let _ = to_datetime(f64::INFINITY);
        let _ = to_datetime(f64::NEG_INFINITY);
    }

    #[test]
    fn test_out_of_range_clamps() {
        let dt = to_datetime(1e300);
        // Clamped, not panicked; exact value is unspecified.
        assert!(dt >= DateTime::UNIX_EPOCH);
    }
}
