//! Hourly weather reading

use chrono::{DateTime, DurationRound, NaiveDateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Coordinate, TIMESTAMP_FORMAT};

/// One hourly observation for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Start of the hour (UTC)
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Air temperature at 2m (°C)
    pub temperature: f64,
    /// Relative humidity at 2m (%)
    pub humidity: f64,
}

impl Reading {
    /// Create a reading for a coordinate, truncating the timestamp to the hour
    pub fn new(
        timestamp: DateTime<Utc>,
        coordinate: Coordinate,
        temperature: f64,
        humidity: f64,
    ) -> Self {
        Self {
            timestamp: truncate_to_hour(timestamp),
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            temperature,
            humidity,
        }
    }
}

/// Truncate a timestamp to the start of its hour
pub fn truncate_to_hour(timestamp: DateTime<Utc>) -> DateTime<Utc> {
    timestamp
        .duration_trunc(TimeDelta::hours(1))
        .unwrap_or(timestamp)
}

/// Format a timestamp in the persisted encoding
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a timestamp in the persisted encoding
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_truncate_to_hour() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 14, 37, 12).unwrap();
        let truncated = truncate_to_hour(ts);
        assert_eq!(truncated, Utc.with_ymd_and_hms(2024, 3, 1, 14, 0, 0).unwrap());
    }

    #[test]
    fn test_new_reading_is_hourly() {
        let coord = Coordinate::new(10.0, 20.0).unwrap();
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 14, 59, 59).unwrap();
        let reading = Reading::new(ts, coord, 12.5, 80.0);
        assert_eq!(format_timestamp(&reading.timestamp), "2024-03-01T14:00:00Z");
        assert_eq!(reading.latitude, 10.0);
    }

    #[test]
    fn test_timestamp_encoding() {
        let ts = Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap();
        let encoded = format_timestamp(&ts);
        assert_eq!(encoded, "2024-12-31T23:00:00Z");
        assert_eq!(parse_timestamp(&encoded), Some(ts));
        assert_eq!(parse_timestamp("not a time"), None);
    }
}
