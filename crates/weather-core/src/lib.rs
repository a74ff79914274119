//! Weather Core Types
//!
//! Shared data model for the weather report service: hourly readings,
//! validated coordinates and the canonical timestamp encoding.

mod coordinate;
mod reading;

pub use coordinate::{Coordinate, CoordinateError};
pub use reading::{format_timestamp, parse_timestamp, truncate_to_hour, Reading};

/// Timestamp encoding used for persistence and exports (UTC, second precision)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Length of the export window in hours
pub const REPORT_WINDOW_HOURS: i64 = 48;
