//! Report metadata derived from the exported rows

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use weather_core::Reading;

const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M UTC";

/// Metadata block shown at the top of the PDF report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub generated_at: DateTime<Utc>,
    pub row_count: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Most frequent `(latitude, longitude)` among the rows
    pub coordinate: Option<(f64, f64)>,
    /// True when every row shares `coordinate`
    pub single_location: bool,
}

impl ReportSummary {
    pub fn from_readings(readings: &[Reading], generated_at: DateTime<Utc>) -> Self {
        let mut counts: HashMap<(u64, u64), (usize, usize)> = HashMap::new();
        for (index, reading) in readings.iter().enumerate() {
            let entry = counts
                .entry((reading.latitude.to_bits(), reading.longitude.to_bits()))
                .or_insert((0, index));
            entry.0 += 1;
        }

        // most rows wins, earliest first appearance breaks ties
        let coordinate = counts
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.1 .1.cmp(&a.1 .1)))
            .map(|((lat, lon), _)| (f64::from_bits(*lat), f64::from_bits(*lon)));

        Self {
            generated_at,
            row_count: readings.len(),
            start: readings.iter().map(|r| r.timestamp).min(),
            end: readings.iter().map(|r| r.timestamp).max(),
            coordinate,
            single_location: counts.len() == 1,
        }
    }

    pub fn location_text(&self) -> String {
        match self.coordinate {
            Some((lat, lon)) if self.single_location => {
                format!("Lat: {:.4}, Lon: {:.4}", lat, lon)
            }
            Some((lat, lon)) => format!("Lat: {:.4}, Lon: {:.4} (most frequent)", lat, lon),
            None => "Location: N/A".to_string(),
        }
    }

    pub fn date_range_text(&self) -> String {
        match (self.start, self.end) {
            (Some(start), Some(end)) => format!(
                "Date Range: {} to {}",
                start.format(DISPLAY_FORMAT),
                end.format(DISPLAY_FORMAT)
            ),
            _ => "Date Range: no data in the last 48 hours".to_string(),
        }
    }

    pub fn generated_text(&self) -> String {
        format!("Generated: {}", self.generated_at.format(DISPLAY_FORMAT))
    }

    pub fn row_count_text(&self) -> String {
        format!("Rows: {}", self.row_count)
    }

    /// Metadata lines in display order
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.location_text(),
            self.date_range_text(),
            self.generated_text(),
            self.row_count_text(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use weather_core::Coordinate;

    fn readings_at(coords: &[(f64, f64)]) -> Vec<Reading> {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        coords
            .iter()
            .enumerate()
            .map(|(i, (lat, lon))| {
                Reading::new(
                    start + TimeDelta::hours(i as i64),
                    Coordinate::new(*lat, *lon).unwrap(),
                    10.0,
                    50.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_summary() {
        let summary = ReportSummary::from_readings(&[], Utc::now());
        assert_eq!(summary.row_count, 0);
        assert_eq!(summary.location_text(), "Location: N/A");
        assert!(summary.date_range_text().contains("no data"));
        assert!(!summary.single_location);
    }

    #[test]
    fn test_single_location() {
        let readings = readings_at(&[(52.52, 13.41), (52.52, 13.41)]);
        let summary = ReportSummary::from_readings(&readings, Utc::now());
        assert!(summary.single_location);
        assert_eq!(summary.location_text(), "Lat: 52.5200, Lon: 13.4100");
        assert_eq!(
            summary.date_range_text(),
            "Date Range: 2024-03-01 00:00 UTC to 2024-03-01 01:00 UTC"
        );
        assert_eq!(summary.row_count_text(), "Rows: 2");
    }

    #[test]
    fn test_mixed_locations_report_most_frequent() {
        let readings = readings_at(&[(1.0, 2.0), (3.0, 4.0), (3.0, 4.0)]);
        let summary = ReportSummary::from_readings(&readings, Utc::now());
        assert!(!summary.single_location);
        assert_eq!(summary.coordinate, Some((3.0, 4.0)));
        assert!(summary.location_text().ends_with("(most frequent)"));
    }

    #[test]
    fn test_tie_prefers_first_seen() {
        let readings = readings_at(&[(1.0, 2.0), (3.0, 4.0)]);
        let summary = ReportSummary::from_readings(&readings, Utc::now());
        assert_eq!(summary.coordinate, Some((1.0, 2.0)));
    }
}
