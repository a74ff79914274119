//! Temperature/humidity line chart
//!
//! Rasterised with imageproc so both PDF renderers embed the same image.
//! The chart carries no text; titles, legend and axis range are written
//! by the renderer around it.

use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::io::Cursor;
use weather_core::Reading;

use crate::ReportError;

pub const CHART_WIDTH: u32 = 1000;
pub const CHART_HEIGHT: u32 = 500;

const MARGIN: u32 = 40;
const GRID_DIVISIONS: u32 = 8;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const GRID: Rgb<u8> = Rgb([225, 225, 225]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
/// Temperature series
pub const TEMPERATURE_COLOR: Rgb<u8> = Rgb([214, 39, 40]);
/// Humidity series
pub const HUMIDITY_COLOR: Rgb<u8> = Rgb([31, 119, 180]);

/// Shared value axis covering both series, padded so lines never touch the frame
pub fn value_range(readings: &[Reading]) -> Option<(f64, f64)> {
    let values = readings
        .iter()
        .flat_map(|r| [r.temperature, r.humidity])
        .filter(|v| v.is_finite());

    let (min, max) = values.fold(None, |acc: Option<(f64, f64)>, v| match acc {
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        None => Some((v, v)),
    })?;

    if (max - min).abs() < f64::EPSILON {
        return Some((min - 1.0, max + 1.0));
    }
    let pad = (max - min) * 0.05;
    Some((min - pad, max + pad))
}

/// Draw the chart. Zero readings yield an empty framed plot area.
pub fn render_chart(readings: &[Reading]) -> RgbImage {
    let mut image = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);

    let left = MARGIN as f32;
    let top = MARGIN as f32;
    let plot_w = (CHART_WIDTH - 2 * MARGIN) as f32;
    let plot_h = (CHART_HEIGHT - 2 * MARGIN) as f32;

    for i in 1..GRID_DIVISIONS {
        let fraction = i as f32 / GRID_DIVISIONS as f32;
        let y = top + plot_h * fraction;
        let x = left + plot_w * fraction;
        draw_line_segment_mut(&mut image, (left, y), (left + plot_w, y), GRID);
        draw_line_segment_mut(&mut image, (x, top), (x, top + plot_h), GRID);
    }
    draw_hollow_rect_mut(
        &mut image,
        Rect::at(MARGIN as i32, MARGIN as i32).of_size(plot_w as u32, plot_h as u32),
        AXIS,
    );

    let Some((min, max)) = value_range(readings) else {
        return image;
    };

    let first = readings.iter().map(|r| r.timestamp).min();
    let last = readings.iter().map(|r| r.timestamp).max();
    let (Some(first), Some(last)) = (first, last) else {
        return image;
    };
    let span = (last - first).num_seconds() as f32;

    let point = |reading: &Reading, value: f64| -> (f32, f32) {
        let x = if span > 0.0 {
            left + plot_w * ((reading.timestamp - first).num_seconds() as f32 / span)
        } else {
            left + plot_w / 2.0
        };
        let y = top + plot_h * (1.0 - ((value - min) / (max - min)) as f32);
        (x, y)
    };

    for (series, color) in [
        (Series::Temperature, TEMPERATURE_COLOR),
        (Series::Humidity, HUMIDITY_COLOR),
    ] {
        let points: Vec<(f32, f32)> = readings
            .iter()
            .map(|r| point(r, series.value(r)))
            .collect();

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            // two pixel stroke
            draw_line_segment_mut(&mut image, a, b, color);
            draw_line_segment_mut(&mut image, (a.0, a.1 + 1.0), (b.0, b.1 + 1.0), color);
        }
        if points.len() == 1 {
            let (x, y) = points[0];
            draw_filled_circle_mut(&mut image, (x as i32, y as i32), 4, color);
        }
    }

    image
}

#[derive(Clone, Copy)]
enum Series {
    Temperature,
    Humidity,
}

impl Series {
    fn value(self, reading: &Reading) -> f64 {
        match self {
            Series::Temperature => reading.temperature,
            Series::Humidity => reading.humidity,
        }
    }
}

/// Encode the chart as PNG
pub fn chart_png(image: &RgbImage) -> Result<Vec<u8>, ReportError> {
    encode(image, ImageFormat::Png)
}

/// Encode the chart as baseline JPEG (embeddable in PDF via DCTDecode)
pub fn chart_jpeg(image: &RgbImage) -> Result<Vec<u8>, ReportError> {
    encode(image, ImageFormat::Jpeg)
}

fn encode(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>, ReportError> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), format)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use weather_core::Coordinate;

    fn readings(n: i64) -> Vec<Reading> {
        let coord = Coordinate::new(0.0, 0.0).unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        (0..n)
            .map(|i| Reading::new(start + TimeDelta::hours(i), coord, 10.0 + i as f64, 80.0 - i as f64))
            .collect()
    }

    fn count_color(image: &RgbImage, color: Rgb<u8>) -> usize {
        image.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_value_range() {
        assert_eq!(value_range(&[]), None);

        let (min, max) = value_range(&readings(3)).unwrap();
        assert!(min < 10.0);
        assert!(max > 80.0);
    }

    #[test]
    fn test_flat_series_gets_nonzero_range() {
        let coord = Coordinate::new(0.0, 0.0).unwrap();
        let flat = vec![Reading::new(Utc::now(), coord, 50.0, 50.0)];
        assert_eq!(value_range(&flat), Some((49.0, 51.0)));
    }

    #[test]
    fn test_empty_chart_has_no_series() {
        let image = render_chart(&[]);
        assert_eq!(image.dimensions(), (CHART_WIDTH, CHART_HEIGHT));
        assert_eq!(count_color(&image, TEMPERATURE_COLOR), 0);
        assert!(count_color(&image, AXIS) > 0);
    }

    #[test]
    fn test_chart_draws_both_series() {
        let image = render_chart(&readings(48));
        assert!(count_color(&image, TEMPERATURE_COLOR) > 100);
        assert!(count_color(&image, HUMIDITY_COLOR) > 100);
    }

    #[test]
    fn test_single_reading_is_marked() {
        let image = render_chart(&readings(1));
        assert!(count_color(&image, TEMPERATURE_COLOR) > 0);
    }

    #[test]
    fn test_encodings() {
        let image = render_chart(&readings(5));
        let png = chart_png(&image).unwrap();
        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
        let jpeg = chart_jpeg(&image).unwrap();
        assert!(jpeg.starts_with(&[0xFF, 0xD8]));
    }
}
