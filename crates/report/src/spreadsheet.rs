//! Spreadsheet export

use rust_xlsxwriter::{Format, Workbook};
use tracing::debug;
use weather_core::{format_timestamp, Reading};

use crate::ReportError;

/// Worksheet holding the exported rows
pub const SHEET_NAME: &str = "last_48_hours";

/// Header row, one column per reading field
pub const SPREADSHEET_COLUMNS: [&str; 5] =
    ["timestamp", "latitude", "longitude", "temperature", "humidity"];

/// Serialize readings as an `.xlsx` workbook, one row per reading.
///
/// An empty slice produces a header-only sheet.
pub fn build_spreadsheet(readings: &[Reading]) -> Result<Vec<u8>, ReportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;

        for (col, name) in SPREADSHEET_COLUMNS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *name, &header)?;
        }
        sheet.set_column_width(0, 22)?;
        sheet.set_column_width(3, 13)?;

        for (index, reading) in readings.iter().enumerate() {
            let row = index as u32 + 1;
            sheet.write_string(row, 0, format_timestamp(&reading.timestamp))?;
            sheet.write_number(row, 1, reading.latitude)?;
            sheet.write_number(row, 2, reading.longitude)?;
            sheet.write_number(row, 3, reading.temperature)?;
            sheet.write_number(row, 4, reading.humidity)?;
        }
    }

    let bytes = workbook.save_to_buffer()?;
    debug!("Built spreadsheet with {} rows ({} bytes)", readings.len(), bytes.len());
    Ok(bytes)
}
