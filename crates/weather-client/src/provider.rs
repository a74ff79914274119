//! Provider abstraction

use async_trait::async_trait;
use weather_core::{Coordinate, Reading};

use crate::ClientError;

/// Trailing window requested from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    /// Number of past days to include
    pub past_days: u8,
}

impl Default for FetchWindow {
    fn default() -> Self {
        Self { past_days: 2 }
    }
}

/// Source of hourly readings for a coordinate
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch readings for the window, sorted ascending by timestamp.
    ///
    /// Returns either the complete set of readings or an error, never a
    /// partial result.
    async fn fetch_readings(
        &self,
        coordinate: Coordinate,
        window: FetchWindow,
    ) -> Result<Vec<Reading>, ClientError>;

    /// Short provider name for logs and metrics
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn _assert_object_safe(_: &dyn WeatherProvider) {}

    #[test]
    fn test_default_window() {
        assert_eq!(FetchWindow::default().past_days, 2);
    }
}
