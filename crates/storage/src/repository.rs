//! Repository Implementation

use crate::StorageError;
use chrono::{DateTime, TimeDelta, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use weather_core::{format_timestamp, parse_timestamp, Reading, REPORT_WINDOW_HOURS};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS weather_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    latitude REAL NOT NULL,
    longitude REAL NOT NULL,
    temperature REAL NOT NULL,
    humidity REAL NOT NULL,
    UNIQUE (timestamp, latitude, longitude)
)
"#;

const UPSERT: &str = r#"
INSERT INTO weather_readings (timestamp, latitude, longitude, temperature, humidity)
VALUES (?1, ?2, ?3, ?4, ?5)
ON CONFLICT (timestamp, latitude, longitude)
DO UPDATE SET temperature = excluded.temperature, humidity = excluded.humidity
"#;

const SELECT_SINCE: &str = r#"
SELECT timestamp, latitude, longitude, temperature, humidity
FROM weather_readings
WHERE timestamp >= ?1
ORDER BY timestamp ASC, latitude ASC, longitude ASC
"#;

/// Repository for weather readings backed by SQLite
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Open (or create) the database at `database_url` and ensure the schema.
    ///
    /// In-memory databases are pinned to a single pooled connection so every
    /// query sees the same data.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        let mut options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));
        if !in_memory {
            options = options.journal_mode(SqliteJournalMode::Wal);
        }

        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        let repository = Self { pool };
        repository.init_schema().await?;

        info!("Opened SQLite repository at {}", database_url);
        Ok(repository)
    }

    /// Open a private in-memory database
    pub async fn in_memory() -> Result<Self, StorageError> {
        Self::connect("sqlite::memory:").await
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::ConnectionFailed(format!("schema creation: {}", e)))?;
        Ok(())
    }

    /// Insert or overwrite readings by `(timestamp, latitude, longitude)`.
    ///
    /// The whole batch is written in one transaction: on error nothing is
    /// committed.
    pub async fn upsert(&self, readings: &[Reading]) -> Result<u64, StorageError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        let mut written = 0u64;
        for reading in readings {
            sqlx::query(UPSERT)
                .bind(format_timestamp(&reading.timestamp))
                .bind(reading.latitude)
                .bind(reading.longitude)
                .bind(reading.temperature)
                .bind(reading.humidity)
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::WriteFailed(e.to_string()))?;
            written += 1;
        }

        tx.commit()
            .await
            .map_err(|e| StorageError::WriteFailed(e.to_string()))?;

        debug!("Upserted {} readings", written);
        Ok(written)
    }

    /// Readings with `timestamp >= since`, oldest first
    pub async fn query_since(&self, since: DateTime<Utc>) -> Result<Vec<Reading>, StorageError> {
        let rows = sqlx::query(SELECT_SINCE)
            .bind(format_timestamp(&since))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        rows.iter()
            .map(|row| {
                let timestamp: String = row
                    .try_get("timestamp")
                    .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
                let timestamp = parse_timestamp(&timestamp).ok_or_else(|| {
                    StorageError::ReadFailed(format!("corrupt timestamp `{}`", timestamp))
                })?;

                Ok(Reading {
                    timestamp,
                    latitude: get_f64(row, "latitude")?,
                    longitude: get_f64(row, "longitude")?,
                    temperature: get_f64(row, "temperature")?,
                    humidity: get_f64(row, "humidity")?,
                })
            })
            .collect()
    }

    /// Readings from the last 48 hours relative to now, oldest first
    pub async fn query_last_48_hours(&self) -> Result<Vec<Reading>, StorageError> {
        let cutoff = Utc::now() - TimeDelta::hours(REPORT_WINDOW_HOURS);
        self.query_since(cutoff).await
    }

    /// Total number of stored readings
    pub async fn count(&self) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weather_readings")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        Ok(count.max(0) as u64)
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn get_f64(row: &sqlx::sqlite::SqliteRow, column: &str) -> Result<f64, StorageError> {
    row.try_get(column)
        .map_err(|e| StorageError::ReadFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::{truncate_to_hour, Coordinate};

    fn reading(hours_ago: i64, temperature: f64, humidity: f64) -> Reading {
        let coord = Coordinate::new(52.52, 13.41).unwrap();
        Reading::new(
            truncate_to_hour(Utc::now()) - TimeDelta::hours(hours_ago),
            coord,
            temperature,
            humidity,
        )
    }

    #[tokio::test]
    async fn test_empty_store() {
        let repo = Repository::in_memory().await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 0);
        assert!(repo.query_last_48_hours().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upsert_and_query() {
        let repo = Repository::in_memory().await.unwrap();
        let readings = vec![reading(2, 10.0, 60.0), reading(1, 11.0, 65.0)];

        assert_eq!(repo.upsert(&readings).await.unwrap(), 2);

        let stored = repo.query_last_48_hours().await.unwrap();
        assert_eq!(stored, readings);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent_and_last_write_wins() {
        let repo = Repository::in_memory().await.unwrap();
        repo.upsert(&[reading(3, 10.0, 60.0), reading(2, 11.0, 61.0)])
            .await
            .unwrap();
        repo.upsert(&[reading(2, 20.0, 70.0), reading(1, 12.0, 62.0)])
            .await
            .unwrap();

        assert_eq!(repo.count().await.unwrap(), 3);

        let stored = repo.query_last_48_hours().await.unwrap();
        assert_eq!(stored[1].temperature, 20.0);
        assert_eq!(stored[1].humidity, 70.0);
    }

    #[tokio::test]
    async fn test_distinct_coordinates_are_distinct_keys() {
        let repo = Repository::in_memory().await.unwrap();
        let mut other = reading(1, 5.0, 50.0);
        other.longitude = -0.12;

        repo.upsert(&[reading(1, 10.0, 60.0), other]).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_window_excludes_old_readings() {
        let repo = Repository::in_memory().await.unwrap();
        repo.upsert(&[reading(72, 1.0, 10.0), reading(49, 2.0, 20.0), reading(47, 3.0, 30.0), reading(0, 4.0, 40.0)])
            .await
            .unwrap();

        let stored = repo.query_last_48_hours().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].temperature, 3.0);
        assert_eq!(stored[1].temperature, 4.0);
        assert!(stored.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_failed_batch_writes_nothing() {
        let repo = Repository::in_memory().await.unwrap();
        // NaN is bound as NULL and violates the NOT NULL constraint
        let batch = vec![reading(2, 10.0, 60.0), reading(1, f64::NAN, 60.0)];

        let err = repo.upsert(&batch).await.unwrap_err();
        assert!(matches!(err, StorageError::WriteFailed(_)));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("weather.sqlite3").display());

        let repo = Repository::connect(&url).await.unwrap();
        repo.upsert(&[reading(1, 10.0, 60.0)]).await.unwrap();
        repo.close().await;

        let reopened = Repository::connect(&url).await.unwrap();
        assert_eq!(reopened.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_overlapping_upserts() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("weather.sqlite3").display());
        let repo = Repository::connect(&url).await.unwrap();

        let base = truncate_to_hour(Utc::now());
        let coords = [(52.52, 13.41), (48.86, 2.35), (-33.87, 151.21), (40.71, -74.01)];

        let tasks: Vec<_> = (0..16)
            .map(|task| {
                let repo = repo.clone();
                let (lat, lon) = coords[task % coords.len()];
                tokio::spawn(async move {
                    let coord = Coordinate::new(lat, lon).unwrap();
                    let batch: Vec<Reading> = (0..48)
                        .map(|h| {
                            Reading::new(
                                base - TimeDelta::hours(h),
                                coord,
                                task as f64 + h as f64 * 0.1,
                                50.0,
                            )
                        })
                        .collect();
                    repo.upsert(&batch).await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), 48);
        }

        assert_eq!(repo.count().await.unwrap(), 4 * 48);
    }
}
