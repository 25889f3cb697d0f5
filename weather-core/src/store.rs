//! SQLite-backed weather history.
//!
//! Records are append-only: one row per successful report, stamped by the
//! store when the batch is written and never updated afterwards.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params, types::Type};
use std::{fs, path::Path};
use tracing::{debug, info};

use crate::{
    error::StoreError,
    model::{PersistedRecord, WeatherReport},
};

/// Number of records shown as history.
pub const HISTORY_LIMIT: usize = 50;

pub trait RecordStore {
    /// Append all reports in one transaction, returning how many were written.
    fn append(&mut self, reports: &[WeatherReport]) -> Result<usize, StoreError>;

    /// Most recent records, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<PersistedRecord>, StoreError>;
}

pub struct SqliteRecordStore {
    conn: Connection,
}

impl SqliteRecordStore {
    /// Open (or create) the database at `path`, including parent directories.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let store = Self { conn: Connection::open(path)? };
        store.init_schema()?;
        debug!(path = %path.display(), "weather history opened");
        Ok(store)
    }

    /// Create an in-memory store (for testing).
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StoreError> {
        let store = Self { conn: Connection::open_in_memory()? };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS weather_records (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                temperature_kelvin REAL NOT NULL,
                temperature_celsius REAL NOT NULL,
                temperature_fahrenheit REAL NOT NULL,
                humidity INTEGER NOT NULL,
                wind_speed REAL NOT NULL,
                weather_description TEXT NOT NULL,
                comfort_index REAL NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_weather_records_recorded
                ON weather_records(recorded_at DESC, id DESC);
            "#,
        )?;
        Ok(())
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<PersistedRecord> {
        let recorded_at_str: String = row.get(9)?;
        let recorded_at = DateTime::parse_from_rfc3339(&recorded_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;

        Ok(PersistedRecord {
            id: row.get(0)?,
            city_name: row.get(1)?,
            temperature_kelvin: row.get(2)?,
            temperature_celsius: row.get(3)?,
            temperature_fahrenheit: row.get(4)?,
            humidity_pct: row.get(5)?,
            wind_speed: row.get(6)?,
            weather_description: row.get(7)?,
            comfort_index: row.get(8)?,
            recorded_at,
        })
    }

    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 =
            self.conn.query_row("SELECT COUNT(*) FROM weather_records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}

impl RecordStore for SqliteRecordStore {
    fn append(&mut self, reports: &[WeatherReport]) -> Result<usize, StoreError> {
        if reports.is_empty() {
            info!("no valid weather records to store");
            return Ok(0);
        }

        let recorded_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO weather_records
                 (city, temperature_kelvin, temperature_celsius, temperature_fahrenheit,
                  humidity, wind_speed, weather_description, comfort_index, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;

            for report in reports {
                stmt.execute(params![
                    report.city_name,
                    report.temperature_kelvin,
                    report.temperature_celsius,
                    report.temperature_fahrenheit,
                    report.humidity_pct,
                    report.wind_speed,
                    report.weather_description,
                    report.comfort_index,
                    recorded_at,
                ])?;
            }
        }
        tx.commit()?;

        info!(stored = reports.len(), "stored weather records");
        Ok(reports.len())
    }

    fn recent(&self, limit: usize) -> Result<Vec<PersistedRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, city, temperature_kelvin, temperature_celsius, temperature_fahrenheit,
                    humidity, wind_speed, weather_description, comfort_index, recorded_at
             FROM weather_records
             ORDER BY recorded_at DESC, id DESC
             LIMIT ?1",
        )?;

        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![limit], Self::row_to_record)?;

        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}
