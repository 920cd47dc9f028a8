//! SQLite price store adapter.
//!
//! One table, no key: every append adds rows, so ingesting the same range
//! twice doubles it.

use crate::domain::error::TraderError;
use crate::domain::ohlcv::PriceRecord;
use crate::ports::store_port::PriceStore;
use chrono::NaiveDate;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::params;
use tracing::debug;

pub struct SqliteAdapter {
    pool: Pool<SqliteConnectionManager>,
}

fn query_err(e: rusqlite::Error) -> TraderError {
    TraderError::DatabaseQuery {
        reason: e.to_string(),
    }
}

impl SqliteAdapter {
    pub fn open(db_path: &str, pool_size: u32) -> Result<Self, TraderError> {
        debug!(path = db_path, pool_size, "opening sqlite store");
        let manager = SqliteConnectionManager::file(db_path);
        let pool =
            Pool::builder()
                .max_size(pool_size)
                .build(manager)
                .map_err(|e: r2d2::Error| TraderError::Database {
                    reason: e.to_string(),
                })?;

        Ok(Self { pool })
    }

    pub fn in_memory() -> Result<Self, TraderError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder()
            .max_size(1)
            .build(manager)
            .map_err(|e: r2d2::Error| TraderError::Database {
                reason: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<SqliteConnectionManager>, TraderError> {
        self.pool
            .get()
            .map_err(|e: r2d2::Error| TraderError::Database {
                reason: e.to_string(),
            })
    }

    pub fn initialize_schema(&self) -> Result<(), TraderError> {
        let conn = self.conn()?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS harshfinance_data (
                date TEXT,
                open REAL,
                high REAL,
                low REAL,
                close REAL,
                adj_close REAL,
                volume INTEGER
            );",
        )
        .map_err(query_err)?;

        Ok(())
    }
}

fn parse_date(date_str: &str) -> Result<NaiveDate, TraderError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e: chrono::ParseError| {
        TraderError::Database {
            reason: format!("invalid stored date '{}': {}", date_str, e),
        }
    })
}

impl PriceStore for SqliteAdapter {
    fn append(&self, records: &[PriceRecord]) -> Result<usize, TraderError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction().map_err(query_err)?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO harshfinance_data (date, open, high, low, close, adj_close, volume)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                )
                .map_err(query_err)?;

            for record in records {
                stmt.execute(params![
                    record.date.format("%Y-%m-%d").to_string(),
                    record.open,
                    record.high,
                    record.low,
                    record.close,
                    record.adj_close,
                    record.volume
                ])
                .map_err(query_err)?;
            }
        }

        tx.commit().map_err(query_err)?;
        debug!(rows = records.len(), "appended price rows");

        Ok(records.len())
    }

    fn load_all(&self) -> Result<Vec<PriceRecord>, TraderError> {
        let conn = self.conn()?;

        let query = "SELECT date, open, high, low, close, adj_close, volume
                     FROM harshfinance_data
                     ORDER BY date ASC, rowid ASC";

        let mut stmt = conn.prepare(query).map_err(query_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, f64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, f64>(5)?,
                    row.get::<_, i64>(6)?,
                ))
            })
            .map_err(query_err)?;

        let mut records = Vec::new();
        for row in rows {
            let (date_str, open, high, low, close, adj_close, volume) = row.map_err(query_err)?;
            records.push(PriceRecord {
                date: parse_date(&date_str)?,
                open,
                high,
                low,
                close,
                adj_close,
                volume,
            });
        }

        Ok(records)
    }

    fn row_count(&self) -> Result<usize, TraderError> {
        let conn = self.conn()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM harshfinance_data", [], |row| row.get(0))
            .map_err(query_err)?;
        Ok(count as usize)
    }

    fn date_range(&self) -> Result<Option<(NaiveDate, NaiveDate, usize)>, TraderError> {
        let conn = self.conn()?;

        let result: (Option<String>, Option<String>, i64) = conn
            .query_row(
                "SELECT MIN(date), MAX(date), COUNT(*) FROM harshfinance_data",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .map_err(query_err)?;

        match result {
            (Some(min_str), Some(max_str), count) if count > 0 => Ok(Some((
                parse_date(&min_str)?,
                parse_date(&max_str)?,
                count as usize,
            ))),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(date: &str, close: f64) -> PriceRecord {
        PriceRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            adj_close: close * 0.98,
            volume: 1_000,
        }
    }

    fn store() -> SqliteAdapter {
        let adapter = SqliteAdapter::in_memory().unwrap();
        adapter.initialize_schema().unwrap();
        adapter
    }

    #[test]
    fn schema_is_idempotent() {
        let adapter = store();
        adapter.initialize_schema().unwrap();
        assert_eq!(adapter.row_count().unwrap(), 0);
    }

    #[test]
    fn append_and_load_roundtrip() {
        let adapter = store();
        let records = vec![record("2024-01-02", 101.5), record("2024-01-01", 100.5)];

        assert_eq!(adapter.append(&records).unwrap(), 2);

        let loaded = adapter.load_all().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0], records[1]);
        assert_eq!(loaded[1], records[0]);
    }

    #[test]
    fn appending_twice_duplicates_rows() {
        let adapter = store();
        let records = vec![record("2024-01-01", 100.0), record("2024-01-02", 101.0)];

        adapter.append(&records).unwrap();
        adapter.append(&records).unwrap();

        assert_eq!(adapter.row_count().unwrap(), 4);
        let dates: Vec<String> = adapter
            .load_all()
            .unwrap()
            .iter()
            .map(|r| r.date.to_string())
            .collect();
        assert_eq!(
            dates,
            vec!["2024-01-01", "2024-01-01", "2024-01-02", "2024-01-02"]
        );
    }

    #[test]
    fn duplicates_load_in_insertion_order() {
        let adapter = store();
        adapter.append(&[record("2024-01-01", 100.0)]).unwrap();
        adapter.append(&[record("2024-01-01", 105.0)]).unwrap();

        let closes: Vec<f64> = adapter.load_all().unwrap().iter().map(|r| r.close).collect();
        assert_eq!(closes, vec![100.0, 105.0]);
    }

    #[test]
    fn date_range_reports_bounds() {
        let adapter = store();
        adapter
            .append(&[record("2024-01-05", 102.5), record("2024-01-01", 100.5)])
            .unwrap();

        let (min, max, count) = adapter.date_range().unwrap().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(count, 2);
    }

    #[test]
    fn date_range_empty_store() {
        assert!(store().date_range().unwrap().is_none());
    }

    #[test]
    fn append_empty_slice() {
        let adapter = store();
        assert_eq!(adapter.append(&[]).unwrap(), 0);
        assert_eq!(adapter.row_count().unwrap(), 0);
    }

    #[test]
    fn file_store_persists_between_opens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prices.db");
        let path = path.to_str().unwrap();

        {
            let adapter = SqliteAdapter::open(path, 2).unwrap();
            adapter.initialize_schema().unwrap();
            adapter.append(&[record("2024-01-01", 100.0)]).unwrap();
        }

        let reopened = SqliteAdapter::open(path, 2).unwrap();
        reopened.initialize_schema().unwrap();
        assert_eq!(reopened.row_count().unwrap(), 1);
    }

    #[test]
    fn reads_existing_harshfinance_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harshfinance_data.db");

        {
            let conn = rusqlite::Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE harshfinance_data (
                    date TEXT, open REAL, high REAL, low REAL,
                    close REAL, adj_close REAL, volume INTEGER
                );
                INSERT INTO harshfinance_data VALUES
                    ('2022-04-04', 4547.97, 4583.5, 4539.21, 4582.64, 4582.64, 2809470000);",
            )
            .unwrap();
        }

        let adapter = SqliteAdapter::open(path.to_str().unwrap(), 1).unwrap();
        adapter.initialize_schema().unwrap();

        let loaded = adapter.load_all().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].date, NaiveDate::from_ymd_opt(2022, 4, 4).unwrap());
        assert_eq!(loaded[0].close, 4582.64);
        assert_eq!(loaded[0].volume, 2_809_470_000);
    }
}
