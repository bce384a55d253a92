use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, ErrorCode, Row, params};
use tracing::{debug, info};

use crate::parser::types::normalize_name;
use crate::store::error::StoreError;
use crate::store::record::PackageRecord;
use crate::store::{ListFilter, RecordStore};
use crate::version::pep440::Version;

const COLUMNS: &str = "package_name, is_editable, is_parseable, declared_version, \
    current_version, next_version, latest_version, raw, licence, python_support, \
    supports_py3, django_support, diff_status, checked_pypi_at, url";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Opening package database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // Enable WAL mode so readers are not blocked during a sync
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Package database ready");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                package_name TEXT NOT NULL UNIQUE,
                is_editable INTEGER NOT NULL DEFAULT 0,
                is_parseable INTEGER NOT NULL DEFAULT 0,
                declared_version TEXT,
                current_version TEXT,
                next_version TEXT,
                latest_version TEXT,
                raw TEXT,
                licence TEXT,
                python_support TEXT NOT NULL DEFAULT '[]',
                supports_py3 INTEGER NOT NULL DEFAULT 0,
                django_support TEXT NOT NULL DEFAULT '[]',
                diff_status TEXT NOT NULL DEFAULT 'unknown',
                checked_pypi_at INTEGER,
                url TEXT
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_diff_status ON packages(diff_status)",
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }
}

fn version_column(version: &Option<Version>) -> Option<&str> {
    version.as_ref().map(Version::as_str)
}

fn json_set(row: &Row, index: usize) -> rusqlite::Result<BTreeSet<String>> {
    let text: String = row.get(index)?;
    serde_json::from_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(e)))
}

fn version_from_row(row: &Row, index: usize) -> rusqlite::Result<Option<Version>> {
    let text: Option<String> = row.get(index)?;
    Ok(text.and_then(|t| Version::parse(&t).ok()))
}

fn record_from_row(row: &Row) -> rusqlite::Result<PackageRecord> {
    let diff_status: String = row.get(12)?;
    let checked_pypi_at: Option<i64> = row.get(13)?;

    Ok(PackageRecord {
        package_name: row.get(0)?,
        is_editable: row.get(1)?,
        is_parseable: row.get(2)?,
        declared_version: row.get(3)?,
        current_version: version_from_row(row, 4)?,
        next_version: version_from_row(row, 5)?,
        latest_version: version_from_row(row, 6)?,
        raw: row.get(7)?,
        licence: row.get(8)?,
        python_support: json_set(row, 9)?,
        supports_py3: row.get(10)?,
        django_support: json_set(row, 11)?,
        diff_status: diff_status.parse().map_err(|e: String| {
            rusqlite::Error::FromSqlConversionFailure(12, Type::Text, e.into())
        })?,
        checked_pypi_at: checked_pypi_at.and_then(DateTime::<Utc>::from_timestamp_millis),
        url: row.get(14)?,
    })
}

impl RecordStore for SqliteStore {
    fn get(&self, package_name: &str) -> Result<Option<PackageRecord>, StoreError> {
        let conn = self.lock_conn()?;
        let result = conn.query_row(
            &format!("SELECT {COLUMNS} FROM packages WHERE package_name = ?1"),
            [normalize_name(package_name)],
            record_from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self, filter: ListFilter) -> Result<Vec<PackageRecord>, StoreError> {
        let condition = match filter {
            ListFilter::All => "",
            ListFilter::NonEditable => "WHERE is_editable = 0",
        };

        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM packages {condition} ORDER BY package_name"
        ))?;

        let records = stmt
            .query_map([], record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn create(&self, record: PackageRecord) -> Result<PackageRecord, StoreError> {
        let python_support = serde_json::to_string(&record.python_support)?;
        let django_support = serde_json::to_string(&record.django_support)?;

        let conn = self.lock_conn()?;
        let result = conn.execute(
            &format!(
                "INSERT INTO packages ({COLUMNS}) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                record.package_name,
                record.is_editable,
                record.is_parseable,
                record.declared_version,
                version_column(&record.current_version),
                version_column(&record.next_version),
                version_column(&record.latest_version),
                record.raw,
                record.licence,
                python_support,
                record.supports_py3,
                django_support,
                record.diff_status.as_str(),
                record.checked_pypi_at.map(|t| t.timestamp_millis()),
                record.url,
            ],
        );

        match result {
            Ok(_) => {
                debug!("Created package record {}", record.package_name);
                Ok(record)
            }
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation =>
            {
                Err(StoreError::DuplicateName(record.package_name))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn update(&self, record: &PackageRecord) -> Result<(), StoreError> {
        let python_support = serde_json::to_string(&record.python_support)?;
        let django_support = serde_json::to_string(&record.django_support)?;

        let conn = self.lock_conn()?;
        let rows_affected = conn.execute(
            r#"
            UPDATE packages SET
                is_editable = ?2,
                is_parseable = ?3,
                declared_version = ?4,
                current_version = ?5,
                next_version = ?6,
                latest_version = ?7,
                raw = ?8,
                licence = ?9,
                python_support = ?10,
                supports_py3 = ?11,
                django_support = ?12,
                diff_status = ?13,
                checked_pypi_at = ?14,
                url = ?15
            WHERE package_name = ?1
            "#,
            params![
                record.package_name,
                record.is_editable,
                record.is_parseable,
                record.declared_version,
                version_column(&record.current_version),
                version_column(&record.next_version),
                version_column(&record.latest_version),
                record.raw,
                record.licence,
                python_support,
                record.supports_py3,
                django_support,
                record.diff_status.as_str(),
                record.checked_pypi_at.map(|t| t.timestamp_millis()),
                record.url,
            ],
        )?;

        if rows_affected == 0 {
            return Err(StoreError::NotFound(record.package_name.clone()));
        }

        debug!("Updated package record {}", record.package_name);
        Ok(())
    }

    fn delete_all(&self) -> Result<usize, StoreError> {
        let conn = self.lock_conn()?;
        let deleted = conn.execute("DELETE FROM packages", [])?;
        info!("Deleted {} package records", deleted);
        Ok(deleted)
    }
}
