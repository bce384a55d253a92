//! Record store layer
//!
//! The sync engine is the only writer; everything else reads.
//!
//! # Modules
//!
//! - [`record`]: `PackageRecord`, the persisted entity
//! - [`sqlite`]: SQLite-backed `RecordStore`
//! - [`filter`]: Predicates over record sets (update availability, status, flags)
//! - [`error`]: `StoreError`

#[cfg(test)]
use mockall::automock;

pub mod error;
pub mod filter;
pub mod record;
pub mod sqlite;

pub use error::StoreError;
pub use filter::{RecordQuery, UpdateAvailability};
pub use record::PackageRecord;
pub use sqlite::SqliteStore;

/// Which records `RecordStore::list` returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFilter {
    All,
    /// Records that are checked against the index
    NonEditable,
}

/// Trait for persisting package records keyed by normalized name
#[cfg_attr(test, automock)]
pub trait RecordStore: Send + Sync {
    /// Get a record by package name
    fn get(&self, package_name: &str) -> Result<Option<PackageRecord>, StoreError>;

    /// List records ordered by package name
    fn list(&self, filter: ListFilter) -> Result<Vec<PackageRecord>, StoreError>;

    /// Insert a new record; fails with `DuplicateName` if the name exists
    fn create(&self, record: PackageRecord) -> Result<PackageRecord, StoreError>;

    /// Overwrite every field of an existing record in one statement
    fn update(&self, record: &PackageRecord) -> Result<(), StoreError>;

    /// Delete every record, returning how many were removed
    fn delete_all(&self) -> Result<usize, StoreError>;
}
