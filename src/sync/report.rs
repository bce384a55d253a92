//! Results of sync runs, for display and notification

use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

use crate::store::error::StoreError;
use crate::store::record::PackageRecord;
use crate::version::diff::DiffStatus;
use crate::version::error::IndexError;

/// Why a record could not be refreshed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    PackageNotFound,
    IndexUnavailable,
    Store,
}

/// A record left untouched by a remote sync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncFailure {
    pub package_name: String,
    pub kind: FailureKind,
    pub message: String,
}

impl SyncFailure {
    pub fn from_index_error(package_name: &str, error: &IndexError) -> Self {
        let kind = match error {
            IndexError::PackageNotFound(_) => FailureKind::PackageNotFound,
            IndexError::Unavailable(_) => FailureKind::IndexUnavailable,
        };

        Self {
            package_name: package_name.to_string(),
            kind,
            message: error.to_string(),
        }
    }

    pub fn from_store_error(package_name: &str, error: &StoreError) -> Self {
        Self {
            package_name: package_name.to_string(),
            kind: FailureKind::Store,
            message: error.to_string(),
        }
    }
}

/// Outcome of local reconciliation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LocalSync {
    /// One record per manifest requirement, created or found
    pub records: Vec<PackageRecord>,
    /// Names of records created by this run
    pub created: Vec<String>,
    /// Skipped manifest lines and requirements
    pub warnings: Vec<String>,
}

/// Outcome of remote reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Refreshed records grouped by diff status, most severe first
    pub results: IndexMap<DiffStatus, Vec<PackageRecord>>,
    pub failures: Vec<SyncFailure>,
    pub refreshed_at: DateTime<Utc>,
}

impl SyncReport {
    pub fn new(refreshed_at: DateTime<Utc>) -> Self {
        Self {
            results: IndexMap::new(),
            failures: Vec::new(),
            refreshed_at,
        }
    }

    pub fn push(&mut self, record: PackageRecord) {
        self.results
            .entry(record.diff_status)
            .or_default()
            .push(record);
    }

    /// Order groups by severity and records within a group by name
    pub fn sort(&mut self) {
        self.results.sort_by(|a, _, b, _| b.cmp(a));
        for records in self.results.values_mut() {
            records.sort_by(|a, b| a.package_name.cmp(&b.package_name));
        }
        self.failures.sort_by(|a, b| a.package_name.cmp(&b.package_name));
    }

    pub fn records(&self, status: DiffStatus) -> &[PackageRecord] {
        self.results.get(&status).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn package_names(&self, status: DiffStatus) -> Vec<&str> {
        self.records(status)
            .iter()
            .map(|r| r.package_name.as_str())
            .collect()
    }

    /// Number of records refreshed successfully
    pub fn refreshed(&self) -> usize {
        self.results.values().map(Vec::len).sum()
    }

    /// Plain-text summary headed by `subject`
    pub fn summary<'a>(&'a self, subject: &'a str) -> Summary<'a> {
        Summary {
            report: self,
            subject,
        }
    }
}

pub struct Summary<'a> {
    report: &'a SyncReport,
    subject: &'a str,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.subject)?;
        writeln!(f, "{}", "=".repeat(self.subject.chars().count()))?;

        for status in DiffStatus::BY_SEVERITY {
            let records = self.report.records(status);
            if records.is_empty() {
                continue;
            }

            writeln!(f)?;
            writeln!(f, "{} ({})", status, records.len())?;
            for record in records {
                write!(f, "  {}", record.package_name)?;
                match (&record.current_version, &record.latest_version) {
                    (Some(current), Some(latest)) if current != latest => {
                        write!(f, " {current} -> {latest}")?
                    }
                    (Some(current), _) => write!(f, " {current}")?,
                    (None, Some(latest)) => write!(f, " (latest {latest})")?,
                    (None, None) => {}
                }
                writeln!(f)?;
            }
        }

        if !self.report.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "failed ({})", self.report.failures.len())?;
            for failure in &self.report.failures {
                writeln!(f, "  {}: {}", failure.package_name, failure.message)?;
            }
        }

        writeln!(f)?;
        write!(
            f,
            "Refreshed at {}",
            self.report.refreshed_at.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }
}
