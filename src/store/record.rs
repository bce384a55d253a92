//! Persisted package record

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::parser::types::normalize_name;
use crate::version::diff::DiffStatus;
use crate::version::pep440::Version;

/// Tracked state of one manifest dependency
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageRecord {
    /// Normalized package name, unique across records
    pub package_name: String,
    /// Installed from a local path or VCS reference; never compared against the index
    pub is_editable: bool,
    /// The declared version parsed into a comparable [`Version`]
    pub is_parseable: bool,
    /// Version string exactly as the manifest declared it
    pub declared_version: Option<String>,
    pub current_version: Option<Version>,
    /// Smallest published version newer than `current_version`
    pub next_version: Option<Version>,
    pub latest_version: Option<Version>,
    /// Unparsed index metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    pub licence: Option<String>,
    pub python_support: BTreeSet<String>,
    pub supports_py3: bool,
    pub django_support: BTreeSet<String>,
    pub diff_status: DiffStatus,
    pub checked_pypi_at: Option<DateTime<Utc>>,
    pub url: Option<String>,
}

impl PackageRecord {
    /// A record with nothing known beyond its name
    pub fn new(package_name: &str) -> Self {
        Self {
            package_name: normalize_name(package_name),
            is_editable: false,
            is_parseable: false,
            declared_version: None,
            current_version: None,
            next_version: None,
            latest_version: None,
            raw: None,
            licence: None,
            python_support: BTreeSet::new(),
            supports_py3: false,
            django_support: BTreeSet::new(),
            diff_status: DiffStatus::Unknown,
            checked_pypi_at: None,
            url: None,
        }
    }

    /// Whether a newer release exists; `None` when it cannot be known
    pub fn is_updateable(&self) -> Option<bool> {
        if self.is_editable {
            return None;
        }
        let latest = self.latest_version.as_ref()?;
        Some(self.current_version.as_ref() != Some(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Option<Version> {
        Some(Version::parse(s).unwrap())
    }

    #[test]
    fn new_normalizes_name_and_starts_unknown() {
        let record = PackageRecord::new("Django_Filter");

        assert_eq!(record.package_name, "django-filter");
        assert_eq!(record.diff_status, DiffStatus::Unknown);
        assert!(!record.is_editable);
        assert!(record.current_version.is_none());
    }

    #[test]
    fn is_updateable_compares_current_with_latest() {
        let mut record = PackageRecord::new("requests");
        assert_eq!(record.is_updateable(), None);

        record.current_version = v("2.0.0");
        record.latest_version = v("2.0.0");
        assert_eq!(record.is_updateable(), Some(false));

        record.latest_version = v("3.0.0");
        assert_eq!(record.is_updateable(), Some(true));

        record.is_editable = true;
        assert_eq!(record.is_updateable(), None);
    }
}
