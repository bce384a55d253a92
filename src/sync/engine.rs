//! Reconciliation of the manifest, the record store and the package index

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};

use crate::config::SyncConfig;
use crate::parser::requirements_txt::RequirementsTxtParser;
use crate::parser::traits::ManifestParser;
use crate::parser::types::{Manifest, RequirementSpec};
use crate::store::error::StoreError;
use crate::store::record::PackageRecord;
use crate::store::{ListFilter, RecordStore};
use crate::sync::clock::Clock;
use crate::sync::error::SyncError;
use crate::sync::report::{LocalSync, SyncFailure, SyncReport};
use crate::version::diff::classify;
use crate::version::error::IndexError;
use crate::version::pep440::Version;
use crate::version::registry::PackageIndex;
use crate::version::types::{IndexPackage, supports_py3};

/// Sole writer of package records.
///
/// Callers must not run two [`SyncEngine::sync_remote`] passes over
/// overlapping records at the same time: each record is written whole, so the
/// later write wins and may carry stale index data.
pub struct SyncEngine {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn PackageIndex>,
    clock: Arc<dyn Clock>,
    parser: RequirementsTxtParser,
    config: SyncConfig,
}

impl SyncEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        index: Arc<dyn PackageIndex>,
        clock: Arc<dyn Clock>,
        config: SyncConfig,
    ) -> Self {
        Self {
            store,
            index,
            clock,
            parser: RequirementsTxtParser::new(),
            config,
        }
    }

    /// Read the configured manifest and create records for new requirements
    pub fn sync_local(&self) -> Result<LocalSync, SyncError> {
        info!(
            "Loading requirements from {}",
            self.config.requirements_file.display()
        );
        let manifest = self.parser.read_path(&self.config.requirements_file)?;
        self.sync_manifest(&manifest)
    }

    /// Create records for requirements not yet stored; existing records are
    /// returned as they are, even if the manifest now declares another version
    pub fn sync_manifest(&self, manifest: &Manifest) -> Result<LocalSync, SyncError> {
        let mut outcome = LocalSync::default();

        for skipped in &manifest.skipped {
            outcome.warnings.push(format!(
                "line {}: skipped {:?}: {}",
                skipped.line, skipped.content, skipped.reason
            ));
        }

        for requirement in &manifest.requirements {
            if let Some(record) = self.store.get(&requirement.name)? {
                debug!("Package '{}' already tracked", record.package_name);
                outcome.records.push(record);
                continue;
            }

            match self.store.create(record_from_requirement(requirement)) {
                Ok(record) => {
                    info!("Package '{}' added", record.package_name);
                    outcome.created.push(record.package_name.clone());
                    outcome.records.push(record);
                }
                Err(StoreError::DuplicateName(name)) => {
                    info!("Package '{}' already exists", name);
                    match self.store.get(&name)? {
                        Some(record) => outcome.records.push(record),
                        None => {
                            warn!("Skipping missing package: {:?}", requirement);
                            outcome.warnings.push(format!(
                                "line {}: skipped {}: record disappeared during sync",
                                requirement.line, name
                            ));
                        }
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            "Local sync finished: {} packages, {} new, {} warnings",
            outcome.records.len(),
            outcome.created.len(),
            outcome.warnings.len()
        );
        Ok(outcome)
    }

    /// Refresh records from the package index.
    ///
    /// `None` or an empty selection refreshes every non-editable record.
    /// A record that cannot be refreshed is left untouched and reported in
    /// [`SyncReport::failures`]; it never aborts the batch.
    pub async fn sync_remote(
        &self,
        records: Option<Vec<PackageRecord>>,
    ) -> Result<SyncReport, SyncError> {
        info!("Fetching latest data from the package index");

        let records = match records {
            Some(records) if !records.is_empty() => records,
            _ => self.store.list(ListFilter::NonEditable)?,
        };

        let outcomes: Vec<_> = stream::iter(records)
            .map(|record| self.refresh_record(record))
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await;

        let mut report = SyncReport::new(self.clock.now());
        for outcome in outcomes {
            match outcome {
                Ok(Some(record)) => report.push(record),
                Ok(None) => {}
                Err(failure) => report.failures.push(failure),
            }
        }
        report.sort();

        info!(
            "Remote sync finished: {} refreshed, {} failed",
            report.refreshed(),
            report.failures.len()
        );
        Ok(report)
    }

    /// Refresh a single record; editable records are skipped with `Ok(None)`
    pub async fn refresh_record(
        &self,
        mut record: PackageRecord,
    ) -> Result<Option<PackageRecord>, SyncFailure> {
        if record.is_editable {
            debug!("Skipping editable package: {}", record.package_name);
            return Ok(None);
        }

        let package = self
            .index
            .fetch_package(&record.package_name)
            .await
            .map_err(|e| {
                error!("{}: {}", record.package_name, e);
                SyncFailure::from_index_error(&record.package_name, &e)
            })?;

        apply_index_package(
            &mut record,
            &package,
            self.clock.now(),
            self.config.ignore_prerelease,
        );

        self.store.update(&record).map_err(|e| {
            error!("Failed to save {}: {}", record.package_name, e);
            SyncFailure::from_store_error(&record.package_name, &e)
        })?;

        debug!(
            "Updated package from index: {} ({})",
            record.package_name, record.diff_status
        );
        Ok(Some(record))
    }

    /// Published versions newer than the record's current version, oldest first
    pub async fn available_updates(
        &self,
        record: &PackageRecord,
    ) -> Result<Vec<Version>, IndexError> {
        let package = self.index.fetch_package(&record.package_name).await?;

        let mut newer: Vec<Version> =
            published_versions(&package.versions, self.config.ignore_prerelease)
                .into_iter()
                .filter(|v| record.current_version.as_ref().is_none_or(|c| v > c))
                .collect();
        newer.sort();

        Ok(newer)
    }

    /// Delete every record
    pub fn clean(&self) -> Result<usize, SyncError> {
        let deleted = self.store.delete_all()?;
        info!("Deleted all existing packages ({})", deleted);
        Ok(deleted)
    }
}

/// Build a new record from a manifest requirement; an unparseable version is
/// kept only as `declared_version`
pub fn record_from_requirement(requirement: &RequirementSpec) -> PackageRecord {
    let mut record = PackageRecord::new(&requirement.name);
    record.is_editable = requirement.is_editable;
    record.declared_version = requirement.version.clone();

    if requirement.is_editable {
        record.url = requirement.uri.clone();
        return record;
    }

    if let Some(declared) = &requirement.version {
        match Version::parse(declared) {
            Ok(version) => {
                record.current_version = Some(version);
                record.is_parseable = true;
            }
            Err(e) => warn!("{}: {}, storing it unparsed", requirement.name, e),
        }
    }

    record
}

/// Overwrite the index-derived fields of `record` and recompute its status
pub fn apply_index_package(
    record: &mut PackageRecord,
    package: &IndexPackage,
    checked_at: DateTime<Utc>,
    ignore_prerelease: bool,
) {
    let published = published_versions(&package.versions, ignore_prerelease);

    record.latest_version = published.iter().max().cloned();
    record.next_version = record
        .current_version
        .as_ref()
        .and_then(|current| published.iter().filter(|v| *v > current).min().cloned());

    record.licence = package.licence.clone();
    record.python_support = package.python_support();
    record.supports_py3 = supports_py3(&record.python_support);
    record.django_support = package.django_support();
    record.url = package.url.clone();
    record.raw = Some(package.raw.clone());
    record.checked_pypi_at = Some(checked_at);
    record.diff_status = classify(
        record.current_version.as_ref(),
        record.latest_version.as_ref(),
        record.is_editable,
    );
}

/// Parse published version strings, dropping the ones that are not PEP 440
fn published_versions(versions: &[String], ignore_prerelease: bool) -> Vec<Version> {
    versions
        .iter()
        .filter_map(|raw| {
            Version::parse(raw)
                .inspect_err(|e| debug!("Ignoring published version: {}", e))
                .ok()
        })
        .filter(|v| !(ignore_prerelease && v.is_prerelease()))
        .collect()
}
