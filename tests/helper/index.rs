//! Package index test utilities

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use package_monitor::config::SyncConfig;
use package_monitor::store::SqliteStore;
use package_monitor::sync::SyncEngine;
use package_monitor::sync::clock::FixedClock;
use package_monitor::version::error::IndexError;
use package_monitor::version::registry::PackageIndex;
use package_monitor::version::types::IndexPackage;

/// In-memory package index
#[derive(Default)]
pub struct FakeIndex {
    packages: HashMap<String, IndexPackage>,
    unavailable: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_versions(mut self, package: &str, versions: Vec<&str>) -> Self {
        let package_versions = versions.into_iter().map(|v| v.to_string()).collect();
        self.packages
            .insert(package.to_string(), IndexPackage::new(package_versions));
        self
    }

    pub fn with_package(mut self, package: &str, data: IndexPackage) -> Self {
        self.packages.insert(package.to_string(), data);
        self
    }

    /// Requests for `package` fail as if the index timed out
    pub fn with_unavailable(mut self, package: &str) -> Self {
        self.unavailable.insert(package.to_string());
        self
    }

    /// Package names requested so far, in request order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PackageIndex for FakeIndex {
    async fn fetch_package(&self, package_name: &str) -> Result<IndexPackage, IndexError> {
        self.requests.lock().unwrap().push(package_name.to_string());

        if self.unavailable.contains(package_name) {
            return Err(IndexError::Unavailable("request timed out".to_string()));
        }

        self.packages
            .get(package_name)
            .cloned()
            .ok_or_else(|| IndexError::PackageNotFound(package_name.to_string()))
    }
}

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap()
}

/// Create an engine over a fresh database with `requirements` as its manifest
pub fn create_test_engine(
    index: Arc<FakeIndex>,
    requirements: &str,
) -> (TempDir, Arc<SqliteStore>, SyncEngine) {
    let temp_dir = TempDir::new().unwrap();
    let requirements_file = temp_dir.path().join("requirements.txt");
    std::fs::write(&requirements_file, requirements).unwrap();

    let store = Arc::new(SqliteStore::new(&temp_dir.path().join("test.db")).unwrap());
    let config = SyncConfig {
        requirements_file,
        ..SyncConfig::default()
    };
    let engine = SyncEngine::new(
        store.clone(),
        index,
        Arc::new(FixedClock(fixed_now())),
        config,
    );

    (temp_dir, store, engine)
}
