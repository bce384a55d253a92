//! Index trait for fetching package metadata from a remote source

#[cfg(test)]
use mockall::automock;

use crate::version::error::IndexError;
use crate::version::types::IndexPackage;

/// Trait for querying a package index
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait PackageIndex: Send + Sync {
    /// Fetches published versions and metadata for a package
    ///
    /// # Arguments
    /// * `package_name` - Normalized package name (e.g., "requests")
    ///
    /// # Returns
    /// * `Ok(IndexPackage)` - Versions (unordered), licence, classifiers and URL
    /// * `Err(IndexError::PackageNotFound)` - The index has no such package
    /// * `Err(IndexError::Unavailable)` - Network, timeout or response failure
    async fn fetch_package(&self, package_name: &str) -> Result<IndexPackage, IndexError>;
}
