//! PyPI JSON API client for fetching Python package metadata

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::version::error::IndexError;
use crate::version::registry::PackageIndex;
use crate::version::types::IndexPackage;

pub const DEFAULT_PYPI_URL: &str = "https://pypi.org";

const LICENSE_CLASSIFIER: &str = "License :: ";

/// PyPI index client
pub struct PypiIndex {
    client: Client,
    base_url: String,
}

impl PypiIndex {
    /// Build a client whose requests give up after `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, IndexError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

/// PyPI JSON API response structure
#[derive(Debug, Deserialize)]
struct PypiResponse {
    info: PypiInfo,
    #[serde(default)]
    releases: HashMap<String, Vec<PypiFile>>,
}

/// Package information from PyPI
#[derive(Debug, Deserialize)]
struct PypiInfo {
    license: Option<String>,
    #[serde(default)]
    classifiers: Vec<String>,
    home_page: Option<String>,
    project_url: Option<String>,
    package_url: Option<String>,
}

/// Release file entry; only the release keys are used
#[derive(Debug, Deserialize)]
struct PypiFile {}

impl PypiInfo {
    /// `license` when set, otherwise the last segment of a `License ::` classifier
    fn licence(&self) -> Option<String> {
        self.license
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.eq_ignore_ascii_case("unknown"))
            .map(str::to_string)
            .or_else(|| {
                self.classifiers
                    .iter()
                    .filter_map(|c| c.strip_prefix(LICENSE_CLASSIFIER))
                    .filter_map(|rest| rest.rsplit("::").next())
                    .map(str::trim)
                    .find(|l| !l.is_empty())
                    .map(str::to_string)
            })
    }

    fn url(&self) -> Option<String> {
        [&self.project_url, &self.home_page, &self.package_url]
            .into_iter()
            .flatten()
            .map(|u| u.trim())
            .find(|u| !u.is_empty() && *u != "UNKNOWN")
            .map(str::to_string)
    }
}

#[async_trait]
impl PackageIndex for PypiIndex {
    async fn fetch_package(&self, package_name: &str) -> Result<IndexPackage, IndexError> {
        let url = format!("{}/pypi/{}/json", self.base_url, package_name);
        debug!("Fetching PyPI package: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(IndexError::PackageNotFound(package_name.to_string()));
        }

        if !response.status().is_success() {
            return Err(IndexError::Unavailable(format!(
                "PyPI API returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        let mut document: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| IndexError::Unavailable(format!("invalid JSON from PyPI: {e}")))?;

        let raw = document
            .get("info")
            .map(|info| info.to_string())
            .unwrap_or_default();

        let pypi_response: PypiResponse = serde_json::from_value(document.take())
            .map_err(|e| IndexError::Unavailable(format!("unexpected PyPI response: {e}")))?;

        let versions: Vec<String> = pypi_response.releases.into_keys().collect();

        debug!(
            "Found {} versions for package {}",
            versions.len(),
            package_name
        );

        Ok(IndexPackage {
            versions,
            licence: pypi_response.info.licence(),
            url: pypi_response.info.url(),
            classifiers: pypi_response.info.classifiers,
            raw,
        })
    }
}
