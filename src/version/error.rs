use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("Unparseable version: {0:?}")]
    Unparseable(String),
}

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// Network failure, timeout, unexpected status or malformed response
    #[error("Index unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for IndexError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            IndexError::Unavailable(format!("request timed out: {error}"))
        } else {
            IndexError::Unavailable(error.to_string())
        }
    }
}
