//! Parser trait definition

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::parser::types::Manifest;

/// Trait for parsing requirement manifests
///
/// Parsing itself never fails: lines that cannot be understood are reported
/// in [`Manifest::skipped`]. Only reading the source can fail.
pub trait ManifestParser {
    /// Parse manifest content into requirement specifications
    fn parse(&self, content: &str) -> Manifest;

    /// Read and parse a manifest from any byte stream
    fn read<R: Read>(&self, mut reader: R) -> Result<Manifest, ParseError>
    where
        Self: Sized,
    {
        let mut content = String::new();
        reader
            .read_to_string(&mut content)
            .map_err(ParseError::Read)?;
        Ok(self.parse(&content))
    }

    /// Read and parse a manifest file
    fn read_path(&self, path: &Path) -> Result<Manifest, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|source| ParseError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.parse(&content))
    }
}

/// Error type for reading a manifest
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The manifest file could not be opened or read
    #[error("Failed to read manifest {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest stream could not be read
    #[error("Failed to read manifest stream: {0}")]
    Read(#[source] std::io::Error),
}
