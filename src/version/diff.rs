//! Severity classification of the gap between current and latest versions

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::version::pep440::Version;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiffStatus {
    /// No index data, no comparable current version, or an editable package
    Unknown,
    UpToDate,
    Patch,
    Minor,
    Major,
}

impl DiffStatus {
    /// Statuses from most to least severe, the order reports list them in.
    pub const BY_SEVERITY: [DiffStatus; 5] = [
        DiffStatus::Major,
        DiffStatus::Minor,
        DiffStatus::Patch,
        DiffStatus::UpToDate,
        DiffStatus::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiffStatus::Unknown => "unknown",
            DiffStatus::UpToDate => "up-to-date",
            DiffStatus::Patch => "patch",
            DiffStatus::Minor => "minor",
            DiffStatus::Major => "major",
        }
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(DiffStatus::Unknown),
            "up-to-date" => Ok(DiffStatus::UpToDate),
            "patch" => Ok(DiffStatus::Patch),
            "minor" => Ok(DiffStatus::Minor),
            "major" => Ok(DiffStatus::Major),
            other => Err(format!("unknown diff status: {other}")),
        }
    }
}

/// Classify how far `current` lags behind `latest`.
///
/// Editable packages and missing versions are always `Unknown`. Otherwise the
/// first differing component decides: epoch or major segment gives `Major`,
/// minor segment gives `Minor`, anything later gives `Patch`.
pub fn classify(
    current: Option<&Version>,
    latest: Option<&Version>,
    is_editable: bool,
) -> DiffStatus {
    if is_editable {
        return DiffStatus::Unknown;
    }

    let (Some(current), Some(latest)) = (current, latest) else {
        return DiffStatus::Unknown;
    };

    if current == latest {
        DiffStatus::UpToDate
    } else if current.epoch() != latest.epoch() || current.major() != latest.major() {
        DiffStatus::Major
    } else if current.minor() != latest.minor() {
        DiffStatus::Minor
    } else {
        DiffStatus::Patch
    }
}
