//! Predicates for selecting records to display

use std::fmt;
use std::str::FromStr;

use crate::store::record::PackageRecord;
use crate::version::diff::DiffStatus;

/// Tri-state "update available" filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateAvailability {
    /// Both versions known and different
    Available,
    /// Both versions known and equal
    UpToDate,
    /// No index data yet
    Unknown,
}

impl UpdateAvailability {
    pub fn matches(&self, record: &PackageRecord) -> bool {
        let current = record.current_version.as_ref();
        let latest = record.latest_version.as_ref();

        match self {
            UpdateAvailability::Unknown => latest.is_none(),
            UpdateAvailability::UpToDate => {
                current.is_some() && latest.is_some() && current == latest
            }
            UpdateAvailability::Available => {
                current.is_some() && latest.is_some() && current != latest
            }
        }
    }
}

impl FromStr for UpdateAvailability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" | "1" => Ok(UpdateAvailability::Available),
            "no" | "0" => Ok(UpdateAvailability::UpToDate),
            "unknown" | "-1" => Ok(UpdateAvailability::Unknown),
            other => Err(format!("expected yes, no or unknown, got {other:?}")),
        }
    }
}

impl fmt::Display for UpdateAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpdateAvailability::Available => "yes",
            UpdateAvailability::UpToDate => "no",
            UpdateAvailability::Unknown => "unknown",
        })
    }
}

/// Keep only the records matching `availability`
pub fn filter_by_update_availability(
    records: &[PackageRecord],
    availability: UpdateAvailability,
) -> Vec<&PackageRecord> {
    records.iter().filter(|r| availability.matches(r)).collect()
}

/// Conjunction of optional record predicates; unset fields match everything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub diff_status: Option<DiffStatus>,
    pub update: Option<UpdateAvailability>,
    pub is_editable: Option<bool>,
    pub is_parseable: Option<bool>,
    pub supports_py3: Option<bool>,
}

impl RecordQuery {
    pub fn matches(&self, record: &PackageRecord) -> bool {
        self.diff_status.is_none_or(|s| record.diff_status == s)
            && self.update.is_none_or(|u| u.matches(record))
            && self.is_editable.is_none_or(|e| record.is_editable == e)
            && self.is_parseable.is_none_or(|p| record.is_parseable == p)
            && self.supports_py3.is_none_or(|p| record.supports_py3 == p)
    }

    pub fn apply(&self, records: Vec<PackageRecord>) -> Vec<PackageRecord> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::pep440::Version;
    use rstest::rstest;

    fn record(name: &str, current: Option<&str>, latest: Option<&str>) -> PackageRecord {
        PackageRecord {
            current_version: current.map(|v| Version::parse(v).unwrap()),
            latest_version: latest.map(|v| Version::parse(v).unwrap()),
            ..PackageRecord::new(name)
        }
    }

    fn sample() -> Vec<PackageRecord> {
        vec![
            record("current", Some("1.0.0"), Some("1.0.0")),
            record("outdated", Some("1.0.0"), Some("2.0.0")),
            record("unchecked", Some("1.0.0"), None),
            record("unpinned", None, Some("2.0.0")),
        ]
    }

    #[rstest]
    #[case(UpdateAvailability::Available, vec!["outdated"])]
    #[case(UpdateAvailability::UpToDate, vec!["current"])]
    #[case(UpdateAvailability::Unknown, vec!["unchecked"])]
    fn filter_by_update_availability_returns_expected(
        #[case] availability: UpdateAvailability,
        #[case] expected: Vec<&str>,
    ) {
        let records = sample();

        let names: Vec<_> = filter_by_update_availability(&records, availability)
            .into_iter()
            .map(|r| r.package_name.as_str())
            .collect();

        assert_eq!(names, expected);
    }

    #[rstest]
    #[case("yes", UpdateAvailability::Available)]
    #[case("1", UpdateAvailability::Available)]
    #[case("no", UpdateAvailability::UpToDate)]
    #[case("0", UpdateAvailability::UpToDate)]
    #[case("unknown", UpdateAvailability::Unknown)]
    #[case("-1", UpdateAvailability::Unknown)]
    fn update_availability_parses_names_and_codes(
        #[case] input: &str,
        #[case] expected: UpdateAvailability,
    ) {
        assert_eq!(input.parse::<UpdateAvailability>(), Ok(expected));
    }

    #[test]
    fn record_query_combines_predicates() {
        let mut records = sample();
        records[1].diff_status = DiffStatus::Major;
        records[1].supports_py3 = true;
        records[0].supports_py3 = true;

        let query = RecordQuery {
            supports_py3: Some(true),
            diff_status: Some(DiffStatus::Major),
            ..Default::default()
        };

        let names: Vec<_> = query
            .apply(records)
            .into_iter()
            .map(|r| r.package_name)
            .collect();
        assert_eq!(names, vec!["outdated"]);
    }

    #[test]
    fn empty_record_query_matches_everything() {
        assert_eq!(RecordQuery::default().apply(sample()).len(), 4);
    }
}
