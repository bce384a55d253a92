//! Comparable package versions backed by PEP 440
//!
//! Ordering follows PEP 440 (`1.0a1 < 1.0 < 1.0.post1`). Equality is stricter
//! than PEP 440: `1.0` and `1.0.0` compare as different versions, with the
//! shorter release sorting first, so that a pin written with fewer segments is
//! never silently reported as up to date.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use pep508_rs::pep440_rs;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::version::error::VersionError;

#[derive(Debug, Clone)]
pub struct Version {
    parsed: pep440_rs::Version,
    raw: String,
}

impl Version {
    /// Parse a version string, keeping the original text for display.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let raw = raw.trim();
        let parsed = pep440_rs::Version::from_str(raw)
            .map_err(|_| VersionError::Unparseable(raw.to_string()))?;

        Ok(Self {
            parsed,
            raw: raw.to_string(),
        })
    }

    /// The version string as it was given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn epoch(&self) -> u64 {
        self.parsed.epoch()
    }

    /// Release segment at `index`, counting missing trailing segments as 0.
    pub fn segment(&self, index: usize) -> u64 {
        self.parsed.release().get(index).copied().unwrap_or(0)
    }

    pub fn major(&self) -> u64 {
        self.segment(0)
    }

    pub fn minor(&self) -> u64 {
        self.segment(1)
    }

    /// True for pre-releases (`a`, `b`, `rc`) and development releases.
    pub fn is_prerelease(&self) -> bool {
        self.parsed.is_pre() || self.parsed.is_dev()
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed).then_with(|| {
            self.parsed
                .release()
                .len()
                .cmp(&other.parsed.release().len())
        })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Version::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[rstest]
    #[case("1.0.0", "1.0.1", Ordering::Less)]
    #[case("1.2.0", "1.10.0", Ordering::Less)]
    #[case("2.0.0", "1.99.99", Ordering::Greater)]
    #[case("1.0a1", "1.0b1", Ordering::Less)]
    #[case("1.0rc1", "1.0", Ordering::Less)]
    #[case("1.0", "1.0.post1", Ordering::Less)]
    #[case("1.0.dev1", "1.0a1", Ordering::Less)]
    #[case("1!0.1", "2.0", Ordering::Greater)]
    #[case("1.0", "1.0.0", Ordering::Less)]
    #[case("v1.2.3", "1.2.3", Ordering::Equal)]
    fn cmp_follows_pep440_precedence(
        #[case] left: &str,
        #[case] right: &str,
        #[case] expected: Ordering,
    ) {
        assert_eq!(v(left).cmp(&v(right)), expected);
        assert_eq!(v(right).cmp(&v(left)), expected.reverse());
    }

    #[test]
    fn shorter_release_is_not_equal_to_padded_release() {
        assert_ne!(v("1.0"), v("1.0.0"));
        assert_eq!(v("1.0.0"), v("1.0.0"));
    }

    #[test]
    fn ordering_is_transitive_across_mixed_versions() {
        let mut versions: Vec<Version> = [
            "2.0", "1.0.post1", "1.0", "1.0rc1", "1.0.0", "0.9", "1.0a1", "1.0.dev0", "1!0.1",
        ]
        .iter()
        .map(|s| v(s))
        .collect();
        versions.sort();

        for window in versions.windows(2) {
            assert!(window[0] < window[1], "{} < {}", window[0], window[1]);
        }
        for i in 0..versions.len() {
            for j in i + 1..versions.len() {
                assert!(versions[i] < versions[j]);
            }
        }
    }

    #[rstest]
    #[case("not-a-version")]
    #[case("")]
    #[case("latest")]
    #[case("1.0-custom-build!!")]
    fn parse_rejects_strings_without_a_valid_version(#[case] raw: &str) {
        assert!(matches!(
            Version::parse(raw),
            Err(VersionError::Unparseable(_))
        ));
    }

    #[rstest]
    #[case("3.1.4", 3, 1)]
    #[case("7", 7, 0)]
    #[case("2.5rc1", 2, 5)]
    fn segments_pad_missing_parts_with_zero(
        #[case] raw: &str,
        #[case] major: u64,
        #[case] minor: u64,
    ) {
        let version = v(raw);
        assert_eq!(version.major(), major);
        assert_eq!(version.minor(), minor);
        assert_eq!(version.segment(5), 0);
    }

    #[rstest]
    #[case("1.0a1", true)]
    #[case("1.0.dev3", true)]
    #[case("1.0", false)]
    #[case("1.0.post2", false)]
    fn is_prerelease_detects_pre_and_dev_releases(#[case] raw: &str, #[case] expected: bool) {
        assert_eq!(v(raw).is_prerelease(), expected);
    }

    #[test]
    fn display_keeps_original_text() {
        assert_eq!(v(" 2.32.0 ").to_string(), "2.32.0");
        assert_eq!(
            serde_json::to_string(&v("1.0rc1")).unwrap(),
            "\"1.0rc1\""
        );
    }
}
