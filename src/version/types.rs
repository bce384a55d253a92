//! Data returned by a package index query

use std::collections::BTreeSet;

const PYTHON_CLASSIFIER: &str = "Programming Language :: Python :: ";
const DJANGO_CLASSIFIER: &str = "Framework :: Django :: ";

/// Everything the index knows about one package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexPackage {
    /// Every published version string, in no particular order
    pub versions: Vec<String>,
    pub licence: Option<String>,
    /// Trove classifiers, e.g. `Programming Language :: Python :: 3.12`
    pub classifiers: Vec<String>,
    pub url: Option<String>,
    /// Unparsed package metadata as JSON text
    pub raw: String,
}

impl IndexPackage {
    pub fn new(versions: Vec<String>) -> Self {
        Self {
            versions,
            ..Default::default()
        }
    }

    /// Interpreter versions the package declares support for (`3`, `3.12`, ...)
    pub fn python_support(&self) -> BTreeSet<String> {
        versions_after(&self.classifiers, PYTHON_CLASSIFIER)
    }

    /// Django releases the package declares support for
    pub fn django_support(&self) -> BTreeSet<String> {
        versions_after(&self.classifiers, DJANGO_CLASSIFIER)
    }
}

/// Whether any supported interpreter version belongs to Python 3
pub fn supports_py3(python_support: &BTreeSet<String>) -> bool {
    python_support
        .iter()
        .any(|v| v == "3" || v.starts_with("3."))
}

/// Collect the numeric segment that directly follows `prefix`.
///
/// `Programming Language :: Python :: 3 :: Only` and
/// `Programming Language :: Python :: Implementation :: CPython` are skipped.
fn versions_after(classifiers: &[String], prefix: &str) -> BTreeSet<String> {
    classifiers
        .iter()
        .filter_map(|c| c.strip_prefix(prefix))
        .filter(|rest| !rest.contains("::"))
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_digit() || c == '.'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package_with(classifiers: &[&str]) -> IndexPackage {
        IndexPackage {
            classifiers: classifiers.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn python_support_extracts_interpreter_versions() {
        let package = package_with(&[
            "Programming Language :: Python",
            "Programming Language :: Python :: 3",
            "Programming Language :: Python :: 3 :: Only",
            "Programming Language :: Python :: 3.11",
            "Programming Language :: Python :: 3.12",
            "Programming Language :: Python :: Implementation :: CPython",
            "License :: OSI Approved :: Apache Software License",
        ]);

        let support = package.python_support();
        assert_eq!(
            support.into_iter().collect::<Vec<_>>(),
            vec!["3", "3.11", "3.12"]
        );
    }

    #[test]
    fn django_support_extracts_framework_versions() {
        let package = package_with(&[
            "Framework :: Django",
            "Framework :: Django :: 4.2",
            "Framework :: Django :: 5.0",
        ]);

        assert_eq!(
            package.django_support().into_iter().collect::<Vec<_>>(),
            vec!["4.2", "5.0"]
        );
    }

    #[test]
    fn supports_py3_requires_a_python_3_entry() {
        let py2_only = package_with(&["Programming Language :: Python :: 2.7"]).python_support();
        let mixed = package_with(&[
            "Programming Language :: Python :: 2.7",
            "Programming Language :: Python :: 3.6",
        ])
        .python_support();

        assert!(!supports_py3(&py2_only));
        assert!(supports_py3(&mixed));
        assert!(!supports_py3(&BTreeSet::new()));
    }
}
