//! Common types for manifest parsers

/// A single requirement found in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequirementSpec {
    /// Normalized package name (e.g., "django-rest-framework"), or the install
    /// URI when a local requirement carries no recognizable name
    pub name: String,
    /// Version pinned with `==` or `===`
    pub version: Option<String>,
    /// Full version specifier as written (e.g., ">=2.0,<3.0")
    pub specifier: Option<String>,
    /// Installed from a local path, VCS reference or URL rather than the index
    pub is_editable: bool,
    /// Install source for local requirements
    pub uri: Option<String>,
    /// Line number (1-indexed) where the requirement starts
    pub line: usize,
}

/// A manifest line that was not understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// Line number (1-indexed)
    pub line: usize,
    pub content: String,
    pub reason: String,
}

/// Parsed manifest: requirements in file order plus anything skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub requirements: Vec<RequirementSpec>,
    pub skipped: Vec<SkippedLine>,
}

/// Normalize a package name: lowercase, with runs of `-`, `_` and `.` as `-`.
///
/// Anything that is not a distribution name (a path or URL standing in for an
/// unnamed local requirement) is only trimmed, so distinct targets keep
/// distinct keys.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    if !is_distribution_name(name) {
        return name.to_string();
    }

    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
            }
            in_separator = true;
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    normalized
}

/// ASCII letters, digits, `-`, `_` and `.`, starting and ending alphanumeric
fn is_distribution_name(name: &str) -> bool {
    let valid_char = |c: char| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.');

    name.chars().all(valid_char)
        && name.starts_with(|c: char| c.is_ascii_alphanumeric())
        && name.ends_with(|c: char| c.is_ascii_alphanumeric())
}
