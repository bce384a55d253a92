//! requirements.txt parser (pip requirements file format)
//!
//! Supports:
//! - Index requirements in PEP 508 form: `requests==2.32.0`, `Django>=4.2,<5`
//! - Editable installs: `-e git+https://github.com/org/lib.git#egg=lib`, `-e ./lib`
//! - Local paths, VCS references and archive URLs without `-e`
//! - Comments, blank lines and `\` line continuations
//!
//! Pip options (`-r`, `-c`, `--index-url`, ...) are ignored, and per-requirement
//! options such as `--hash` are stripped. Lines that cannot be parsed are
//! reported in [`Manifest::skipped`] and never abort the read.

use std::str::FromStr;

use pep508_rs::pep440_rs::{Operator, VersionSpecifiers};
use pep508_rs::{Requirement, VerbatimUrl, VersionOrUrl};
use regex::Regex;
use tracing::{debug, warn};

use crate::parser::traits::ManifestParser;
use crate::parser::types::{Manifest, RequirementSpec, SkippedLine, normalize_name};

const ARCHIVE_SUFFIXES: &[&str] = &[".whl", ".tar.gz", ".tgz", ".tar.bz2", ".zip"];

/// Parser for pip requirements files
pub struct RequirementsTxtParser {
    /// Regex for trailing comments: `requests==1.0  # pinned`
    comment_re: Regex,
    /// Regex for the start of per-requirement options: ` --hash=...`
    option_re: Regex,
    /// Regex for VCS schemes: `git+https://...`
    vcs_re: Regex,
    /// Regex for the egg fragment naming a local requirement: `#egg=name`
    egg_re: Regex,
    /// Regex for a plausible distribution name derived from a path
    name_re: Regex,
    /// Regex for a pin whose version is not PEP 440: `legacy==nightly-build`
    loose_pin_re: Regex,
    /// Regex for the operand of an `==` or `===` clause, as written
    pin_operand_re: Regex,
}

impl RequirementsTxtParser {
    pub fn new() -> Self {
        Self {
            comment_re: Regex::new(r"(^|\s+)#.*$").unwrap(),
            option_re: Regex::new(r"\s+--?[A-Za-z]").unwrap(),
            vcs_re: Regex::new(r"^(git|hg|svn|bzr)\+").unwrap(),
            egg_re: Regex::new(r"[#&]egg=([A-Za-z0-9][A-Za-z0-9._-]*)").unwrap(),
            name_re: Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9._-]*[A-Za-z0-9])?$").unwrap(),
            loose_pin_re: Regex::new(
                r"^([A-Za-z0-9](?:[A-Za-z0-9._-]*[A-Za-z0-9])?)\s*===?\s*([^\s;,]+)$",
            )
            .unwrap(),
            pin_operand_re: Regex::new(r"(?:^|[^<>!~=])===?\s*([^\s,;)]+)").unwrap(),
        }
    }
}

impl Default for RequirementsTxtParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestParser for RequirementsTxtParser {
    fn parse(&self, content: &str) -> Manifest {
        let mut manifest = Manifest::default();

        for (line, text) in logical_lines(content, &self.comment_re) {
            let uncommented = self.comment_re.replace(&text, "");
            let trimmed = uncommented.trim();

            // Skip empty lines and comments
            if trimmed.is_empty() {
                continue;
            }

            match self.parse_line(trimmed, line) {
                Ok(Some(requirement)) => {
                    debug!("Parsed requirement on line {}: {:?}", line, requirement);
                    manifest.requirements.push(requirement);
                }
                Ok(None) => {}
                Err(reason) => {
                    warn!("Skipping line {} {:?}: {}", line, trimmed, reason);
                    manifest.skipped.push(SkippedLine {
                        line,
                        content: trimmed.to_string(),
                        reason,
                    });
                }
            }
        }

        manifest
    }
}

impl RequirementsTxtParser {
    /// Parse one logical line; `Ok(None)` means the line is a pip option
    fn parse_line(&self, text: &str, line: usize) -> Result<Option<RequirementSpec>, String> {
        if let Some(target) = editable_target(text) {
            if target.is_empty() {
                return Err("editable requirement without a target".to_string());
            }
            return Ok(Some(self.local_requirement(target, line)));
        }

        if text.starts_with('-') {
            debug!("Ignoring pip option on line {}: {}", line, text);
            return Ok(None);
        }

        let requirement = match self.option_re.find(text) {
            Some(option) => text[..option.start()].trim(),
            None => text,
        };

        if self.is_local(requirement) {
            return Ok(Some(self.local_requirement(requirement, line)));
        }

        self.index_requirement(requirement, line).map(Some)
    }

    /// Whether a requirement points at a path, VCS reference or URL
    fn is_local(&self, requirement: &str) -> bool {
        let target = requirement.split_whitespace().next().unwrap_or(requirement);

        target.starts_with('.')
            || target.starts_with('/')
            || target.starts_with('~')
            || target.starts_with("file:")
            || target.contains("://")
            || self.vcs_re.is_match(target)
            || ARCHIVE_SUFFIXES.iter().any(|s| target.ends_with(s))
    }

    /// Build a requirement for a local/VCS target, naming it after its egg
    /// fragment or last path segment, or the target itself as a last resort
    fn local_requirement(&self, target: &str, line: usize) -> RequirementSpec {
        let name = self
            .egg_re
            .captures(target)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .or_else(|| self.name_from_path(target))
            .map(|name| normalize_name(&name))
            .unwrap_or_else(|| target.to_string());

        RequirementSpec {
            name,
            version: None,
            specifier: None,
            is_editable: true,
            uri: Some(target.to_string()),
            line,
        }
    }

    fn name_from_path(&self, target: &str) -> Option<String> {
        if ARCHIVE_SUFFIXES.iter().any(|s| target.ends_with(s)) {
            return None;
        }

        let path = target.split(['#', '?']).next().unwrap_or(target);
        let last = path.trim_end_matches('/').rsplit(['/', ':']).next()?;
        // Drop a VCS revision: `repo.git@v1.2`
        let last = last.split('@').next()?.trim_end_matches(".git");

        self.name_re.is_match(last).then(|| last.to_string())
    }

    /// Parse a PEP 508 requirement published on the index
    fn index_requirement(&self, text: &str, line: usize) -> Result<RequirementSpec, String> {
        let requirement = match Requirement::<VerbatimUrl>::from_str(text) {
            Ok(requirement) => requirement,
            Err(e) => return self.loose_pin(text, line).ok_or_else(|| e.to_string()),
        };
        let name = normalize_name(&requirement.name.to_string());

        let spec = match requirement.version_or_url {
            // `name @ git+https://...` is installed from the URL, not the index
            Some(VersionOrUrl::Url(url)) => RequirementSpec {
                name,
                version: None,
                specifier: None,
                is_editable: true,
                uri: Some(url.to_string()),
                line,
            },
            Some(VersionOrUrl::VersionSpecifier(specifiers)) => {
                let specifier = specifiers.to_string();
                RequirementSpec {
                    name,
                    version: self.pinned_version(text, &specifiers),
                    specifier: (!specifier.is_empty()).then_some(specifier),
                    is_editable: false,
                    uri: None,
                    line,
                }
            }
            None => RequirementSpec {
                name,
                version: None,
                specifier: None,
                is_editable: false,
                uri: None,
                line,
            },
        };

        Ok(spec)
    }

    /// Keep a pin whose version pip would reject; the version is stored as
    /// written and left for the version layer to mark unparseable
    fn loose_pin(&self, text: &str, line: usize) -> Option<RequirementSpec> {
        let caps = self.loose_pin_re.captures(text)?;
        let version = caps[2].to_string();
        debug!("Loose pin on line {}: {}", line, text);

        Some(RequirementSpec {
            name: normalize_name(&caps[1]),
            specifier: Some(format!("=={version}")),
            version: Some(version),
            is_editable: false,
            uri: None,
            line,
        })
    }

    /// The version fixed by an `==` or `===` clause, as written in `text`
    fn pinned_version(&self, text: &str, specifiers: &VersionSpecifiers) -> Option<String> {
        let pinned = specifiers
            .iter()
            .find(|s| matches!(s.operator(), Operator::Equal | Operator::ExactEqual))?;

        let operand = self
            .pin_operand_re
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        Some(operand.unwrap_or_else(|| pinned.version().to_string()))
    }
}

/// Extract the target of `-e <target>`, `--editable <target>` or `--editable=<target>`
fn editable_target(text: &str) -> Option<&str> {
    let rest = text
        .strip_prefix("--editable")
        .or_else(|| text.strip_prefix("-e"))?;

    if rest.is_empty() {
        return Some(rest);
    }
    if !rest.starts_with(|c: char| c.is_whitespace() || c == '=') {
        return None;
    }

    Some(rest.trim_start_matches(|c: char| c.is_whitespace() || c == '=').trim())
}

/// Join `\` continuations, yielding each logical line with its first line number.
/// A commented line ends the logical line even if it ends with `\`.
fn logical_lines(content: &str, comment_re: &Regex) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (index, raw) in content.lines().enumerate() {
        let (start, mut text) = pending.take().unwrap_or((index + 1, String::new()));

        let continued = if comment_re.is_match(raw) {
            None
        } else {
            raw.strip_suffix('\\')
        };

        match continued {
            Some(continued) => {
                text.push_str(continued);
                pending = Some((start, text));
            }
            None => {
                text.push_str(raw);
                lines.push((start, text));
            }
        }
    }

    if let Some(last) = pending {
        lines.push(last);
    }

    lines
}
