use crate::config::ScanConfig;
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Archive format recognised from a file name.
///
/// Matching is an exact, case-sensitive suffix test: `a.zip` is a zip,
/// `a.ZIP` and `a.zip.bak` are not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveKind {
    Zip,
    Gzip,
    Unrecognized,
}

impl ArchiveKind {
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".zip") {
            ArchiveKind::Zip
        } else if name.ends_with(".gz") {
            ArchiveKind::Gzip
        } else {
            ArchiveKind::Unrecognized
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.file_name()
            .and_then(|n| n.to_str())
            .map(Self::from_file_name)
            .unwrap_or(ArchiveKind::Unrecognized)
    }

    pub fn is_archive(self) -> bool {
        !matches!(self, ArchiveKind::Unrecognized)
    }

    /// Name of the file a gzip source decompresses to, `None` for other kinds
    /// or when nothing is left after dropping the suffix.
    pub fn gzip_output_name(self, name: &str) -> Option<&str> {
        match self {
            ArchiveKind::Gzip => name.strip_suffix(".gz").filter(|stem| !stem.is_empty()),
            _ => None,
        }
    }
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Gzip => "gzip",
            ArchiveKind::Unrecognized => "unrecognized",
        };
        f.write_str(label)
    }
}

pub struct ArchiveFilter {
    exclude_dirs: Vec<String>,
    exclude_patterns: Vec<Regex>,
}

impl ArchiveFilter {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        let exclude_patterns = config
            .exclude_patterns
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            exclude_dirs: config.exclude_dirs.clone(),
            exclude_patterns,
        })
    }

    /// `path` is relative to the scan root, so patterns never see the root prefix.
    pub fn classify(&self, path: &Path) -> ArchiveKind {
        if self.matches_any_pattern(&path.to_string_lossy()) {
            return ArchiveKind::Unrecognized;
        }
        ArchiveKind::from_path(path)
    }

    pub fn should_traverse_directory(&self, path: &Path) -> bool {
        if let Some(dir_name) = path.file_name().and_then(|s| s.to_str()) {
            if self.exclude_dirs.iter().any(|exclude| exclude == dir_name) {
                return false;
            }
        }

        !self.matches_any_pattern(&path.to_string_lossy())
    }

    pub fn matches_any_pattern(&self, text: &str) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.is_match(text))
    }
}
