use crate::error::{Result, UnzipperError};
use std::fs;
use std::path::{Path, PathBuf};

/// Base name used when the root has no final component, e.g. `/`.
const FALLBACK_BASE_NAME: &str = "root";

/// Owns the single output directory of a run: picks a free name under the
/// root and creates it.
pub struct OutputManager {
    output_directory: PathBuf,
}

impl OutputManager {
    /// Resolve `<basename(root)><suffix>`, appending `_1`, `_2`, ... while the
    /// candidate already exists. Nothing is created here.
    pub fn new(root: PathBuf, suffix: &str, max_attempts: u32) -> Result<Self> {
        let base_name = format!("{}{}", root_base_name(&root), suffix);
        let output_directory = resolve_free_name(&root, &base_name, max_attempts)?;

        Ok(Self { output_directory })
    }

    /// Create the directory. Uses a non-recursive create so a name taken
    /// between resolution and creation fails instead of being reused.
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir(&self.output_directory).map_err(|source| {
            UnzipperError::OutputDirectoryCreation {
                path: self.output_directory.display().to_string(),
                source,
            }
        })?;

        tracing::debug!(path = %self.output_directory.display(), "created output directory");
        Ok(())
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }
}

fn root_base_name(root: &Path) -> String {
    // `.` and `..` have no file name of their own; resolve them first.
    let resolved = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    resolved
        .file_name()
        .or_else(|| root.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_BASE_NAME.to_string())
}

fn resolve_free_name(root: &Path, base_name: &str, max_attempts: u32) -> Result<PathBuf> {
    let candidate = root.join(base_name);
    if !candidate.exists() {
        return Ok(candidate);
    }

    for counter in 1..max_attempts {
        let candidate = root.join(format!("{}_{}", base_name, counter));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(UnzipperError::TooManyCollisions {
        base: root.join(base_name).display().to_string(),
        attempts: max_attempts,
    })
}
