use crate::config::ScanConfig;
use crate::error::{Result, UnzipperError};
use crate::scanner::archive_filter::{ArchiveFilter, ArchiveKind};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct ArchiveFile {
    pub source_path: PathBuf,
    pub relative_path: PathBuf,
    pub filename: String,
    pub kind: ArchiveKind,
    pub size: u64,
}

impl ArchiveFile {
    pub fn new(source_path: PathBuf, relative_path: PathBuf, kind: ArchiveKind, size: u64) -> Self {
        let filename = source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            source_path,
            relative_path,
            filename,
            kind,
            size,
        }
    }

    pub fn display_path(&self) -> String {
        self.source_path.display().to_string()
    }
}

/// Check that `root` names an existing directory.
pub fn validate_root(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Err(UnzipperError::InvalidInput {
            message: "Pass an input directory.".to_string(),
        });
    }

    if !root.exists() {
        return Err(UnzipperError::InvalidInput {
            message: format!("Provided path '{}' does not exist.", root.display()),
        });
    }

    if !root.is_dir() {
        return Err(UnzipperError::InvalidInput {
            message: format!("Provided path '{}' is not a directory.", root.display()),
        });
    }

    Ok(())
}

pub struct ArchiveScanner {
    filter: ArchiveFilter,
    max_depth: Option<usize>,
    follow_links: bool,
    skip_dir: Option<PathBuf>,
}

impl ArchiveScanner {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        Ok(Self {
            filter: ArchiveFilter::new(config)?,
            max_depth: config.max_depth,
            follow_links: config.follow_links,
            skip_dir: None,
        })
    }

    /// Prune `dir` from every walk, used for the run's own output directory.
    pub fn with_skip_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.skip_dir = Some(dir.into());
        self
    }

    pub fn scan_directory<P: AsRef<Path>>(&self, root: P) -> Result<Vec<ArchiveFile>> {
        let root_path = root.as_ref();

        let mut walker = WalkDir::new(root_path).follow_links(self.follow_links);
        if let Some(depth) = self.max_depth {
            walker = walker.max_depth(depth);
        }

        let mut archives = Vec::new();

        for entry in walker
            .into_iter()
            .filter_entry(|e| self.should_traverse(e, root_path))
        {
            let entry = match entry {
                Ok(entry) => entry,
                // The root itself could not be read
                Err(err) if err.depth() == 0 => return Err(UnzipperError::Io(err.into())),
                Err(err) => {
                    // Unreadable subtrees are skipped, the rest of the walk goes on
                    tracing::warn!(error = %err, "skipping unreadable path during scan");
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            match self.process_file(&entry, root_path) {
                Ok(Some(archive)) => archives.push(archive),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(path = %entry.path().display(), error = %err, "skipping file");
                }
            }
        }

        archives.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        tracing::debug!(count = archives.len(), root = %root_path.display(), "scan finished");

        Ok(archives)
    }

    fn should_traverse(&self, entry: &DirEntry, root_path: &Path) -> bool {
        if entry.depth() == 0 {
            return true;
        }

        if !entry.file_type().is_dir() {
            return true;
        }

        if self
            .skip_dir
            .as_deref()
            .is_some_and(|skip| entry.path() == skip)
        {
            return false;
        }

        let relative = entry.path().strip_prefix(root_path).unwrap_or(entry.path());
        self.filter.should_traverse_directory(relative)
    }

    fn process_file(&self, entry: &DirEntry, root_path: &Path) -> Result<Option<ArchiveFile>> {
        let path = entry.path();

        let relative_path = path
            .strip_prefix(root_path)
            .map_err(|_| UnzipperError::InvalidPath {
                path: format!(
                    "Cannot calculate relative path for {} from root {}",
                    path.display(),
                    root_path.display()
                ),
            })?
            .to_path_buf();

        let kind = self.filter.classify(&relative_path);
        if !kind.is_archive() {
            return Ok(None);
        }

        let metadata = entry
            .metadata()
            .map_err(|e| UnzipperError::Io(e.into()))?;

        Ok(Some(ArchiveFile::new(
            path.to_path_buf(),
            relative_path,
            kind,
            metadata.len(),
        )))
    }

    pub fn get_statistics(&self, archives: &[ArchiveFile]) -> ScanStatistics {
        ScanStatistics {
            zip_files: archives.iter().filter(|a| a.kind == ArchiveKind::Zip).count(),
            gzip_files: archives.iter().filter(|a| a.kind == ArchiveKind::Gzip).count(),
            total_size: archives.iter().map(|a| a.size).sum(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanStatistics {
    pub zip_files: usize,
    pub gzip_files: usize,
    pub total_size: u64,
}

impl ScanStatistics {
    pub fn display_summary(&self) -> String {
        format!(
            "Scan Results:\n  .zip files: {}\n  .gz files: {}\n  Total size: {}",
            self.zip_files,
            self.gzip_files,
            crate::ui::output::format_bytes(self.total_size)
        )
    }
}
