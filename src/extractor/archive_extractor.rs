use crate::config::{ExtractConfig, GzipLayout};
use crate::error::UnzipperError;
use crate::extractor::formats::{self, ArchiveOutcome, FormatOptions};
use crate::scanner::ArchiveFile;
use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct ExtractionSummary {
    pub archives_found: usize,
    pub archives_extracted: usize,
    pub archives_failed: usize,
    pub sources_deleted: usize,
    pub entries_written: usize,
    pub bytes_written: u64,
    pub start_time: Instant,
    pub errors: Vec<String>,
}

impl ExtractionSummary {
    pub fn new(archives_found: usize) -> Self {
        Self {
            archives_found,
            archives_extracted: 0,
            archives_failed: 0,
            sources_deleted: 0,
            entries_written: 0,
            bytes_written: 0,
            start_time: Instant::now(),
            errors: Vec::new(),
        }
    }

    pub fn record_success(&mut self, outcome: &ArchiveOutcome) {
        self.archives_extracted += 1;
        self.entries_written += outcome.entries_written;
        self.bytes_written += outcome.bytes_written;
    }

    pub fn record_failure<S: Into<String>>(&mut self, error: S) {
        self.archives_failed += 1;
        self.errors.push(error.into());
    }

    pub fn add_error<S: Into<String>>(&mut self, error: S) {
        self.errors.push(error.into());
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Per-archive notifications, in the order they happen.
#[derive(Debug)]
pub enum ExtractionEvent<'a> {
    Started {
        archive: &'a ArchiveFile,
    },
    Extracted {
        archive: &'a ArchiveFile,
        outcome: ArchiveOutcome,
    },
    Failed {
        archive: &'a ArchiveFile,
        error: &'a UnzipperError,
    },
    Deleted {
        archive: &'a ArchiveFile,
    },
    /// Deletion was requested but some entries were not written.
    SourceKept {
        archive: &'a ArchiveFile,
        entries_skipped: usize,
    },
    DeleteFailed {
        archive: &'a ArchiveFile,
        error: &'a std::io::Error,
    },
}

pub struct ArchiveExtractor {
    delete_source: bool,
    gzip_layout: GzipLayout,
    preserve_mtime: bool,
    buffer_size: usize,
}

impl ArchiveExtractor {
    pub fn new() -> Self {
        Self {
            delete_source: false,
            gzip_layout: GzipLayout::Flat,
            preserve_mtime: true,
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    pub fn from_config(config: &ExtractConfig) -> Self {
        Self::new()
            .with_delete_source(config.delete_source)
            .with_gzip_layout(config.gzip_layout)
            .with_preserve_mtime(config.preserve_mtime)
    }

    pub fn with_delete_source(mut self, delete: bool) -> Self {
        self.delete_source = delete;
        self
    }

    pub fn with_gzip_layout(mut self, layout: GzipLayout) -> Self {
        self.gzip_layout = layout;
        self
    }

    pub fn with_preserve_mtime(mut self, preserve: bool) -> Self {
        self.preserve_mtime = preserve;
        self
    }

    /// Extract each archive in turn. A failing archive is recorded and never
    /// stops the loop; its source is kept regardless of `delete_source`.
    pub fn extract_archives(
        &self,
        archives: &[ArchiveFile],
        output_root: &Path,
        event_callback: Option<&dyn Fn(&ExtractionEvent)>,
    ) -> ExtractionSummary {
        let mut summary = ExtractionSummary::new(archives.len());

        for archive in archives {
            notify(event_callback, ExtractionEvent::Started { archive });

            let outcome = match self.extract_one(archive, output_root) {
                Ok(outcome) => {
                    summary.record_success(&outcome);
                    notify(event_callback, ExtractionEvent::Extracted { archive, outcome });
                    outcome
                }
                Err(error) => {
                    summary.record_failure(format!(
                        "Failed to extract {}: {}",
                        archive.display_path(),
                        error
                    ));
                    notify(event_callback, ExtractionEvent::Failed {
                        archive,
                        error: &error,
                    });
                    continue;
                }
            };

            if self.delete_source && outcome.entries_skipped > 0 {
                summary.add_error(format!(
                    "Kept {}: {} entries were not extracted",
                    archive.display_path(),
                    outcome.entries_skipped
                ));
                notify(event_callback, ExtractionEvent::SourceKept {
                    archive,
                    entries_skipped: outcome.entries_skipped,
                });
                continue;
            }

            if self.delete_source {
                match fs::remove_file(&archive.source_path) {
                    Ok(()) => {
                        summary.sources_deleted += 1;
                        notify(event_callback, ExtractionEvent::Deleted { archive });
                    }
                    Err(error) => {
                        summary.add_error(format!(
                            "Failed to delete {}: {}",
                            archive.display_path(),
                            error
                        ));
                        notify(event_callback, ExtractionEvent::DeleteFailed {
                            archive,
                            error: &error,
                        });
                    }
                }
            }
        }

        summary
    }

    fn extract_one(
        &self,
        archive: &ArchiveFile,
        output_root: &Path,
    ) -> crate::error::Result<ArchiveOutcome> {
        let options = FormatOptions {
            buffer_size: self.buffer_size,
            gzip_layout: self.gzip_layout,
            preserve_mtime: self.preserve_mtime,
        };
        formats::extract_archive(archive, output_root, &options)
    }
}

fn notify(callback: Option<&dyn Fn(&ExtractionEvent)>, event: ExtractionEvent<'_>) {
    if let Some(callback) = callback {
        callback(&event);
    }
}

impl Default for ArchiveExtractor {
    fn default() -> Self {
        Self::new()
    }
}
