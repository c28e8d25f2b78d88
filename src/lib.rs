pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod scanner;
pub mod ui;

// Public API re-exports
pub use cli::Cli;
pub use config::{CliOverrides, Config, ExtractConfig, GzipLayout, OutputConfig, ScanConfig};
pub use error::{Result, UnzipperError, UserFriendlyError};

pub use extractor::{ArchiveExtractor, ArchiveOutcome, ExtractionEvent, ExtractionSummary, OutputManager};
pub use scanner::{ArchiveFile, ArchiveKind, ArchiveScanner};
pub use ui::{OutputFormatter, OutputMode};

use std::path::Path;

/// Main library interface: one configured extraction run per call to [`Unzipper::run`].
pub struct Unzipper {
    config: Config,
    output_formatter: OutputFormatter,
}

impl Unzipper {
    pub fn new(config: Config) -> Self {
        let output_formatter = OutputFormatter::new(
            config.output.format.into(),
            config.output.verbose,
            config.output.quiet,
        );

        Self {
            config,
            output_formatter,
        }
    }

    /// Create an Unzipper from CLI arguments and the discovered configuration file
    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        Ok(Self::new(cli_args.load_config()?))
    }

    /// Extract every archive under `root` into a new output directory.
    ///
    /// Fails only before any archive is touched: when `root` is not a
    /// directory, when no free output name exists, or when the output
    /// directory cannot be created. Per-archive failures are reported and
    /// counted in the returned summary.
    pub fn run(&self, root: &Path) -> Result<ExtractionSummary> {
        scanner::validate_root(root)?;

        self.output_formatter
            .start_operation(&format!("Root directory: {}", root.display()));

        let output_manager = self.setup_output_directory(root)?;
        let output_dir = output_manager.get_output_directory();

        let archives = self.scan_archives(root, output_dir)?;
        if archives.is_empty() {
            self.output_formatter.info("No .zip or .gz files found");
        }

        let summary = self.extract_archives(&archives, output_dir);

        self.output_formatter.print_extraction_summary(&summary);
        tracing::info!(
            extracted = summary.archives_extracted,
            failed = summary.archives_failed,
            deleted = summary.sources_deleted,
            "run finished"
        );

        Ok(summary)
    }

    fn setup_output_directory(&self, root: &Path) -> Result<OutputManager> {
        let manager = OutputManager::new(
            root.to_path_buf(),
            &self.config.extract.output_suffix,
            self.config.extract.max_name_attempts,
        )?;

        manager.initialize()?;

        self.output_formatter.info(&format!(
            "Created output directory: {}",
            manager.get_output_directory().display()
        ));

        Ok(manager)
    }

    fn scan_archives(&self, root: &Path, output_dir: &Path) -> Result<Vec<ArchiveFile>> {
        let scanner = ArchiveScanner::new(&self.config.scan)?.with_skip_dir(output_dir);

        let archives = scanner.scan_directory(root)?;

        let stats = scanner.get_statistics(&archives);
        self.output_formatter.debug(&stats.display_summary());

        Ok(archives)
    }

    fn extract_archives(&self, archives: &[ArchiveFile], output_dir: &Path) -> ExtractionSummary {
        let extractor = ArchiveExtractor::from_config(&self.config.extract);

        extractor.extract_archives(archives, output_dir, Some(&|event| self.report_event(event)))
    }

    fn report_event(&self, event: &ExtractionEvent) {
        let formatter = &self.output_formatter;

        match event {
            ExtractionEvent::Started { archive } => {
                let suffix = match archive.kind {
                    ArchiveKind::Zip => ".zip",
                    _ => ".gz",
                };
                formatter.info(&format!(
                    "Unzipping {} file: {}",
                    suffix,
                    archive.display_path()
                ));
            }
            ExtractionEvent::Extracted { archive, outcome } => {
                formatter.success(&format!("Unzipped: {}", archive.filename));
                if outcome.entries_skipped > 0 {
                    formatter.warning(&format!(
                        "Skipped {} unnamed entries in {}",
                        outcome.entries_skipped, archive.filename
                    ));
                }
            }
            ExtractionEvent::Failed { archive, error } => {
                tracing::debug!(archive = %archive.display_path(), error = %error, "extraction failed");
                match error {
                    UnzipperError::CorruptArchive { kind, .. } => {
                        formatter.warning(&format!("Bad {} file: {}", kind, archive.filename));
                    }
                    other => {
                        formatter.warning(&format!(
                            "Failed to extract {}: {}",
                            archive.filename,
                            other.user_message()
                        ));
                    }
                }
            }
            ExtractionEvent::Deleted { archive } => {
                formatter.info(&format!("Deleted source file: {}", archive.display_path()));
            }
            ExtractionEvent::SourceKept {
                archive,
                entries_skipped,
            } => {
                formatter.warning(&format!(
                    "Kept source file {}: {} entries could not be extracted",
                    archive.display_path(),
                    entries_skipped
                ));
            }
            ExtractionEvent::DeleteFailed { archive, error } => {
                formatter.warning(&format!(
                    "Could not delete source file {}: {}",
                    archive.display_path(),
                    error
                ));
            }
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    /// Handle error with user-friendly output
    pub fn handle_error(&self, error: &UnzipperError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}

/// Extract all `.zip` and `.gz` files under `root` into a new
/// `<root name>_unzip` directory, deleting each successfully extracted
/// source when `delete_source` is set. Uses the default configuration.
pub fn extract<P: AsRef<Path>>(root: P, delete_source: bool) -> Result<()> {
    let mut config = Config::default();
    config.extract.delete_source = delete_source;

    Unzipper::new(config).run(root.as_ref()).map(|_| ())
}

/// Get version information
pub fn version_info() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
