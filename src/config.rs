use crate::error::{Result, UnzipperError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "UNZIPPER_CONFIG";

const DEFAULT_CONFIG_PATHS: [&str; 2] = ["unzipper.toml", ".unzipper.toml"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub scan: ScanConfig,
    pub extract: ExtractConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanConfig {
    pub exclude_dirs: Vec<String>,
    pub exclude_patterns: Vec<String>,
    pub max_depth: Option<usize>,
    pub follow_links: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub delete_source: bool,
    pub output_suffix: String,
    pub max_name_attempts: u32,
    pub gzip_layout: GzipLayout,
    pub preserve_mtime: bool,
}

/// Where decompressed `.gz` files land inside the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GzipLayout {
    /// Directly in the output directory; equal names overwrite each other.
    #[default]
    Flat,
    /// Under the archive's directory relative to the scanned root.
    Mirror,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbose: u8,
    pub quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
    Plain,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            delete_source: false,
            output_suffix: "_unzip".to_string(),
            max_name_attempts: 10_000,
            gzip_layout: GzipLayout::Flat,
            preserve_mtime: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Human,
            verbose: 1,
            quiet: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(UnzipperError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| UnzipperError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        Self::from_toml_str(&content).map_err(|e| UnzipperError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                for default_path in &DEFAULT_CONFIG_PATHS {
                    if Path::new(default_path).exists() {
                        tracing::debug!(path = default_path, "loading configuration");
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    /// Configuration file named by `$UNZIPPER_CONFIG`, if set.
    pub fn env_config_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if cli_args.delete_source {
            self.extract.delete_source = true;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let suffix = &self.extract.output_suffix;
        if suffix.is_empty() {
            return Err(UnzipperError::Config {
                message: "Output directory suffix must not be empty".to_string(),
            });
        }

        if suffix.contains('/') || suffix.contains('\\') {
            return Err(UnzipperError::Config {
                message: format!("Output directory suffix must not contain path separators: {}", suffix),
            });
        }

        if self.extract.max_name_attempts == 0 {
            return Err(UnzipperError::Config {
                message: "max_name_attempts must be greater than 0".to_string(),
            });
        }

        if self.scan.max_depth == Some(0) {
            return Err(UnzipperError::Config {
                message: "Maximum directory depth must be greater than 0".to_string(),
            });
        }

        for pattern in &self.scan.exclude_patterns {
            regex::Regex::new(pattern)?;
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub delete_source: bool,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delete_source(mut self, delete: bool) -> Self {
        self.delete_source = delete;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.extract.delete_source);
        assert_eq!(config.extract.output_suffix, "_unzip");
        assert_eq!(config.extract.gzip_layout, GzipLayout::Flat);
        assert!(config.scan.exclude_dirs.is_empty());
        assert_eq!(config.output.verbose, 1);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.extract.output_suffix = "../escape".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.extract.max_name_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.scan.exclude_patterns = vec!["[".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "[extract]\ngzip_layout = \"mirror\"\n\n[output]\nformat = \"plain\"").unwrap();

        let config = Config::load_from_file(temp_file.path()).unwrap();
        assert_eq!(config.extract.gzip_layout, GzipLayout::Mirror);
        assert_eq!(config.output.format, OutputFormat::Plain);
        assert_eq!(config.extract.output_suffix, "_unzip");
        assert_eq!(config.extract.max_name_attempts, 10_000);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = Config::load_from_file("/definitely/not/here/unzipper.toml");
        assert!(matches!(result, Err(UnzipperError::Config { .. })));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let result = Config::from_toml_str("[extract\ndelete_source = yes");
        assert!(matches!(result, Err(UnzipperError::Config { .. })));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = Config::default();

        config.merge_with_cli_args(&CliOverrides::new());
        assert!(!config.extract.delete_source);

        config.merge_with_cli_args(&CliOverrides::new().with_delete_source(true));
        assert!(config.extract.delete_source);
    }

    #[test]
    fn test_cli_flag_does_not_clear_file_setting() {
        let mut config = Config::from_toml_str("[extract]\ndelete_source = true").unwrap();

        config.merge_with_cli_args(&CliOverrides::new().with_delete_source(false));
        assert!(config.extract.delete_source);
    }
}
