use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "unzipper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Recursively extract .zip and .gz archives into a new directory")]
#[command(
    long_about = "Unzipper walks a directory tree, finds every .zip and .gz file and extracts \
                  them into a freshly created <name>_unzip directory inside that tree. \
                  Source archives are kept unless --delete is given."
)]
#[command(after_help = "EXAMPLES:\n  \
    unzipper ~/Downloads/exports\n  \
    unzipper ~/Downloads/exports --delete\n\n\
    Settings are read from unzipper.toml, .unzipper.toml or the file named by $UNZIPPER_CONFIG.")]
pub struct Cli {
    /// Directory to scan for archives
    pub root: Option<PathBuf>,

    /// Delete each source archive after it is extracted successfully
    #[arg(long)]
    pub delete: bool,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(Config::env_config_path())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new().with_delete_source(self.delete)
    }

    pub fn root_path(&self) -> PathBuf {
        self.root.clone().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_after_root() {
        let cli = Cli::try_parse_from(["unzipper", "/data/in", "--delete"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/data/in")));
        assert!(cli.delete);
    }

    #[test]
    fn test_delete_before_root() {
        let cli = Cli::try_parse_from(["unzipper", "--delete", "/data/in"]).unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/data/in")));
        assert!(cli.delete);
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["unzipper", "/data/in"]).unwrap();
        assert!(!cli.delete);
        assert!(!cli.create_cli_overrides().delete_source);
    }

    #[test]
    fn test_missing_root_parses_to_empty_path() {
        let cli = Cli::try_parse_from(["unzipper"]).unwrap();
        assert_eq!(cli.root, None);
        assert_eq!(cli.root_path(), PathBuf::new());
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(Cli::try_parse_from(["unzipper", "/data/in", "--force"]).is_err());
    }
}
