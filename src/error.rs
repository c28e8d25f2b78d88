use crate::scanner::ArchiveKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UnzipperError {
    #[error("Invalid input directory: {message}")]
    InvalidInput { message: String },

    #[error("Could not create output directory {path}: {source}")]
    OutputDirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No free output directory name for {base} after {attempts} attempts")]
    TooManyCollisions { base: String, attempts: u32 },

    #[error("Bad {kind} file {path}: {reason}")]
    CorruptArchive {
        kind: ArchiveKind,
        path: String,
        reason: String,
    },

    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },
}

impl UnzipperError {
    pub fn exit_code(&self) -> i32 {
        match self {
            UnzipperError::InvalidInput { .. } => 2,
            UnzipperError::OutputDirectoryCreation { .. } => 3,
            UnzipperError::TooManyCollisions { .. } => 4,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for UnzipperError {
    fn user_message(&self) -> String {
        match self {
            UnzipperError::InvalidInput { message } => {
                format!("Invalid input directory: {}", message)
            }
            UnzipperError::OutputDirectoryCreation { path, source } => {
                format!("Exception occurred while creating the folder {}: {}", path, source)
            }
            UnzipperError::TooManyCollisions { base, attempts } => {
                format!(
                    "Could not find a free name for {} after {} attempts",
                    base, attempts
                )
            }
            UnzipperError::CorruptArchive { kind, path, .. } => {
                format!("Bad {} file: {}", kind, path)
            }
            UnzipperError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            UnzipperError::InvalidPath { path } => {
                format!("Invalid file path: {}", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            UnzipperError::InvalidInput { .. } => Some(
                "Pass an existing directory, e.g. `unzipper /path/to/downloads --delete`.".to_string()
            ),
            UnzipperError::OutputDirectoryCreation { .. } => Some(
                "Ensure you have write permission for the input directory and enough free disk space.".to_string()
            ),
            UnzipperError::TooManyCollisions { .. } => Some(
                "Remove old output directories or raise `max_name_attempts` in the [extract] section of the configuration.".to_string()
            ),
            UnzipperError::CorruptArchive { .. } => Some(
                "The archive is damaged or not in the format its name suggests; the source file was left in place.".to_string()
            ),
            UnzipperError::Config { .. } => Some(
                "Check your configuration file syntax (unzipper.toml or $UNZIPPER_CONFIG).".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for UnzipperError {
    fn from(error: toml::de::Error) -> Self {
        UnzipperError::Config {
            message: error.to_string(),
        }
    }
}

impl From<regex::Error> for UnzipperError {
    fn from(error: regex::Error) -> Self {
        UnzipperError::Config {
            message: format!("Invalid exclude pattern: {}", error),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnzipperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_friendly_messages() {
        let error = UnzipperError::InvalidInput {
            message: "'/nope' does not exist".to_string(),
        };
        assert!(error.user_message().contains("Invalid input directory"));
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_corrupt_archive_message_names_format() {
        let error = UnzipperError::CorruptArchive {
            kind: ArchiveKind::Gzip,
            path: "logs/a.gz".to_string(),
            reason: "invalid gzip header".to_string(),
        };
        assert_eq!(error.user_message(), "Bad gzip file: logs/a.gz");
        assert!(error.to_string().contains("invalid gzip header"));
        assert_eq!(error.exit_code(), 1);
    }

    #[test]
    fn test_exit_codes() {
        let invalid = UnzipperError::InvalidInput {
            message: "missing".to_string(),
        };
        let creation = UnzipperError::OutputDirectoryCreation {
            path: "x_unzip".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        let collisions = UnzipperError::TooManyCollisions {
            base: "x_unzip".to_string(),
            attempts: 3,
        };

        assert_eq!(invalid.exit_code(), 2);
        assert_eq!(creation.exit_code(), 3);
        assert_eq!(collisions.exit_code(), 4);

        let io = UnzipperError::Io(std::io::Error::from(std::io::ErrorKind::Other));
        assert_eq!(io.exit_code(), 1);
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_error = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let error = UnzipperError::from(toml_error);
        assert!(matches!(error, UnzipperError::Config { .. }));
    }
}
