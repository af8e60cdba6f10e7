use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackupError {
    #[error("IO operation failed: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to create output directory {path}: {source}")]
    CreateOutput {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {path}: {source}")]
    Copy {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to check whether {path} exists: {source}")]
    Inspect {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to traverse {path}: {source}")]
    Walk {
        path: String,
        #[source]
        source: walkdir::Error,
    },

    #[error("Permission denied: {path}")]
    Permission { path: String },

    #[error("Failed to serialize backup summary: {message}")]
    Serialization { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Path validation failed: {path}")]
    InvalidPath { path: String },

    #[error("Source and destination are the same file: {path}")]
    SameFile { path: String },
}

impl BackupError {
    pub fn create_output(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            return BackupError::Permission {
                path: path.display().to_string(),
            };
        }
        BackupError::CreateOutput {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn copy(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            return BackupError::Permission {
                path: path.display().to_string(),
            };
        }
        BackupError::Copy {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn inspect(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            return BackupError::Permission {
                path: path.display().to_string(),
            };
        }
        BackupError::Inspect {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn walk(path: &Path, source: walkdir::Error) -> Self {
        let denied = source
            .io_error()
            .is_some_and(|e| e.kind() == io::ErrorKind::PermissionDenied);

        if denied {
            let failing = source.path().unwrap_or(path);
            return BackupError::Permission {
                path: failing.display().to_string(),
            };
        }
        BackupError::Walk {
            path: path.display().to_string(),
            source,
        }
    }

    /// Process exit code reported by the binary for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BackupError::Config { .. } => 2,
            BackupError::Permission { .. } => 3,
            BackupError::InvalidPath { .. } | BackupError::SameFile { .. } => 4,
            BackupError::Serialization { .. } => 5,
            _ => 1,
        }
    }
}

pub trait UserFriendlyError {
    fn user_message(&self) -> String;
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for BackupError {
    fn user_message(&self) -> String {
        match self {
            BackupError::CreateOutput { path, source } => {
                format!("Could not create output directory {}: {}", path, source)
            }
            BackupError::Copy { path, source } => {
                format!("Copy failed for {}: {}", path, source)
            }
            BackupError::Inspect { path, source } => {
                format!("Could not inspect {}: {}", path, source)
            }
            BackupError::Walk { path, source } => {
                format!("Could not walk directory tree {}: {}", path, source)
            }
            BackupError::Permission { path } => {
                format!("Permission denied accessing: {}", path)
            }
            BackupError::Serialization { message } => {
                format!("Could not write backup summary: {}", message)
            }
            BackupError::Config { message } => {
                format!("Configuration error: {}", message)
            }
            BackupError::InvalidPath { path } => {
                format!("Invalid path: {}", path)
            }
            BackupError::SameFile { path } => {
                format!("Refusing to copy {} onto itself", path)
            }
            _ => self.to_string(),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            BackupError::Permission { .. } => Some(
                "Ensure you can read the source backup folder and write to the output directory.".to_string()
            ),
            BackupError::CreateOutput { .. } => Some(
                "Check that the parent directory exists and that the disk is not full, or choose another location with --output.".to_string()
            ),
            BackupError::Copy { .. } | BackupError::Walk { .. } => Some(
                "Check free disk space and file permissions, then run the command again. Already copied files are kept.".to_string()
            ),
            BackupError::Config { .. } => Some(
                "Check your configuration file syntax, or regenerate one with --generate-config.".to_string()
            ),
            BackupError::InvalidPath { .. } => Some(
                "Essential files must be regular files and essential directories must be directories inside the source folder.".to_string()
            ),
            BackupError::SameFile { .. } => Some(
                "Choose an output directory outside the source backup folder with --output.".to_string()
            ),
            _ => None,
        }
    }
}

impl From<toml::de::Error> for BackupError {
    fn from(error: toml::de::Error) -> Self {
        BackupError::Config {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(error: serde_json::Error) -> Self {
        BackupError::Serialization {
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BackupError>;
