use crate::error::{BackupError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

pub const DEFAULT_SOURCE_DIR: &str = "backup_20250729_014531";
pub const DEFAULT_OUTPUT_DIR: &str = "downloadable_backup";
pub const DEFAULT_SUMMARY_FILENAME: &str = "BACKUP_SUMMARY.json";
pub const DEFAULT_INSTRUCTIONS_FILENAME: &str = "README.txt";

pub const DEFAULT_INSTRUCTIONS: &str = "# UDRG Backup - Download Instructions

## What's Included:
- ✅ Complete application source code
- ✅ Database exports (996 members, 46 users)\x20\x20
- ✅ Configuration and deployment files
- ✅ Migration guides and scripts

## What's NOT Included (due to size):
- ❌ Upload files (3,442 photos - 3GB+)

## To Get Upload Files:
1. Upload files are in: backup_20250729_014531/uploads/
2. You'll need to transfer these separately
3. Or use the migration_package/uploads/ directory

## Deployment:
1. Use the files in this backup
2. Follow VPS_MIGRATION_STEPS.md\x20\x20
3. Transfer upload files separately to your VPS

## File Sizes:
- This backup: ~50MB (without uploads)
- Upload files: ~3GB (transfer separately)
- Total system: ~3.3GB
";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backup: BackupConfig,
    pub summary: SummaryConfig,
    pub artifacts: ArtifactConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub essential_files: Vec<String>,
    pub essential_dirs: Vec<String>,
}

/// Values written verbatim into the summary artifact.
///
/// These are descriptive figures about the full backup, not measurements of
/// what a run actually copied.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummaryConfig {
    pub total_members: String,
    pub total_users: String,
    pub upload_files: String,
    pub backup_size: String,
    pub contents: Vec<String>,
    pub note: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArtifactConfig {
    pub summary_filename: String,
    pub instructions_filename: String,
    pub instructions: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup: BackupConfig::default(),
            summary: SummaryConfig::default(),
            artifacts: ArtifactConfig::default(),
        }
    }
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            essential_files: vec![
                "package.json".to_string(),
                "package-lock.json".to_string(),
                "VPS_MIGRATION_STEPS.md".to_string(),
                "deploy_to_vps.sh".to_string(),
                ".env.example".to_string(),
                "nginx.conf".to_string(),
                "members_data.csv".to_string(),
                "users_data.csv".to_string(),
            ],
            essential_dirs: vec![
                "server".to_string(),
                "shared".to_string(),
                "client/src".to_string(),
            ],
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            total_members: "996".to_string(),
            total_users: "46".to_string(),
            upload_files: "3442".to_string(),
            backup_size: "3.3GB".to_string(),
            contents: vec![
                "Application source code".to_string(),
                "Database exports (CSV)".to_string(),
                "Configuration files".to_string(),
                "Deployment scripts".to_string(),
                "Migration guides".to_string(),
            ],
            note: "Upload files (photos) need separate transfer due to size".to_string(),
        }
    }
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            summary_filename: DEFAULT_SUMMARY_FILENAME.to_string(),
            instructions_filename: DEFAULT_INSTRUCTIONS_FILENAME.to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
        }
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(BackupError::Config {
                message: format!("Configuration file not found: {}", path.display()),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| BackupError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| BackupError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        Ok(config)
    }

    pub fn load_with_defaults<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["backup-assembler.toml", ".backup-assembler.toml"];

                for default_path in &default_paths {
                    if Path::new(default_path).exists() {
                        return Self::load_from_file(default_path);
                    }
                }

                Ok(Self::default())
            }
        }
    }

    pub fn merge_with_cli_args(&mut self, cli_args: &CliOverrides) {
        if let Some(ref source_dir) = cli_args.source_dir {
            self.backup.source_dir = source_dir.clone();
        }

        if let Some(ref output_dir) = cli_args.output_dir {
            self.backup.output_dir = output_dir.clone();
        }
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| BackupError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        std::fs::write(path, content).map_err(|e| BackupError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.backup.output_dir.as_os_str().is_empty() {
            return Err(BackupError::Config {
                message: "Output directory must not be empty".to_string(),
            });
        }

        let source_dir = resolve_path(&self.backup.source_dir)?;
        let output_dir = resolve_path(&self.backup.output_dir)?;
        if output_dir.starts_with(&source_dir) {
            return Err(BackupError::Config {
                message: format!(
                    "Output directory {} must be outside the source directory {}",
                    self.backup.output_dir.display(),
                    self.backup.source_dir.display()
                ),
            });
        }

        for file in &self.backup.essential_files {
            if !is_plain_file_name(file) {
                return Err(BackupError::Config {
                    message: format!(
                        "Essential file must be a bare file name inside the source directory: {:?}",
                        file
                    ),
                });
            }
        }

        for dir in &self.backup.essential_dirs {
            if !is_contained_relative_path(dir) {
                return Err(BackupError::Config {
                    message: format!(
                        "Essential directory must be a relative path without '..': {:?}",
                        dir
                    ),
                });
            }
        }

        let artifacts = [
            &self.artifacts.summary_filename,
            &self.artifacts.instructions_filename,
        ];
        for name in artifacts {
            if !is_plain_file_name(name) {
                return Err(BackupError::Config {
                    message: format!("Artifact file name must be a bare file name: {:?}", name),
                });
            }
        }

        if self.artifacts.summary_filename == self.artifacts.instructions_filename {
            return Err(BackupError::Config {
                message: "Summary and instructions artifacts must use different file names"
                    .to_string(),
            });
        }

        let mut seen = HashSet::new();
        for file in &self.backup.essential_files {
            if !seen.insert(file.as_str()) {
                return Err(BackupError::Config {
                    message: format!("Essential file listed twice: {}", file),
                });
            }
        }

        Ok(())
    }

    pub fn create_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config).unwrap_or_else(|_| String::new())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn is_contained_relative_path(path: &str) -> bool {
    !path.is_empty()
        && Path::new(path)
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        && Path::new(path)
            .components()
            .any(|c| matches!(c, Component::Normal(_)))
}

/// Absolute form of `path` with symlinks and `..` resolved, even when the
/// trailing components do not exist yet.
fn resolve_path(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    for ancestor in absolute.ancestors() {
        let Ok(mut resolved) = ancestor.canonicalize() else {
            continue;
        };

        let remainder = absolute.strip_prefix(ancestor).unwrap_or(Path::new(""));
        for component in remainder.components() {
            match component {
                Component::Normal(name) => resolved.push(name),
                Component::ParentDir => {
                    resolved.pop();
                }
                _ => {}
            }
        }
        return Ok(resolved);
    }

    Ok(absolute)
}

#[derive(Debug, Default)]
pub struct CliOverrides {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl CliOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_dir(mut self, source_dir: Option<PathBuf>) -> Self {
        self.source_dir = source_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: Option<PathBuf>) -> Self {
        self.output_dir = output_dir;
        self
    }
}
