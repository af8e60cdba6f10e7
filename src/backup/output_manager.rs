use crate::config::{ArtifactConfig, SummaryConfig};
use crate::error::{BackupError, Result};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Metadata document written as the JSON summary artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub backup_date: String,
    pub total_members: String,
    pub total_users: String,
    pub upload_files: String,
    pub backup_size: String,
    pub contents: Vec<String>,
    pub note: String,
}

impl SummaryRecord {
    /// Builds a record stamped with the current local time.
    pub fn new(summary: &SummaryConfig) -> Self {
        let backup_date = format_backup_date(Local::now().naive_local());

        Self {
            backup_date,
            total_members: summary.total_members.clone(),
            total_users: summary.total_users.clone(),
            upload_files: summary.upload_files.clone(),
            backup_size: summary.backup_size.clone(),
            contents: summary.contents.clone(),
            note: summary.note.clone(),
        }
    }
}

/// ISO 8601 local timestamp with microseconds, or without a fraction at all
/// when the microsecond part is zero.
pub fn format_backup_date(timestamp: NaiveDateTime) -> String {
    if timestamp.nanosecond() / 1_000 == 0 {
        timestamp.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        timestamp.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

/// Size and shape of the output directory at the time it was measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputMeasurement {
    pub total_bytes: u64,
    pub entry_count: usize,
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupReport {
    pub output_directory: PathBuf,
    pub files_copied: Vec<String>,
    pub directories_copied: Vec<String>,
    pub bytes_copied: u64,
    pub measurement: OutputMeasurement,
    pub summary: SummaryRecord,
}

pub struct OutputManager {
    output_directory: PathBuf,
    summary_filename: String,
    instructions_filename: String,
}

impl OutputManager {
    pub fn new(output_directory: PathBuf, artifacts: &ArtifactConfig) -> Self {
        Self {
            output_directory,
            summary_filename: artifacts.summary_filename.clone(),
            instructions_filename: artifacts.instructions_filename.clone(),
        }
    }

    /// Creates the output directory and any missing parents. An existing
    /// directory is reused as is.
    pub fn initialize(&self) -> Result<()> {
        fs::create_dir_all(&self.output_directory)
            .map_err(|e| BackupError::create_output(&self.output_directory, e))
    }

    pub fn get_output_directory(&self) -> &Path {
        &self.output_directory
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_directory.join(&self.summary_filename)
    }

    pub fn instructions_path(&self) -> PathBuf {
        self.output_directory.join(&self.instructions_filename)
    }

    pub fn write_summary(&self, record: &SummaryRecord) -> Result<PathBuf> {
        let summary_path = self.summary_path();
        let json_content = serde_json::to_string_pretty(record)?;

        fs::write(&summary_path, json_content).map_err(|e| BackupError::copy(&summary_path, e))?;

        Ok(summary_path)
    }

    pub fn write_instructions(&self, instructions: &str) -> Result<PathBuf> {
        let instructions_path = self.instructions_path();

        fs::write(&instructions_path, instructions)
            .map_err(|e| BackupError::copy(&instructions_path, e))?;

        Ok(instructions_path)
    }

    /// Sums the sizes of every regular file below the output directory and
    /// counts its immediate entries. Symlinks are not followed.
    pub fn measure(&self) -> Result<OutputMeasurement> {
        let mut total_bytes = 0u64;

        for entry in WalkDir::new(&self.output_directory).follow_links(false) {
            let entry = entry.map_err(|e| BackupError::walk(&self.output_directory, e))?;

            if entry.file_type().is_file() {
                let metadata = entry
                    .metadata()
                    .map_err(|e| BackupError::walk(&self.output_directory, e))?;
                total_bytes += metadata.len();
            }
        }

        let mut entry_count = 0;
        for entry in fs::read_dir(&self.output_directory)? {
            entry?;
            entry_count += 1;
        }

        Ok(OutputMeasurement {
            total_bytes,
            entry_count,
        })
    }
}

pub fn format_mib(bytes: u64) -> String {
    format!("{:.1}MB", bytes as f64 / BYTES_PER_MIB)
}
