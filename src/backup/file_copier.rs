use crate::error::{BackupError, Result};
use filetime::FileTime;
use std::fs;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Bytes and files written by a single copy operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub bytes: u64,
}

impl CopyStats {
    fn add_file(&mut self, bytes: u64) {
        self.files += 1;
        self.bytes += bytes;
    }
}

pub struct FileCopier {
    buffer_size: usize,
}

impl FileCopier {
    pub fn new() -> Self {
        Self {
            buffer_size: 64 * 1024, // 64KB buffer
        }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(4096); // Minimum 4KB buffer
        self
    }

    /// Returns `Ok(false)` only when `path` does not exist. Any other failure
    /// while checking is an error.
    pub fn source_exists(path: &Path) -> Result<bool> {
        path.try_exists().map_err(|e| BackupError::inspect(path, e))
    }

    /// Copies a single regular file, overwriting `dest`, and carries over the
    /// permissions plus access and modification times of `source`.
    pub fn copy_file(&self, source: &Path, dest: &Path) -> Result<u64> {
        let metadata = fs::metadata(source).map_err(|e| BackupError::copy(source, e))?;

        if !metadata.is_file() {
            return Err(BackupError::InvalidPath {
                path: format!("Source is not a regular file: {}", source.display()),
            });
        }

        if is_same_file(source, dest)? {
            return Err(BackupError::SameFile {
                path: source.display().to_string(),
            });
        }

        let bytes = self.copy_file_with_buffer(source, dest)?;
        copy_metadata(&metadata, dest)?;

        Ok(bytes)
    }

    /// Recursively copies `source` into `dest`, merging with whatever `dest`
    /// already contains. Symlinks are followed.
    pub fn copy_tree(&self, source: &Path, dest: &Path) -> Result<CopyStats> {
        let root_metadata = fs::metadata(source).map_err(|e| BackupError::copy(source, e))?;

        if !root_metadata.is_dir() {
            return Err(BackupError::InvalidPath {
                path: format!("Source is not a directory: {}", source.display()),
            });
        }

        let mut stats = CopyStats::default();
        let mut directories: Vec<(PathBuf, fs::Metadata)> = Vec::new();

        let walker = WalkDir::new(source).follow_links(true).sort_by_file_name();

        for entry in walker {
            let entry = entry.map_err(|e| BackupError::walk(source, e))?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| BackupError::InvalidPath {
                    path: entry.path().display().to_string(),
                })?;
            let target = dest.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&target).map_err(|e| BackupError::copy(&target, e))?;
                let metadata = entry
                    .metadata()
                    .map_err(|e| BackupError::walk(source, e))?;
                directories.push((target, metadata));
            } else {
                stats.add_file(self.copy_file(entry.path(), &target)?);
            }
        }

        // Deepest directories first so a parent's mtime is not disturbed afterwards.
        for (target, metadata) in directories.iter().rev() {
            copy_metadata(metadata, target)?;
        }

        Ok(stats)
    }

    fn copy_file_with_buffer(&self, source: &Path, dest: &Path) -> Result<u64> {
        let source_file = fs::File::open(source).map_err(|e| BackupError::copy(source, e))?;
        let dest_file = fs::File::create(dest).map_err(|e| BackupError::copy(dest, e))?;

        let mut reader = BufReader::with_capacity(self.buffer_size, source_file);
        let mut writer = BufWriter::with_capacity(self.buffer_size, dest_file);

        let mut total_bytes = 0u64;
        let mut buffer = vec![0u8; 8192];

        loop {
            let bytes_read = reader
                .read(&mut buffer)
                .map_err(|e| BackupError::copy(source, e))?;

            if bytes_read == 0 {
                break;
            }

            writer
                .write_all(&buffer[..bytes_read])
                .map_err(|e| BackupError::copy(dest, e))?;

            total_bytes += bytes_read as u64;
        }

        writer.flush().map_err(|e| BackupError::copy(dest, e))?;

        Ok(total_bytes)
    }
}

impl Default for FileCopier {
    fn default() -> Self {
        Self::new()
    }
}

/// Opening `dest` for writing truncates it, so a copy onto the same file
/// (directly, through a symlink or a `..` path) must be caught first.
fn is_same_file(source: &Path, dest: &Path) -> Result<bool> {
    if !dest.try_exists().map_err(|e| BackupError::inspect(dest, e))? {
        return Ok(false);
    }

    let source = source
        .canonicalize()
        .map_err(|e| BackupError::copy(source, e))?;
    let dest = dest.canonicalize().map_err(|e| BackupError::copy(dest, e))?;

    Ok(source == dest)
}

fn copy_metadata(metadata: &fs::Metadata, dest: &Path) -> Result<()> {
    let accessed = FileTime::from_last_access_time(metadata);
    let modified = FileTime::from_last_modification_time(metadata);

    filetime::set_file_times(dest, accessed, modified).map_err(|e| BackupError::copy(dest, e))?;
    fs::set_permissions(dest, metadata.permissions()).map_err(|e| BackupError::copy(dest, e))?;

    Ok(())
}
