pub mod file_copier;
pub mod output_manager;

pub use file_copier::{CopyStats, FileCopier};
pub use output_manager::{format_mib, BackupReport, OutputManager, OutputMeasurement, SummaryRecord};
