pub mod backup;
pub mod cli;
pub mod config;
pub mod error;
pub mod ui;

// Public API re-exports
pub use cli::{Cli, OutputFormat};
pub use config::{ArtifactConfig, BackupConfig, CliOverrides, Config, SummaryConfig};
pub use error::{BackupError, Result, UserFriendlyError};

// Core functionality re-exports
pub use backup::{BackupReport, CopyStats, FileCopier, OutputManager, OutputMeasurement, SummaryRecord};
pub use ui::{OutputFormatter, OutputMode};

use std::path::{Path, PathBuf};
use ui::output::Stage;

/// Essential entries that were found in the source folder and copied.
#[derive(Debug, Clone, Default)]
pub struct CopyOutcome {
    pub copied: Vec<String>,
    pub bytes: u64,
}

/// Essential entries found in the source folder, as seen by a dry run.
#[derive(Debug, Clone, Default)]
pub struct BackupPlan {
    pub present_files: Vec<String>,
    pub missing_files: Vec<String>,
    pub present_dirs: Vec<String>,
    pub missing_dirs: Vec<String>,
}

/// Builds a reduced backup folder from a full backup folder.
pub struct BackupAssembler {
    config: Config,
    output_formatter: OutputFormatter,
    copier: FileCopier,
}

impl BackupAssembler {
    pub fn new(config: Config, output_mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        Self {
            config,
            output_formatter: OutputFormatter::new(output_mode, verbose, quiet),
            copier: FileCopier::new(),
        }
    }

    pub fn from_cli(cli_args: &Cli) -> Result<Self> {
        let config = cli_args.load_config()?;
        let output_mode = match cli_args.output_format {
            OutputFormat::Human => OutputMode::Human,
            OutputFormat::Json => OutputMode::Json,
            OutputFormat::Plain => OutputMode::Plain,
        };

        Ok(Self::new(
            config,
            output_mode,
            cli_args.verbosity_level(),
            cli_args.quiet,
        ))
    }

    /// Runs every step in order. The first fatal error aborts the run and
    /// leaves whatever was already written in place.
    pub fn assemble(&self) -> Result<BackupReport> {
        self.config.validate()?;

        self.output_formatter
            .start_operation("Creating downloadable backup files...");
        self.output_formatter.info(&format!(
            "Source: {}",
            self.config.backup.source_dir.display()
        ));

        let output_manager = OutputManager::new(
            self.config.backup.output_dir.clone(),
            &self.config.artifacts,
        );

        output_manager.initialize()?;

        let files = self.copy_essential_files(output_manager.get_output_directory())?;
        let directories = self.copy_essential_directories(output_manager.get_output_directory())?;

        let summary = self.write_summary_artifact(&output_manager)?;
        self.write_instructions_artifact(&output_manager)?;

        self.report_result(&output_manager, files, directories, summary)
    }

    pub fn copy_essential_files(&self, output_dir: &Path) -> Result<CopyOutcome> {
        self.output_formatter.start_stage(Stage::Files);

        let mut outcome = CopyOutcome::default();

        for name in &self.config.backup.essential_files {
            let source = self.config.backup.source_dir.join(name);

            if !FileCopier::source_exists(&source)? {
                self.output_formatter
                    .debug(&format!("Skipping missing file {}", source.display()));
                continue;
            }

            let bytes = self.copier.copy_file(&source, &output_dir.join(name))?;
            outcome.bytes += bytes;
            outcome.copied.push(name.clone());

            self.output_formatter.copied(name);
            self.output_formatter
                .debug(&format!("{} bytes from {}", bytes, source.display()));
        }

        Ok(outcome)
    }

    pub fn copy_essential_directories(&self, output_dir: &Path) -> Result<CopyOutcome> {
        self.output_formatter.start_stage(Stage::Directories);

        let mut outcome = CopyOutcome::default();

        for relative in &self.config.backup.essential_dirs {
            let source = self.config.backup.source_dir.join(relative);

            if !FileCopier::source_exists(&source)? {
                self.output_formatter
                    .debug(&format!("Skipping missing directory {}", source.display()));
                continue;
            }

            let stats = self.copier.copy_tree(&source, &output_dir.join(relative))?;
            outcome.bytes += stats.bytes;
            outcome.copied.push(relative.clone());

            self.output_formatter.copied(relative);
            self.output_formatter.debug(&format!(
                "{} files, {} bytes from {}",
                stats.files,
                stats.bytes,
                source.display()
            ));
        }

        Ok(outcome)
    }

    pub fn write_summary_artifact(&self, output_manager: &OutputManager) -> Result<SummaryRecord> {
        let record = SummaryRecord::new(&self.config.summary);
        let path = output_manager.write_summary(&record)?;

        self.output_formatter
            .info(&format!("Wrote summary {}", path.display()));

        Ok(record)
    }

    pub fn write_instructions_artifact(&self, output_manager: &OutputManager) -> Result<PathBuf> {
        let path = output_manager.write_instructions(&self.config.artifacts.instructions)?;

        self.output_formatter
            .info(&format!("Wrote instructions {}", path.display()));

        Ok(path)
    }

    fn report_result(
        &self,
        output_manager: &OutputManager,
        files: CopyOutcome,
        directories: CopyOutcome,
        summary: SummaryRecord,
    ) -> Result<BackupReport> {
        let measurement = output_manager.measure()?;

        Ok(BackupReport {
            output_directory: output_manager.get_output_directory().to_path_buf(),
            bytes_copied: files.bytes + directories.bytes,
            files_copied: files.copied,
            directories_copied: directories.copied,
            measurement,
            summary,
        })
    }

    /// Checks which essential entries exist without writing anything.
    pub fn plan(&self) -> Result<BackupPlan> {
        let mut plan = BackupPlan::default();
        let source_dir = &self.config.backup.source_dir;

        for name in &self.config.backup.essential_files {
            if FileCopier::source_exists(&source_dir.join(name))? {
                plan.present_files.push(name.clone());
            } else {
                plan.missing_files.push(name.clone());
            }
        }

        for relative in &self.config.backup.essential_dirs {
            if FileCopier::source_exists(&source_dir.join(relative))? {
                plan.present_dirs.push(relative.clone());
            } else {
                plan.missing_dirs.push(relative.clone());
            }
        }

        Ok(plan)
    }

    pub fn generate_sample_config<P: AsRef<Path>>(output_path: P) -> Result<()> {
        let sample_config = Config::create_sample_config();
        std::fs::write(output_path.as_ref(), sample_config)?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn output_formatter(&self) -> &OutputFormatter {
        &self.output_formatter
    }

    pub fn handle_error(&self, error: &BackupError) {
        self.output_formatter.print_user_friendly_error(error);
    }
}
