use crate::config::{CliOverrides, Config};
use crate::error::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "backup-assembler")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Assemble a reduced, downloadable backup from a full backup folder")]
#[command(
    long_about = "Copies the essential files and directories of a full backup folder into a \
                  smaller output directory, then writes a JSON summary and a README with \
                  transfer instructions. Missing entries are skipped; any other I/O failure \
                  aborts the run."
)]
#[command(after_help = "EXAMPLES:\n  \
    backup-assembler\n  \
    backup-assembler --source backup_20250729_014531 --output downloadable_backup\n  \
    backup-assembler --config backup-assembler.toml --output-format json\n  \
    backup-assembler --dry-run -v")]
pub struct Cli {
    /// Full backup folder to copy from
    #[arg(short, long)]
    pub source: Option<PathBuf>,

    /// Directory that receives the reduced backup
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, help = "Path to TOML configuration file")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Dry run (show what would be copied without writing anything)
    #[arg(long)]
    pub dry_run: bool,

    /// Generate sample configuration file
    #[arg(long, help = "Generate a sample configuration file")]
    pub generate_config: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON formatted output
    Json,
    /// Plain text output
    Plain,
}

impl Cli {
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_with_defaults(self.config.as_ref())?;

        config.merge_with_cli_args(&self.create_cli_overrides());
        config.validate()?;

        Ok(config)
    }

    pub fn create_cli_overrides(&self) -> CliOverrides {
        CliOverrides::new()
            .with_source_dir(self.source.clone())
            .with_output_dir(self.output.clone())
    }

    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_arguments_is_valid() {
        let cli = Cli::try_parse_from(["backup-assembler"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.dry_run);
        assert!(matches!(cli.output_format, OutputFormat::Human));
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::try_parse_from([
            "backup-assembler",
            "--source",
            "full",
            "--output",
            "slim",
            "-vv",
        ])
        .unwrap();

        let overrides = cli.create_cli_overrides();
        assert_eq!(overrides.source_dir, Some(PathBuf::from("full")));
        assert_eq!(overrides.output_dir, Some(PathBuf::from("slim")));
        assert_eq!(cli.verbosity_level(), 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["backup-assembler", "-q", "-v"]).is_err());
    }
}
