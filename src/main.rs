use backup_assembler::{
    BackupAssembler, BackupError, Cli, OutputFormatter, OutputMode, UserFriendlyError,
};
use clap::Parser;
use std::process;

fn main() {
    let exit_code = run();
    process::exit(exit_code);
}

fn run() -> i32 {
    let cli = Cli::parse();

    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    let assembler = match BackupAssembler::from_cli(&cli) {
        Ok(assembler) => assembler,
        Err(e) => {
            print_startup_error(&e);
            return e.exit_code();
        }
    };

    if cli.dry_run {
        return handle_dry_run(&assembler);
    }

    match assembler.assemble() {
        Ok(report) => {
            assembler.output_formatter().print_backup_report(&report);
            0
        }
        Err(e) => {
            assembler.handle_error(&e);
            e.exit_code()
        }
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "backup-assembler.toml".to_string());

    match BackupAssembler::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  backup-assembler --config {}", config_path);
            println!("\nEdit the file to change paths, essential entries or summary values.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn handle_dry_run(assembler: &BackupAssembler) -> i32 {
    let formatter = assembler.output_formatter();
    let config = assembler.config();

    formatter.start_operation("DRY RUN MODE - No files will be copied");
    formatter.print_separator();

    let plan = match assembler.plan() {
        Ok(plan) => plan,
        Err(e) => {
            assembler.handle_error(&e);
            return e.exit_code();
        }
    };

    if formatter.mode() == OutputMode::Json {
        let json = serde_json::json!({
            "type": "plan",
            "source": config.backup.source_dir,
            "output": config.backup.output_dir,
            "files": plan.present_files,
            "missing_files": plan.missing_files,
            "directories": plan.present_dirs,
            "missing_directories": plan.missing_dirs,
        });
        formatter.print_json_document(&json);
        return 0;
    }

    formatter.detail(&format!("Source: {}", config.backup.source_dir.display()));
    formatter.detail(&format!("Output: {}", config.backup.output_dir.display()));

    if plan.present_files.is_empty() && plan.present_dirs.is_empty() {
        formatter.warning("No essential files or directories found in the source folder");
    }

    for name in &plan.present_files {
        formatter.detail(&format!("would copy file       {}", name));
    }
    for name in &plan.present_dirs {
        formatter.detail(&format!("would copy directory  {}", name));
    }
    for name in plan.missing_files.iter().chain(&plan.missing_dirs) {
        formatter.debug(&format!("missing {}", name));
    }

    formatter.detail(&format!(
        "would write           {}, {}",
        config.artifacts.summary_filename, config.artifacts.instructions_filename
    ));

    formatter.print_separator();
    formatter.success("Dry run completed successfully");

    0
}

fn print_startup_error(error: &BackupError) {
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}
