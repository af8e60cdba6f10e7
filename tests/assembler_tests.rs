//! End-to-end runs of the assembler against temporary source folders.

use backup_assembler::config::DEFAULT_INSTRUCTIONS;
use backup_assembler::{BackupAssembler, BackupError, Config, OutputMode, SummaryRecord};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

fn config_in(root: &Path) -> Config {
    let mut config = Config::default();
    config.backup.source_dir = root.join("backup_20250729_014531");
    config.backup.output_dir = root.join("downloadable_backup");
    config
}

fn run(config: &Config) -> backup_assembler::BackupReport {
    BackupAssembler::new(config.clone(), OutputMode::Plain, 0, true)
        .assemble()
        .unwrap()
}

fn immediate_entries(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

fn files_under(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut files: Vec<(PathBuf, Vec<u8>)> = WalkDir::new(dir)
        .into_iter()
        .map(|e| e.unwrap())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let relative = e.path().strip_prefix(dir).unwrap().to_path_buf();
            (relative, fs::read(e.path()).unwrap())
        })
        .collect();
    files.sort();
    files
}

fn populate_full_source(source: &Path) {
    fs::create_dir_all(source.join("server").join("routes")).unwrap();
    fs::create_dir_all(source.join("shared")).unwrap();
    fs::create_dir_all(source.join("client").join("src").join("pages")).unwrap();
    fs::create_dir_all(source.join("uploads")).unwrap();

    fs::write(source.join("package.json"), "{\"name\":\"udrg\"}").unwrap();
    fs::write(source.join(".env.example"), "DATABASE_URL=\n").unwrap();
    fs::write(source.join("members_data.csv"), "id,name\n1,Ann\n2,Bob\n").unwrap();
    fs::write(source.join("server").join("index.ts"), "listen(5000)").unwrap();
    fs::write(source.join("server").join("routes").join("members.ts"), "get()").unwrap();
    fs::write(source.join("shared").join("schema.ts"), "export {}").unwrap();
    fs::write(source.join("client").join("src").join("pages").join("Home.tsx"), "<Home/>").unwrap();
    fs::write(source.join("uploads").join("photo.jpg"), vec![0u8; 4096]).unwrap();
    fs::write(source.join("notes.txt"), "not essential").unwrap();
}

#[test]
fn missing_source_still_writes_artifacts() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());

    let report = run(&config);

    assert!(report.files_copied.is_empty());
    assert!(report.directories_copied.is_empty());
    assert_eq!(report.measurement.entry_count, 2);
    assert_eq!(
        immediate_entries(&config.backup.output_dir),
        BTreeSet::from(["BACKUP_SUMMARY.json".to_string(), "README.txt".to_string()])
    );
}

#[test]
fn single_package_json_scenario() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    fs::create_dir_all(&config.backup.source_dir).unwrap();
    fs::write(config.backup.source_dir.join("package.json"), "0123456789").unwrap();

    let report = run(&config);
    let output = &config.backup.output_dir;

    assert_eq!(report.files_copied, vec!["package.json"]);
    assert_eq!(report.measurement.entry_count, 3);
    assert_eq!(
        immediate_entries(output),
        BTreeSet::from([
            "package.json".to_string(),
            "BACKUP_SUMMARY.json".to_string(),
            "README.txt".to_string(),
        ])
    );
    assert_eq!(fs::read(output.join("package.json")).unwrap(), b"0123456789");
}

#[test]
fn only_essential_entries_are_copied() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    populate_full_source(&config.backup.source_dir);

    let report = run(&config);
    let output = &config.backup.output_dir;

    assert_eq!(
        report.files_copied,
        vec!["package.json", ".env.example", "members_data.csv"]
    );
    assert_eq!(report.directories_copied, vec!["server", "shared", "client/src"]);

    assert!(!output.join("uploads").exists());
    assert!(!output.join("notes.txt").exists());
    assert!(!output.join("users_data.csv").exists());

    for relative in [
        "server/index.ts",
        "server/routes/members.ts",
        "shared/schema.ts",
        "client/src/pages/Home.tsx",
        "members_data.csv",
    ] {
        assert_eq!(
            fs::read(output.join(relative)).unwrap(),
            fs::read(config.backup.source_dir.join(relative)).unwrap(),
            "content mismatch for {}",
            relative
        );
    }
}

#[test]
fn reported_size_matches_output_tree() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    populate_full_source(&config.backup.source_dir);

    let report = run(&config);

    let expected: u64 = files_under(&config.backup.output_dir)
        .iter()
        .map(|(_, content)| content.len() as u64)
        .sum();
    assert_eq!(report.measurement.total_bytes, expected);
    assert_eq!(report.output_directory, config.backup.output_dir);
}

#[test]
fn directory_copy_preserves_unrelated_destination_files() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    populate_full_source(&config.backup.source_dir);

    let stale = config.backup.output_dir.join("server").join("hotfix.ts");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "patched on the VPS").unwrap();

    run(&config);

    assert_eq!(fs::read_to_string(&stale).unwrap(), "patched on the VPS");
    assert!(config.backup.output_dir.join("server").join("index.ts").exists());
}

#[test]
fn second_run_is_byte_identical_except_timestamp() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    populate_full_source(&config.backup.source_dir);
    let summary_name = config.artifacts.summary_filename.clone();

    run(&config);
    let first: Vec<_> = files_under(&config.backup.output_dir)
        .into_iter()
        .filter(|(path, _)| path != Path::new(&summary_name))
        .collect();

    let report = run(&config);
    let second: Vec<_> = files_under(&config.backup.output_dir)
        .into_iter()
        .filter(|(path, _)| path != Path::new(&summary_name))
        .collect();

    assert_eq!(first, second);

    let written: SummaryRecord = serde_json::from_str(
        &fs::read_to_string(config.backup.output_dir.join(&summary_name)).unwrap(),
    )
    .unwrap();
    assert_eq!(written.total_members, "996");
    assert_eq!(written.backup_date, report.summary.backup_date);
}

#[test]
fn instructions_are_written_verbatim() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config_in(temp_dir.path());
    config.artifacts.instructions = "Transfer uploads separately.\n".to_string();

    run(&config);

    assert_eq!(
        fs::read_to_string(config.backup.output_dir.join("README.txt")).unwrap(),
        "Transfer uploads separately.\n"
    );
}

#[test]
fn default_instructions_keep_trailing_spaces() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());

    run(&config);

    let written = fs::read(config.backup.output_dir.join("README.txt")).unwrap();
    assert_eq!(written, DEFAULT_INSTRUCTIONS.as_bytes());
    assert_eq!(written.len(), 731);

    let text = String::from_utf8(written).unwrap();
    assert!(text.contains("- ✅ Database exports (996 members, 46 users)  \n"));
    assert!(text.contains("2. Follow VPS_MIGRATION_STEPS.md  \n"));
}

#[test]
fn output_equal_to_source_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config_in(temp_dir.path());
    config.backup.output_dir = config.backup.source_dir.clone();
    fs::create_dir_all(config.backup.source_dir.join("server")).unwrap();
    fs::write(config.backup.source_dir.join("package.json"), "0123456789").unwrap();
    fs::write(config.backup.source_dir.join("server").join("index.ts"), "listen(5000)").unwrap();

    let result = BackupAssembler::new(config.clone(), OutputMode::Plain, 0, true).assemble();

    assert!(matches!(result, Err(BackupError::Config { .. })));
    let source = &config.backup.source_dir;
    assert_eq!(fs::read_to_string(source.join("package.json")).unwrap(), "0123456789");
    assert_eq!(
        fs::read_to_string(source.join("server").join("index.ts")).unwrap(),
        "listen(5000)"
    );
    assert!(!source.join("README.txt").exists());
}

#[test]
fn output_nested_in_source_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = config_in(temp_dir.path());
    config.backup.output_dir = config.backup.source_dir.join("server").join("slim");
    fs::create_dir_all(config.backup.source_dir.join("server")).unwrap();
    fs::write(config.backup.source_dir.join("server").join("index.ts"), "listen(5000)").unwrap();

    let result = BackupAssembler::new(config.clone(), OutputMode::Plain, 0, true).assemble();

    assert!(matches!(result, Err(BackupError::Config { .. })));
    assert!(!config.backup.output_dir.exists());
}

#[test]
fn essential_file_that_is_a_directory_is_fatal() {
    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    fs::create_dir_all(config.backup.source_dir.join("nginx.conf")).unwrap();

    let result = BackupAssembler::new(config.clone(), OutputMode::Plain, 0, true).assemble();

    assert!(result.is_err());
    assert!(!config.backup.output_dir.join("README.txt").exists());
}

#[cfg(unix)]
#[test]
fn unreadable_source_file_is_fatal() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let config = config_in(temp_dir.path());
    fs::create_dir_all(&config.backup.source_dir).unwrap();
    let locked = config.backup.source_dir.join("users_data.csv");
    fs::write(&locked, "id").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores file modes, so only assert when the file is really unreadable.
    if fs::File::open(&locked).is_ok() {
        return;
    }

    let result = BackupAssembler::new(config.clone(), OutputMode::Plain, 0, true).assemble();
    assert!(matches!(result, Err(BackupError::Permission { .. })));
}
