use crate::backup::{format_mib, BackupReport};
use crate::error::{BackupError, UserFriendlyError};
use console::{style, Emoji, Term};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✓ ", "+ ");
static DONE: Emoji = Emoji("✅ ", "* ");
static CROSS: Emoji = Emoji("❌ ", "x ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static ROCKET: Emoji = Emoji("🚀 ", "> ");
static FILES: Emoji = Emoji("📂 ", "> ");
static FOLDER: Emoji = Emoji("📁 ", "> ");
static RULER: Emoji = Emoji("📏 ", "  ");
static CLIPBOARD: Emoji = Emoji("📋 ", "  ");

/// Which batch of essential entries a stage header introduces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Stage {
    Files,
    Directories,
}

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Success, message),
            OutputMode::Json => self.print_json_message("success", message),
            OutputMode::Plain => println!("SUCCESS: {}", message),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => self.print_json_message("error", message),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(2) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    pub fn start_operation(&self, operation: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("{}{}", ROCKET, style(operation).bold());
                    } else {
                        println!("{}{}", ROCKET, operation);
                    }
                }
                OutputMode::Json => self.print_json_message("operation_start", operation),
                OutputMode::Plain => println!("STARTING: {}", operation),
            }
        }
    }

    pub fn start_stage(&self, stage: Stage) {
        if !self.should_show_message(0) {
            return;
        }

        let (emoji, message) = match stage {
            Stage::Files => (FILES, "Copying essential files..."),
            Stage::Directories => (FOLDER, "Copying important directories..."),
        };

        match self.mode {
            OutputMode::Human => println!("{}{}", emoji, message),
            OutputMode::Json => self.print_json_message("stage", message),
            OutputMode::Plain => println!("STAGE: {}", message),
        }
    }

    /// One line per essential entry that was actually copied.
    pub fn copied(&self, name: &str) {
        if !self.should_show_message(0) {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("  {}{}", CHECKMARK, style(name).green());
                } else {
                    println!("  {}{}", CHECKMARK, name);
                }
            }
            OutputMode::Json => self.print_json_object(&serde_json::json!({
                "type": "copied",
                "path": name,
            })),
            OutputMode::Plain => println!("COPIED: {}", name),
        }
    }

    /// Indented detail line shown at the default verbosity.
    pub fn detail(&self, message: &str) {
        if !self.should_show_message(0) {
            return;
        }

        match self.mode {
            OutputMode::Human | OutputMode::Plain => println!("  {}", message),
            OutputMode::Json => self.print_json_message("detail", message),
        }
    }

    pub fn print_json_document(&self, document: &serde_json::Value) {
        if self.quiet {
            return;
        }

        println!(
            "{}",
            serde_json::to_string_pretty(document).unwrap_or_else(|_| "{}".to_string())
        );
    }

    pub fn print_user_friendly_error(&self, error: &BackupError) {
        self.error(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        eprintln!(
                            "{}{}",
                            INFO,
                            style(&format!("Suggestion: {}", suggestion)).cyan()
                        );
                    } else {
                        eprintln!("Suggestion: {}", suggestion);
                    }
                }
                OutputMode::Json => {
                    self.print_json_object(&serde_json::json!({
                        "type": "suggestion",
                        "message": suggestion
                    }));
                }
                OutputMode::Plain => {
                    eprintln!("SUGGESTION: {}", suggestion);
                }
            }
        }
    }

    pub fn print_backup_report(&self, report: &BackupReport) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => self.print_human_report(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_report(report),
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => println!("{}", "-".repeat(60)),
            OutputMode::Json => {}
        }
    }

    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        let emoji = match msg_type {
            MessageType::Success => DONE,
            MessageType::Error => CROSS,
            MessageType::Warning => WARNING,
            MessageType::Info => INFO,
        };

        let text = if self.use_colors {
            match msg_type {
                MessageType::Success => style(message).green().bold().to_string(),
                MessageType::Error => style(message).red().bold().to_string(),
                MessageType::Warning => style(message).yellow().bold().to_string(),
                MessageType::Info => style(message).cyan().to_string(),
            }
        } else {
            message.to_string()
        };

        match msg_type {
            MessageType::Error => eprintln!("{}{}", emoji, text),
            _ => println!("{}{}", emoji, text),
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&serde_json::json!({
            "type": "message",
            "level": level,
            "message": message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        }));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn print_human_report(&self, report: &BackupReport) {
        let location = report.output_directory.display().to_string();
        let size = format_mib(report.measurement.total_bytes);
        let entries = report.measurement.entry_count.to_string();

        println!();
        if self.use_colors {
            println!("{}{}", DONE, style("Downloadable backup created!").green().bold());
            println!("{}Location: {}", FOLDER, style(location).cyan().bold());
            println!("{}Size: {}", RULER, style(size).cyan().bold());
            println!("{}Files: {}", CLIPBOARD, style(entries).cyan().bold());
        } else {
            println!("{}Downloadable backup created!", DONE);
            println!("{}Location: {}", FOLDER, location);
            println!("{}Size: {}", RULER, size);
            println!("{}Files: {}", CLIPBOARD, entries);
        }
    }

    fn print_plain_report(&self, report: &BackupReport) {
        println!("COMPLETED: Downloadable backup created");
        println!("Location: {}", report.output_directory.display());
        println!("Size: {}", format_mib(report.measurement.total_bytes));
        println!("Bytes: {}", report.measurement.total_bytes);
        println!("Files: {}", report.measurement.entry_count);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}
