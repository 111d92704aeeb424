//! CLI command handling for carve

use crate::host::{extract_to_file, extract_to_function, ExtractRequest, FileHost, SelectionSpec};
use anyhow::{anyhow, Context};
use carve_config::AppConfig;
use carve_foundation::{CarveError, EditPlan};
use carve_lang_jsx::code_actions;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing::error;

/// The main CLI struct.
#[derive(Parser)]
#[command(name = "carve")]
#[command(about = "Extract selected JSX into new React components")]
#[command(version)]
pub struct Cli {
    /// Directory holding carve.toml (defaults to the current directory)
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// The command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the selection is
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Selected range as LINE:COL-LINE:COL (1-based, end exclusive)
    #[arg(long, conflicts_with_all = ["start", "end"], required_unless_present_all = ["start", "end"])]
    pub range: Option<String>,

    /// Start of the selection as a character offset
    #[arg(long, requires = "end")]
    pub start: Option<usize>,

    /// End of the selection as a character offset (exclusive)
    #[arg(long, requires = "start")]
    pub end: Option<usize>,
}

/// The available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Extract the selected JSX into a new component
    Extract {
        /// Document containing the selection
        file: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Name of the new component (normalized to PascalCase)
        #[arg(long)]
        name: String,

        /// Put the component in a sibling file and import it
        #[arg(long)]
        to_file: bool,

        /// Print the edit plan without touching any file
        #[arg(long)]
        dry_run: bool,

        /// Output format (pretty or compact)
        #[arg(long, default_value = "pretty", value_parser = ["pretty", "compact"])]
        format: String,
    },
    /// List the refactorings available for a selection
    Actions {
        /// Document containing the selection
        file: PathBuf,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Output format (pretty or compact)
        #[arg(long, default_value = "pretty", value_parser = ["pretty", "compact"])]
        format: String,
    },
    /// Show the effective configuration
    Config {
        /// Output format (pretty or compact)
        #[arg(long, default_value = "pretty", value_parser = ["pretty", "compact"])]
        format: String,
    },
}

/// Main CLI entry point
pub fn run() {
    let cli = Cli::parse();

    let workspace = cli
        .workspace
        .clone()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    let config = match AppConfig::load(&workspace) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(2);
        }
    };
    carve_config::logging::initialize(&config);

    match cli.command {
        Commands::Extract {
            file,
            selection,
            name,
            to_file,
            dry_run,
            format,
        } => {
            handle_extract(&config, file, &selection, name, to_file, dry_run, &format);
        }
        Commands::Actions {
            file,
            selection,
            format,
        } => {
            if let Err(e) = handle_actions(&file, &selection, &format) {
                error!(error = %e, "Listing actions failed");
                eprintln!("❌ Error: {:#}", e);
                process::exit(1);
            }
        }
        Commands::Config { format } => {
            let value = serde_json::to_value(&config).unwrap_or_default();
            output_result(&value, &format);
        }
    }
}

/// Parse `LINE:COL`
fn parse_position(text: &str) -> anyhow::Result<(u32, u32)> {
    let (line, column) = text
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected LINE:COL, got '{}'", text))?;
    let line = line
        .trim()
        .parse()
        .with_context(|| format!("Invalid line in '{}'", text))?;
    let column = column
        .trim()
        .parse()
        .with_context(|| format!("Invalid column in '{}'", text))?;
    Ok((line, column))
}

/// Parse `LINE:COL-LINE:COL`
fn parse_range(text: &str) -> anyhow::Result<SelectionSpec> {
    let (start, end) = text
        .split_once('-')
        .ok_or_else(|| anyhow!("Expected LINE:COL-LINE:COL, got '{}'", text))?;
    Ok(SelectionSpec::Range {
        start: parse_position(start)?,
        end: parse_position(end)?,
    })
}

impl SelectionArgs {
    fn to_spec(&self) -> anyhow::Result<SelectionSpec> {
        match (&self.range, self.start, self.end) {
            (Some(range), _, _) => parse_range(range),
            (None, Some(start), Some(end)) => Ok(SelectionSpec::Offsets { start, end }),
            _ => Err(anyhow!("Pass --range or both --start and --end")),
        }
    }
}

fn handle_extract(
    config: &AppConfig,
    file: PathBuf,
    selection: &SelectionArgs,
    name: String,
    to_file: bool,
    dry_run: bool,
    format: &str,
) {
    let selection = match selection.to_spec() {
        Ok(spec) => spec,
        Err(e) => {
            eprintln!("❌ Error: {:#}", e);
            process::exit(2);
        }
    };
    let request = ExtractRequest {
        selection,
        name,
        dry_run,
    };
    let mut host = FileHost::new(&file, config.host.format_command.clone());

    let result = if to_file {
        extract_to_file(&mut host, &request, config)
    } else {
        extract_to_function(&mut host, &request, config)
    };

    match result {
        Ok(plan) => {
            if dry_run {
                let value = serde_json::to_value(&plan).unwrap_or_default();
                output_result(&value, format);
            } else {
                print_summary(&plan, &file);
            }
        }
        Err(e) => {
            error!(error = %e, file = %file.display(), "Extraction failed");
            output_error(&e, format);
            process::exit(1);
        }
    }
}

fn print_summary(plan: &EditPlan, file: &Path) {
    let component = plan
        .metadata
        .intent_arguments
        .get("name")
        .and_then(|name| name.as_str())
        .unwrap_or("component");
    println!("✅ Extracted {} in {}", component, file.display());
    for (path, _) in plan.created_files() {
        println!("   created {}", path);
    }
}

fn handle_actions(file: &Path, selection: &SelectionArgs, format: &str) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let selection = selection.to_spec()?.resolve(&text)?;
    let selected = carve_foundation::SourceText::new(text.as_str())
        .slice(selection.start, selection.end)?
        .to_string();

    let actions = code_actions(&selected);
    output_result(&serde_json::to_value(&actions)?, format);
    Ok(())
}

/// Output result to stdout based on format
fn output_result(result: &serde_json::Value, format: &str) {
    let output = match format {
        "compact" => serde_json::to_string(result).unwrap_or_else(|_| "{}".to_string()),
        _ => serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string()),
    };
    println!("{}", output);
}

/// Output error to stderr based on format
fn output_error(error: &CarveError, format: &str) {
    let error_json = serde_json::json!({
        "error": {
            "code": error.code(),
            "message": error.user_message(),
            "details": error.to_string(),
        }
    });

    let output = match format {
        "compact" => serde_json::to_string(&error_json).unwrap_or_else(|_| "{}".to_string()),
        _ => serde_json::to_string_pretty(&error_json).unwrap_or_else(|_| "{}".to_string()),
    };
    eprintln!("{}", output);
}
