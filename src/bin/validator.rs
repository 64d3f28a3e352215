//! Specification Validator CLI
//!
//! Validates UI specification files and reports every finding.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use uispec_validator::{
    detailed_report, format_errors, summary_json, validation::has_errors, OutputFormat,
    SpecificationParser, ValidationStageError, ValidatorConfig,
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "uispec-validate")]
#[command(about = "Validate UI specification documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate specification files or directories of them
    Check {
        /// Files or directories (searched recursively for *.json)
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop at the first error in each document
        #[arg(long)]
        stop_at_first_error: bool,

        /// Omit suggestions from findings
        #[arg(long)]
        no_suggestions: bool,

        /// Attach ancestry context to findings
        #[arg(long)]
        development: bool,

        /// Print the grouped report instead of the terse listing
        #[arg(long)]
        report: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Check {
            paths,
            config,
            stop_at_first_error,
            no_suggestions,
            development,
            report,
            json,
        } => {
            let cfg = ValidatorConfig::load_from(config.as_deref())?;
            cfg.validate()?;

            let mut options = cfg.pipeline_options();
            options.stop_at_first_error |= stop_at_first_error;
            options.development |= development;
            if no_suggestions {
                options.include_suggestions = false;
            }
            let parser = SpecificationParser::new(options);

            let files = collect_files(&paths);
            if files.is_empty() {
                return Err("No specification files found".into());
            }
            info!(count = files.len(), "checking specification files");

            let mut failed = 0;
            let mut summaries = Vec::new();

            for file in &files {
                let findings = check_file(&parser, file)?;
                let valid = !has_errors(&findings);
                if !valid {
                    failed += 1;
                }

                if json {
                    let mut summary = summary_json(&findings);
                    summary["file"] = json!(file.display().to_string());
                    summaries.push(summary);
                    continue;
                }

                if valid {
                    println!("✅ {}", file.display());
                    if cfg.output.show_warnings && !findings.is_empty() {
                        println!("{}\n", indent(&format_errors(&findings)));
                    }
                } else {
                    println!("❌ {}", file.display());
                    let rendered = if report || cfg.output.report {
                        detailed_report(&findings)
                    } else {
                        format_errors(&findings)
                    };
                    println!("{}\n", indent(&rendered));
                }
            }

            if json {
                let output = json!({
                    "generated_at": chrono::Utc::now().to_rfc3339(),
                    "checked": files.len(),
                    "failed": failed,
                    "files": summaries,
                });
                match cfg.output.format {
                    OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(&output)?),
                    OutputFormat::Compact => println!("{}", serde_json::to_string(&output)?),
                }
            } else {
                println!("Checked {} file(s): {} failed", files.len(), failed);
            }

            if failed > 0 {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Expand directories into the `*.json` files beneath them
fn collect_files(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().map(|ext| ext == "json").unwrap_or(false))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    files
}

fn check_file(
    parser: &SpecificationParser,
    path: &Path,
) -> Result<Vec<ValidationStageError>, Box<dyn std::error::Error>> {
    debug!(file = %path.display(), "validating");
    let content = std::fs::read_to_string(path)?;

    Ok(match parser.parse_validated(content) {
        Ok(validated) => validated.findings,
        Err(error) => error.into_findings(),
    })
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("   {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}
