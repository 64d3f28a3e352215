//! Validator Config CLI
//!
//! View and manage validator configuration.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uispec_validator::ValidatorConfig;

#[derive(Parser)]
#[command(name = "uispec-config")]
#[command(about = "View and manage validator configuration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path (default: uispec.toml)
        #[arg(short, long, default_value = "uispec.toml")]
        output: PathBuf,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = ValidatorConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Validator Configuration\n");
                println!("Pipeline:");
                println!("  Development: {}", cfg.pipeline.development);
                println!("  Stop at first error: {}", cfg.pipeline.stop_at_first_error);
                println!("  Validate schemas: {}", cfg.pipeline.validate_schemas);
                println!("  Include suggestions: {}", cfg.pipeline.include_suggestions);
                println!("  Documentation: {:?}", cfg.pipeline.documentation_base_url);
                println!("  Max depth: {}", cfg.pipeline.max_depth);
                println!("  Nesting warning depth: {}", cfg.pipeline.nesting_warning_depth);

                println!("\nOutput:");
                println!("  Format: {:?}", cfg.output.format);
                println!("  Report: {}", cfg.output.report);
                println!("  Show warnings: {}", cfg.output.show_warnings);

                if let Some(path) = ValidatorConfig::user_config_path() {
                    println!("\nUser config: {}", path.display());
                }
            }
        }

        Commands::Init { output } => {
            let cfg = ValidatorConfig::default();
            cfg.save(&output)?;
            println!("✅ Created config file: {}", output.display());
        }

        Commands::Validate { config } => {
            let loaded = ValidatorConfig::load_from(config.as_deref())
                .map_err(uispec_validator::Error::from)
                .and_then(|cfg| cfg.validate().map(|_| cfg));

            match loaded {
                Ok(cfg) => {
                    println!("✅ Configuration is valid");
                    println!("   Max depth: {}", cfg.pipeline.max_depth);
                    println!("   Stop at first error: {}", cfg.pipeline.stop_at_first_error);
                    println!("   Output format: {:?}", cfg.output.format);
                }
                Err(e) => {
                    eprintln!("❌ Configuration error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
