//! Schema Config CLI
//!
//! View and manage pipeline configuration.

use clap::{Parser, Subcommand};
use component_schemas::PipelineConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-config")]
#[command(about = "View and manage component schema pipeline configuration")]
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
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Output path
        #[arg(short, long, default_value = "component-schemas.toml")]
        output: String,
    },

    /// Validate configuration
    Validate {
        /// Config file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Show { config, toml, json } => {
            let cfg = PipelineConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", cfg.to_toml()?);
            } else {
                println!("📋 Component Schema Configuration\n");
                println!("Limits:");
                println!("  Max depth: {}", cfg.limits.max_depth);
                println!("  Max children per node: {}", cfg.limits.max_children);
                println!("  Max components: {}", cfg.limits.max_components);
                println!("  Max variants per set: {}", cfg.limits.max_variants);

                println!("\nResolver:");
                println!("  Suggestion threshold: {}", cfg.resolver.suggestion_threshold);
                println!("  Available names shown: {}", cfg.resolver.max_available_names);
                println!("  Icon suggestions: {}", cfg.resolver.max_icon_suggestions);
            }
        }

        Commands::Init { output } => {
            PipelineConfig::default().save(&output)?;
            println!("✅ Created config file: {}", output);
        }

        Commands::Validate { config } => match PipelineConfig::load_from(config.as_deref()) {
            Ok(cfg) => {
                println!("✅ Configuration is valid");
                println!("   Max depth: {}", cfg.limits.max_depth);
                println!("   Suggestion threshold: {}", cfg.resolver.suggestion_threshold);
            }
            Err(e) => {
                eprintln!("❌ Configuration error: {}", e);
                std::process::exit(1);
            }
        },
    }

    Ok(())
}
