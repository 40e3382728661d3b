//! Schema Check CLI
//!
//! Validates component schema documents, prints creation order, and tries
//! token and icon references against exported name lists.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use component_schemas::tokens::{StaticNameSource, TokenKind};
use component_schemas::{
    resolve_dependencies, DocumentMerger, IconResolver, ParseResult, PipelineConfig, TokenIndex,
    TokenResolver,
};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "schema-check")]
#[command(about = "Validate component schemas and resolve token/icon references")]
struct Cli {
    /// Config file to load (optional)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and merge schema documents and icon registries
    Validate {
        /// JSON files or directories containing them
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print component creation order (dependencies first)
    Order {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Resolve a design-token reference
    ResolveToken {
        /// Exported token names (JSON with variables/textStyles/effectStyles)
        #[arg(short, long)]
        tokens: PathBuf,

        /// Token kind
        #[arg(short, long, value_enum, default_value = "variable")]
        kind: KindArg,

        reference: String,
    },

    /// Resolve a `library:icon` reference against icon registries
    ResolveIcon {
        /// Registry files or directories
        #[arg(short, long, required = true)]
        registry: Vec<PathBuf>,

        reference: String,
    },

    /// Fuzzy-search token names
    Search {
        #[arg(short, long)]
        tokens: PathBuf,

        query: String,

        /// Max results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Variable,
    TextStyle,
    EffectStyle,
}

impl From<KindArg> for TokenKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Variable => TokenKind::Variable,
            KindArg::TextStyle => TokenKind::TextStyle,
            KindArg::EffectStyle => TokenKind::EffectStyle,
        }
    }
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

fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { paths } => {
            let files = collect_json_files(&paths)?;
            let result = merge_files(&files, &config)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_file_legend(&files);
                print_diagnostics(&result);
                if result.valid {
                    let schema = result.schema.as_ref();
                    println!(
                        "✅ Valid: {} definition(s), {} icon registr{}",
                        schema.map_or(0, |s| s.definition_count()),
                        result.registries.len(),
                        if result.registries.len() == 1 { "y" } else { "ies" }
                    );
                }
            }

            if !result.valid {
                std::process::exit(1);
            }
        }

        Commands::Order { paths } => {
            let files = collect_json_files(&paths)?;
            let result = merge_files(&files, &config)?;

            let Some(schema) = result.schema.as_ref() else {
                print_file_legend(&files);
                print_diagnostics(&result);
                std::process::exit(1);
            };

            let order = resolve_dependencies(schema);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&order)?);
            } else if let Some(error) = &order.error {
                println!("❌ {}", error);
            } else {
                println!("📋 Creation order ({} components)\n", order.order.len());
                for (i, id) in order.order.iter().enumerate() {
                    println!("  {:>3}. {}", i + 1, id);
                }
            }

            if !order.success {
                std::process::exit(1);
            }
        }

        Commands::ResolveToken { tokens, kind, reference } => {
            let index = load_index(&tokens)?;
            let resolver = TokenResolver::with_config(&index, config.resolver.clone());
            let result = resolver.resolve(kind.into(), &reference);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                match &result.value {
                    Some(entry) if result.is_low_confidence() => {
                        println!("⚠️  \"{}\" matched {} by final segment only", reference, entry.name);
                    }
                    Some(entry) => println!("✅ \"{}\" -> {}", reference, entry.name),
                    None => {
                        println!("❌ \"{}\" not found", reference);
                        println!("   Tried: {}", result.tried_names.join(", "));
                        if let Some(suggestion) = &result.suggestion {
                            println!("   Did you mean: {}?", suggestion);
                        }
                    }
                }
            }

            if !result.is_resolved() {
                std::process::exit(1);
            }
        }

        Commands::ResolveIcon { registry, reference } => {
            let files = collect_json_files(&registry)?;
            let result = merge_files(&files, &config)?;
            if !result.valid {
                print_diagnostics(&result);
                std::process::exit(1);
            }

            let resolver = IconResolver::with_config(&result.registries, &config.resolver);
            let icon = resolver.resolve(&reference);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&icon)?);
            } else if let Some(key) = &icon.component_key {
                println!("✅ {} -> {}", reference, key);
            } else if let Some(error) = &icon.error {
                println!("❌ {}", error);
            }

            if !icon.is_resolved() {
                std::process::exit(1);
            }
        }

        Commands::Search { tokens, query, limit } => {
            let index = load_index(&tokens)?;
            let hits = index.search(&query, limit);

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&hits)?);
            } else if hits.is_empty() {
                println!("🔍 No tokens match \"{}\"", query);
            } else {
                println!("🔍 {} match(es) for \"{}\"\n", hits.len(), query);
                for hit in &hits {
                    println!("  {:<40} {:<13} {}", hit.name, hit.kind.as_str(), hit.score);
                }
            }
        }
    }

    Ok(())
}

/// Expand directories to their `.json` files, sorted for stable `[file N]` numbering
fn collect_json_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .sort_by_file_name()
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
                .collect();
            files.append(&mut found);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("No such file or directory: {}", path.display());
        }
    }
    tracing::debug!(count = files.len(), "collected input files");
    Ok(files)
}

fn merge_files(files: &[PathBuf], config: &PipelineConfig) -> Result<ParseResult> {
    let documents = files
        .iter()
        .map(|path| {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
        })
        .collect::<Result<Vec<String>>>()?;

    Ok(DocumentMerger::with_limits(config.limits).merge_all(&documents))
}

fn load_index(path: &Path) -> Result<TokenIndex> {
    let source = StaticNameSource::from_file(path)
        .with_context(|| format!("Failed to load token names from {}", path.display()))?;
    Ok(TokenIndex::build(&source))
}

fn print_file_legend(files: &[PathBuf]) {
    if files.len() > 1 {
        for (i, path) in files.iter().enumerate() {
            println!("  [file {}] {}", i + 1, path.display());
        }
        println!();
    }
}

fn print_diagnostics(result: &ParseResult) {
    for error in &result.errors {
        println!("❌ {}", error);
    }
    for warning in &result.warnings {
        println!("⚠️  {}", warning);
    }
    if !result.valid {
        println!();
        println!(
            "❌ Invalid: {} error(s), {} warning(s)",
            result.errors.len(),
            result.warnings.len()
        );
    }
}
