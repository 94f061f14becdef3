//! Skimibowi CLI - generate SKiDL board programs from a JSON configuration.

use clap::{Parser, Subcommand, ValueEnum};
use skimibowi::engine::{dependency_graph, Dependency, NameSet};
use skimibowi::{
    prepare, Composer, GenerationOptions, GenerationResult, RawConfig, SkimibowiCore,
    SkimibowiError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skimibowi")]
#[command(about = "SKiDL microcontroller board program generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Print debug logs to stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the SKiDL program for a configuration
    Generate {
        /// Path to the JSON board configuration
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Write the program to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Start every fragment with a comment naming it
        #[arg(long)]
        section_comments: bool,
    },

    /// Validate a configuration and show which fragments it selects
    Check {
        /// Path to the JSON board configuration
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormat,
    },

    /// List the features in composition order
    Features {
        /// Show prerequisites and what each feature provides
        #[arg(short, long)]
        verbose: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let exit_code = match cli.command {
        Commands::Generate {
            config,
            output,
            section_comments,
        } => handle_generate(&config, output.as_deref(), section_comments),
        Commands::Check { config, format } => handle_check(&config, format),
        Commands::Features { verbose } => handle_features(verbose),
    };

    process::exit(exit_code);
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_config(path: &Path) -> Result<RawConfig, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
    RawConfig::from_json(&json).map_err(|e| SkimibowiError::from(e).to_string())
}

fn handle_generate(config: &Path, output: Option<&Path>, section_comments: bool) -> i32 {
    let raw = match read_config(config) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let options = GenerationOptions { section_comments };
    let result = match SkimibowiCore::generate(&raw, options) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(path, &result.program) {
                eprintln!("Error: Cannot write {}: {}", path.display(), e);
                return 1;
            }
            tracing::info!("Wrote {} lines to {}", result.stats.lines, path.display());
        }
        None => print!("{}", result.program),
    }
    0
}

fn handle_check(config: &Path, format: OutputFormat) -> i32 {
    let raw = match read_config(config) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {}", e);
            return 1;
        }
    };

    let outcome = prepare(&raw).and_then(|board| {
        SkimibowiCore::generate_validated(&board, GenerationOptions::default())
            .map(|result| (board.mcu.to_string(), result))
    });

    match outcome {
        Ok((mcu, result)) => {
            match format {
                OutputFormat::Human => output_human(config, &mcu, &result),
                OutputFormat::Json => output_json(config, &mcu, &result),
            }
            0
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

fn output_human(config: &Path, mcu: &str, result: &GenerationResult) {
    println!("\nConfiguration: {}", config.display());
    println!("{}", "─".repeat(60));
    println!("  Microcontroller: {}", mcu);

    println!("\n  Fragments:");
    for feature in result.features() {
        println!("    - {}", feature);
    }

    println!("\n  Summary:");
    println!("    Fragments: {}", result.stats.fragments);
    println!("    Parts:     {}", result.stats.parts);
    println!("    Nets:      {}", result.stats.nets);
    println!("    Lines:     {}", result.stats.lines);
}

fn output_json(config: &Path, mcu: &str, result: &GenerationResult) {
    let output = serde_json::json!({
        "config": config.display().to_string(),
        "mcu": mcu,
        "fragments": result.features(),
        "parts": result.parts,
        "nets": result.nets,
        "stats": result.stats,
    });
    match serde_json::to_string_pretty(&output) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("Error: {}", e),
    }
}

fn handle_features(verbose: bool) -> i32 {
    let composer = Composer::new();
    let table = composer.table();

    println!("Features in composition order:\n");
    for (position, entry) in table.iter().enumerate() {
        println!("  {:>2}. {:<18} {}", position + 1, entry.name, entry.title);
        if verbose {
            print_names("requires", &entry.requires);
            print_names("provides", &entry.provides);
            if !entry.follows.is_empty() {
                println!("        follows:  {}", entry.follows.join(", "));
            }
        }
    }

    if verbose {
        let graph = match dependency_graph(table) {
            Ok(graph) => graph,
            Err(e) => {
                eprintln!("Error: {}", e);
                return 1;
            }
        };
        println!("\nDependencies:\n");
        for edge in graph.raw_edges() {
            let reason = match edge.weight {
                Dependency::Part(part) => format!("part {}", part),
                Dependency::Net(net) => format!("net {}", net),
                Dependency::Follows => "optional".to_string(),
            };
            println!(
                "  {} -> {} ({})",
                graph[edge.source()],
                graph[edge.target()],
                reason
            );
        }
    }
    0
}

fn print_names(label: &str, names: &NameSet) {
    if names.is_empty() {
        return;
    }
    let mut items: Vec<String> = names.parts.iter().map(|p| p.to_string()).collect();
    items.extend(names.nets.iter().map(|n| format!("NETS['{}']", n)));
    println!("        {}: {}", label, items.join(", "));
}
