mod check;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use sun_core::EngineConfig;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Project configuration picked up from the working directory.
const DEFAULT_CONFIG_FILE: &str = "sun.toml";

/// Sun syntax checker with error recovery.
#[derive(Parser)]
#[command(name = "sun", version, about = "Sun syntax checker with error recovery")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Engine configuration file (default: ./sun.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop collecting syntax errors after this many per file
    #[arg(long, global = true)]
    max_errors: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report lexical and syntax errors for .sun files
    Check {
        /// Paths to .sun source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Disable ANSI colors in the report
        #[arg(long)]
        no_color: bool,
    },

    /// Print cross-file error statistics and recommendations
    Summary {
        /// Paths to .sun source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Write the aggregated reports as JSON and/or CSV
    #[command(group(ArgGroup::new("target").required(true).multiple(true).args(["json", "csv"])))]
    Export {
        /// Paths to .sun source files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Destination of the JSON export
        #[arg(long)]
        json: Option<PathBuf>,
        /// Destination of the CSV export
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Start the Language Server Protocol server over stdio
    Lsp,
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref(), cli.max_errors) {
        Ok(config) => config,
        Err(e) => {
            report_error(&e.to_string(), cli.output, cli.quiet);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Check { files, no_color } => {
            check::cmd_check(&files, &config, no_color, cli.output, cli.quiet);
        }
        Commands::Summary { files } => {
            check::cmd_summary(&files, &config, cli.output, cli.quiet);
        }
        Commands::Export { files, json, csv } => {
            check::cmd_export(
                &files,
                &config,
                json.as_deref(),
                csv.as_deref(),
                cli.output,
                cli.quiet,
            );
        }
        Commands::Lsp => {
            if let Err(e) = sun_lsp::run(config) {
                eprintln!("LSP server error: {}", e);
                process::exit(1);
            }
        }
    }
}

/// Logs go to stderr so report output and LSP stdio stay clean.
/// `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

fn load_config(
    path: Option<&Path>,
    max_errors: Option<usize>,
) -> Result<EngineConfig, sun_core::ConfigError> {
    let mut config = match path {
        Some(path) => EngineConfig::load(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            EngineConfig::load(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => EngineConfig::default(),
    };
    if let Some(max) = max_errors {
        config.max_errors = max;
    }
    tracing::debug!(?config, "engine configuration");
    Ok(config)
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
