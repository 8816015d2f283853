mod commands;
mod templates;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::{cmd_list, cmd_render, cmd_validate};

/// Environment variable holding the log filter (e.g. `debug`,
/// `stackform_core=trace`).
const LOG_ENV: &str = "STACKFORM_LOG";

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Typed builder for declarative infrastructure templates.
#[derive(Parser)]
#[command(
    name = "stackform",
    version,
    about = "Typed builder for declarative infrastructure templates"
)]
struct Cli {
    /// Output format for errors and status (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in templates
    List,

    /// Build a template and print its JSON document
    Render {
        /// Name of the built-in template (see `stackform list`)
        template: String,
        /// Write the document to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Emit compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },

    /// Validate a rendered document against the document JSON Schema
    Validate {
        /// Path to the JSON document
        document: PathBuf,
    },
}

fn init_logging(quiet: bool) {
    let default = if quiet { "error" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match cli.command {
        Commands::List => cmd_list(cli.output),
        Commands::Render {
            template,
            out,
            compact,
        } => {
            cmd_render(&template, out.as_deref(), compact, cli.output, cli.quiet);
        }
        Commands::Validate { document } => {
            cmd_validate(&document, cli.output, cli.quiet);
        }
    }
}

/// Report a plain error message in the requested format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
