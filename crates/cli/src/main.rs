mod cmd;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{GenerateArgs, cmd_generate, cmd_plan, cmd_reset, cmd_status};
use crate::output::OutputFormat;

/// lfscript - Compile a Linux From Scratch book into unattended build scripts
#[derive(Parser)]
#[command(name = "lfscript")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Configuration file (default: ~/.config/lfscript/config.toml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate the build scripts of a book
  Generate {
    /// Book document (JSON)
    document: PathBuf,

    /// Adjustments file for the book version (TOML)
    #[arg(short, long)]
    adjust: PathBuf,

    /// Write scripts under this directory instead of the configured one
    #[arg(long)]
    state_root: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show what generating would do, section by section
  Plan {
    /// Book document (JSON)
    document: PathBuf,

    /// Adjustments file for the book version (TOML)
    #[arg(short, long)]
    adjust: PathBuf,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Show the build time accounting of a running or finished build
  Status {
    /// Book version, e.g. 9.1
    version: String,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "text")]
    output: OutputFormat,
  },

  /// Clear the build time accounting, so the next run measures from scratch
  Reset {
    /// Book version, e.g. 9.1
    version: String,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "error" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = cli.config.as_deref();
  match cli.command {
    Commands::Generate {
      document,
      adjust,
      state_root,
      output,
    } => cmd_generate(
      GenerateArgs {
        document: &document,
        adjust: &adjust,
        state_root: state_root.as_deref(),
        config,
      },
      output,
    ),
    Commands::Plan {
      document,
      adjust,
      output,
    } => cmd_plan(&document, &adjust, config, output),
    Commands::Status { version, output } => cmd_status(&version, config, output),
    Commands::Reset { version } => cmd_reset(&version, config),
  }
}
