use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::{GlobalFlags, OutputFormat, ProgressMode};
pub use root_commands::Commands;

/// Top-level CLI parser for the `ars` binary.
#[derive(Debug, Parser)]
#[command(name = "ars", version, about = "ars - agentic research studio client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Progress bar: auto, on, off
    #[arg(long, global = true, default_value = "auto")]
    pub progress: ProgressMode,

    /// Backend base URL (overrides `backend.base_url`)
    #[arg(long, global = true, value_name = "URL")]
    pub backend_url: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            quiet: self.quiet,
            verbose: self.verbose,
            progress: self.progress,
            backend_url: self.backend_url.clone(),
        }
    }
}
