use ars_core::enums::{Depth, Tone};
use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Run one research session to completion and print the report.
    Research(ResearchArgs),
    /// Interactive research chat on stdin.
    Chat(ChatArgs),
    /// Fetch the current state of a research session once.
    Status(StatusArgs),
    /// Download the HTML report of a finished research session.
    Export(ExportArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ResearchArgs {
    /// Topic to research.
    pub topic: String,
    /// Search depth: basic, deep, comprehensive.
    #[arg(long)]
    pub depth: Option<Depth>,
    /// Report tone: professional, academic, creative.
    #[arg(long)]
    pub tone: Option<Tone>,
    /// Write the HTML report into this directory once available.
    #[arg(long, value_name = "DIR")]
    pub save_report: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ChatArgs {
    /// Initial search depth.
    #[arg(long)]
    pub depth: Option<Depth>,
    /// Initial report tone.
    #[arg(long)]
    pub tone: Option<Tone>,
}

#[derive(Clone, Debug, Args)]
pub struct StatusArgs {
    /// Backend research session id.
    pub research_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct ExportArgs {
    /// Backend research session id.
    pub research_id: String,
    /// Output directory (defaults to `general.report_dir`).
    #[arg(long, value_name = "DIR")]
    pub out: Option<String>,
}
