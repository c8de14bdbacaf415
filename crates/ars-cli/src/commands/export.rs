use std::path::Path;

use anyhow::Context;
use ars_client::ResearchTransport;
use ars_session::SessionError;
use ars_session::export::export_state_report;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ExportArgs;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ExportResponse {
    research_id: String,
    path: String,
}

/// Handle `ars export`.
pub async fn handle(args: &ExportArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = ctx
        .client()
        .fetch_research_state(&args.research_id)
        .await
        .with_context(|| format!("failed to fetch research '{}'", args.research_id))?;

    let dir = args
        .out
        .as_deref()
        .unwrap_or(&ctx.config.general.report_dir);

    let path = match export_state_report(&state, Path::new(dir)) {
        Ok(path) => path,
        Err(SessionError::NoReport) => anyhow::bail!(
            "research '{}' has no HTML report yet (status: {})",
            args.research_id,
            state.status
        ),
        Err(error) => return Err(error).context("failed to export report"),
    };

    output(
        &ExportResponse {
            research_id: args.research_id.clone(),
            path: path.display().to_string(),
        },
        flags.format,
    )
}
