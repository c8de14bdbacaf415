use anyhow::Context;
use ars_client::ResearchTransport;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::StatusArgs;
use crate::commands::shared::{ResearchSummary, print_summary};
use crate::context::AppContext;

/// Handle `ars status`.
pub async fn handle(args: &StatusArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let state = match ctx.client().fetch_research_state(&args.research_id).await {
        Ok(state) => state,
        Err(error) if error.is_not_found() => {
            anyhow::bail!("research '{}' not found", args.research_id)
        }
        Err(error) => {
            return Err(error)
                .with_context(|| format!("failed to fetch research '{}'", args.research_id));
        }
    };

    print_summary(&ResearchSummary::from_state(&args.research_id, &state), flags.format)
}
