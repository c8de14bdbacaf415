use std::path::Path;

use anyhow::Context;
use ars_core::entities::Customization;
use ars_session::export::export_message_report;
use ars_session::{SessionError, SessionPhase};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ResearchArgs;
use crate::commands::shared::{ResearchSummary, follow, print_summary};
use crate::context::AppContext;
use crate::progress::Progress;

/// Handle `ars research`.
pub async fn handle(
    args: &ResearchArgs,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let defaults = ctx.config.general.default_customization();
    let customization = Customization::new(
        args.depth.unwrap_or(defaults.depth),
        args.tone.unwrap_or(defaults.tone),
    );
    tracing::debug!(topic = %args.topic, depth = %customization.depth, tone = %customization.tone, "starting research");

    let progress = Progress::research();
    let session = ctx
        .controller
        .start_research(&args.topic, customization)
        .await
        .inspect_err(|_| progress.finish_clear())?;

    let phase = tokio::select! {
        phase = follow(&ctx.controller, &session, &progress) => phase,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            session.abandon().await?;
            SessionPhase::Abandoned
        }
    };

    match phase {
        SessionPhase::Complete => progress.finish_clear(),
        other => progress.finish_err(other.as_str()),
    }

    let message = ctx
        .controller
        .message(&session.message_id)
        .await
        .context("research message missing from thread")?;

    let mut summary = ResearchSummary::from_message(&message, phase);
    if let Some(dir) = &args.save_report {
        match export_message_report(&message, Path::new(dir)) {
            Ok(path) => summary = summary.with_report_path(&path),
            Err(SessionError::NoReport) => {
                tracing::warn!(research_id = %session.research_id, "no HTML report to save");
            }
            Err(error) => return Err(error).context("failed to save report"),
        }
    }

    print_summary(&summary, flags.format)?;

    match phase {
        SessionPhase::Error => anyhow::bail!("research '{}' ended with an error", session.research_id),
        SessionPhase::Abandoned => anyhow::bail!("research '{}' abandoned", session.research_id),
        _ => Ok(()),
    }
}
