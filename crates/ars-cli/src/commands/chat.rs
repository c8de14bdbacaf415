use std::io::Write;
use std::path::Path;

use anyhow::Context;
use ars_client::ResearchClient;
use ars_core::entities::Customization;
use ars_core::enums::{Depth, Tone};
use ars_session::export::export_message_report;
use ars_session::{SessionController, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;

use crate::cli::{GlobalFlags, OutputFormat};
use crate::cli::root_commands::ChatArgs;
use crate::commands::shared::{
    QUICK_PROMPTS, ResearchSummary, SourceRow, follow, print_summary, render_sources,
};
use crate::context::AppContext;
use crate::progress::Progress;

/// One line of chat input.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatInput {
    Empty,
    Topic(String),
    ToggleDepth,
    ToggleTone,
    Prompts,
    QuickPrompt(usize),
    Sources,
    Download(Option<String>),
    Help,
    Quit,
    Unknown(String),
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Topic(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        match name {
            "depth" => Self::ToggleDepth,
            "tone" => Self::ToggleTone,
            "prompts" => Self::Prompts,
            "sources" => Self::Sources,
            "download" => Self::Download(parts.next().map(str::to_string)),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            other => other
                .parse::<usize>()
                .map_or_else(|_| Self::Unknown(other.to_string()), Self::QuickPrompt),
        }
    }
}

const HELP: &str = "\
Type a topic to research it. Commands:
  /depth          toggle deep <-> basic search
  /tone           toggle professional <-> academic tone
  /prompts        list quick prompts, run one with /1, /2, ...
  /sources        list citations of the last answer
  /download [DIR] save the last HTML report
  /quit           leave (abandons running research)";

/// Handle `ars chat`.
pub async fn handle(args: &ChatArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let defaults = ctx.config.general.default_customization();
    let mut customization = Customization::new(
        args.depth.unwrap_or(defaults.depth),
        args.tone.unwrap_or(defaults.tone),
    );
    let mut watcher: Option<JoinHandle<()>> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    eprintln!("ars chat ({}) - /help for commands", describe(customization));

    loop {
        prompt();
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read from stdin")?,
            signal = tokio::signal::ctrl_c() => {
                signal.context("failed to listen for Ctrl-C")?;
                None
            }
        };
        let Some(line) = line else {
            break;
        };

        match ChatInput::parse(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Help => eprintln!("{HELP}"),
            ChatInput::ToggleDepth => {
                customization.toggle_depth();
                eprintln!("{}", describe(customization));
            }
            ChatInput::ToggleTone => {
                customization.toggle_tone();
                eprintln!("{}", describe(customization));
            }
            ChatInput::Prompts => {
                for (i, topic) in QUICK_PROMPTS.iter().enumerate() {
                    eprintln!("  /{}  {topic}", i + 1);
                }
            }
            ChatInput::QuickPrompt(n) => match n.checked_sub(1).and_then(|i| QUICK_PROMPTS.get(i)) {
                Some(topic) => {
                    eprintln!("> {topic}");
                    let quick = Customization::new(Depth::Deep, Tone::Professional);
                    submit(ctx, topic, quick, flags.format, &mut watcher).await?;
                }
                None => eprintln!("no quick prompt #{n}; see /prompts"),
            },
            ChatInput::Sources => show_sources(ctx).await,
            ChatInput::Download(dir) => {
                let dir = dir.unwrap_or_else(|| ctx.config.general.report_dir.clone());
                download(ctx, Path::new(&dir)).await?;
            }
            ChatInput::Topic(topic) => {
                submit(ctx, &topic, customization, flags.format, &mut watcher).await?;
            }
            ChatInput::Unknown(name) => eprintln!("unknown command /{name}; try /help"),
        }
    }

    ctx.controller.shutdown().await;
    if let Some(watcher) = watcher {
        let _ = watcher.await;
    }
    Ok(())
}

fn describe(customization: Customization) -> String {
    format!("depth: {}, tone: {}", customization.depth, customization.tone)
}

fn prompt() {
    eprint!("> ");
    let _ = std::io::stderr().flush();
}

/// Start a session and follow it in the background. Input stays live but
/// new topics are refused until it finishes.
async fn submit(
    ctx: &AppContext,
    topic: &str,
    customization: Customization,
    format: OutputFormat,
    watcher: &mut Option<JoinHandle<()>>,
) -> anyhow::Result<()> {
    let session = match ctx.controller.try_start_research(topic, customization).await {
        Ok(session) => session,
        Err(SessionError::Busy) => {
            eprintln!("research is still running; wait for it to finish");
            return Ok(());
        }
        Err(SessionError::EmptyTopic) => return Ok(()),
        Err(SessionError::Submission { message_id, .. }) => {
            if let Some(message) = ctx.controller.message(&message_id).await {
                eprintln!("{}", message.content);
            }
            return Ok(());
        }
        Err(error) => return Err(error.into()),
    };

    let controller: SessionController<ResearchClient> = ctx.controller.clone();
    *watcher = Some(tokio::spawn(async move {
        let progress = Progress::research();
        let phase = follow(&controller, &session, &progress).await;
        progress.finish_clear();

        let Some(message) = controller.message(&session.message_id).await else {
            return;
        };
        if let Err(error) = print_summary(&ResearchSummary::from_message(&message, phase), format) {
            tracing::warn!(%error, "failed to print research result");
        }
        prompt();
    }));
    Ok(())
}

async fn show_sources(ctx: &AppContext) {
    let sources = ctx
        .controller
        .last_assistant()
        .await
        .map(|message| SourceRow::from_findings(&message.sources))
        .unwrap_or_default();

    if sources.is_empty() {
        eprintln!("no sources yet");
    } else {
        println!("{}", render_sources(&sources));
    }
}

async fn download(ctx: &AppContext, dir: &Path) -> anyhow::Result<()> {
    let Some(message) = ctx.controller.last_assistant().await else {
        eprintln!("nothing to download yet");
        return Ok(());
    };

    match export_message_report(&message, dir) {
        Ok(path) => eprintln!("report saved to {}", path.display()),
        Err(SessionError::NoReport) => eprintln!("no HTML report available for the last answer"),
        Err(error) => return Err(error).context("failed to save report"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::ChatInput;

    #[test]
    fn plain_text_is_a_topic() {
        assert_eq!(
            ChatInput::parse("  Market Analysis of EVs 2025 \n"),
            ChatInput::Topic("Market Analysis of EVs 2025".into())
        );
    }

    #[test]
    fn blank_line_is_empty() {
        assert_eq!(ChatInput::parse("   "), ChatInput::Empty);
    }

    #[test]
    fn slash_commands_parse() {
        assert_eq!(ChatInput::parse("/depth"), ChatInput::ToggleDepth);
        assert_eq!(ChatInput::parse("/tone"), ChatInput::ToggleTone);
        assert_eq!(ChatInput::parse("/prompts"), ChatInput::Prompts);
        assert_eq!(ChatInput::parse("/sources"), ChatInput::Sources);
        assert_eq!(ChatInput::parse("/quit"), ChatInput::Quit);
        assert_eq!(ChatInput::parse("/2"), ChatInput::QuickPrompt(2));
    }

    #[test]
    fn download_takes_optional_dir() {
        assert_eq!(ChatInput::parse("/download"), ChatInput::Download(None));
        assert_eq!(
            ChatInput::parse("/download reports/ev"),
            ChatInput::Download(Some("reports/ev".into()))
        );
    }

    #[test]
    fn unknown_command_is_reported() {
        assert_eq!(ChatInput::parse("/nope"), ChatInput::Unknown("nope".into()));
        assert_eq!(ChatInput::parse("/"), ChatInput::Unknown(String::new()));
    }
}
