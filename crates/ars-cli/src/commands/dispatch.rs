use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Research(args) => commands::research::handle(&args, ctx, flags).await,
        Commands::Chat(args) => commands::chat::handle(&args, ctx, flags).await,
        Commands::Status(args) => commands::status::handle(&args, ctx, flags).await,
        Commands::Export(args) => commands::export::handle(&args, ctx, flags).await,
    }
}
