use anyhow::Context;
use ars_client::ResearchClient;
use ars_config::ArsConfig;
use ars_session::SessionController;

/// Everything a command handler needs: resolved config and a controller
/// bound to the HTTP transport.
pub struct AppContext {
    pub config: ArsConfig,
    pub controller: SessionController<ResearchClient>,
}

impl AppContext {
    pub fn init(config: ArsConfig) -> anyhow::Result<Self> {
        let client = ResearchClient::new(&config.backend)
            .context("failed to build research backend client")?;
        tracing::debug!(root = client.root(), "research backend client ready");

        let controller = SessionController::from_config(client, &config.polling);
        Ok(Self { config, controller })
    }

    pub fn client(&self) -> &ResearchClient {
        self.controller.transport()
    }
}
