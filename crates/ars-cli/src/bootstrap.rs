use anyhow::Context;
use ars_config::ArsConfig;

use crate::cli::GlobalFlags;

/// Load layered config, then apply command-line overrides on top.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<ArsConfig> {
    load_dotenv()?;

    let mut config = ArsConfig::load().context("failed to load ars configuration")?;
    apply_flag_overrides(&mut config, flags)?;
    Ok(config)
}

fn apply_flag_overrides(config: &mut ArsConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if let Some(url) = &flags.backend_url {
        config.backend.base_url.clone_from(url);
        config
            .backend
            .validate()
            .with_context(|| format!("invalid --backend-url '{url}'"))?;
    }
    Ok(())
}

fn load_dotenv() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let env_path = cwd.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    }
    Ok(())
}
