//! Settings are layered: defaults, then the optional TOML file, then
//! `FINANCEFIT_*` environment variables, then command-line flags.
use serde::Deserialize;

use crate::{commands::GlobalArgs, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/financefit.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub state_path: String,
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: client::api::DEFAULT_BASE_URL.to_string(),
            timeout_secs: client::api::DEFAULT_TIMEOUT.as_secs(),
            state_path: "config/financefit_state.json".to_string(),
            level: "info".to_string(),
        }
    }
}

pub fn load(args: &GlobalArgs) -> Result<Settings> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("FINANCEFIT"));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }
    if let Some(state_path) = &args.state_path {
        settings.state_path = state_path.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }

    Ok(settings)
}
