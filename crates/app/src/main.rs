use std::{process::ExitCode, sync::Arc, time::Duration};

use clap::Parser;
use client::{ApiClient, FileStorage, Finance, Navigator, SessionStorage, SessionStore};

use crate::{commands::Cli, error::Result, render::Output};

mod commands;
mod error;
mod prompt;
mod render;
mod settings;

/// The CLI has no routes: an expired session just tells the user to log in.
struct CliNavigator;

impl Navigator for CliNavigator {
    fn redirect(&self, route: &str) {
        tracing::debug!(route, "session ended");
        eprintln!("Session expired, run `financefit login` again.");
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let settings = settings::load(&cli.global)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "financefit={level},client={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(base_url = %settings.base_url, state = %settings.state_path, "starting");

    let storage: Arc<dyn SessionStorage> = Arc::new(FileStorage::open(&settings.state_path)?);
    let api = ApiClient::builder()
        .base_url(&settings.base_url)
        .timeout(Duration::from_secs(settings.timeout_secs))
        .storage(storage.clone())
        .build()?;

    let session = Arc::new(SessionStore::new(api, storage, Arc::new(CliNavigator)));
    session.restore().await;

    let finance = Finance::new(session);
    let out = Output {
        json: cli.global.json,
    };
    commands::run(cli.command, &finance, out).await
}
