use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

mod catalog;
mod check;
mod config;
mod data;
mod error;
mod library;
mod quest;
mod server;

use config::{AppConfig, CliArgs, FileConfig};
use library::{HotReloadEvent, Library};
use quest::QuestRepository;
use server::AppState;

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("listen_quest_server=info".parse()?),
        )
        .init();

    let file_config = cli_args.config.as_deref().map(FileConfig::load).transpose()?;
    let config = AppConfig::resolve(&cli_args, file_config)?;

    let library = Library::load(&config.data_dir);
    let quests = QuestRepository::load(&config.quests_file)
        .with_context(|| format!("Failed to load quests from {:?}", config.quests_file))?;

    if cli_args.check_only {
        return run_check(&library, &quests).await;
    }

    let state = AppState::new(library, quests, config.data_dir.clone());

    if config.hot_reload {
        match library::start_file_watcher(state.library.clone(), config.data_dir.clone()) {
            Ok(mut rx) => {
                tokio::spawn(async move {
                    while let Some(event) = rx.recv().await {
                        match event {
                            HotReloadEvent::Reloaded(path) => info!("Library hot-reload: {}", path),
                            HotReloadEvent::Error(e) => error!("Library hot-reload error: {}", e),
                        }
                    }
                });
                info!("Library hot-reload enabled");
            }
            Err(e) => {
                warn!("Failed to start library hot-reload: {}", e);
            }
        }
    }

    let app = server::router(state, config.log_requests);

    let addr = config.socket_addr();
    info!("Quest server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Print every data problem; fails when any are found
async fn run_check(library: &Library, quests: &QuestRepository) -> Result<()> {
    let quests = quests.snapshot().await;
    let problems = check::check_data(library, &quests);

    if problems.is_empty() {
        println!("Data is clean");
        return Ok(());
    }

    for problem in &problems {
        println!("{}", problem);
    }
    anyhow::bail!("Found {} issue(s)", problems.len())
}
