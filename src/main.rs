mod app;
mod browse;
mod catalog;
mod config;
mod error;
mod player;
mod share;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::App;
use crate::browse::{MetadataLoader, Route, SharedCatalog};
use crate::catalog::TmdbClient;
use crate::config::Config;
use crate::error::Result;
use crate::player::SourceTable;

/// Browse an anime's seasons and play its episodes in mpv
#[derive(Debug, Parser)]
#[command(name = "anistream", version, about)]
struct Args {
    /// Show id, `/show/{id}` or `/show/{id}/season/{s}/episode/{e}`
    target: String,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn setup_logging() -> Result<()> {
    let data_dir = config::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    let file_appender = tracing_appender::rolling::daily(&data_dir, "anistream.log");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("anistream=info".parse().unwrap()))
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The TUI owns the terminal, so logs go to a file
    if let Err(e) = setup_logging() {
        eprintln!("Warning: Could not set up logging: {}", e);
    }

    info!("Starting anistream");

    let route = Route::parse(&args.target)?;

    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!("Loaded config");

    let catalog: SharedCatalog = Arc::new(TmdbClient::new(&config.catalog)?);
    let loader = MetadataLoader::new(catalog);
    let sources = SourceTable::new(config.sources.clone());
    info!(sources = sources.len(), "Loaded playback sources");

    let mut terminal = app::init_terminal()?;

    let mut app = App::new(config, loader, Box::new(sources), route);
    let result = app.run(&mut terminal).await;

    app::restore_terminal()?;

    result
}
