//! Task API server
//!
//! REST service for creating, listing, completing and deleting tasks.

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use taskapi::cli::Cli;
use taskapi::config::ConfigLoader;
use taskapi::db::Database;
use taskapi::logging::init_logging;
use taskapi::server;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_target(), cli.verbose)?;

    let mut loader = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    for source in loader.sources() {
        debug!(file = %source.display(), "Loaded config");
    }
    cli.apply_overrides(loader.config_mut());
    let config = loader.into_config();

    info!(db_path = %config.server.db_path.display(), "Opening database");
    let db = Arc::new(Database::open(&config.server.db_path)?);

    server::serve(db, &config.server.bind_addr(), server::shutdown_signal()).await
}
