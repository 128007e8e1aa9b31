//! Server entry-point: configuration, tracing, and the HTTP listener.

use actix_web::{App, HttpServer};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use backend::api;
use backend::server::{AppState, Config};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = Config::parse();
    let state = AppState::build(&config)
        .map_err(|err| std::io::Error::other(format!("failed to open uploads dir: {err}")))?;

    info!(addr = %config.bind_addr, uploads = %config.uploads_dir.display(), "starting server");
    HttpServer::new(move || {
        App::new()
            .app_data(state.catalogue.clone())
            .app_data(state.ledger.clone())
            .configure(api::configure)
    })
    .bind(config.bind_addr)?
    .run()
    .await
}
