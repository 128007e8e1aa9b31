//! Process configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Command-line and environment configuration for the server binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "linkboard", about = "Link-sharing service backend")]
pub struct Config {
    /// Socket address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Directory where ingested image assets are stored.
    #[arg(long, env = "UPLOADS_DIR", default_value = "uploads")]
    pub uploads_dir: PathBuf,

    /// Items per page for the feed, author pages, and search.
    #[arg(long, env = "PAGE_SIZE", default_value_t = pagination::DEFAULT_PAGE_SIZE)]
    pub page_size: u64,
}
