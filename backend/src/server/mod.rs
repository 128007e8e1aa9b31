//! Server assembly: builds the adapters and services from configuration.

use std::sync::Arc;

use actix_web::web;

use crate::api::{Catalogue, Ledger};
use crate::domain::ingestion::ImageIngestor;
use crate::domain::ports::AssetStoreError;
use crate::domain::posts::PostCatalogue;
use crate::domain::voting::VoteLedger;
use crate::outbound::{DirAssetStore, HttpImageFetcher, MemoryStore};

pub mod config;

pub use self::config::Config;

/// Shared application services, ready to be registered as `web::Data`.
#[derive(Clone)]
pub struct AppState {
    pub catalogue: web::Data<Catalogue>,
    pub ledger: web::Data<Ledger>,
}

impl AppState {
    /// Wire the in-memory store, the HTTP fetcher, and the uploads
    /// directory into the two domain services.
    pub fn build(config: &Config) -> Result<Self, AssetStoreError> {
        let store = Arc::new(MemoryStore::new());
        let assets = Arc::new(DirAssetStore::open(&config.uploads_dir)?);
        let fetcher = Arc::new(HttpImageFetcher::new(reqwest::Client::new()));
        let ingestor = ImageIngestor::new(fetcher, assets);

        let catalogue = web::Data::new(PostCatalogue::new(
            Arc::clone(&store),
            Arc::clone(&store),
            ingestor,
            config.page_size,
        ));
        let ledger = web::Data::new(VoteLedger::new(Arc::clone(&store), Arc::clone(&store)));
        Ok(Self { catalogue, ledger })
    }
}
