//! Inbound HTTP adapter.
//!
//! Thin actix-web handlers over the domain services. Routing mirrors the
//! public/private split: listing and search are open, submission, voting,
//! and deletion require the identity forwarded by the external auth layer.

use actix_web::web;

use crate::domain::posts::PostCatalogue;
use crate::domain::voting::VoteLedger;
use crate::outbound::{DirAssetStore, HttpImageFetcher, MemoryStore};

pub mod error;
pub mod health;
pub mod identity;
pub mod posts;

pub use self::error::{ApiError, ErrorCode};
pub use self::identity::{Identity, USER_ID_HEADER};

/// Catalogue service as wired in production.
pub type Catalogue = PostCatalogue<MemoryStore, MemoryStore, HttpImageFetcher, DirAssetStore>;
/// Vote ledger as wired in production.
pub type Ledger = VoteLedger<MemoryStore, MemoryStore>;

/// Register every route. The caller provides the service instances as
/// `web::Data` before applying this configuration.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/posts", web::get().to(posts::front_page))
            .route("/search", web::get().to(posts::search))
            .route("/user/{name}", web::get().to(posts::user_page))
            .service(
                web::scope("/auth")
                    .route("/submit", web::post().to(posts::submit))
                    .route("/upvote/{id}", web::put().to(posts::upvote))
                    .route("/downvote/{id}", web::put().to(posts::downvote))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            ),
    )
    .service(
        web::scope("/health")
            .route("/live", web::get().to(health::live))
            .route("/ready", web::get().to(health::ready)),
    );
}
