//! Link-sharing service backend.
//!
//! Users submit links with a remote image, browse a paginated feed, search,
//! and cast up/down votes. The interesting parts are the image ingestion
//! pipeline (fetch, decode, thumbnail, durable store) and the vote ledger
//! (atomic, idempotent three-record vote application); everything else is
//! thin adapter code around them.

pub mod api;
pub mod domain;
pub mod outbound;
pub mod server;
