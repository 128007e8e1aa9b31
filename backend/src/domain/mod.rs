//! Domain entities, ports, and services.
//!
//! The core is leaf logic over generic collaborator ports: a document-store
//! abstraction for posts and users, an HTTP fetch capability, and an asset
//! store. Inbound adapters translate the typed errors raised here; nothing
//! in this tree knows about HTTP or a concrete storage engine.

pub mod ingestion;
pub mod ports;
pub mod post;
pub mod posts;
pub mod user;
pub mod voting;

pub use self::post::{Post, PostId};
pub use self::user::{Author, User, UserId};
pub use self::voting::{VoteDirection, VoteError, VoteLedger};
