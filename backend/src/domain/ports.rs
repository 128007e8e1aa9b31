//! Domain ports for the driven adapters.
//!
//! The core treats persistence as a document collection with find, insert,
//! atomic increment, and conditional set-membership primitives; the image
//! pipeline likewise only sees an HTTP fetch capability and a
//! filesystem-like asset store. Each trait exposes strongly typed errors so
//! adapters map their failures into predictable variants.

use async_trait::async_trait;
use thiserror::Error;

use super::post::{Post, PostId};
use super::user::{User, UserId};

/// Filter applied to post collection queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Every post.
    All,
    /// Posts authored by one user.
    Author(UserId),
    /// Posts whose title or URL contains the needle, case-insensitively.
    TitleOrUrlContains(String),
}

/// Descending sort key for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    Created,
    /// Highest score first.
    Score,
}

impl SortOrder {
    /// Normalise a raw `orderBy` query value; anything unrecognised falls
    /// back to [`SortOrder::Created`].
    #[must_use]
    pub fn from_query(raw: Option<&str>) -> Self {
        match raw {
            Some("score") => Self::Score,
            _ => Self::Created,
        }
    }
}

/// Offset window for a sorted range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListWindow {
    pub skip: u64,
    pub limit: u64,
}

/// Failures surfaced by [`PostStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PostStoreError {
    /// Connectivity or query execution failure in the backing store.
    #[error("post store failure: {message}")]
    Backend { message: String },
    /// An update targeted a post that does not exist.
    #[error("post {id} is not in the store")]
    Missing { id: PostId },
}

impl PostStoreError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`UserStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserStoreError {
    /// Connectivity or query execution failure in the backing store.
    #[error("user store failure: {message}")]
    Backend { message: String },
    /// An update targeted a user that does not exist.
    #[error("user {id} is not in the store")]
    Missing { id: UserId },
}

impl UserStoreError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`ImageFetcher`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request could not be sent or the body could not be read.
    #[error("image fetch failed: {message}")]
    Request { message: String },
    /// The origin answered with a non-success status.
    #[error("image fetch answered with status {status}")]
    Status { status: u16 },
}

impl FetchError {
    /// Helper for transport-level failures.
    pub fn request(message: impl std::fmt::Display) -> Self {
        Self::Request {
            message: message.to_string(),
        }
    }
}

/// Failures surfaced by [`AssetStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetStoreError {
    /// Filesystem-level failure while writing or removing an asset.
    #[error("asset store failure for {filename}: {message}")]
    Io { filename: String, message: String },
}

impl AssetStoreError {
    /// Helper wrapping an I/O failure with the affected filename.
    pub fn io(filename: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Io {
            filename: filename.into(),
            message: message.to_string(),
        }
    }
}

/// Persistence port for the post collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Insert a newly created post.
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError>;

    /// Fetch one post by identifier.
    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError>;

    /// Count posts matching the filter.
    async fn count(&self, filter: &PostFilter) -> Result<u64, PostStoreError>;

    /// Sorted, windowed range query over posts matching the filter.
    async fn list(
        &self,
        filter: &PostFilter,
        order: SortOrder,
        window: ListWindow,
    ) -> Result<Vec<Post>, PostStoreError>;

    /// Atomically add `delta` to a post's score.
    async fn increment_score(&self, id: &PostId, delta: i64) -> Result<(), PostStoreError>;

    /// Remove a post record.
    async fn remove(&self, id: &PostId) -> Result<(), PostStoreError>;
}

/// Persistence port for the user collection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Managed by the external auth collaborator in
    /// production; the port carries it so adapters and tests can seed users.
    async fn insert(&self, user: &User) -> Result<(), UserStoreError>;

    /// Fetch one user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError>;

    /// Fetch one user by display name.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, UserStoreError>;

    /// Atomically add `delta` to a user's aggregate score.
    async fn increment_total_score(&self, id: &UserId, delta: i64) -> Result<(), UserStoreError>;

    /// Set-insert-if-absent on the voter's vote history.
    ///
    /// Returns `Ok(true)` when the post was newly recorded and `Ok(false)`
    /// when the voter had already voted on it. The check and the insert are
    /// a single conditional update; no two concurrent calls for the same
    /// voter and post may both observe `true`.
    async fn record_vote(&self, voter: &UserId, post: &PostId) -> Result<bool, UserStoreError>;
}

/// Outbound HTTP port used by the ingestion pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw bytes behind an image URL. One attempt, no retry.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Filesystem-like store for ingested image assets.
#[cfg_attr(test, mockall::automock)]
pub trait AssetStore: Send + Sync {
    /// Durably write an asset under `filename`. Implementations must never
    /// leave a partially written file visible under the final name.
    fn write(&self, filename: &str, bytes: &[u8]) -> Result<(), AssetStoreError>;

    /// Delete an asset by name. A file that is already absent is success.
    fn remove(&self, filename: &str) -> Result<(), AssetStoreError>;
}
