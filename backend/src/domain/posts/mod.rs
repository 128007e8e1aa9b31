//! Post catalogue: submission, deletion, and the paginated listing queries
//! behind the feed, author pages, and search.

use std::sync::Arc;

use chrono::Utc;
use pagination::{Page, PlanError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

use super::ingestion::{ImageIngestor, IngestError};
use super::ports::{
    AssetStore, ImageFetcher, ListWindow, PostFilter, PostStore, SortOrder, UserStore,
};
use super::post::{Post, PostId};
use super::user::{Author, UserId};


/// Submission payload: the link plus the remote image to ingest.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct PostForm {
    pub title: String,
    pub url: String,
    pub image: String,
    #[serde(default)]
    pub comment: String,
}

/// A listed post with its author projection attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostWithAuthor {
    #[serde(flatten)]
    pub post: Post,
    pub author: Author,
}

/// Failures of post submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    /// The image could not be turned into a stored asset.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// The post record could not be written; nothing was left behind.
    #[error("post submission store failure: {message}")]
    Repository { message: String },
    /// The post was inserted but the author's aggregate was not credited.
    /// The catalogue is in an inconsistent intermediate state; operators
    /// must reconcile, so this is never presented as an ordinary rejection.
    #[error("submission of {post} partially applied: {message}")]
    Partial { post: PostId, message: String },
}

impl SubmitError {
    fn repository(err: impl std::fmt::Display) -> Self {
        Self::Repository {
            message: err.to_string(),
        }
    }
}

/// Failures of post deletion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    /// The post does not exist.
    #[error("post {post} not found")]
    NotFound { post: PostId },
    /// Only the author may delete a post.
    #[error("post {post} is owned by another user")]
    NotOwner { post: PostId },
    /// The asset could not be unlinked; the record is left in place.
    #[error("asset removal failed: {message}")]
    Asset { message: String },
    /// The record could not be removed after the asset was unlinked.
    #[error("post deletion store failure: {message}")]
    Repository { message: String },
}

/// Failures of the listing queries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The requested author page names a user that does not exist.
    #[error("unknown user {name}")]
    UnknownUser { name: String },
    /// Page-window planning rejected the request.
    #[error(transparent)]
    Window(#[from] PlanError),
    /// The backing store failed.
    #[error("post query store failure: {message}")]
    Repository { message: String },
}

impl QueryError {
    fn repository(err: impl std::fmt::Display) -> Self {
        Self::Repository {
            message: err.to_string(),
        }
    }
}

/// Catalogue service over the document store and the ingestion pipeline.
#[derive(Clone)]
pub struct PostCatalogue<P, U, F, A> {
    posts: Arc<P>,
    users: Arc<U>,
    ingestor: ImageIngestor<F, A>,
    page_size: u64,
}

impl<P, U, F, A> PostCatalogue<P, U, F, A> {
    /// Create a catalogue with the given page size for listing windows.
    pub fn new(
        posts: Arc<P>,
        users: Arc<U>,
        ingestor: ImageIngestor<F, A>,
        page_size: u64,
    ) -> Self {
        Self {
            posts,
            users,
            ingestor,
            page_size,
        }
    }
}

impl<P, U, F, A> PostCatalogue<P, U, F, A>
where
    P: PostStore,
    U: UserStore,
    F: ImageFetcher,
    A: AssetStore,
{
    /// Ingest the image and create the post.
    ///
    /// The post starts at score 1 and the author's aggregate is credited by
    /// one: submitting counts as a self-upvote. The asset write completes
    /// before any record references it; if the insert then fails, the
    /// orphaned asset is unlinked on a best-effort basis.
    pub async fn submit(&self, author: &UserId, form: PostForm) -> Result<Post, SubmitError> {
        let asset = self.ingestor.ingest(&form.image).await?;
        let post = Post {
            id: asset.post_id,
            title: form.title,
            url: form.url,
            comment: form.comment,
            image: asset.filename,
            score: 1,
            created: Utc::now(),
            author_id: *author,
        };

        if let Err(err) = self.posts.insert(&post).await {
            if self.ingestor.remove_asset(&post.image).is_err() {
                warn!(filename = post.image, "orphaned asset left behind");
            }
            return Err(SubmitError::repository(err));
        }
        // The post is visible from here; a failed author credit leaves the
        // catalogue partially applied and must be surfaced for
        // reconciliation.
        if let Err(err) = self.users.increment_total_score(author, 1).await {
            error!(post = %post.id, author = %author, %err, "submission partially applied");
            return Err(SubmitError::Partial {
                post: post.id,
                message: format!("author total score not credited: {err}"),
            });
        }

        debug!(post = %post.id, author = %author, "post submitted");
        Ok(post)
    }

    /// Remove a post and its asset. Author-only.
    ///
    /// The asset is unlinked before the record so a half-finished deletion
    /// leaves a post whose deletion can simply be retried; the idempotent
    /// asset removal makes the retry safe.
    pub async fn delete(&self, requester: &UserId, post_id: &PostId) -> Result<(), DeleteError> {
        let post = self
            .posts
            .find_by_id(post_id)
            .await
            .map_err(|err| DeleteError::Repository {
                message: err.to_string(),
            })?
            .ok_or(DeleteError::NotFound { post: *post_id })?;
        if post.author_id != *requester {
            return Err(DeleteError::NotOwner { post: *post_id });
        }

        self.ingestor
            .remove_asset(&post.image)
            .map_err(|err| DeleteError::Asset {
                message: err.to_string(),
            })?;
        self.posts
            .remove(post_id)
            .await
            .map_err(|err| DeleteError::Repository {
                message: err.to_string(),
            })?;

        debug!(post = %post_id, "post deleted");
        Ok(())
    }

    /// The front-page feed.
    pub async fn front_page(
        &self,
        page: u64,
        order: SortOrder,
    ) -> Result<Page<PostWithAuthor>, QueryError> {
        self.list(PostFilter::All, page, order).await
    }

    /// Posts authored by the named user.
    pub async fn by_author(
        &self,
        name: &str,
        page: u64,
        order: SortOrder,
    ) -> Result<Page<PostWithAuthor>, QueryError> {
        let user = self
            .users
            .find_by_name(name)
            .await
            .map_err(QueryError::repository)?
            .ok_or_else(|| QueryError::UnknownUser {
                name: name.to_owned(),
            })?;
        self.list(PostFilter::Author(user.id), page, order).await
    }

    /// Posts whose title or URL matches the query, case-insensitively.
    pub async fn search(
        &self,
        query: &str,
        page: u64,
        order: SortOrder,
    ) -> Result<Page<PostWithAuthor>, QueryError> {
        self.list(PostFilter::TitleOrUrlContains(query.to_owned()), page, order)
            .await
    }

    async fn list(
        &self,
        filter: PostFilter,
        page: u64,
        order: SortOrder,
    ) -> Result<Page<PostWithAuthor>, QueryError> {
        let total = self
            .posts
            .count(&filter)
            .await
            .map_err(QueryError::repository)?;
        let window = pagination::plan(page, total, self.page_size)?;
        let posts = self
            .posts
            .list(
                &filter,
                order,
                ListWindow {
                    skip: window.skip,
                    limit: self.page_size,
                },
            )
            .await
            .map_err(QueryError::repository)?;

        let mut items = Vec::with_capacity(posts.len());
        for post in posts {
            let author = self
                .users
                .find_by_id(&post.author_id)
                .await
                .map_err(QueryError::repository)?
                .ok_or_else(|| {
                    QueryError::repository(format!("author {} missing", post.author_id))
                })?;
            items.push(PostWithAuthor {
                post,
                author: Author::from(&author),
            });
        }
        Ok(Page::from_window(window, page, total, items))
    }
}
