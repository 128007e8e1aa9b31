//! Vote ledger: applies a signed vote across the three affected records.
//!
//! A vote adjusts the post score, the author's aggregate score, and the
//! voter's vote history together. The anti-double-vote check rides on the
//! store's conditional set-insert, so concurrent votes by the same voter on
//! the same post cannot both pass; votes by different voters are never
//! serialised against each other.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use super::ports::{PostStore, UserStore};
use super::post::PostId;
use super::user::UserId;


/// Direction of a vote. Upvotes and downvotes are the same operation with
/// opposite deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    /// Signed score delta this direction applies.
    #[must_use]
    pub const fn delta(self) -> i64 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

/// Failures of a single vote application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    /// The target post does not exist.
    #[error("post {post} not found")]
    NotFound { post: PostId },
    /// Authors may not vote on their own posts.
    #[error("self-votes are rejected")]
    SelfVote,
    /// The voter has already voted on this post.
    #[error("{voter} already voted on {post}")]
    AlreadyVoted { voter: UserId, post: PostId },
    /// The vote was recorded but one of the score updates did not land.
    /// The ledger is in an inconsistent intermediate state; operators must
    /// reconcile, so this is never presented as an ordinary rejection.
    #[error("vote by {voter} on {post} partially applied: {message}")]
    Partial {
        voter: UserId,
        post: PostId,
        message: String,
    },
    /// Store failure before any record was mutated.
    #[error("vote ledger store failure: {message}")]
    Repository { message: String },
}

impl VoteError {
    fn repository(err: impl std::fmt::Display) -> Self {
        Self::Repository {
            message: err.to_string(),
        }
    }

    fn partial(voter: UserId, post: PostId, message: impl Into<String>) -> Self {
        Self::Partial {
            voter,
            post,
            message: message.into(),
        }
    }
}

/// The vote ledger service.
#[derive(Clone)]
pub struct VoteLedger<P, U> {
    posts: Arc<P>,
    users: Arc<U>,
}

impl<P, U> VoteLedger<P, U> {
    /// Create a ledger over the post and user collections.
    pub fn new(posts: Arc<P>, users: Arc<U>) -> Self {
        Self { posts, users }
    }
}

impl<P, U> VoteLedger<P, U>
where
    P: PostStore,
    U: UserStore,
{
    /// Apply exactly one signed vote from `voter` to `post_id`.
    ///
    /// Either all three records reflect the vote on return, or the error
    /// says which invariant rejected it; a [`VoteError::Partial`] means the
    /// vote was recorded but a score increment did not land.
    pub async fn apply(
        &self,
        voter: UserId,
        post_id: PostId,
        direction: VoteDirection,
    ) -> Result<(), VoteError> {
        let post = self
            .posts
            .find_by_id(&post_id)
            .await
            .map_err(VoteError::repository)?
            .ok_or(VoteError::NotFound { post: post_id })?;

        if post.author_id == voter {
            debug!(%voter, %post_id, "self-vote rejected");
            return Err(VoteError::SelfVote);
        }

        // Conditional set-insert: check and record in one atomic step.
        let recorded = self
            .users
            .record_vote(&voter, &post_id)
            .await
            .map_err(VoteError::repository)?;
        if !recorded {
            debug!(%voter, %post_id, "duplicate vote rejected");
            return Err(VoteError::AlreadyVoted {
                voter,
                post: post_id,
            });
        }

        // The vote is on the books from here; failures below leave the
        // ledger partially applied and must be surfaced for reconciliation.
        let delta = direction.delta();
        if let Err(err) = self.posts.increment_score(&post_id, delta).await {
            let partial = VoteError::partial(
                voter,
                post_id,
                format!("post score not adjusted: {err}"),
            );
            error!(%voter, %post_id, delta, %err, "vote partially applied");
            return Err(partial);
        }
        if let Err(err) = self
            .users
            .increment_total_score(&post.author_id, delta)
            .await
        {
            let partial = VoteError::partial(
                voter,
                post_id,
                format!("author total score not adjusted: {err}"),
            );
            error!(%voter, %post_id, author = %post.author_id, delta, %err, "vote partially applied");
            return Err(partial);
        }

        debug!(%voter, %post_id, delta, "vote applied");
        Ok(())
    }
}
