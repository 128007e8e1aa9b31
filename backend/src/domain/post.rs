//! Post aggregate: a submitted link with a locally stored image card and a
//! running vote score.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Unique post identifier.
///
/// The same generator also names the asset file derived from the post's
/// image, binding the asset 1:1 to the post that references it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(Uuid);

impl PostId {
    /// Generate a fresh, collision-resistant identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Hyphen-free hex form, used as the stem of derived asset filenames.
    #[must_use]
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for PostId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// A submitted link.
///
/// All fields are immutable after creation except `score`, which only the
/// vote ledger adjusts. `score` starts at 1: submitting counts as a
/// self-upvote and is credited to the author's aggregate at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub url: String,
    pub comment: String,
    /// Filename of the locally stored thumbnail in the uploads directory.
    pub image: String,
    pub score: i64,
    pub created: DateTime<Utc>,
    pub author_id: UserId,
}
