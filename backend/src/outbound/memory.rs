//! In-memory document store.
//!
//! Backs both collection ports with dashmap so the per-entry locks give the
//! atomicity the ports demand: `record_vote` checks and inserts under the
//! voter's entry lock, and the score increments hold only the affected
//! entry. Votes touching different records never contend.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::ports::{
    ListWindow, PostFilter, PostStore, PostStoreError, SortOrder, UserStore, UserStoreError,
};
use crate::domain::post::{Post, PostId};
use crate::domain::user::{User, UserId};

/// Dashmap-backed store for posts and users.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: DashMap<PostId, Post>,
    users: DashMap<UserId, User>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace a post record directly. Test and bootstrap helper.
    pub fn insert_post(&self, post: &Post) {
        self.posts.insert(post.id, post.clone());
    }

    /// Seed or replace a user record directly. Test and bootstrap helper.
    pub fn insert_user(&self, user: &User) {
        self.users.insert(user.id, user.clone());
    }

    /// Snapshot one post.
    #[must_use]
    pub fn post(&self, id: &PostId) -> Option<Post> {
        self.posts.get(id).map(|entry| entry.clone())
    }

    /// Snapshot one user.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.users.get(id).map(|entry| entry.clone())
    }

    /// Number of stored posts.
    #[must_use]
    pub fn post_count(&self) -> usize {
        self.posts.len()
    }

    fn matches(filter: &PostFilter, post: &Post) -> bool {
        match filter {
            PostFilter::All => true,
            PostFilter::Author(author) => post.author_id == *author,
            PostFilter::TitleOrUrlContains(needle) => {
                let needle = needle.to_lowercase();
                post.title.to_lowercase().contains(&needle)
                    || post.url.to_lowercase().contains(&needle)
            }
        }
    }

    fn filtered(&self, filter: &PostFilter) -> Vec<Post> {
        self.posts
            .iter()
            .filter(|entry| Self::matches(filter, entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert(&self, post: &Post) -> Result<(), PostStoreError> {
        self.posts.insert(post.id, post.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PostId) -> Result<Option<Post>, PostStoreError> {
        Ok(self.post(id))
    }

    async fn count(&self, filter: &PostFilter) -> Result<u64, PostStoreError> {
        let count = self
            .posts
            .iter()
            .filter(|entry| Self::matches(filter, entry.value()))
            .count();
        Ok(count as u64)
    }

    async fn list(
        &self,
        filter: &PostFilter,
        order: SortOrder,
        window: ListWindow,
    ) -> Result<Vec<Post>, PostStoreError> {
        let mut posts = self.filtered(filter);
        match order {
            SortOrder::Created => posts.sort_by(|a, b| b.created.cmp(&a.created)),
            SortOrder::Score => posts.sort_by(|a, b| {
                b.score
                    .cmp(&a.score)
                    .then_with(|| b.created.cmp(&a.created))
            }),
        }
        Ok(posts
            .into_iter()
            .skip(usize::try_from(window.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(window.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn increment_score(&self, id: &PostId, delta: i64) -> Result<(), PostStoreError> {
        let mut post = self
            .posts
            .get_mut(id)
            .ok_or(PostStoreError::Missing { id: *id })?;
        post.score += delta;
        Ok(())
    }

    async fn remove(&self, id: &PostId) -> Result<(), PostStoreError> {
        self.posts.remove(id);
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserStoreError> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserStoreError> {
        Ok(self.user(id))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, UserStoreError> {
        Ok(self
            .users
            .iter()
            .find(|entry| entry.value().name == name)
            .map(|entry| entry.value().clone()))
    }

    async fn increment_total_score(&self, id: &UserId, delta: i64) -> Result<(), UserStoreError> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or(UserStoreError::Missing { id: *id })?;
        user.total_score += delta;
        Ok(())
    }

    async fn record_vote(&self, voter: &UserId, post: &PostId) -> Result<bool, UserStoreError> {
        // The entry lock held by get_mut makes the membership check and the
        // insert one atomic step per voter.
        let mut user = self
            .users
            .get_mut(voter)
            .ok_or(UserStoreError::Missing { id: *voter })?;
        Ok(user.votes.insert(*post))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rstest::rstest;

    use super::*;

    fn post(author: UserId, title: &str, score: i64, age: i64) -> Post {
        Post {
            id: PostId::generate(),
            title: title.to_owned(),
            url: format!("https://example.test/{title}"),
            comment: String::new(),
            image: "cafe.jpg".to_owned(),
            score,
            created: Utc::now() - Duration::seconds(age),
            author_id: author,
        }
    }

    #[actix_rt::test]
    async fn record_vote_inserts_once() {
        let store = MemoryStore::new();
        let user = User::new("v", "v@example.test");
        store.insert_user(&user);
        let post_id = PostId::generate();

        assert!(store.record_vote(&user.id, &post_id).await.expect("vote"));
        assert!(!store.record_vote(&user.id, &post_id).await.expect("vote"));
        assert_eq!(store.user(&user.id).expect("user").votes.len(), 1);
    }

    #[actix_rt::test]
    async fn record_vote_for_unknown_voter_is_missing() {
        let store = MemoryStore::new();
        let voter = UserId::generate();
        let err = store
            .record_vote(&voter, &PostId::generate())
            .await
            .expect_err("missing voter");
        assert_eq!(err, UserStoreError::Missing { id: voter });
    }

    #[actix_rt::test]
    async fn increment_score_targets_one_post() {
        let store = MemoryStore::new();
        let author = UserId::generate();
        let first = post(author, "first", 1, 0);
        let second = post(author, "second", 1, 1);
        store.insert_post(&first);
        store.insert_post(&second);

        store
            .increment_score(&first.id, -1)
            .await
            .expect("increment");
        assert_eq!(store.post(&first.id).expect("first").score, 0);
        assert_eq!(store.post(&second.id).expect("second").score, 1);
    }

    #[actix_rt::test]
    async fn list_windows_are_sorted_and_offset() {
        let store = MemoryStore::new();
        let author = UserId::generate();
        for n in 0..5 {
            store.insert_post(&post(author, &format!("p{n}"), n, n));
        }

        let page = store
            .list(
                &PostFilter::All,
                SortOrder::Created,
                ListWindow { skip: 2, limit: 2 },
            )
            .await
            .expect("list");
        let titles: Vec<&str> = page.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["p2", "p3"]);
    }

    #[rstest]
    #[case("P1", 1)]
    #[case("example.test", 5)]
    #[case("nothing-like-this", 0)]
    fn search_filter_counts(#[case] needle: &str, #[case] expected: u64) {
        let store = MemoryStore::new();
        let author = UserId::generate();
        for n in 0..5 {
            store.insert_post(&post(author, &format!("p{n}"), 0, n));
        }
        let filter = PostFilter::TitleOrUrlContains(needle.to_owned());
        let count = futures::executor::block_on(store.count(&filter)).expect("count");
        assert_eq!(count, expected);
    }
}
