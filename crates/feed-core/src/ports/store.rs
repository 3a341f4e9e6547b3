//! Entity store port - persistence of posts, interest associations and likes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{LikeStatus, NewPost, Post, PostChange, PostId, PostQuery, UserId};
use crate::error::RepoError;

/// Check evaluated by the store against the locked, freshly read post.
///
/// Alias for the `precondition` parameter of the conditional writes.
pub type Precondition<'a> = &'a (dyn for<'p> Fn(&'p Post) -> bool + Send + Sync);

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    /// The precondition held and the write was committed.
    Applied(T),
    /// The precondition failed; nothing was written.
    Rejected,
    /// The post does not exist.
    Missing,
}

/// Store contract used by the core services.
///
/// Every method is a single atomic unit in the backing store. Conditional
/// writes must evaluate the precondition and apply the change without any
/// other writer to the same post in between.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Fetch a post with its interest ids.
    async fn find_post(&self, post_id: PostId) -> Result<Option<Post>, RepoError>;

    /// Insert a post and its interest associations.
    async fn insert_post(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Apply `change` if `precondition` holds for the current state.
    async fn update_post_if(
        &self,
        post_id: PostId,
        precondition: &(dyn for<'p> Fn(&'p Post) -> bool + Send + Sync),
        change: PostChange,
    ) -> Result<WriteOutcome<Post>, RepoError>;

    /// Remove the post, its interest associations and its likes if
    /// `precondition` holds for the current state.
    async fn delete_post_if(
        &self,
        post_id: PostId,
        precondition: &(dyn for<'p> Fn(&'p Post) -> bool + Send + Sync),
    ) -> Result<WriteOutcome<()>, RepoError>;

    /// One page of posts matching the query plus the total number of matches.
    async fn find_posts(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), RepoError>;

    /// Live like count for a post.
    async fn count_likes(&self, post_id: PostId) -> Result<u64, RepoError>;

    /// Set the like state of `(post_id, user_id)` and count afterwards.
    ///
    /// Setting the state it already has is a no-op. Returns `None` if the
    /// post does not exist.
    async fn set_like(
        &self,
        post_id: PostId,
        user_id: &UserId,
        liked: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<LikeStatus>, RepoError>;
}
