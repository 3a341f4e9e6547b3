//! In-memory store - used when no database is configured and in tests.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use feed_core::domain::{
    Interest, InterestId, LikeStatus, NewPost, Post, PostChange, PostId, PostQuery, UserId,
};
use feed_core::error::RepoError;
use feed_core::ports::{FollowGraph, InterestCatalog, PostStore, WriteOutcome};


#[derive(Default)]
struct State {
    last_post_id: PostId,
    posts: BTreeMap<PostId, Post>,
    likes: BTreeMap<(PostId, UserId), DateTime<Utc>>,
    interests: BTreeMap<InterestId, String>,
    follows: BTreeSet<(UserId, UserId)>,
}

impl State {
    fn like_count(&self, post_id: PostId) -> u64 {
        self.likes
            .range((post_id, UserId::from(String::new()))..)
            .take_while(|((id, _), _)| *id == post_id)
            .count() as u64
    }
}

/// Every port implemented over a single async `RwLock`.
///
/// Each operation takes the lock once, so conditional writes and like toggles
/// are atomic with respect to each other. Data is lost on process restart.
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    /// Start with a seeded interest catalog.
    pub fn with_interests<'a>(interests: impl IntoIterator<Item = (InterestId, &'a str)>) -> Self {
        let state = State {
            interests: interests
                .into_iter()
                .map(|(id, name)| (id, name.to_string()))
                .collect(),
            ..State::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn follow(&self, follower: &UserId, followee: &UserId) {
        let mut state = self.state.write().await;
        state.follows.insert((follower.clone(), followee.clone()));
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn satisfies(post: &Post, query: &PostQuery) -> bool {
    let filter = &query.filter;
    if let Some(interest_id) = filter.interest_id {
        if !post.interest_ids.contains(&interest_id) {
            return false;
        }
    }
    if let Some(creator) = &filter.created_by {
        if &post.created_by != creator {
            return false;
        }
    }
    if let Some(authors) = &query.authors {
        if !authors.contains(&post.created_by) {
            return false;
        }
    }
    if let Some(term) = &filter.search {
        let term = term.to_lowercase();
        if !post.title.to_lowercase().contains(&term) && !post.body.to_lowercase().contains(&term)
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl PostStore for InMemoryStore {
    async fn find_post(&self, post_id: PostId) -> Result<Option<Post>, RepoError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&post_id).cloned())
    }

    async fn insert_post(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut state = self.state.write().await;
        if let Some(missing) = post
            .interest_ids
            .iter()
            .find(|id| !state.interests.contains_key(*id))
        {
            return Err(RepoError::Constraint(format!(
                "interest {missing} does not exist"
            )));
        }

        state.last_post_id += 1;
        let post = post.into_post(state.last_post_id);
        state.posts.insert(post.post_id, post.clone());
        Ok(post)
    }

    async fn update_post_if(
        &self,
        post_id: PostId,
        precondition: &(dyn for<'p> Fn(&'p Post) -> bool + Send + Sync),
        change: PostChange,
    ) -> Result<WriteOutcome<Post>, RepoError> {
        let mut state = self.state.write().await;
        let Some(current) = state.posts.get(&post_id) else {
            return Ok(WriteOutcome::Missing);
        };
        if !precondition(current) {
            return Ok(WriteOutcome::Rejected);
        }

        let mut updated = current.clone();
        updated.apply(change);
        if let Some(missing) = updated
            .interest_ids
            .iter()
            .find(|id| !state.interests.contains_key(*id))
        {
            return Err(RepoError::Constraint(format!(
                "interest {missing} does not exist"
            )));
        }
        state.posts.insert(post_id, updated.clone());
        Ok(WriteOutcome::Applied(updated))
    }

    async fn delete_post_if(
        &self,
        post_id: PostId,
        precondition: &(dyn for<'p> Fn(&'p Post) -> bool + Send + Sync),
    ) -> Result<WriteOutcome<()>, RepoError> {
        let mut state = self.state.write().await;
        let Some(current) = state.posts.get(&post_id) else {
            return Ok(WriteOutcome::Missing);
        };
        if !precondition(current) {
            return Ok(WriteOutcome::Rejected);
        }

        state.likes.retain(|(id, _), _| *id != post_id);
        state.posts.remove(&post_id);
        Ok(WriteOutcome::Applied(()))
    }

    async fn find_posts(&self, query: &PostQuery) -> Result<(Vec<Post>, u64), RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<&Post> = state
            .posts
            .values()
            .filter(|post| satisfies(post, query))
            .collect();
        found.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.post_id.cmp(&a.post_id))
        });

        let total = found.len() as u64;
        let page = found
            .into_iter()
            .skip(query.page.skip as usize)
            .take(query.page.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn count_likes(&self, post_id: PostId) -> Result<u64, RepoError> {
        let state = self.state.read().await;
        Ok(state.like_count(post_id))
    }

    async fn set_like(
        &self,
        post_id: PostId,
        user_id: &UserId,
        liked: bool,
        at: DateTime<Utc>,
    ) -> Result<Option<LikeStatus>, RepoError> {
        let mut state = self.state.write().await;
        if !state.posts.contains_key(&post_id) {
            return Ok(None);
        }

        let key = (post_id, user_id.clone());
        if liked {
            state.likes.entry(key).or_insert(at);
        } else {
            state.likes.remove(&key);
        }

        Ok(Some(LikeStatus {
            post_id,
            likes_count: state.like_count(post_id),
            liked,
        }))
    }
}

#[async_trait]
impl FollowGraph for InMemoryStore {
    async fn followees(&self, viewer: &UserId) -> Result<Vec<UserId>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|(follower, _)| follower == viewer)
            .map(|(_, followee)| followee.clone())
            .collect())
    }
}

#[async_trait]
impl InterestCatalog for InMemoryStore {
    async fn interest_exists(&self, interest_id: InterestId) -> Result<bool, RepoError> {
        let state = self.state.read().await;
        Ok(state.interests.contains_key(&interest_id))
    }

    async fn find_interests(&self, ids: &[InterestId]) -> Result<Vec<Interest>, RepoError> {
        let state = self.state.read().await;
        let mut found: Vec<Interest> = ids
            .iter()
            .filter_map(|id| {
                state.interests.get(id).map(|name| Interest {
                    interest_id: *id,
                    interest_name: name.clone(),
                })
            })
            .collect();
        found.sort_by_key(|interest| interest.interest_id);
        found.dedup_by_key(|interest| interest.interest_id);
        Ok(found)
    }

    async fn list_interests(&self) -> Result<Vec<Interest>, RepoError> {
        let state = self.state.read().await;
        let mut all: Vec<Interest> = state
            .interests
            .iter()
            .map(|(id, name)| Interest {
                interest_id: *id,
                interest_name: name.clone(),
            })
            .collect();
        all.sort_by(|a, b| a.interest_name.cmp(&b.interest_name));
        Ok(all)
    }
}
