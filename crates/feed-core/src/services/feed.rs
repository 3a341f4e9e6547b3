use std::sync::Arc;

use crate::domain::{Interest, Page, PageRequest, PostFilter, PostId, PostQuery, PostView, UserId};
use crate::error::DomainError;
use crate::etag::EntityTag;
use crate::ports::{FollowGraph, PostStore};

use super::PostAggregator;

/// Read paths: single post, filtered listing and the personalized feed.
pub struct FeedQueryPlanner {
    store: Arc<dyn PostStore>,
    follows: Arc<dyn FollowGraph>,
    aggregator: PostAggregator,
}

impl FeedQueryPlanner {
    pub fn new(
        store: Arc<dyn PostStore>,
        follows: Arc<dyn FollowGraph>,
        aggregator: PostAggregator,
    ) -> Self {
        Self {
            store,
            follows,
            aggregator,
        }
    }

    pub fn aggregator(&self) -> &PostAggregator {
        &self.aggregator
    }

    pub async fn get_post(&self, post_id: PostId) -> Result<PostView, DomainError> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        self.aggregator.enrich(post).await
    }

    /// Interests of a post together with the post's current tag.
    pub async fn post_interests(
        &self,
        post_id: PostId,
    ) -> Result<(Vec<Interest>, EntityTag), DomainError> {
        let post = self
            .store
            .find_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        let interests = self.aggregator.interests(&post).await?;
        Ok((interests, EntityTag::compute(&post)))
    }

    pub async fn list_posts(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<Page<PostView>, DomainError> {
        self.run(PostQuery {
            filter: filter.normalized(),
            authors: None,
            page,
        })
        .await
    }

    /// Posts by everyone `viewer` follows, newest first.
    pub async fn personalized_feed(
        &self,
        viewer: &UserId,
        page: PageRequest,
    ) -> Result<Page<PostView>, DomainError> {
        let followees = self.follows.followees(viewer).await?;
        if followees.is_empty() {
            tracing::debug!(viewer = %viewer, "Viewer follows nobody; feed is empty");
            return Ok(Page::empty(page));
        }

        self.run(PostQuery {
            filter: PostFilter::default(),
            authors: Some(followees),
            page,
        })
        .await
    }

    async fn run(&self, query: PostQuery) -> Result<Page<PostView>, DomainError> {
        let (posts, total) = self.store.find_posts(&query).await?;
        let items = self.aggregator.enrich_all(posts).await?;

        Ok(Page {
            items,
            total,
            skip: query.page.skip,
            limit: query.page.limit,
        })
    }
}
