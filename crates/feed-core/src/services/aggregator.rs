use std::sync::Arc;

use crate::domain::{Interest, LinkBuilder, Post, PostView};
use crate::error::DomainError;
use crate::etag::EntityTag;
use crate::ports::{InterestCatalog, PostStore};

/// Joins a post with its interests, live like count and links.
#[derive(Clone)]
pub struct PostAggregator {
    store: Arc<dyn PostStore>,
    catalog: Arc<dyn InterestCatalog>,
    links: LinkBuilder,
}

impl PostAggregator {
    pub fn new(
        store: Arc<dyn PostStore>,
        catalog: Arc<dyn InterestCatalog>,
        links: LinkBuilder,
    ) -> Self {
        Self {
            store,
            catalog,
            links,
        }
    }

    pub fn links(&self) -> &LinkBuilder {
        &self.links
    }

    /// Interests for exactly the ids the post carries, ordered by id.
    pub async fn interests(&self, post: &Post) -> Result<Vec<Interest>, DomainError> {
        let mut interests = self.catalog.find_interests(&post.interest_ids).await?;
        interests.sort_by_key(|interest| interest.interest_id);
        Ok(interests)
    }

    pub async fn enrich(&self, post: Post) -> Result<PostView, DomainError> {
        let interests = self.interests(&post).await?;
        let likes_count = self.store.count_likes(post.post_id).await?;
        let etag = EntityTag::compute(&post);
        let links = self.links.for_post(&post);

        Ok(PostView {
            post_id: post.post_id,
            title: post.title,
            body: post.body,
            image_url: post.image_url,
            created_by: post.created_by,
            created_at: post.created_at,
            updated_at: post.updated_at,
            interests,
            likes_count,
            links,
            etag,
        })
    }

    pub async fn enrich_all(&self, posts: Vec<Post>) -> Result<Vec<PostView>, DomainError> {
        let mut views = Vec::with_capacity(posts.len());
        for post in posts {
            views.push(self.enrich(post).await?);
        }
        Ok(views)
    }
}
