use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interest::Interest;
use super::post::{Post, PostId, UserId};
use crate::etag::EntityTag;

/// A navigational reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Links embedded in every item-shaped post response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub collection: Link,
    pub interests: Link,
    pub likes: Link,
    pub author: Link,
}

/// Builds link targets relative to the public base URL of the service.
#[derive(Debug, Clone, Default)]
pub struct LinkBuilder {
    base_url: String,
}

impl LinkBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn href(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn post(&self, post_id: PostId) -> String {
        self.href(&format!("/posts/{post_id}"))
    }

    pub fn for_post(&self, post: &Post) -> PostLinks {
        let own = self.post(post.post_id);
        PostLinks {
            self_link: Link::new(own.clone()),
            collection: Link::new(self.href("/posts")),
            interests: Link::new(format!("{own}/interests")),
            likes: Link::new(format!("{own}/like")),
            author: Link::new(self.href(&format!("/users/{}", post.created_by))),
        }
    }
}

/// A post joined with its interests, live like count and links.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub post_id: PostId,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub interests: Vec<Interest>,
    pub likes_count: u64,
    pub links: PostLinks,
    /// Sent as the `ETag` header rather than in the body.
    #[serde(skip)]
    pub etag: EntityTag,
}

/// Outcome of a like toggle, counted after the toggle was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeStatus {
    pub post_id: PostId,
    pub likes_count: u64,
    pub liked: bool,
}
