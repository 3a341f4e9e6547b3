//! Entity tags - fingerprints of a post's mutable state.
//!
//! A tag is the SHA-256 of the canonical bytes of every field that can change
//! after creation. Fields are length-prefixed so that no two distinct states
//! share an encoding.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::domain::{InterestId, Post, normalize_interest_ids};

/// Strong entity tag, rendered in headers as a quoted string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct EntityTag(String);

impl EntityTag {
    /// Compute the tag for the current state of a post.
    pub fn compute(post: &Post) -> Self {
        let mut hasher = Canonical::new();
        hasher.int(post.post_id);
        hasher.text(&post.title);
        hasher.text(&post.body);
        match &post.image_url {
            Some(url) => {
                hasher.int(1);
                hasher.text(url);
            }
            None => hasher.int(0),
        }
        hasher.int(post.updated_at.timestamp_micros());
        hasher.interests(&post.interest_ids);
        hasher.finish()
    }

    /// Tag for a page of results: item tags in order plus the window.
    pub fn for_page<'a>(
        items: impl IntoIterator<Item = &'a EntityTag>,
        total: u64,
        skip: u64,
        limit: u64,
    ) -> Self {
        let mut hasher = Canonical::new();
        for tag in items {
            hasher.text(tag.as_str());
        }
        hasher.int(total as i64);
        hasher.int(skip as i64);
        hasher.int(limit as i64);
        hasher.finish()
    }

    /// Parse a single tag as sent by a client (`"abc"`, `W/"abc"` or `abc`).
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let unprefixed = trimmed.strip_prefix("W/").unwrap_or(trimmed);
        let opaque = unprefixed.trim_matches('"').trim();
        if opaque.is_empty() {
            None
        } else {
            Some(Self(opaque.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Header form, e.g. `"3f2a..."`.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The tags a conditional request was made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IfMatch {
    /// `*`: any current representation (RFC 9110, section 13.1.1).
    Any,
    Tags(Vec<EntityTag>),
}

impl IfMatch {
    /// Parse a header value: `*` or a comma-separated tag list. Returns
    /// `None` if no tag is present.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.trim() == "*" {
            return Some(Self::Any);
        }
        let tags: Vec<EntityTag> = raw.split(',').filter_map(EntityTag::parse).collect();
        if tags.is_empty() { None } else { Some(Self::Tags(tags)) }
    }

    pub fn matches(&self, current: &EntityTag) -> bool {
        match self {
            Self::Any => true,
            Self::Tags(tags) => tags.iter().any(|tag| tag == current),
        }
    }
}

impl From<EntityTag> for IfMatch {
    fn from(tag: EntityTag) -> Self {
        Self::Tags(vec![tag])
    }
}

struct Canonical(Sha256);

impl Canonical {
    fn new() -> Self {
        Self(Sha256::new())
    }

    fn int(&mut self, value: i64) {
        self.0.update(value.to_le_bytes());
    }

    fn text(&mut self, value: &str) {
        self.0.update((value.len() as u64).to_le_bytes());
        self.0.update(value.as_bytes());
    }

    fn interests(&mut self, ids: &[InterestId]) {
        let ids = normalize_interest_ids(ids.to_vec());
        self.0.update((ids.len() as u64).to_le_bytes());
        for id in ids {
            self.0.update(id.to_le_bytes());
        }
    }

    fn finish(self) -> EntityTag {
        EntityTag(hex::encode(self.0.finalize()))
    }
}
