use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::field::Field;
use super::interest::{InterestId, normalize_interest_ids};

pub type PostId = i64;

/// Opaque identity of a user, as asserted by the upstream gateway.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Accept a raw identifier, rejecting blank values.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current time at the resolution the store keeps (microseconds).
pub fn store_time_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Post entity as persisted, including its interest associations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub post_id: PostId,
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Sorted ascending, no duplicates.
    pub interest_ids: Vec<InterestId>,
}

impl Post {
    /// The `updated_at` to stamp on the next successful mutation.
    ///
    /// Strictly greater than the current value even if the clock has not
    /// advanced past it, so every mutation changes the entity tag.
    pub fn next_updated_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.max(self.updated_at + Duration::microseconds(1))
    }

    /// Apply a change in place. Used by stores after the precondition holds.
    pub fn apply(&mut self, change: PostChange) {
        let PostChange { patch, touched_at } = change;
        self.updated_at = self.next_updated_at(touched_at);
        patch.title.apply_to(&mut self.title);
        patch.body.apply_to(&mut self.body);
        patch.image_url.apply_to(&mut self.image_url);
        patch
            .interest_ids
            .map(normalize_interest_ids)
            .apply_to(&mut self.interest_ids);
    }
}

/// Caller-supplied content for create and full update.
#[derive(Debug, Clone, Default)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub interest_ids: Vec<InterestId>,
}

impl PostDraft {
    /// A patch that replaces every mutable field.
    pub fn into_patch(self) -> PostPatch {
        PostPatch {
            title: Field::Present(self.title),
            body: Field::Present(self.body),
            image_url: Field::Present(self.image_url),
            interest_ids: Field::Present(self.interest_ids),
        }
    }
}

/// Partial update - only the present fields are overwritten.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PostPatch {
    pub title: Field<String>,
    pub body: Field<String>,
    pub image_url: Field<Option<String>>,
    pub interest_ids: Field<Vec<InterestId>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        !(self.title.is_present()
            || self.body.is_present()
            || self.image_url.is_present()
            || self.interest_ids.is_present())
    }
}

/// A validated patch stamped with the time of the write.
#[derive(Debug, Clone)]
pub struct PostChange {
    pub patch: PostPatch,
    pub touched_at: DateTime<Utc>,
}

/// A validated post ready for insertion; the store assigns `post_id`.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub image_url: Option<String>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub interest_ids: Vec<InterestId>,
}

impl NewPost {
    /// Materialize the stored post once the id is known.
    pub fn into_post(self, post_id: PostId) -> Post {
        Post {
            post_id,
            title: self.title,
            body: self.body,
            image_url: self.image_url,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.created_at,
            interest_ids: self.interest_ids,
        }
    }
}
