//! Data Transfer Objects - request types for the API.

use serde::{Deserialize, Serialize};

use feed_core::domain::{Interest, InterestId, PostDraft, PostFilter, PostId, PostPatch, UserId};

/// Body of `POST /posts` and `PUT /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub interest_ids: Vec<InterestId>,
}

impl From<PostRequest> for PostDraft {
    fn from(req: PostRequest) -> Self {
        Self {
            title: req.title,
            body: req.body,
            image_url: req.image_url,
            interest_ids: req.interest_ids,
        }
    }
}

/// Body of `PATCH /posts/{id}`; omitted fields are left untouched.
pub type PatchPostRequest = PostPatch;

/// Body of `POST /posts/{id}/interests`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddInterestsRequest {
    pub interest_ids: Vec<InterestId>,
}

/// Interest set of one post, ordered by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostInterestsResponse {
    pub post_id: PostId,
    pub interests: Vec<Interest>,
}

/// Query string of `GET /posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPostsQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub interest_id: Option<InterestId>,
    pub created_by: Option<String>,
    pub search: Option<String>,
}

impl ListPostsQuery {
    pub fn filter(&self) -> PostFilter {
        PostFilter {
            interest_id: self.interest_id,
            created_by: self.created_by.as_deref().and_then(UserId::parse),
            search: self.search.clone(),
        }
    }

    /// Supplied filters as an encoded query string, e.g.
    /// `interest_id=2&search=rust+tips`. Empty when unfiltered.
    pub fn filter_query(&self) -> String {
        let params = FilterParams {
            interest_id: self.interest_id,
            created_by: self.created_by.as_deref(),
            search: self.search.as_deref(),
        };
        serde_urlencoded::to_string(params).unwrap_or_default()
    }
}

#[derive(Serialize)]
struct FilterParams<'a> {
    interest_id: Option<InterestId>,
    created_by: Option<&'a str>,
    search: Option<&'a str>,
}

/// Query string of `GET /posts/feed`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

/// Response of `DELETE /posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub status: String,
    pub post_id: PostId,
}

impl DeletedResponse {
    pub fn new(post_id: PostId) -> Self {
        Self {
            status: "deleted".to_string(),
            post_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_encodes_supplied_filters() {
        let query = ListPostsQuery {
            skip: Some(10),
            interest_id: Some(2),
            search: Some("50% & more".to_string()),
            ..Default::default()
        };
        assert_eq!(query.filter_query(), "interest_id=2&search=50%25+%26+more");
        assert_eq!(ListPostsQuery::default().filter_query(), "");
    }
}
