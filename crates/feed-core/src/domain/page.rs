use serde::Serialize;

use super::interest::InterestId;
use super::post::UserId;
use super::view::PostView;
use crate::etag::EntityTag;
use crate::error::DomainError;

pub const DEFAULT_LIMIT: u64 = 10;
pub const MAX_LIMIT: u64 = 100;

/// Validated pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: u64,
    pub limit: u64,
}

impl PageRequest {
    /// Validate raw query values.
    ///
    /// A negative `skip` is rejected. `limit` falls back to the default when
    /// missing or below one and is clamped to the maximum.
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Result<Self, DomainError> {
        let skip = match skip {
            None => 0,
            Some(s) if s < 0 => {
                return Err(DomainError::Validation(format!(
                    "skip must be non-negative, got {s}"
                )));
            }
            Some(s) => s as u64,
        };
        let limit = match limit {
            Some(l) if l >= 1 => (l as u64).min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        Ok(Self { skip, limit })
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Conjunctive listing filters; `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub interest_id: Option<InterestId>,
    pub created_by: Option<UserId>,
    /// Case-insensitive substring of title or body.
    pub search: Option<String>,
}

impl PostFilter {
    /// Drop blank search terms so they do not constrain the result.
    pub fn normalized(mut self) -> Self {
        self.search = self
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        self
    }
}

/// Everything the store needs to produce one page of posts.
///
/// Rows are ordered newest first (`created_at` then `post_id`, both
/// descending) before the window is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    pub filter: PostFilter,
    /// Restrict to these authors. An empty set matches nothing.
    pub authors: Option<Vec<UserId>>,
    pub page: PageRequest,
}

/// One window of a result set plus the size of the whole filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn empty(page: PageRequest) -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            skip: page.skip,
            limit: page.limit,
        }
    }

    pub fn has_more(&self) -> bool {
        self.skip + self.limit < self.total
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

impl Page<PostView> {
    /// Collection tag over the item tags and the window.
    pub fn etag(&self) -> EntityTag {
        EntityTag::for_page(
            self.items.iter().map(|item| &item.etag),
            self.total,
            self.skip,
            self.limit,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(PageRequest::new(None, None).unwrap().limit, DEFAULT_LIMIT);
        assert_eq!(PageRequest::new(None, Some(0)).unwrap().limit, DEFAULT_LIMIT);
        assert_eq!(PageRequest::new(None, Some(-4)).unwrap().limit, DEFAULT_LIMIT);
        assert_eq!(PageRequest::new(None, Some(500)).unwrap().limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(Some(20), Some(25)).unwrap(), PageRequest { skip: 20, limit: 25 });
    }

    #[test]
    fn test_negative_skip_is_rejected() {
        assert!(matches!(
            PageRequest::new(Some(-1), None),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = PostFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.search, None);
    }
}
