//! Response envelopes (RFC 7807 compliant for errors).

use serde::{Deserialize, Serialize};

use feed_core::domain::{Link, Page};

/// Navigation links of a paginated collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
    pub first: Link,
    pub last: Link,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<Link>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<Link>,
}

/// One page of a collection with totals and navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
    pub has_more: bool,
    pub links: PageLinks,
}

impl<T> PageResponse<T> {
    /// Wrap a page, building links against `collection_href` (e.g. `/posts`).
    /// `filters` is an encoded query string carried into every link so the
    /// links page through the same filtered collection.
    pub fn from_page(page: Page<T>, collection_href: &str, filters: &str) -> Self {
        let has_more = page.has_more();
        let Page {
            items,
            total,
            skip,
            limit,
        } = page;

        let at = |skip: u64| {
            let mut href = format!("{collection_href}?skip={skip}&limit={limit}");
            if !filters.is_empty() {
                href.push('&');
                href.push_str(filters);
            }
            Link::new(href)
        };
        let last_skip = if total == 0 {
            0
        } else {
            (total - 1) / limit.max(1) * limit
        };

        let links = PageLinks {
            self_link: at(skip),
            first: at(0),
            last: at(last_skip),
            next: has_more.then(|| at(skip + limit)),
            prev: (skip > 0).then(|| at(skip.saturating_sub(limit))),
        };

        Self {
            items,
            total,
            skip,
            limit,
            has_more,
            links,
        }
    }
}

/// RFC 7807 Problem Details for HTTP APIs.
///
/// See: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// A URI reference that identifies the problem type.
    #[serde(rename = "type")]
    pub error_type: String,

    /// A short, human-readable summary of the problem type.
    pub title: String,

    /// The HTTP status code.
    pub status: u16,

    /// A human-readable explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// A URI reference that identifies the specific occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
}

impl ErrorResponse {
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            error_type: "about:blank".to_string(),
            title: title.into(),
            status,
            detail: None,
            instance: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    // Common error constructors
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(400, "Bad Request").with_detail(detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(401, "Authentication Required").with_detail(detail)
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(404, "Not Found").with_detail(detail)
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(409, "Conflict").with_detail(detail)
    }

    pub fn precondition_required() -> Self {
        Self::new(428, "Precondition Required")
            .with_detail("Send the post's current ETag in an If-Match header.")
    }

    pub fn internal_error() -> Self {
        Self::new(500, "Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(skip: u64, limit: u64, total: u64) -> Page<u8> {
        Page {
            items: Vec::new(),
            total,
            skip,
            limit,
        }
    }

    #[test]
    fn test_middle_page_links() {
        let response = PageResponse::from_page(page(10, 10, 25), "/posts", "");
        assert!(response.has_more);
        assert_eq!(response.links.self_link.href, "/posts?skip=10&limit=10");
        assert_eq!(response.links.last.href, "/posts?skip=20&limit=10");
        assert_eq!(response.links.next.unwrap().href, "/posts?skip=20&limit=10");
        assert_eq!(response.links.prev.unwrap().href, "/posts?skip=0&limit=10");
    }

    #[test]
    fn test_edge_pages_omit_links() {
        let first = PageResponse::from_page(page(0, 10, 5), "/posts", "");
        assert!(first.links.prev.is_none());
        assert!(first.links.next.is_none());

        let empty = PageResponse::from_page(page(0, 10, 0), "/posts/feed", "");
        assert_eq!(empty.links.last.href, "/posts/feed?skip=0&limit=10");

        let json = serde_json::to_value(&empty).unwrap();
        assert!(json["links"].get("next").is_none());
        assert_eq!(json["links"]["self"]["href"], "/posts/feed?skip=0&limit=10");
    }

    #[test]
    fn test_links_keep_filters() {
        let response = PageResponse::from_page(page(2, 2, 5), "/posts", "interest_id=2&search=tw");
        assert_eq!(
            response.links.next.unwrap().href,
            "/posts?skip=4&limit=2&interest_id=2&search=tw"
        );
        assert_eq!(
            response.links.first.href,
            "/posts?skip=0&limit=2&interest_id=2&search=tw"
        );
    }
}
