//! Personalized feed.

use actix_web::{HttpResponse, web};

use feed_core::domain::PageRequest;
use feed_shared::PageResponse;
use feed_shared::dto::PageQuery;

use crate::middleware::conditional::etag_header;
use crate::middleware::error::AppResult;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// GET /posts/feed
///
/// Posts by everyone the caller follows, newest first.
pub async fn personalized_feed(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.skip, query.limit)?;
    let feed = &state.services.feed;

    let posts = feed.personalized_feed(identity.user_id(), page).await?;
    let etag = posts.etag();
    let collection = feed.aggregator().links().href("/posts/feed");

    Ok(HttpResponse::Ok()
        .insert_header(etag_header(&etag))
        .json(PageResponse::from_page(posts, &collection, "")))
}
