//! Interest catalog and per-post interest sub-resource.

use actix_web::{HttpResponse, web};

use feed_core::domain::{InterestId, Post, PostId};
use feed_core::EntityTag;
use feed_shared::dto::{AddInterestsRequest, PostInterestsResponse};

use crate::middleware::conditional::{IfMatchHeader, etag_header};
use crate::middleware::error::AppResult;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// GET /interests
pub async fn list_interests(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let interests = state.catalog.list_interests().await?;
    Ok(HttpResponse::Ok().json(interests))
}

/// GET /posts/{post_id}/interests
pub async fn post_interests(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    let (interests, etag) = state.services.feed.post_interests(post_id).await?;

    Ok(HttpResponse::Ok()
        .insert_header(etag_header(&etag))
        .json(PostInterestsResponse { post_id, interests }))
}

/// POST /posts/{post_id}/interests
pub async fn add_interests(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<PostId>,
    if_match: IfMatchHeader,
    body: web::Json<AddInterestsRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .services
        .mutations
        .add_interests(path.into_inner(), body.into_inner().interest_ids, if_match.tags())
        .await?;
    interest_set(&state, post).await
}

/// DELETE /posts/{post_id}/interests/{interest_id}
pub async fn remove_interest(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<(PostId, InterestId)>,
    if_match: IfMatchHeader,
) -> AppResult<HttpResponse> {
    let (post_id, interest_id) = path.into_inner();
    let post = state
        .services
        .mutations
        .remove_interest(post_id, interest_id, if_match.tags())
        .await?;
    interest_set(&state, post).await
}

async fn interest_set(state: &AppState, post: Post) -> AppResult<HttpResponse> {
    let interests = state.services.feed.aggregator().interests(&post).await?;
    Ok(HttpResponse::Ok()
        .insert_header(etag_header(&EntityTag::compute(&post)))
        .json(PostInterestsResponse {
            post_id: post.post_id,
            interests,
        }))
}
