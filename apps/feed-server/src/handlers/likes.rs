//! Like toggles. Both verbs are idempotent and report the fresh count.

use actix_web::{HttpResponse, web};

use feed_core::domain::PostId;

use crate::middleware::error::AppResult;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// POST /posts/{post_id}/like
pub async fn like_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let status = state
        .services
        .likes
        .like(path.into_inner(), identity.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(status))
}

/// DELETE /posts/{post_id}/like
pub async fn unlike_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<PostId>,
) -> AppResult<HttpResponse> {
    let status = state
        .services
        .likes
        .unlike(path.into_inner(), identity.user_id())
        .await?;
    Ok(HttpResponse::Ok().json(status))
}
