//! Post collection and item handlers.

use actix_web::{HttpResponse, http::header, web};

use feed_core::domain::{PageRequest, PostId, PostView};
use feed_shared::PageResponse;
use feed_shared::dto::{DeletedResponse, ListPostsQuery, PatchPostRequest, PostRequest};

use crate::middleware::conditional::{IfMatchHeader, IfNoneMatchHeader, etag_header};
use crate::middleware::error::AppResult;
use crate::middleware::identity::Identity;
use crate::state::AppState;

/// GET /posts
pub async fn list_posts(
    state: web::Data<AppState>,
    _identity: Identity,
    query: web::Query<ListPostsQuery>,
) -> AppResult<HttpResponse> {
    let page = PageRequest::new(query.skip, query.limit)?;
    let feed = &state.services.feed;

    let posts = feed.list_posts(query.filter(), page).await?;
    let etag = posts.etag();
    let collection = feed.aggregator().links().href("/posts");

    Ok(HttpResponse::Ok()
        .insert_header(etag_header(&etag))
        .json(PageResponse::from_page(posts, &collection, &query.filter_query())))
}

/// GET /posts/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<PostId>,
    if_none_match: IfNoneMatchHeader,
) -> AppResult<HttpResponse> {
    let view = state.services.feed.get_post(path.into_inner()).await?;

    if if_none_match.is_fresh(&view.etag) {
        return Ok(HttpResponse::NotModified()
            .insert_header(etag_header(&view.etag))
            .finish());
    }
    Ok(item(view))
}

/// POST /posts
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .services
        .mutations
        .create(identity.user_id(), body.into_inner().into())
        .await?;
    let view = state.services.feed.aggregator().enrich(post).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, view.links.self_link.href.clone()))
        .insert_header(etag_header(&view.etag))
        .json(view))
}

/// PUT /posts/{post_id}
pub async fn replace_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<PostId>,
    if_match: IfMatchHeader,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .services
        .mutations
        .full_update(path.into_inner(), body.into_inner().into(), if_match.tags())
        .await?;
    let view = state.services.feed.aggregator().enrich(post).await?;
    Ok(item(view))
}

/// PATCH /posts/{post_id}
pub async fn patch_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<PostId>,
    if_match: IfMatchHeader,
    body: web::Json<PatchPostRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .services
        .mutations
        .partial_update(path.into_inner(), body.into_inner(), if_match.tags())
        .await?;
    let view = state.services.feed.aggregator().enrich(post).await?;
    Ok(item(view))
}

/// DELETE /posts/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<PostId>,
    if_match: IfMatchHeader,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state
        .services
        .mutations
        .delete(post_id, if_match.tags())
        .await?;

    Ok(HttpResponse::Ok().json(DeletedResponse::new(post_id)))
}

fn item(view: PostView) -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(etag_header(&view.etag))
        .json(view)
}
