//! HTTP handlers and route configuration.

mod feed;
mod health;
mod interests;
mod likes;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;

use crate::middleware::error::extractor_error;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(extractor_error))
        .app_data(web::QueryConfig::default().error_handler(extractor_error))
        .app_data(web::PathConfig::default().error_handler(extractor_error))
        // Public routes
        .route("/", web::get().to(health::banner))
        .route("/health", web::get().to(health::health_check))
        .route("/interests", web::get().to(interests::list_interests))
        .service(
            web::scope("/posts")
                .route("", web::get().to(posts::list_posts))
                .route("", web::post().to(posts::create_post))
                // Must precede `/{post_id}`
                .route("/feed", web::get().to(feed::personalized_feed))
                .route("/{post_id}", web::get().to(posts::get_post))
                .route("/{post_id}", web::put().to(posts::replace_post))
                .route("/{post_id}", web::patch().to(posts::patch_post))
                .route("/{post_id}", web::delete().to(posts::delete_post))
                .route("/{post_id}/interests", web::get().to(interests::post_interests))
                .route("/{post_id}/interests", web::post().to(interests::add_interests))
                .route(
                    "/{post_id}/interests/{interest_id}",
                    web::delete().to(interests::remove_interest),
                )
                .route("/{post_id}/like", web::post().to(likes::like_post))
                .route("/{post_id}/like", web::delete().to(likes::unlike_post)),
        );
}
