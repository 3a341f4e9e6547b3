//! Health check and service banner.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
    pub storage: &'static str,
    pub timestamp: String,
}

/// Health check endpoint - returns server status.
///
/// GET /health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let reachable = match &state.db {
        Some(db) => database_reachable(db).await,
        None => true,
    };
    let status = if reachable { "ok" } else { "degraded" };

    let response = HealthResponse {
        status,
        service: state.service_name.clone(),
        version: env!("CARGO_PKG_VERSION"),
        storage: state.storage,
        timestamp: chrono::Utc::now().to_rfc3339(),
    };

    if reachable {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

/// GET /
pub async fn banner(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": state.service_name,
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/health",
        "posts": "/posts",
    }))
}

#[cfg(feature = "postgres")]
async fn database_reachable(db: &feed_infra::DatabaseConnections) -> bool {
    db.ping().await
}

#[cfg(not(feature = "postgres"))]
async fn database_reachable(_db: &feed_infra::DatabaseConnections) -> bool {
    true
}
