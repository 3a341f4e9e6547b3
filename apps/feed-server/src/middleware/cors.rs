//! Cross-origin access for browser clients.

use actix_cors::Cors;
use actix_web::http::header;

/// Build the CORS layer for the configured origins. `*` allows any origin.
///
/// Browsers only let scripts read `ETag` and `Location` when they are
/// exposed, and clients need both for conditional writes.
pub fn cors(allowed_origins: &[String]) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .supports_credentials()
        .expose_headers([header::ETAG, header::LOCATION, header::CONTENT_TYPE])
        .max_age(3600);

    if allowed_origins.iter().any(|origin| origin == "*") {
        cors.allow_any_origin()
    } else {
        allowed_origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}
