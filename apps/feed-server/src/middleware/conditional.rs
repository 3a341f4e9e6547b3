//! Conditional request headers (`If-Match`, `If-None-Match`) and `ETag`.

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header};
use std::future::{Ready, ready};

use feed_core::{EntityTag, IfMatch};

use crate::middleware::error::AppError;

/// Tags the client sent in `If-Match`, if any.
#[derive(Debug, Clone)]
pub struct IfMatchHeader(pub Option<IfMatch>);

impl IfMatchHeader {
    pub fn tags(&self) -> Option<&IfMatch> {
        self.0.as_ref()
    }
}

impl FromRequest for IfMatchHeader {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_tags(req, header::IF_MATCH).map(IfMatchHeader))
    }
}

/// Tags the client sent in `If-None-Match`, if any.
#[derive(Debug, Clone)]
pub struct IfNoneMatchHeader(pub Option<IfMatch>);

impl IfNoneMatchHeader {
    /// True when the client already holds `current`.
    pub fn is_fresh(&self, current: &EntityTag) -> bool {
        self.0.as_ref().is_some_and(|tags| tags.matches(current))
    }
}

impl FromRequest for IfNoneMatchHeader {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(parse_tags(req, header::IF_NONE_MATCH).map(IfNoneMatchHeader))
    }
}

fn parse_tags(req: &HttpRequest, name: header::HeaderName) -> Result<Option<IfMatch>, AppError> {
    match req.headers().get(&name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(IfMatch::parse)
            .map_err(|_| AppError::BadRequest(format!("{name} header is not valid text"))),
    }
}

/// `ETag` header pair for a response.
pub fn etag_header(tag: &EntityTag) -> (header::HeaderName, String) {
    (header::ETAG, tag.quoted())
}
