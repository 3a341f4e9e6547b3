//! Caller identity extractor.
//!
//! The identity is authenticated upstream and forwarded in a trusted header
//! (`IDENTITY_HEADER`, default `x-firebase-uid`). Handlers take [`Identity`]
//! as an argument and pass the user id explicitly into the core services.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use std::future::{Ready, ready};

use feed_core::domain::UserId;

use crate::config::DEFAULT_IDENTITY_HEADER;
use crate::middleware::error::AppError;
use crate::state::AppState;

/// Authenticated caller.
#[derive(Debug, Clone)]
pub struct Identity(pub UserId);

impl Identity {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

impl FromRequest for Identity {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let header = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.identity_header.as_str())
            .unwrap_or(DEFAULT_IDENTITY_HEADER);

        // Absent, non-UTF-8 and blank values are all unauthenticated.
        let user_id = req
            .headers()
            .get(header)
            .and_then(|value| value.to_str().ok())
            .and_then(UserId::parse);

        match user_id {
            Some(user_id) => ready(Ok(Identity(user_id))),
            None => {
                tracing::debug!(header, "Request without caller identity");
                ready(Err(AppError::Unauthenticated))
            }
        }
    }
}
