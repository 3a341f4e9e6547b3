//! # Feed Shared
//!
//! Wire types of the feed API: request bodies, query strings and response
//! envelopes.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, PageLinks, PageResponse};
