//! # Feed Core
//!
//! The domain layer of the feed service: post mutation under optimistic
//! concurrency control and feed assembly.
//! This crate contains pure business logic; storage and the follow graph are
//! reached only through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod etag;
pub mod ports;
pub mod services;

pub use error::{DomainError, RepoError};
pub use etag::{EntityTag, IfMatch};
