//! SeaORM entities for the feed schema.

pub mod follow;
pub mod interest;
pub mod post;
pub mod post_interest;
pub mod post_like;
