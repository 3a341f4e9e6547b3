//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod catalog;
mod follow;
mod store;

pub use catalog::InterestCatalog;
pub use follow::FollowGraph;
pub use store::{PostStore, Precondition, WriteOutcome};
