//! # Feed Infrastructure
//!
//! Concrete implementations of the ports defined in `feed-core`.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external dependencies, in-memory only
//! - `postgres` - PostgreSQL store via SeaORM

pub mod database;
pub mod memory;

// Re-exports - In-Memory
pub use database::{DatabaseConfig, DatabaseConnections};
pub use memory::InMemoryStore;

// Re-exports - PostgreSQL
#[cfg(feature = "postgres")]
pub use database::PostgresFeedStore;
