//! Middleware modules.

pub mod conditional;
pub mod cors;
pub mod error;
pub mod identity;
