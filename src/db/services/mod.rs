//! The `services` module provides a high-level API for interacting with the database.
//! It encapsulates the SQL logic and data access patterns, allowing the HTTP
//! handlers to work with domain models without knowing the underlying schema.
//!
//! Public items from the sub-modules are re-exported here for convenient access
//! under the `crate::db::services::` path.

pub mod bookmark_query;
pub mod bookmark_service;
pub mod tag_service;
pub mod user_service;

pub use bookmark_query::*;
pub use bookmark_service::*;
pub use tag_service::*;
pub use user_service::*;
