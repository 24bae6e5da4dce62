//! SQLite persistence for sqlaudit.
//!
//! Connection management, schema migrations, the findings / annotation /
//! action-log stores, the materialized compliance view, and retention.
//! The [`Database`] handle implements the provider traits from
//! `sqlaudit-core`, so the engine never touches SQL directly.

pub mod connection;
pub mod materialized;
pub mod migrations;
pub mod providers;
pub mod queries;
pub mod retention;

pub use connection::Database;
