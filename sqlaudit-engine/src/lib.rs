//! The sqlaudit reconciliation engine.
//!
//! Compares a baseline audit snapshot (findings plus history-derived
//! annotation state) against a freshly collected one, classifies every
//! entity's transition, resolves concurrent signals, persists annotation
//! updates, and emits idempotent action-log entries.

pub mod reconcile;
pub mod stats;

pub use reconcile::engine::SyncEngine;
pub use reconcile::types::{SyncRequest, SyncSummary};
