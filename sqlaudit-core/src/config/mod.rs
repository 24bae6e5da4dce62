//! Configuration system for sqlaudit.
//! TOML-based, layered resolution: env > project > user > defaults.

pub mod audit_config;
pub mod database_config;
pub mod retention_config;
pub mod sync_config;

pub use audit_config::AuditConfig;
pub use database_config::DatabaseConfig;
pub use retention_config::RetentionConfig;
pub use sync_config::SyncConfig;
