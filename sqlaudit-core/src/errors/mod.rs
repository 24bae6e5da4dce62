//! Error handling for sqlaudit.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod storage_error;
pub mod sync_error;

pub use config_error::ConfigError;
pub use error_code::AuditErrorCode;
pub use storage_error::StorageError;
pub use sync_error::SyncError;
