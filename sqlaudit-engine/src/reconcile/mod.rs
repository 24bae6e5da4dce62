//! Reconciliation: state machine, eligibility, diff, resolution, engine.

pub mod diff;
pub mod eligibility;
pub mod engine;
pub mod resolution;
pub mod state_machine;
pub mod types;

pub use diff::{detect_exception_changes, ExceptionChange, ExceptionChangeKind};
pub use eligibility::{is_exception_eligible, should_clear_exception_status};
pub use resolution::resolve_concurrent_changes;
pub use state_machine::classify_finding_transition;
