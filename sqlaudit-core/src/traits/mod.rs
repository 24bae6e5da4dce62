//! Provider traits — the narrow contracts the engine consumes.

pub mod action_sink;
pub mod annotations_provider;
pub mod findings_provider;

pub use action_sink::ActionSink;
pub use annotations_provider::{AnnotationMap, AnnotationsProvider};
pub use findings_provider::FindingsProvider;
