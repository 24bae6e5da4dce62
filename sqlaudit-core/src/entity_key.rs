//! Entity-key normalization — the one bit-exact contract in the system.
//!
//! Both the spreadsheet reader and the findings collector must produce
//! byte-identical keys for the same entity, or every annotation diff
//! silently degrades into "new issue" / "removed" noise. All composition
//! and normalization therefore goes through this module and nowhere else.

use serde::{Deserialize, Serialize};

use crate::types::EntityType;

/// Normalized composite identifier for one audited object across runs.
///
/// Shape: `<entity_type>|<part>|<part>|...`: lowercase, each part
/// whitespace-trimmed, pipe-delimited. Lookups are case-insensitive across
/// Excel re-entry because the key is lowercased at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityKey(String);

impl EntityKey {
    /// Compose a key from stable identifying attributes, e.g.
    /// `compose(Login, &["srv1", "prod", "sa"])` → `login|srv1|prod|sa`.
    pub fn compose(entity_type: EntityType, parts: &[&str]) -> Self {
        let mut key = String::from(entity_type.wire_name());
        for part in parts {
            key.push('|');
            key.push_str(&part.trim().to_lowercase());
        }
        Self(key)
    }

    /// Normalize a raw key read back from a spreadsheet: trims each
    /// pipe-delimited segment and lowercases the whole string. Applying
    /// this to an already-normalized key is a no-op.
    pub fn normalize(raw: &str) -> Self {
        let key = raw
            .split('|')
            .map(|segment| segment.trim().to_lowercase())
            .collect::<Vec<_>>()
            .join("|");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `entity_type` prefix segment, if present.
    pub fn type_prefix(&self) -> Option<&str> {
        self.0.split('|').next().filter(|s| !s.is_empty())
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EntityKey> for String {
    fn from(key: EntityKey) -> Self {
        key.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_lowercases_and_trims() {
        let key = EntityKey::compose(EntityType::Login, &[" SRV1 ", "Prod", "SA"]);
        assert_eq!(key.as_str(), "login|srv1|prod|sa");
    }

    #[test]
    fn test_normalize_matches_compose() {
        let composed = EntityKey::compose(EntityType::LinkedServer, &["Srv1", "LinkToHR"]);
        let reread = EntityKey::normalize("Linked_Server| Srv1 |LINKTOHR");
        assert_eq!(composed, reread);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = EntityKey::normalize("Login|SRV1|sa");
        let twice = EntityKey::normalize(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_type_prefix() {
        let key = EntityKey::compose(EntityType::Job, &["srv1", "backup job"]);
        assert_eq!(key.type_prefix(), Some("job"));
    }
}
