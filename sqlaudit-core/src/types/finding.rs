//! Findings — one evaluated check result per entity per audit run.

use serde::{Deserialize, Serialize};

use crate::entity_key::EntityKey;

use super::status::{FindingStatus, RiskLevel};

/// Class of audited object. The wire name doubles as the entity-key prefix,
/// disambiguating keys across sheets that share similar column layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    Login,
    Database,
    LinkedServer,
    Configuration,
    Permission,
    Job,
}

impl EntityType {
    /// Stable lowercase wire name. Part of the bit-exact key contract:
    /// both the findings side and the annotations side must agree on it.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Database => "database",
            Self::LinkedServer => "linked_server",
            Self::Configuration => "configuration",
            Self::Permission => "permission",
            Self::Job => "job",
        }
    }

    /// Lenient parse from a wire name or sheet label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "login" | "logins" => Some(Self::Login),
            "database" | "databases" => Some(Self::Database),
            "linked_server" | "linked server" | "linked servers" => Some(Self::LinkedServer),
            "configuration" | "config" => Some(Self::Configuration),
            "permission" | "permissions" => Some(Self::Permission),
            "job" | "jobs" => Some(Self::Job),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One row of a single audit run. Created once per run, never mutated.
///
/// Invariant: at most one `Finding` per `(audit_run_id, entity_type,
/// entity_key)` — the findings store enforces this with a unique index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub audit_run_id: i64,
    pub instance_id: String,
    pub entity_type: EntityType,
    pub entity_key: EntityKey,
    /// `None` means the entity was not observed this run (status
    /// unavailable), which is distinct from any of the three statuses.
    pub status: Option<FindingStatus>,
    pub risk: Option<RiskLevel>,
    pub description: String,
}

impl Finding {
    /// True when the observed status is FAIL or WARN.
    pub fn is_discrepant(&self) -> bool {
        self.status.is_some_and(|s| s.is_discrepant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_wire_names_are_lowercase() {
        for et in [
            EntityType::Login,
            EntityType::Database,
            EntityType::LinkedServer,
            EntityType::Configuration,
            EntityType::Permission,
            EntityType::Job,
        ] {
            let name = et.wire_name();
            assert_eq!(name, name.to_ascii_lowercase());
            assert_eq!(EntityType::parse(name), Some(et));
        }
    }

    #[test]
    fn test_unobserved_finding_is_not_discrepant() {
        let f = Finding {
            audit_run_id: 1,
            instance_id: "srv1\\prod".to_string(),
            entity_type: EntityType::Login,
            entity_key: EntityKey::compose(EntityType::Login, &["srv1", "prod", "sa"]),
            status: None,
            risk: None,
            description: String::new(),
        };
        assert!(!f.is_discrepant());
    }
}
