//! Compliance stats — aggregate counts over one observation point, plus
//! cycle deltas that must agree 1:1 with the action log.

use serde::Serialize;

use sqlaudit_core::traits::AnnotationMap;
use sqlaudit_core::types::{ExceptionInfo, Finding};

use crate::reconcile::eligibility::is_exception_eligible;
use crate::reconcile::types::ChangeCounts;

/// Aggregate posture for one set of findings + annotations.
///
/// Invariant: `active_issues + documented_exceptions` equals the number of
/// discrepant findings: an exception is a documented discrepancy, not a
/// third state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComplianceStats {
    /// Discrepant and NOT exception-eligible.
    pub active_issues: usize,
    /// Discrepant and exception-eligible.
    pub documented_exceptions: usize,
    /// Status PASS.
    pub compliant_items: usize,
    /// Status unavailable this run.
    pub unknown_items: usize,
}

impl ComplianceStats {
    /// Compute stats from current findings and current annotations.
    pub fn compute(findings: &[Finding], annotations: &AnnotationMap) -> Self {
        let mut stats = Self::default();
        for finding in findings {
            let Some(status) = finding.status else {
                stats.unknown_items += 1;
                continue;
            };
            if !status.is_discrepant() {
                stats.compliant_items += 1;
                continue;
            }
            let fields = annotations.get(&finding.entity_key);
            let eligible = is_exception_eligible(
                Some(status),
                fields.map_or(false, |f| f.has_justification()),
                fields.and_then(|f| f.review_status.as_deref()),
            );
            if eligible {
                stats.documented_exceptions += 1;
            } else {
                stats.active_issues += 1;
            }
        }
        stats
    }

    /// Total discrepant findings.
    pub fn discrepant_total(&self) -> usize {
        self.active_issues + self.documented_exceptions
    }
}

/// List the current documented exceptions as derived snapshots, sorted by
/// entity key. The count always equals
/// [`ComplianceStats::documented_exceptions`] for the same inputs.
pub fn documented_exceptions(
    findings: &[Finding],
    annotations: &AnnotationMap,
) -> Vec<ExceptionInfo> {
    let mut out = Vec::new();
    for finding in findings {
        let Some(fields) = annotations.get(&finding.entity_key) else {
            continue;
        };
        if is_exception_eligible(
            finding.status,
            fields.has_justification(),
            fields.review_status.as_deref(),
        ) {
            out.push(ExceptionInfo::from_annotations(
                finding.entity_key.clone(),
                fields,
            ));
        }
    }
    out.sort_by(|a, b| a.entity_key.cmp(&b.entity_key));
    out
}

/// Delta counts between two observation points, derived from the cycle's
/// change tallies. Must match the action-log rows emitted in that cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeltaStats {
    pub fixed: usize,
    pub regressed: usize,
    pub new_issues: usize,
}

impl DeltaStats {
    pub fn from_counts(counts: &ChangeCounts) -> Self {
        Self {
            fixed: counts.fixed,
            regressed: counts.regression,
            new_issues: counts.new_issue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlaudit_core::entity_key::EntityKey;
    use sqlaudit_core::types::{AnnotationFields, EntityType, FindingStatus};

    fn finding(name: &str, status: Option<FindingStatus>) -> Finding {
        Finding {
            audit_run_id: 1,
            instance_id: "srv1".to_string(),
            entity_type: EntityType::Login,
            entity_key: EntityKey::compose(EntityType::Login, &["srv1", name]),
            status,
            risk: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_partition_of_discrepant_findings() {
        let findings = [
            finding("sa", Some(FindingStatus::Fail)),
            finding("guest", Some(FindingStatus::Warn)),
            finding("app_user", Some(FindingStatus::Pass)),
            finding("ghost", None),
        ];
        let mut annotations = AnnotationMap::default();
        annotations.insert(
            EntityKey::compose(EntityType::Login, &["srv1", "guest"]),
            AnnotationFields {
                justification: Some("blocked by vendor".to_string()),
                ..Default::default()
            },
        );

        let stats = ComplianceStats::compute(&findings, &annotations);
        assert_eq!(stats.active_issues, 1);
        assert_eq!(stats.documented_exceptions, 1);
        assert_eq!(stats.compliant_items, 1);
        assert_eq!(stats.unknown_items, 1);
        assert_eq!(stats.discrepant_total(), 2);
    }

    #[test]
    fn test_justification_on_passing_row_counts_as_compliant() {
        let findings = [finding("app_user", Some(FindingStatus::Pass))];
        let mut annotations = AnnotationMap::default();
        annotations.insert(
            EntityKey::compose(EntityType::Login, &["srv1", "app_user"]),
            AnnotationFields {
                justification: Some("documented".to_string()),
                review_status: Some("Exception".to_string()),
                notes: None,
            },
        );

        let stats = ComplianceStats::compute(&findings, &annotations);
        assert_eq!(stats.documented_exceptions, 0);
        assert_eq!(stats.compliant_items, 1);
    }

    #[test]
    fn test_documented_exception_listing_matches_count() {
        let findings = [
            finding("sa", Some(FindingStatus::Fail)),
            finding("guest", Some(FindingStatus::Warn)),
            finding("app_user", Some(FindingStatus::Pass)),
        ];
        let mut annotations = AnnotationMap::default();
        for name in ["sa", "guest", "app_user"] {
            annotations.insert(
                EntityKey::compose(EntityType::Login, &["srv1", name]),
                AnnotationFields {
                    justification: Some(format!("reason for {name}")),
                    ..Default::default()
                },
            );
        }

        let listing = documented_exceptions(&findings, &annotations);
        let stats = ComplianceStats::compute(&findings, &annotations);
        assert_eq!(listing.len(), stats.documented_exceptions);
        assert_eq!(listing.len(), 2); // the passing row is documentation only
        assert!(listing[0].entity_key < listing[1].entity_key);
        assert!(listing.iter().all(|e| e.has_justification));
    }

    #[test]
    fn test_stats_equality_invariant() {
        // active + exceptions == discrepant count, across a mixed bag.
        let findings: Vec<Finding> = (0..20)
            .map(|i| {
                let status = match i % 4 {
                    0 => Some(FindingStatus::Fail),
                    1 => Some(FindingStatus::Warn),
                    2 => Some(FindingStatus::Pass),
                    _ => None,
                };
                finding(&format!("login{i}"), status)
            })
            .collect();
        let mut annotations = AnnotationMap::default();
        for i in [0usize, 1, 4, 13] {
            annotations.insert(
                EntityKey::compose(EntityType::Login, &["srv1", &format!("login{i}")]),
                AnnotationFields {
                    review_status: Some("Exception".to_string()),
                    ..Default::default()
                },
            );
        }

        let stats = ComplianceStats::compute(&findings, &annotations);
        let discrepant = findings.iter().filter(|f| f.is_discrepant()).count();
        assert_eq!(stats.discrepant_total(), discrepant);
    }
}
