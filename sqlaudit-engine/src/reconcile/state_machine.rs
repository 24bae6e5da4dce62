//! Transition classification for a single entity between two observations.

use sqlaudit_core::types::{ChangeType, FindingStatus, TransitionResult};

/// Classify one entity's transition between two observation points.
///
/// Rules are priority-ordered; the first match wins:
///
/// 1. Instance not scanned and no new status → `Unknown`, unlogged. A
///    silent scan failure must never read as "the issue was fixed".
/// 2. No prior observation, new status discrepant → `NewIssue`.
/// 3. No prior observation, new status compliant → `NoChange`.
/// 4. Was discrepant, now PASS → `Fixed`. Outranks any exception-state
///    change seen in the same cycle.
/// 5. Was PASS, now discrepant → `Regression`.
/// 6. Discrepant both times, exception flag flipped → `ExceptionAdded` /
///    `ExceptionRemoved`.
/// 7. Discrepant both times, exception flag unchanged → `StillFailing`.
/// 8. Everything else (PASS→PASS, disappeared entity, ...) → `NoChange`.
pub fn classify_finding_transition(
    old_status: Option<FindingStatus>,
    new_status: Option<FindingStatus>,
    old_has_exception: bool,
    new_has_exception: bool,
    instance_was_scanned: bool,
) -> TransitionResult {
    if !instance_was_scanned && new_status.is_none() {
        return TransitionResult::from_change(ChangeType::Unknown);
    }

    let new_discrepant = new_status.is_some_and(|s| s.is_discrepant());

    let change = match old_status {
        None if new_discrepant => ChangeType::NewIssue,
        None => ChangeType::NoChange,
        Some(old) => {
            let old_discrepant = old.is_discrepant();
            if old_discrepant && new_status == Some(FindingStatus::Pass) {
                ChangeType::Fixed
            } else if old == FindingStatus::Pass && new_discrepant {
                ChangeType::Regression
            } else if old_discrepant && new_discrepant {
                if old_has_exception != new_has_exception {
                    if new_has_exception {
                        ChangeType::ExceptionAdded
                    } else {
                        ChangeType::ExceptionRemoved
                    }
                } else {
                    ChangeType::StillFailing
                }
            } else {
                ChangeType::NoChange
            }
        }
    };

    TransitionResult::from_change(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlaudit_core::types::FindingStatus::{Fail, Pass, Warn};

    fn classify(
        old: Option<FindingStatus>,
        new: Option<FindingStatus>,
        old_exc: bool,
        new_exc: bool,
    ) -> ChangeType {
        classify_finding_transition(old, new, old_exc, new_exc, true).change_type
    }

    #[test]
    fn test_unscanned_instance_is_unknown_not_fixed() {
        let result = classify_finding_transition(Some(Fail), None, false, false, false);
        assert_eq!(result.change_type, ChangeType::Unknown);
        assert!(!result.should_log);
    }

    #[test]
    fn test_scanned_but_vanished_entity_is_no_change() {
        assert_eq!(classify(Some(Fail), None, false, false), ChangeType::NoChange);
    }

    #[test]
    fn test_new_issue() {
        assert_eq!(classify(None, Some(Fail), false, false), ChangeType::NewIssue);
        assert_eq!(classify(None, Some(Warn), false, false), ChangeType::NewIssue);
    }

    #[test]
    fn test_first_observation_passing_is_no_change() {
        assert_eq!(classify(None, Some(Pass), false, false), ChangeType::NoChange);
        assert_eq!(classify(None, None, false, false), ChangeType::NoChange);
    }

    #[test]
    fn test_fixed() {
        assert_eq!(classify(Some(Fail), Some(Pass), false, false), ChangeType::Fixed);
        assert_eq!(classify(Some(Warn), Some(Pass), false, false), ChangeType::Fixed);
    }

    #[test]
    fn test_fix_wins_over_concurrent_exception_add() {
        // The user added a justification in the same edit session in which
        // the underlying issue got fixed: the fix is the story.
        let result = classify_finding_transition(Some(Fail), Some(Pass), false, true, true);
        assert_eq!(result.change_type, ChangeType::Fixed);
        assert!(result.should_log);
    }

    #[test]
    fn test_fixed_with_exception_clearing() {
        // The exception auto-clears alongside a fix, and the transition
        // is FIXED, not EXCEPTION_REMOVED.
        assert_eq!(classify(Some(Fail), Some(Pass), true, false), ChangeType::Fixed);
    }

    #[test]
    fn test_regression() {
        assert_eq!(classify(Some(Pass), Some(Fail), false, false), ChangeType::Regression);
        assert_eq!(classify(Some(Pass), Some(Warn), false, false), ChangeType::Regression);
    }

    #[test]
    fn test_exception_added_and_removed() {
        assert_eq!(
            classify(Some(Fail), Some(Fail), false, true),
            ChangeType::ExceptionAdded
        );
        assert_eq!(
            classify(Some(Fail), Some(Warn), true, false),
            ChangeType::ExceptionRemoved
        );
    }

    #[test]
    fn test_still_failing_is_silent() {
        let result = classify_finding_transition(Some(Fail), Some(Fail), true, true, true);
        assert_eq!(result.change_type, ChangeType::StillFailing);
        assert!(!result.should_log);

        let result = classify_finding_transition(Some(Warn), Some(Fail), false, false, true);
        assert_eq!(result.change_type, ChangeType::StillFailing);
    }

    #[test]
    fn test_pass_to_pass_is_no_change() {
        let result = classify_finding_transition(Some(Pass), Some(Pass), false, false, true);
        assert_eq!(result.change_type, ChangeType::NoChange);
        assert!(!result.should_log);
    }
}
