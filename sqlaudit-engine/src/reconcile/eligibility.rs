//! Exception eligibility — the predicate separating "documented security
//! exception" from "note on a passing row" and from data-entry mistakes.

use sqlaudit_core::types::{FindingStatus, REVIEW_STATUS_EXCEPTION};

/// A documented exception exists iff the finding is discrepant AND the
/// annotation carries either justification text or the explicit
/// `Exception` review status.
///
/// A PASS (or unobserved) row is never eligible regardless of annotation
/// content; justification on a compliant item is documentation, not an
/// accepted risk. This one predicate is what keeps fixes from being
/// counted as exceptions and exceptions from vanishing when their host
/// row happens to pass a cycle.
pub fn is_exception_eligible(
    status: Option<FindingStatus>,
    has_justification: bool,
    review_status: Option<&str>,
) -> bool {
    let Some(status) = status else {
        return false;
    };
    status.is_discrepant()
        && (has_justification
            || review_status.map(str::trim) == Some(REVIEW_STATUS_EXCEPTION))
}

/// True when the `Exception` dropdown is set on a row that is not
/// actually failing. The engine blanks that field (with history) without
/// logging an `EXCEPTION_REMOVED`, since it was never a valid exception.
/// Eligibility governs counting; this governs data hygiene.
pub fn should_clear_exception_status(
    status: Option<FindingStatus>,
    review_status: Option<&str>,
) -> bool {
    status == Some(FindingStatus::Pass)
        && review_status.map(str::trim) == Some(REVIEW_STATUS_EXCEPTION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlaudit_core::types::FindingStatus::{Fail, Pass, Warn};

    #[test]
    fn test_discrepant_with_justification_is_eligible() {
        assert!(is_exception_eligible(Some(Fail), true, None));
        assert!(is_exception_eligible(Some(Warn), true, None));
    }

    #[test]
    fn test_discrepant_with_exception_status_is_eligible() {
        assert!(is_exception_eligible(Some(Fail), false, Some("Exception")));
        assert!(is_exception_eligible(Some(Fail), false, Some("  Exception  ")));
    }

    #[test]
    fn test_pass_is_never_eligible() {
        // Regardless of what the annotation says.
        assert!(!is_exception_eligible(Some(Pass), true, Some("Exception")));
        assert!(!is_exception_eligible(Some(Pass), true, None));
        assert!(!is_exception_eligible(Some(Pass), false, Some("Exception")));
    }

    #[test]
    fn test_unknown_status_is_never_eligible() {
        assert!(!is_exception_eligible(None, true, Some("Exception")));
    }

    #[test]
    fn test_other_review_statuses_carry_no_weight() {
        assert!(!is_exception_eligible(Some(Fail), false, Some("Reviewed")));
        assert!(!is_exception_eligible(Some(Fail), false, Some("exception")));
        assert!(!is_exception_eligible(Some(Fail), false, None));
    }

    #[test]
    fn test_clear_only_on_pass_with_exception_dropdown() {
        assert!(should_clear_exception_status(Some(Pass), Some("Exception")));
        assert!(!should_clear_exception_status(Some(Fail), Some("Exception")));
        assert!(!should_clear_exception_status(Some(Pass), Some("Reviewed")));
        assert!(!should_clear_exception_status(None, Some("Exception")));
    }
}
