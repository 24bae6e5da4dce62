//! Resolution of concurrent signals for one entity in one cycle.

use sqlaudit_core::types::{ChangeType, TransitionResult};

/// Priority of a change type when several detectors fire for the same
/// entity in one cycle. Status transitions outrank annotation-side
/// signals: a finding fixed this cycle must never also surface as
/// "exception added" just because the user edited the row in the same
/// session. `Unknown` sits at the bottom: an unscanned instance is an
/// absence of signal and never overrides a concrete result.
fn priority(change_type: ChangeType) -> u8 {
    match change_type {
        ChangeType::Fixed => 7,
        ChangeType::Regression => 6,
        ChangeType::NewIssue => 5,
        ChangeType::ExceptionAdded
        | ChangeType::ExceptionRemoved
        | ChangeType::ExceptionUpdated => 4,
        ChangeType::StillFailing => 3,
        ChangeType::NoChange => 2,
        ChangeType::Unknown => 1,
    }
}

/// Pick the winning result among concurrent detections. With exactly one
/// result the input is returned unchanged; ties keep the first
/// occurrence; an empty slice resolves to an unlogged `NoChange`.
pub fn resolve_concurrent_changes(results: &[TransitionResult]) -> TransitionResult {
    let mut winner: Option<TransitionResult> = None;
    for result in results {
        match winner {
            Some(current) if priority(result.change_type) <= priority(current.change_type) => {}
            _ => winner = Some(*result),
        }
    }
    winner.unwrap_or_else(|| TransitionResult::from_change(ChangeType::NoChange))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(change_type: ChangeType) -> TransitionResult {
        TransitionResult::from_change(change_type)
    }

    #[test]
    fn test_fix_beats_exception_added() {
        let resolved =
            resolve_concurrent_changes(&[r(ChangeType::ExceptionAdded), r(ChangeType::Fixed)]);
        assert_eq!(resolved.change_type, ChangeType::Fixed);

        // Order must not matter
        let resolved =
            resolve_concurrent_changes(&[r(ChangeType::Fixed), r(ChangeType::ExceptionAdded)]);
        assert_eq!(resolved.change_type, ChangeType::Fixed);
    }

    #[test]
    fn test_status_transitions_beat_annotation_signals() {
        let resolved = resolve_concurrent_changes(&[
            r(ChangeType::ExceptionUpdated),
            r(ChangeType::Regression),
        ]);
        assert_eq!(resolved.change_type, ChangeType::Regression);

        let resolved = resolve_concurrent_changes(&[
            r(ChangeType::ExceptionRemoved),
            r(ChangeType::NewIssue),
        ]);
        assert_eq!(resolved.change_type, ChangeType::NewIssue);
    }

    #[test]
    fn test_exception_signal_beats_still_failing() {
        let resolved = resolve_concurrent_changes(&[
            r(ChangeType::StillFailing),
            r(ChangeType::ExceptionAdded),
        ]);
        assert_eq!(resolved.change_type, ChangeType::ExceptionAdded);
    }

    #[test]
    fn test_single_result_returned_unchanged() {
        let single = r(ChangeType::StillFailing);
        assert_eq!(resolve_concurrent_changes(&[single]), single);
    }

    #[test]
    fn test_empty_resolves_to_silent_no_change() {
        let resolved = resolve_concurrent_changes(&[]);
        assert_eq!(resolved.change_type, ChangeType::NoChange);
        assert!(!resolved.should_log);
    }

    #[test]
    fn test_anything_beats_unknown() {
        let resolved =
            resolve_concurrent_changes(&[r(ChangeType::Unknown), r(ChangeType::NoChange)]);
        assert_eq!(resolved.change_type, ChangeType::NoChange);
    }

    #[test]
    fn test_tie_keeps_first_occurrence() {
        let resolved = resolve_concurrent_changes(&[
            r(ChangeType::ExceptionRemoved),
            r(ChangeType::ExceptionAdded),
        ]);
        assert_eq!(resolved.change_type, ChangeType::ExceptionRemoved);
    }
}
