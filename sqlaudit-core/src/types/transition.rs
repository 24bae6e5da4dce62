//! Change-type taxonomy and transition results.

use serde::{Deserialize, Serialize};

/// Classified change for one entity between two observation points.
/// Closed set; the reconciliation engine never invents new kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeType {
    NoChange,
    Fixed,
    Regression,
    NewIssue,
    ExceptionAdded,
    ExceptionRemoved,
    ExceptionUpdated,
    StillFailing,
    Unknown,
}

impl ChangeType {
    /// Stable wire name stored in the action log.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoChange => "NO_CHANGE",
            Self::Fixed => "FIXED",
            Self::Regression => "REGRESSION",
            Self::NewIssue => "NEW_ISSUE",
            Self::ExceptionAdded => "EXCEPTION_ADDED",
            Self::ExceptionRemoved => "EXCEPTION_REMOVED",
            Self::ExceptionUpdated => "EXCEPTION_UPDATED",
            Self::StillFailing => "STILL_FAILING",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Inverse of [`as_str`](Self::as_str), for reading action-log rows back.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NO_CHANGE" => Some(Self::NoChange),
            "FIXED" => Some(Self::Fixed),
            "REGRESSION" => Some(Self::Regression),
            "NEW_ISSUE" => Some(Self::NewIssue),
            "EXCEPTION_ADDED" => Some(Self::ExceptionAdded),
            "EXCEPTION_REMOVED" => Some(Self::ExceptionRemoved),
            "EXCEPTION_UPDATED" => Some(Self::ExceptionUpdated),
            "STILL_FAILING" => Some(Self::StillFailing),
            "UNKNOWN" => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Whether this change produces an action-log row.
    pub fn should_log(&self) -> bool {
        matches!(
            self,
            Self::Fixed
                | Self::Regression
                | Self::NewIssue
                | Self::ExceptionAdded
                | Self::ExceptionRemoved
                | Self::ExceptionUpdated
        )
    }

    /// Categorical label for the action-log row. Total over the enum.
    pub fn action_status(&self) -> ActionStatus {
        match self {
            Self::Fixed => ActionStatus::Closed,
            Self::ExceptionAdded | Self::ExceptionUpdated => ActionStatus::Exception,
            Self::Regression | Self::NewIssue | Self::ExceptionRemoved | Self::StillFailing => {
                ActionStatus::Open
            }
            Self::NoChange | Self::Unknown => ActionStatus::Unknown,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Categorical status written on action-log rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionStatus {
    Closed,
    Exception,
    Open,
    Unknown,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Exception => "EXCEPTION",
            Self::Open => "OPEN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of classifying a single entity's transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionResult {
    pub change_type: ChangeType,
    pub should_log: bool,
    pub action_status: ActionStatus,
}

impl TransitionResult {
    /// Build the canonical result for a change type; `should_log` and
    /// `action_status` are both total functions of the change type.
    pub fn from_change(change_type: ChangeType) -> Self {
        Self {
            change_type,
            should_log: change_type.should_log(),
            action_status: change_type.action_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_name_roundtrip() {
        for ct in [
            ChangeType::NoChange,
            ChangeType::Fixed,
            ChangeType::Regression,
            ChangeType::NewIssue,
            ChangeType::ExceptionAdded,
            ChangeType::ExceptionRemoved,
            ChangeType::ExceptionUpdated,
            ChangeType::StillFailing,
            ChangeType::Unknown,
        ] {
            assert_eq!(ChangeType::parse(ct.as_str()), Some(ct));
        }
    }

    #[test]
    fn test_loggable_set() {
        assert!(ChangeType::Fixed.should_log());
        assert!(ChangeType::ExceptionUpdated.should_log());
        assert!(!ChangeType::StillFailing.should_log());
        assert!(!ChangeType::NoChange.should_log());
        assert!(!ChangeType::Unknown.should_log());
    }

    #[test]
    fn test_action_status_mapping() {
        assert_eq!(ChangeType::Fixed.action_status(), ActionStatus::Closed);
        assert_eq!(ChangeType::ExceptionAdded.action_status(), ActionStatus::Exception);
        assert_eq!(ChangeType::NewIssue.action_status(), ActionStatus::Open);
        assert_eq!(ChangeType::Unknown.action_status(), ActionStatus::Unknown);
    }
}
