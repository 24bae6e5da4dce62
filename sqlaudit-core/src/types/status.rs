//! Finding status and risk level — the single parsing boundary.
//!
//! Raw audit output arrives as heterogeneous strings and glyphs; everything
//! downstream works on these closed enums. Unrecognized input parses to
//! `None` ("status unavailable"), which is NOT the same thing as a failing
//! finding and must never be conflated with one.

use serde::{Deserialize, Serialize};

/// Result of one security check for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingStatus {
    Pass,
    Fail,
    Warn,
}

impl FindingStatus {
    /// Parse a raw status cell leniently. Case-insensitive, accepts the
    /// glyph forms the collectors and spreadsheets emit. Never panics;
    /// unknown or empty input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }
        match s {
            "✓" | "✔" | "✅" => return Some(Self::Pass),
            "✗" | "✘" | "❌" | "✖" => return Some(Self::Fail),
            "⚠" | "⚠️" => return Some(Self::Warn),
            _ => {}
        }
        match s.to_ascii_lowercase().as_str() {
            "pass" | "passed" | "ok" | "compliant" => Some(Self::Pass),
            "fail" | "failed" | "error" | "noncompliant" | "non-compliant" => Some(Self::Fail),
            "warn" | "warning" => Some(Self::Warn),
            _ => None,
        }
    }

    /// Convenience for optional cells.
    pub fn parse_opt(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::parse)
    }

    /// True for `Fail` and `Warn`. Total over the three variants.
    pub fn is_discrepant(&self) -> bool {
        matches!(self, Self::Fail | Self::Warn)
    }

    /// Stable wire name used in the database and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::Warn => "WARN",
        }
    }
}

impl std::fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk level attached to a finding by the check definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    /// Lenient parse with the same contract as [`FindingStatus::parse`].
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" | "critical" => Some(Self::High),
            "medium" | "med" | "moderate" => Some(Self::Medium),
            "low" | "info" | "informational" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
