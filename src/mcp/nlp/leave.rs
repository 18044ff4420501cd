//! Leave classification.
//!
//! A free-text entry is leave when its lowercased form contains any trigger of
//! a registered pattern. Patterns are checked in declaration order and the
//! first hit wins, so `sick` beats `annual` for text mentioning both.

use std::fmt;

pub const LEAVE_PROJECT: &str = "[LV] Leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveType {
    Sick,
    Annual,
}

impl LeaveType {
    pub fn pattern(self) -> &'static LeavePattern {
        match self {
            Self::Sick => &LEAVE_PATTERNS[0],
            Self::Annual => &LEAVE_PATTERNS[1],
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sick => f.write_str("sick"),
            Self::Annual => f.write_str("annual"),
        }
    }
}

#[derive(Debug)]
pub struct LeavePattern {
    pub kind: LeaveType,
    /// Lowercase substrings that mark a text as this kind of leave.
    pub triggers: &'static [&'static str],
    pub project: &'static str,
    pub task: &'static str,
}

pub static LEAVE_PATTERNS: [LeavePattern; 2] = [
    LeavePattern {
        kind: LeaveType::Sick,
        triggers: &["sick", "ill", "unwell"],
        project: LEAVE_PROJECT,
        task: "Person (Sick/Carer's) Leave",
    },
    LeavePattern {
        kind: LeaveType::Annual,
        triggers: &["annual leave", "vacation", "holiday", "time off"],
        project: LEAVE_PROJECT,
        task: "Annual Leave",
    },
];

/// Returns the first leave type whose triggers occur in `text`.
///
/// Matching is plain substring search, so "homesick" counts as sick leave and
/// "will" contains "ill".
pub fn classify(text: &str) -> Option<LeaveType> {
    let lowercase_text = text.to_lowercase();
    LEAVE_PATTERNS
        .iter()
        .find(|pattern| {
            pattern
                .triggers
                .iter()
                .any(|trigger| lowercase_text.contains(trigger))
        })
        .map(|pattern| pattern.kind)
}
