//! Status codes and the priority hierarchy used to resolve conflicts.
//!
//! Every source normalizer and post-processing pass resolves a clash on the
//! same (employee, date) by comparing priorities: the higher number wins.
//! Codes outside the built-in table have priority 0.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Status code
// ---------------------------------------------------------------------------

/// Short attendance classification for one employee on one day.
///
/// Serialized as its short code (`"P"`, `"CLH"`, `"OFF"`, ...). Codes that are
/// not part of the built-in table round-trip through [`StatusCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatusCode {
    Present,
    /// Generic leave marker.
    Leave,
    CasualLeave,
    CasualLeaveHalf,
    SickLeave,
    SickLeaveHalf,
    /// PAT leave type, full day.
    Pat,
    /// PAT leave type, half day.
    PatHalf,
    MaternityLeave,
    EarnedLeave,
    CompensatoryOff,
    ShortLeave,
    LeaveWithoutPay,
    Tour,
    TourHalf,
    HalfDay,
    Festival,
    Absent,
    AbsentWithoutLeave,
    DayOff,
    Other(String),
}

impl StatusCode {
    pub fn from_code(code: &str) -> Self {
        match code {
            "P" => Self::Present,
            "L" => Self::Leave,
            "CL" => Self::CasualLeave,
            "CLH" => Self::CasualLeaveHalf,
            "SL" => Self::SickLeave,
            "SLH" => Self::SickLeaveHalf,
            "PAT" => Self::Pat,
            "PATH" => Self::PatHalf,
            "ML" => Self::MaternityLeave,
            "EL" => Self::EarnedLeave,
            "CO" => Self::CompensatoryOff,
            "STL" => Self::ShortLeave,
            "LWP" => Self::LeaveWithoutPay,
            "T" => Self::Tour,
            "TH" => Self::TourHalf,
            "H" => Self::HalfDay,
            "FL" => Self::Festival,
            "A" => Self::Absent,
            "AWOL" => Self::AbsentWithoutLeave,
            "OFF" => Self::DayOff,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Present => "P",
            Self::Leave => "L",
            Self::CasualLeave => "CL",
            Self::CasualLeaveHalf => "CLH",
            Self::SickLeave => "SL",
            Self::SickLeaveHalf => "SLH",
            Self::Pat => "PAT",
            Self::PatHalf => "PATH",
            Self::MaternityLeave => "ML",
            Self::EarnedLeave => "EL",
            Self::CompensatoryOff => "CO",
            Self::ShortLeave => "STL",
            Self::LeaveWithoutPay => "LWP",
            Self::Tour => "T",
            Self::TourHalf => "TH",
            Self::HalfDay => "H",
            Self::Festival => "FL",
            Self::Absent => "A",
            Self::AbsentWithoutLeave => "AWOL",
            Self::DayOff => "OFF",
            Self::Other(code) => code,
        }
    }

    /// Built-in priority. Unknown codes rank below everything else.
    pub fn default_priority(&self) -> i32 {
        match self {
            Self::Present => 10,
            Self::Leave
            | Self::CasualLeave
            | Self::CasualLeaveHalf
            | Self::SickLeave
            | Self::SickLeaveHalf
            | Self::Pat
            | Self::PatHalf
            | Self::MaternityLeave
            | Self::EarnedLeave
            | Self::CompensatoryOff
            | Self::ShortLeave
            | Self::LeaveWithoutPay => 9,
            Self::Tour | Self::TourHalf => 8,
            Self::HalfDay => 7,
            Self::Festival => 6,
            Self::Absent => 5,
            Self::AbsentWithoutLeave => 3,
            Self::DayOff => 2,
            Self::Other(_) => 0,
        }
    }

    /// Counts as a worked (or paid-as-worked) day.
    ///
    /// Leave-Without-Pay is a leave variant and therefore also working,
    /// while being absence-class at the same time. A half tour day is
    /// neither working nor absent.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            Self::Present
                | Self::Leave
                | Self::CasualLeave
                | Self::CasualLeaveHalf
                | Self::SickLeave
                | Self::SickLeaveHalf
                | Self::Pat
                | Self::PatHalf
                | Self::MaternityLeave
                | Self::EarnedLeave
                | Self::CompensatoryOff
                | Self::ShortLeave
                | Self::LeaveWithoutPay
                | Self::Festival
                | Self::HalfDay
                | Self::Tour
        )
    }

    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            Self::Absent | Self::LeaveWithoutPay | Self::AbsentWithoutLeave
        )
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        Self::from_code(code)
    }
}

impl From<String> for StatusCode {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<StatusCode> for String {
    fn from(code: StatusCode) -> Self {
        code.code().to_string()
    }
}

// ---------------------------------------------------------------------------
// Priority table
// ---------------------------------------------------------------------------

/// Priority of a code under the built-in table.
pub fn priority(code: &StatusCode) -> i32 {
    code.default_priority()
}

/// The built-in hierarchy with optional per-code overrides from config.
#[derive(Debug, Clone, Default)]
pub struct PriorityTable {
    overrides: HashMap<StatusCode, i32>,
}

impl PriorityTable {
    pub fn with_overrides(overrides: &BTreeMap<String, i32>) -> Self {
        Self {
            overrides: overrides
                .iter()
                .map(|(code, p)| (StatusCode::from_code(code), *p))
                .collect(),
        }
    }

    pub fn priority(&self, code: &StatusCode) -> i32 {
        self.overrides
            .get(code)
            .copied()
            .unwrap_or_else(|| code.default_priority())
    }

    /// `true` when `candidate` strictly outranks `existing`.
    pub fn outranks(&self, candidate: &StatusCode, existing: &StatusCode) -> bool {
        self.priority(candidate) > self.priority(existing)
    }
}
