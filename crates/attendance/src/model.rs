use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::AttendanceError;
use crate::status::StatusCode;

pub type EmployeeId = u64;

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// One (possibly regularized) attendance punch, already resolved to a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceLog {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub status: StatusCode,
    #[serde(default)]
    pub color: Option<String>,
    /// Worked time recorded on the log, in seconds.
    #[serde(default)]
    pub duration_secs: Option<i64>,
}

/// One day of an approved leave application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaveDay {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub leave_type_short_code: String,
    #[serde(default)]
    pub half_day_short_code: Option<String>,
    #[serde(default = "default_full_day")]
    pub is_full_day: bool,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_full_day() -> bool {
    true
}

/// An approved tour. A missing time reads as midnight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tour {
    pub employee_id: EmployeeId,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
}

/// Holiday range. An empty `applicable_employee_ids` set means "everyone".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    #[serde(default)]
    pub title: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub short_code: Option<StatusCode>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub applicable_employee_ids: BTreeSet<EmployeeId>,
}

impl Holiday {
    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    pub fn applies_to_everyone(&self) -> bool {
        self.applicable_employee_ids.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Query window
// ---------------------------------------------------------------------------

/// Inclusive date range of one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl QueryWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AttendanceError> {
        if end < start {
            return Err(AttendanceError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn sundays(&self) -> impl Iterator<Item = NaiveDate> {
        self.days().filter(|d| is_sunday(*d))
    }

    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        start <= self.end && end >= self.start
    }
}

pub fn is_sunday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sun
}

pub fn is_saturday(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Sat
}

/// Pre-fetched collections for one query.
#[derive(Debug, Clone)]
pub struct AttendanceInput {
    pub window: QueryWindow,
    pub attendance_logs: Vec<AttendanceLog>,
    pub leave_days: Vec<LeaveDay>,
    pub tours: Vec<Tour>,
    pub holidays: Vec<Holiday>,
    pub office_closures: BTreeSet<NaiveDate>,
}

impl AttendanceInput {
    pub fn empty(window: QueryWindow) -> Self {
        Self {
            window,
            attendance_logs: Vec::new(),
            leave_days: Vec::new(),
            tours: Vec::new(),
            holidays: Vec::new(),
            office_closures: BTreeSet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Status entries
// ---------------------------------------------------------------------------

/// The retained status of one employee on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: StatusCode,
    pub color: String,
}

impl StatusEntry {
    pub fn new(status: StatusCode, color: impl Into<String>) -> Self {
        Self {
            status,
            color: color.into(),
        }
    }
}

/// A normalizer's output: one candidate status for (employee, date).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
    pub status: StatusCode,
    pub color: String,
}

impl Candidate {
    pub fn new(
        employee_id: EmployeeId,
        date: NaiveDate,
        status: StatusCode,
        color: impl Into<String>,
    ) -> Self {
        Self {
            employee_id,
            date,
            status,
            color: color.into(),
        }
    }
}

/// employee → date → final status.
pub type DayStatusMap = BTreeMap<EmployeeId, BTreeMap<NaiveDate, StatusEntry>>;

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmployeeSummary {
    pub worked_days: usize,
    pub absent_days: usize,
    pub day_off_days: usize,
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub employee_count: usize,
    pub engine_version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceReport {
    pub meta: ReportMeta,
    pub summary: BTreeMap<EmployeeId, EmployeeSummary>,
    pub statuses: DayStatusMap,
}

impl AttendanceReport {
    pub fn status(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<&StatusEntry> {
        self.statuses.get(&employee_id).and_then(|days| days.get(&date))
    }
}
