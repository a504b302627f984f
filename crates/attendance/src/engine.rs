use std::fmt;

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::error::AttendanceError;
use crate::model::{
    AttendanceInput, AttendanceReport, Candidate, DayStatusMap, EmployeeId, QueryWindow,
    ReportMeta, StatusEntry,
};
use crate::normalize::{
    normalize_attendance_log, normalize_holiday, normalize_leave_day, normalize_tour,
    NormalizeContext,
};
use crate::passes::{cascade_saturday_lwp, fill_sundays, infer_sunday_absence};
use crate::status::StatusCode;
use crate::store::DayStatusStore;
use crate::summary::summarize;

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// One step of a run. Stages execute in [`PIPELINE`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AttendanceLogs,
    Tours,
    Holidays,
    Leaves,
    SundayFill,
    SaturdayLwpCascade,
    SundayInference,
}

/// Sources first (logs, tours, holidays, leaves), then the post-processing
/// passes. Holidays must precede leaves for the holiday-yielding leave rule.
pub const PIPELINE: [Stage; 7] = [
    Stage::AttendanceLogs,
    Stage::Tours,
    Stage::Holidays,
    Stage::Leaves,
    Stage::SundayFill,
    Stage::SaturdayLwpCascade,
    Stage::SundayInference,
];

impl Stage {
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            Self::AttendanceLogs | Self::Tours | Self::Holidays | Self::Leaves
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttendanceLogs => write!(f, "attendance_logs"),
            Self::Tours => write!(f, "tours"),
            Self::Holidays => write!(f, "holidays"),
            Self::Leaves => write!(f, "leaves"),
            Self::SundayFill => write!(f, "sunday_fill"),
            Self::SaturdayLwpCascade => write!(f, "saturday_lwp_cascade"),
            Self::SundayInference => write!(f, "sunday_inference"),
        }
    }
}

/// Feed candidates through the store, dropping days outside the window.
fn apply_all(store: &mut DayStatusStore, window: &QueryWindow, candidates: &[Candidate]) -> usize {
    candidates
        .iter()
        .filter(|c| window.contains(c.date))
        .filter(|c| store.apply(c))
        .count()
}

/// Run one stage against the store. Returns the number of days written.
pub fn run_stage(
    stage: Stage,
    store: &mut DayStatusStore,
    input: &AttendanceInput,
    ctx: &NormalizeContext<'_>,
) -> Result<usize, AttendanceError> {
    let window = &input.window;
    let written = match stage {
        Stage::AttendanceLogs => {
            let candidates: Vec<Candidate> = input
                .attendance_logs
                .iter()
                .map(|log| normalize_attendance_log(log, ctx))
                .collect();
            apply_all(store, window, &candidates)
        }
        Stage::Tours => {
            let mut written = 0;
            for tour in &input.tours {
                let candidates = normalize_tour(tour, ctx)?;
                written += apply_all(store, window, &candidates);
            }
            written
        }
        Stage::Holidays => {
            let mut written = 0;
            for holiday in &input.holidays {
                // Known employees are re-read per holiday, as an earlier
                // restricted holiday may introduce one.
                let known = store.employees();
                let candidates = normalize_holiday(holiday, &known, ctx)?;
                written += apply_all(store, window, &candidates);
            }
            written
        }
        Stage::Leaves => {
            let mut written = 0;
            for day in input.leave_days.iter().filter(|l| window.contains(l.date)) {
                let current = store.status_or_absent(day.employee_id, day.date);
                // A skipped leave still makes its employee known.
                store.employee_days_mut(day.employee_id);
                if let Some(candidate) = normalize_leave_day(day, &current, ctx) {
                    written += apply_all(store, window, std::slice::from_ref(&candidate));
                }
            }
            written
        }
        Stage::SundayFill => fill_sundays(store, window, ctx.config),
        Stage::SaturdayLwpCascade => cascade_saturday_lwp(store, window, ctx.config),
        Stage::SundayInference => infer_sunday_absence(store, window, ctx.config),
    };
    Ok(written)
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

/// Run every stage over pre-fetched input and return the reconciled report.
pub fn run(config: &EngineConfig, input: &AttendanceInput) -> Result<AttendanceReport, AttendanceError> {
    let statuses = reconcile(config, input)?;
    let summary = summarize(&statuses);

    tracing::info!(
        start = %input.window.start,
        end = %input.window.end,
        employees = statuses.len(),
        "attendance reconciled"
    );

    Ok(AttendanceReport {
        meta: ReportMeta {
            start: input.window.start,
            end: input.window.end,
            employee_count: statuses.len(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        },
        summary,
        statuses,
    })
}

/// Merge all sources and passes into the final status map.
pub fn reconcile(config: &EngineConfig, input: &AttendanceInput) -> Result<DayStatusMap, AttendanceError> {
    let ctx = NormalizeContext::build(config, input)?;
    let mut store = DayStatusStore::new(config.priority_table());

    for stage in PIPELINE {
        let written = run_stage(stage, &mut store, input, &ctx)?;
        tracing::debug!(%stage, written, "stage complete");
    }

    Ok(materialize(store, &input.window, config))
}

/// One entry per known employee per window day; empty days become Absent.
fn materialize(store: DayStatusStore, window: &QueryWindow, config: &EngineConfig) -> DayStatusMap {
    let mut map = store.into_map();
    for days in map.values_mut() {
        for date in window.days() {
            days.entry(date)
                .or_insert_with(|| StatusEntry::new(StatusCode::Absent, &config.colors.absent));
        }
    }
    map
}

/// Flatten a status map into `(employee, date, code)` rows, ordered.
pub fn status_rows(map: &DayStatusMap) -> Vec<(EmployeeId, NaiveDate, String)> {
    map.iter()
        .flat_map(|(employee_id, days)| {
            days.iter()
                .map(move |(date, entry)| (*employee_id, *date, entry.status.code().to_string()))
        })
        .collect()
}
