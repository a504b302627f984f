//! Collaborator seam and query façade.
//!
//! The engine never fetches anything itself. An [`AttendanceSource`] hands it
//! already-filtered collections; [`aggregate_attendance`] wires a source to
//! [`engine::run`](crate::engine::run).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::EngineConfig;
use crate::engine;
use crate::error::AttendanceError;
use crate::model::{
    AttendanceInput, AttendanceLog, AttendanceReport, EmployeeId, Holiday, LeaveDay, QueryWindow,
    Tour,
};

/// Read-only access to the external stores, pre-filtered per query.
pub trait AttendanceSource {
    /// Logs of the requested employees dated inside the window.
    fn attendance_logs(
        &self,
        employee_ids: &[EmployeeId],
        window: &QueryWindow,
    ) -> Result<Vec<AttendanceLog>, AttendanceError>;

    /// Approved leave days of the requested employees inside the window.
    fn leave_days(
        &self,
        employee_ids: &[EmployeeId],
        window: &QueryWindow,
    ) -> Result<Vec<LeaveDay>, AttendanceError>;

    /// Approved tours of the requested employees starting inside the window.
    fn tours(&self, employee_ids: &[EmployeeId], window: &QueryWindow) -> Result<Vec<Tour>, AttendanceError>;

    /// Holidays overlapping the window that apply to everyone or to at least
    /// one requested employee.
    fn holidays(&self, employee_ids: &[EmployeeId], window: &QueryWindow) -> Result<Vec<Holiday>, AttendanceError>;

    fn office_closures(&self, window: &QueryWindow) -> Result<BTreeSet<NaiveDate>, AttendanceError>;
}

/// Fetch every collection for one query.
pub fn fetch_input<S: AttendanceSource + ?Sized>(
    source: &S,
    employee_ids: &[EmployeeId],
    window: QueryWindow,
) -> Result<AttendanceInput, AttendanceError> {
    Ok(AttendanceInput {
        attendance_logs: source.attendance_logs(employee_ids, &window)?,
        leave_days: source.leave_days(employee_ids, &window)?,
        tours: source.tours(employee_ids, &window)?,
        holidays: source.holidays(employee_ids, &window)?,
        office_closures: source.office_closures(&window)?,
        window,
    })
}

/// Query façade: one authoritative status per employee per day in
/// `[start, end]`.
pub fn aggregate_attendance<S: AttendanceSource + ?Sized>(
    source: &S,
    employee_ids: &[EmployeeId],
    start: NaiveDate,
    end: NaiveDate,
    config: &EngineConfig,
) -> Result<AttendanceReport, AttendanceError> {
    let window = QueryWindow::new(start, end)?;
    let input = fetch_input(source, employee_ids, window)?;
    tracing::debug!(
        logs = input.attendance_logs.len(),
        leave_days = input.leave_days.len(),
        tours = input.tours.len(),
        holidays = input.holidays.len(),
        closures = input.office_closures.len(),
        "fetched attendance sources"
    );
    engine::run(config, &input)
}

// ---------------------------------------------------------------------------
// In-memory source
// ---------------------------------------------------------------------------

/// Source backed by owned vectors, loadable from a JSON document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InMemorySource {
    #[serde(default)]
    pub attendance_logs: Vec<AttendanceLog>,
    #[serde(default)]
    pub leave_days: Vec<LeaveDay>,
    #[serde(default)]
    pub tours: Vec<Tour>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default)]
    pub office_closures: Vec<NaiveDate>,
}

impl InMemorySource {
    pub fn from_json(input: &str) -> Result<Self, AttendanceError> {
        serde_json::from_str(input).map_err(|e| AttendanceError::InputParse(e.to_string()))
    }
}

impl AttendanceSource for InMemorySource {
    fn attendance_logs(
        &self,
        employee_ids: &[EmployeeId],
        window: &QueryWindow,
    ) -> Result<Vec<AttendanceLog>, AttendanceError> {
        Ok(self
            .attendance_logs
            .iter()
            .filter(|l| employee_ids.contains(&l.employee_id) && window.contains(l.date))
            .cloned()
            .collect())
    }

    fn leave_days(
        &self,
        employee_ids: &[EmployeeId],
        window: &QueryWindow,
    ) -> Result<Vec<LeaveDay>, AttendanceError> {
        Ok(self
            .leave_days
            .iter()
            .filter(|l| employee_ids.contains(&l.employee_id) && window.contains(l.date))
            .cloned()
            .collect())
    }

    fn tours(&self, employee_ids: &[EmployeeId], window: &QueryWindow) -> Result<Vec<Tour>, AttendanceError> {
        Ok(self
            .tours
            .iter()
            .filter(|t| employee_ids.contains(&t.employee_id) && window.contains(t.start_date))
            .cloned()
            .collect())
    }

    fn holidays(&self, employee_ids: &[EmployeeId], window: &QueryWindow) -> Result<Vec<Holiday>, AttendanceError> {
        Ok(self
            .holidays
            .iter()
            .filter(|h| window.overlaps(h.start_date, h.last_day()))
            .filter(|h| {
                employee_ids.is_empty()
                    || h.applies_to_everyone()
                    || h.applicable_employee_ids.iter().any(|id| employee_ids.contains(id))
            })
            .cloned()
            .collect())
    }

    fn office_closures(&self, window: &QueryWindow) -> Result<BTreeSet<NaiveDate>, AttendanceError> {
        Ok(self
            .office_closures
            .iter()
            .copied()
            .filter(|d| window.contains(*d))
            .collect())
    }
}
