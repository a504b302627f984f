//! Source normalizers: each turns one raw record into candidate statuses.
//!
//! Normalizers never touch the store. The engine feeds their candidates
//! through [`DayStatusStore::set_if_higher`](crate::store::DayStatusStore::set_if_higher).

use std::collections::{BTreeSet, HashMap, HashSet};

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::EngineConfig;
use crate::error::AttendanceError;
use crate::model::{
    is_sunday, AttendanceInput, AttendanceLog, Candidate, EmployeeId, Holiday, LeaveDay, Tour,
};
use crate::status::StatusCode;

/// Longest worked duration a single day's log may carry.
pub const MAX_LOG_SECONDS: i64 = 24 * 3600;

/// Per-run lookups shared by the normalizers.
pub struct NormalizeContext<'a> {
    pub config: &'a EngineConfig,
    pub office_closures: &'a BTreeSet<NaiveDate>,
    short_leave_days: HashSet<(EmployeeId, NaiveDate)>,
    log_durations: HashMap<(EmployeeId, NaiveDate), i64>,
}

impl<'a> NormalizeContext<'a> {
    /// Build lookups, rejecting logs whose duration is negative or longer
    /// than a day.
    pub fn build(config: &'a EngineConfig, input: &'a AttendanceInput) -> Result<Self, AttendanceError> {
        let short_leave_days = input
            .leave_days
            .iter()
            .filter(|l| l.leave_type_short_code.trim() == config.leave.short_leave_code)
            .map(|l| (l.employee_id, l.date))
            .collect();

        // First log per (employee, day) wins.
        let mut log_durations = HashMap::new();
        for log in &input.attendance_logs {
            let seconds = log.duration_secs.unwrap_or(0);
            if !(0..=MAX_LOG_SECONDS).contains(&seconds) {
                return Err(AttendanceError::InvalidDuration {
                    employee_id: log.employee_id,
                    date: log.date,
                    seconds,
                });
            }
            log_durations.entry((log.employee_id, log.date)).or_insert(seconds);
        }

        Ok(Self {
            config,
            office_closures: &input.office_closures,
            short_leave_days,
            log_durations,
        })
    }

    pub fn has_short_leave(&self, employee_id: EmployeeId, date: NaiveDate) -> bool {
        self.short_leave_days.contains(&(employee_id, date))
    }

    pub fn logged_seconds(&self, employee_id: EmployeeId, date: NaiveDate) -> i64 {
        self.log_durations.get(&(employee_id, date)).copied().unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Attendance logs
// ---------------------------------------------------------------------------

/// Office closure beats everything, then a same-day short leave, then the
/// log's own status.
pub fn normalize_attendance_log(log: &AttendanceLog, ctx: &NormalizeContext<'_>) -> Candidate {
    let colors = &ctx.config.colors;
    let (status, color) = if ctx.office_closures.contains(&log.date) {
        (StatusCode::Present, colors.office_closure.as_str())
    } else if ctx.has_short_leave(log.employee_id, log.date) {
        (StatusCode::Present, colors.short_leave.as_str())
    } else {
        (
            log.status.clone(),
            log.color.as_deref().unwrap_or(&colors.fallback),
        )
    };
    Candidate::new(log.employee_id, log.date, status, color)
}

// ---------------------------------------------------------------------------
// Tours
// ---------------------------------------------------------------------------

/// One calendar day of a tour and the time spent on tour that day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TourDay {
    pub date: NaiveDate,
    pub on_tour: Duration,
}

/// Split a tour into per-day overlaps. A day runs from midnight to the
/// following midnight.
pub fn split_tour(tour: &Tour) -> Result<Vec<TourDay>, AttendanceError> {
    let start = at(tour.start_date, tour.start_time);
    let end = at(tour.end_date, tour.end_time);
    if end < start {
        return Err(AttendanceError::InvalidTour {
            employee_id: tour.employee_id,
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    let mut days = Vec::new();
    let mut cursor = start;
    while cursor.date() <= end.date() {
        let next_midnight = (cursor.date() + Duration::days(1)).and_time(NaiveTime::MIN);
        let day_end = next_midnight.min(end);
        days.push(TourDay {
            date: cursor.date(),
            on_tour: day_end - cursor,
        });
        cursor = next_midnight;
    }
    Ok(days)
}

fn at(date: NaiveDate, time: Option<NaiveTime>) -> NaiveDateTime {
    date.and_time(time.unwrap_or(NaiveTime::MIN))
}

/// Full tour day when time on tour plus the day's logged time reaches
/// `tour.full_day_hours`, otherwise half.
pub fn normalize_tour(tour: &Tour, ctx: &NormalizeContext<'_>) -> Result<Vec<Candidate>, AttendanceError> {
    let threshold_secs = ctx.config.tour.full_day_hours * 3600.0;
    let candidates = split_tour(tour)?
        .into_iter()
        .map(|day| {
            let total = day.on_tour.num_seconds() + ctx.logged_seconds(tour.employee_id, day.date);
            let status = if total as f64 >= threshold_secs {
                StatusCode::Tour
            } else {
                StatusCode::TourHalf
            };
            Candidate::new(tour.employee_id, day.date, status, &ctx.config.colors.tour)
        })
        .collect();
    Ok(candidates)
}

// ---------------------------------------------------------------------------
// Holidays
// ---------------------------------------------------------------------------

/// Expand a holiday over its days for each applicable employee. An empty
/// applicable set falls back to `known_employees`.
pub fn normalize_holiday(
    holiday: &Holiday,
    known_employees: &[EmployeeId],
    ctx: &NormalizeContext<'_>,
) -> Result<Vec<Candidate>, AttendanceError> {
    let last = holiday.last_day();
    if last < holiday.start_date {
        return Err(AttendanceError::InvalidHolidayRange {
            title: holiday.title.clone(),
            start: holiday.start_date,
            end: last,
        });
    }

    let employees: Vec<EmployeeId> = if holiday.applies_to_everyone() {
        known_employees.to_vec()
    } else {
        holiday.applicable_employee_ids.iter().copied().collect()
    };
    let status = holiday.short_code.clone().unwrap_or(StatusCode::Festival);
    let color = holiday.color.as_deref().unwrap_or(&ctx.config.colors.fallback);

    let mut candidates = Vec::new();
    for date in holiday.start_date.iter_days().take_while(|d| *d <= last) {
        for employee_id in &employees {
            candidates.push(Candidate::new(*employee_id, date, status.clone(), color));
        }
    }
    Ok(candidates)
}

// ---------------------------------------------------------------------------
// Leave days
// ---------------------------------------------------------------------------

/// The leave type's full-day or half-day code. `None` when the chosen code is
/// missing or blank.
pub fn leave_status(day: &LeaveDay) -> Option<StatusCode> {
    let code = if day.is_full_day {
        Some(day.leave_type_short_code.as_str())
    } else {
        day.half_day_short_code.as_deref()
    };
    code.map(str::trim)
        .filter(|c| !c.is_empty())
        .map(StatusCode::from_code)
}

/// Leave types listed in `leave.holiday_yielding_codes` keep an existing
/// holiday, and keep a Sunday day-off, whatever their priority says.
pub fn yields_to_existing(day: &LeaveDay, current: &StatusCode, ctx: &NormalizeContext<'_>) -> bool {
    let code = day.leave_type_short_code.trim();
    let yielding = ctx
        .config
        .leave
        .holiday_yielding_codes
        .iter()
        .any(|c| c == code);
    if !yielding {
        return false;
    }
    match current {
        StatusCode::Festival => true,
        StatusCode::DayOff => is_sunday(day.date),
        _ => false,
    }
}

/// `current` is the day's status before this record, read with the
/// empty-day default.
pub fn normalize_leave_day(
    day: &LeaveDay,
    current: &StatusCode,
    ctx: &NormalizeContext<'_>,
) -> Option<Candidate> {
    if yields_to_existing(day, current, ctx) {
        return None;
    }
    let status = match leave_status(day) {
        Some(status) => status,
        None => {
            tracing::warn!(
                employee_id = day.employee_id,
                date = %day.date,
                leave_type = %day.leave_type_short_code,
                is_full_day = day.is_full_day,
                "leave day has no short code for its duration, skipping"
            );
            return None;
        }
    };
    let color = day.color.as_deref().unwrap_or(&ctx.config.colors.leave);
    Some(Candidate::new(day.employee_id, day.date, status, color))
}
