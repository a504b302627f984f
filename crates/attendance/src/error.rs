use std::fmt;

use chrono::NaiveDate;

use crate::model::EmployeeId;

#[derive(Debug)]
pub enum AttendanceError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad color, zero window, etc.).
    ConfigValidation(String),
    /// Query range ends before it starts.
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Holiday whose end date precedes its start date.
    InvalidHolidayRange { title: String, start: NaiveDate, end: NaiveDate },
    /// Tour that ends before it starts.
    InvalidTour { employee_id: EmployeeId, start: String, end: String },
    /// Attendance log whose worked duration is negative or longer than a day.
    InvalidDuration { employee_id: EmployeeId, date: NaiveDate, seconds: i64 },
    /// Source document could not be decoded (bad JSON, bad date, etc.).
    InputParse(String),
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for AttendanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::InvalidRange { start, end } => {
                write!(f, "invalid query range: {end} is before {start}")
            }
            Self::InvalidHolidayRange { title, start, end } => {
                write!(f, "holiday '{title}': end date {end} is before start date {start}")
            }
            Self::InvalidTour { employee_id, start, end } => {
                write!(f, "employee {employee_id}: tour ends at {end} before it starts at {start}")
            }
            Self::InvalidDuration { employee_id, date, seconds } => {
                write!(f, "employee {employee_id}, {date}: attendance duration {seconds}s is outside 0..=86400")
            }
            Self::InputParse(msg) => write!(f, "input parse error: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for AttendanceError {}
