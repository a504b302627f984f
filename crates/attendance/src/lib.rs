//! `hrms-attendance` — Attendance status reconciliation engine.
//!
//! Pure engine crate: receives pre-loaded attendance logs, leave days, tours,
//! holidays and office closures, returns one status per employee per day.
//! No IO or persistence dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod passes;
pub mod source;
pub mod status;
pub mod store;
pub mod summary;

pub use config::EngineConfig;
pub use engine::{reconcile, run, Stage, PIPELINE};
pub use error::AttendanceError;
pub use model::{AttendanceInput, AttendanceReport, DayStatusMap, QueryWindow, StatusEntry};
pub use source::{aggregate_attendance, AttendanceSource, InMemorySource};
pub use status::{PriorityTable, StatusCode};
pub use store::DayStatusStore;
