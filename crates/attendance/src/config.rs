use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AttendanceError;
use crate::status::PriorityTable;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Engine tuning. Every field has a default, so an empty document is valid.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub colors: ColorConfig,
    /// Short code → priority, overriding the built-in hierarchy.
    #[serde(default)]
    pub priorities: BTreeMap<String, i32>,
    #[serde(default)]
    pub tour: TourConfig,
    #[serde(default)]
    pub leave: LeaveConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct ColorConfig {
    pub office_closure: String,
    pub short_leave: String,
    pub tour: String,
    /// Used when a leave type carries no color of its own.
    pub leave: String,
    pub day_off: String,
    pub absent: String,
    pub lwp: String,
    /// Used when an attendance log or holiday carries no color.
    pub fallback: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            office_closure: "#000000".into(),
            short_leave: "#06B900".into(),
            tour: "#06c1c4".into(),
            leave: "#a2a2a2".into(),
            day_off: "#CCCCCC".into(),
            absent: "#FF0000".into(),
            lwp: "#a2a2a2".into(),
            fallback: "#000000".into(),
        }
    }
}

impl ColorConfig {
    fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("office_closure", &self.office_closure),
            ("short_leave", &self.short_leave),
            ("tour", &self.tour),
            ("leave", &self.leave),
            ("day_off", &self.day_off),
            ("absent", &self.absent),
            ("lwp", &self.lwp),
            ("fallback", &self.fallback),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tour / Leave / Inference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TourConfig {
    /// A tour day at or above this many hours is a full tour day.
    pub full_day_hours: f64,
}

impl Default for TourConfig {
    fn default() -> Self {
        Self { full_day_hours: 8.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LeaveConfig {
    /// Leave types that yield to an existing holiday and to a Sunday day-off.
    pub holiday_yielding_codes: Vec<String>,
    /// Leave type that turns a same-day attendance log into Present.
    pub short_leave_code: String,
}

impl Default for LeaveConfig {
    fn default() -> Self {
        Self {
            holiday_yielding_codes: vec!["CL".into()],
            short_leave_code: "STL".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InferenceConfig {
    /// Calendar days searched on each side of a Sunday.
    pub window_days: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self { window_days: 7 }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl EngineConfig {
    pub fn from_toml(input: &str) -> Result<Self, AttendanceError> {
        let config: EngineConfig =
            toml::from_str(input).map_err(|e| AttendanceError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AttendanceError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path)
            .map_err(|e| AttendanceError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), AttendanceError> {
        for (name, value) in self.colors.entries() {
            if !is_hex_color(value) {
                return Err(AttendanceError::ConfigValidation(format!(
                    "colors.{name}: '{value}' is not a #RRGGBB color"
                )));
            }
        }

        let hours = self.tour.full_day_hours;
        if !(hours > 0.0 && hours <= 24.0) {
            return Err(AttendanceError::ConfigValidation(format!(
                "tour.full_day_hours must be in (0, 24], got {hours}"
            )));
        }

        if self.inference.window_days == 0 {
            return Err(AttendanceError::ConfigValidation(
                "inference.window_days must be at least 1".into(),
            ));
        }

        if self.leave.short_leave_code.trim().is_empty() {
            return Err(AttendanceError::ConfigValidation(
                "leave.short_leave_code must not be empty".into(),
            ));
        }

        Ok(())
    }

    pub fn priority_table(&self) -> PriorityTable {
        PriorityTable::with_overrides(&self.priorities)
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
