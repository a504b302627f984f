use std::collections::BTreeMap;

use crate::model::{DayStatusMap, EmployeeId, EmployeeSummary};
use crate::status::StatusCode;

/// Per-employee tallies over the reconciled map.
///
/// A day counts as worked and absent at once when its status belongs to both
/// classes (Leave-Without-Pay).
pub fn summarize(map: &DayStatusMap) -> BTreeMap<EmployeeId, EmployeeSummary> {
    map.iter()
        .map(|(employee_id, days)| {
            let mut summary = EmployeeSummary::default();
            for entry in days.values() {
                *summary
                    .status_counts
                    .entry(entry.status.code().to_string())
                    .or_insert(0) += 1;

                if entry.status.is_working() {
                    summary.worked_days += 1;
                }
                if entry.status.is_absent() {
                    summary.absent_days += 1;
                }
                if entry.status == StatusCode::DayOff {
                    summary.day_off_days += 1;
                }
            }
            (*employee_id, summary)
        })
        .collect()
}
