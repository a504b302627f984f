use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::model::{Candidate, DayStatusMap, EmployeeId, StatusEntry};
use crate::status::{PriorityTable, StatusCode};

/// In-memory employee → date → best status seen so far.
///
/// A day either holds exactly one entry or none. Reads never insert: an empty
/// day reads as Absent, and an employee only becomes known through
/// [`DayStatusStore::employee_days_mut`].
#[derive(Debug, Default)]
pub struct DayStatusStore {
    priorities: PriorityTable,
    days: BTreeMap<EmployeeId, BTreeMap<NaiveDate, StatusEntry>>,
}

impl DayStatusStore {
    pub fn new(priorities: PriorityTable) -> Self {
        Self {
            priorities,
            days: BTreeMap::new(),
        }
    }

    pub fn priorities(&self) -> &PriorityTable {
        &self.priorities
    }

    /// Get-or-insert-empty for an employee's day map.
    pub fn employee_days_mut(&mut self, employee_id: EmployeeId) -> &mut BTreeMap<NaiveDate, StatusEntry> {
        self.days.entry(employee_id).or_default()
    }

    pub fn is_known(&self, employee_id: EmployeeId) -> bool {
        self.days.contains_key(&employee_id)
    }

    /// Known employees, ascending.
    pub fn employees(&self) -> Vec<EmployeeId> {
        self.days.keys().copied().collect()
    }

    pub fn entry(&self, employee_id: EmployeeId, date: NaiveDate) -> Option<&StatusEntry> {
        self.days.get(&employee_id).and_then(|d| d.get(&date))
    }

    /// Current status, reading an empty day as Absent.
    pub fn status_or_absent(&self, employee_id: EmployeeId, date: NaiveDate) -> StatusCode {
        self.entry(employee_id, date)
            .map(|e| e.status.clone())
            .unwrap_or(StatusCode::Absent)
    }

    /// Replace the day's entry only if `status` strictly outranks the current
    /// status. Equal priorities keep the earlier write. Returns whether the
    /// entry changed. The employee becomes known either way.
    pub fn set_if_higher(
        &mut self,
        employee_id: EmployeeId,
        date: NaiveDate,
        status: StatusCode,
        color: &str,
    ) -> bool {
        let current = self.status_or_absent(employee_id, date);
        let wins = self.priorities.outranks(&status, &current);
        let days = self.employee_days_mut(employee_id);
        if wins {
            days.insert(date, StatusEntry::new(status, color));
        }
        wins
    }

    pub fn apply(&mut self, candidate: &Candidate) -> bool {
        self.set_if_higher(
            candidate.employee_id,
            candidate.date,
            candidate.status.clone(),
            &candidate.color,
        )
    }

    /// Place `entry` on a day that has none. Used for statuses that rank below
    /// the empty-day default, such as the Sunday day-off.
    pub fn fill_if_empty(&mut self, employee_id: EmployeeId, date: NaiveDate, entry: StatusEntry) -> bool {
        let days = self.employee_days_mut(employee_id);
        if days.contains_key(&date) {
            return false;
        }
        days.insert(date, entry);
        true
    }

    pub fn into_map(self) -> DayStatusMap {
        self.days
    }
}
