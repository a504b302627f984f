//! Post-processing passes, run after every source has been merged.

use chrono::{Duration, NaiveDate};

use crate::config::EngineConfig;
use crate::model::{is_saturday, is_sunday, EmployeeId, QueryWindow, StatusEntry};
use crate::status::StatusCode;
use crate::store::DayStatusStore;

/// Give every known employee a day-off on each in-range Sunday that has no
/// entry yet. Returns the number of days filled.
pub fn fill_sundays(store: &mut DayStatusStore, window: &QueryWindow, config: &EngineConfig) -> usize {
    let mut filled = 0;
    for employee_id in store.employees() {
        for sunday in window.sundays() {
            let entry = StatusEntry::new(StatusCode::DayOff, &config.colors.day_off);
            if store.fill_if_empty(employee_id, sunday, entry) {
                filled += 1;
            }
        }
    }
    filled
}

/// A Saturday on Leave-Without-Pay drags the following in-range Sunday to
/// Leave-Without-Pay, unless that Sunday already ranks at or above it.
pub fn cascade_saturday_lwp(store: &mut DayStatusStore, window: &QueryWindow, config: &EngineConfig) -> usize {
    let lwp = StatusCode::LeaveWithoutPay;
    let mut changed = 0;
    for employee_id in store.employees() {
        let saturdays: Vec<NaiveDate> = window
            .days()
            .filter(|d| is_saturday(*d))
            .filter(|d| store.entry(employee_id, *d).is_some_and(|e| e.status == lwp))
            .collect();

        for saturday in saturdays {
            let sunday = saturday + Duration::days(1);
            if !window.contains(sunday) {
                continue;
            }
            let Some(current) = store.entry(employee_id, sunday) else {
                continue;
            };
            // Kept explicit so retuned priorities can't silently change the rule.
            if store.priorities().priority(&current.status) >= store.priorities().priority(&lwp) {
                continue;
            }
            if store.set_if_higher(employee_id, sunday, lwp.clone(), &config.colors.lwp) {
                changed += 1;
            }
        }
    }
    changed
}

/// Nearest status before (`step = -1`) or after (`step = 1`) `date` that is
/// not a day-off, skipping Sundays. Sundays still count toward the window and
/// the search stops at the window edge. An empty day reads as Absent.
pub fn nearby_status(
    store: &DayStatusStore,
    employee_id: EmployeeId,
    date: NaiveDate,
    step: i64,
    window: &QueryWindow,
    max_days: u32,
) -> Option<StatusCode> {
    let mut check = date + Duration::days(step);
    let mut checked = 0;
    while window.contains(check) && checked < max_days {
        if !is_sunday(check) {
            let status = store.status_or_absent(employee_id, check);
            if status != StatusCode::DayOff {
                return Some(status);
            }
        }
        check += Duration::days(step);
        checked += 1;
    }
    None
}

/// Whether a day-off Sunday between `prev` and `next` should become Absent.
pub fn should_mark_absent(prev: Option<&StatusCode>, next: Option<&StatusCode>) -> bool {
    match (prev, next) {
        (None, None) => false,
        (Some(p), Some(n)) if p.is_absent() && n.is_absent() => true,
        _ => {
            let has_absent = prev.is_some_and(StatusCode::is_absent) || next.is_some_and(StatusCode::is_absent);
            let has_working = prev.is_some_and(StatusCode::is_working) || next.is_some_and(StatusCode::is_working);
            has_absent && !has_working
        }
    }
}

/// Turn day-off Sundays into Absent when the surrounding days say the
/// employee was away rather than off.
pub fn infer_sunday_absence(store: &mut DayStatusStore, window: &QueryWindow, config: &EngineConfig) -> usize {
    let max_days = config.inference.window_days;
    let mut changed = 0;
    for employee_id in store.employees() {
        for sunday in window.sundays() {
            if store.status_or_absent(employee_id, sunday) != StatusCode::DayOff {
                continue;
            }
            let prev = nearby_status(store, employee_id, sunday, -1, window, max_days);
            let next = nearby_status(store, employee_id, sunday, 1, window, max_days);
            if should_mark_absent(prev.as_ref(), next.as_ref())
                && store.set_if_higher(employee_id, sunday, StatusCode::Absent, &config.colors.absent)
            {
                changed += 1;
            }
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::PriorityTable;
    use std::collections::BTreeMap;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    // March 2025: Fri 14, Sat 15, Sun 16, Mon 17.
    fn window() -> QueryWindow {
        QueryWindow::new(d("2025-03-10"), d("2025-03-23")).unwrap()
    }

    fn status(store: &DayStatusStore, date: &str) -> StatusCode {
        store.entry(1, d(date)).unwrap().status.clone()
    }

    #[test]
    fn sunday_fill_only_for_known_employees() {
        let config = EngineConfig::default();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-16"), StatusCode::Present, "#000000");
        let filled = fill_sundays(&mut store, &window(), &config);
        assert_eq!(filled, 1);
        assert_eq!(status(&store, "2025-03-16"), StatusCode::Present);
        assert_eq!(status(&store, "2025-03-23"), StatusCode::DayOff);
        assert!(store.entry(2, d("2025-03-23")).is_none());
    }

    #[test]
    fn saturday_lwp_cascades_onto_day_off() {
        let config = EngineConfig::default();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-15"), StatusCode::LeaveWithoutPay, "#a2a2a2");
        fill_sundays(&mut store, &window(), &config);
        assert_eq!(cascade_saturday_lwp(&mut store, &window(), &config), 1);
        assert_eq!(status(&store, "2025-03-16"), StatusCode::LeaveWithoutPay);
        assert_eq!(status(&store, "2025-03-23"), StatusCode::DayOff);
    }

    #[test]
    fn saturday_lwp_never_downgrades_sunday() {
        let config = EngineConfig::default();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-15"), StatusCode::LeaveWithoutPay, "#a2a2a2");
        store.set_if_higher(1, d("2025-03-16"), StatusCode::Present, "#000000");
        fill_sundays(&mut store, &window(), &config);
        assert_eq!(cascade_saturday_lwp(&mut store, &window(), &config), 0);
        assert_eq!(status(&store, "2025-03-16"), StatusCode::Present);
    }

    #[test]
    fn saturday_lwp_guard_follows_retuned_priorities() {
        let config = EngineConfig::default();
        let table = PriorityTable::with_overrides(&BTreeMap::from([("OFF".to_string(), 9)]));
        let mut store = DayStatusStore::new(table);
        store.set_if_higher(1, d("2025-03-15"), StatusCode::LeaveWithoutPay, "#a2a2a2");
        fill_sundays(&mut store, &window(), &config);
        assert_eq!(cascade_saturday_lwp(&mut store, &window(), &config), 0);
        assert_eq!(status(&store, "2025-03-16"), StatusCode::DayOff);
    }

    #[test]
    fn saturday_lwp_at_window_edge_is_ignored() {
        let config = EngineConfig::default();
        let w = QueryWindow::new(d("2025-03-10"), d("2025-03-15")).unwrap();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-15"), StatusCode::LeaveWithoutPay, "#a2a2a2");
        assert_eq!(cascade_saturday_lwp(&mut store, &w, &config), 0);
        assert!(store.entry(1, d("2025-03-16")).is_none());
    }

    #[test]
    fn sunday_between_absences_becomes_absent() {
        // Friday and Monday absent (no punches), nothing else on record
        let config = EngineConfig::default();
        let w = QueryWindow::new(d("2025-03-14"), d("2025-03-17")).unwrap();
        let mut store = DayStatusStore::default();
        store.employee_days_mut(1);
        fill_sundays(&mut store, &w, &config);
        assert_eq!(infer_sunday_absence(&mut store, &w, &config), 1);
        let e = store.entry(1, d("2025-03-16")).unwrap();
        assert_eq!(e.status, StatusCode::Absent);
        assert_eq!(e.color, "#FF0000");
    }

    #[test]
    fn working_neighbor_blocks_inference() {
        let config = EngineConfig::default();
        let w = QueryWindow::new(d("2025-03-14"), d("2025-03-17")).unwrap();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-14"), StatusCode::Present, "#000000");
        store.set_if_higher(1, d("2025-03-15"), StatusCode::Present, "#000000");
        fill_sundays(&mut store, &w, &config);
        assert_eq!(infer_sunday_absence(&mut store, &w, &config), 0);
        assert_eq!(store.entry(1, d("2025-03-16")).unwrap().status, StatusCode::DayOff);
    }

    /// A day with no entry reads as Absent, so "Friday present, Monday
    /// absent" only keeps the Sunday off when Saturday holds a status of its
    /// own (see `working_neighbor_blocks_inference`).
    #[test]
    fn unpunched_saturday_counts_as_absence() {
        // Friday present but Saturday has no entry: the nearest day before
        // the Sunday reads as Absent.
        let config = EngineConfig::default();
        let w = QueryWindow::new(d("2025-03-14"), d("2025-03-17")).unwrap();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-14"), StatusCode::Present, "#000000");
        fill_sundays(&mut store, &w, &config);
        assert_eq!(infer_sunday_absence(&mut store, &w, &config), 1);
    }

    #[test]
    fn half_tour_neighbor_does_not_block_inference() {
        let config = EngineConfig::default();
        let w = QueryWindow::new(d("2025-03-14"), d("2025-03-17")).unwrap();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-14"), StatusCode::Absent, "#FF0000");
        store.set_if_higher(1, d("2025-03-15"), StatusCode::TourHalf, "#06c1c4");
        fill_sundays(&mut store, &w, &config);
        assert_eq!(infer_sunday_absence(&mut store, &w, &config), 1);
        assert_eq!(status(&store, "2025-03-16"), StatusCode::Absent);

        // A full tour day does
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-15"), StatusCode::Tour, "#06c1c4");
        fill_sundays(&mut store, &w, &config);
        assert_eq!(infer_sunday_absence(&mut store, &w, &config), 0);
        assert_eq!(status(&store, "2025-03-16"), StatusCode::DayOff);
    }

    #[test]
    fn lone_sunday_stays_off() {
        let config = EngineConfig::default();
        let w = QueryWindow::new(d("2025-03-16"), d("2025-03-16")).unwrap();
        let mut store = DayStatusStore::default();
        store.employee_days_mut(1);
        fill_sundays(&mut store, &w, &config);
        assert_eq!(infer_sunday_absence(&mut store, &w, &config), 0);
        assert_eq!(store.entry(1, d("2025-03-16")).unwrap().status, StatusCode::DayOff);
    }

    #[test]
    fn nearby_search_skips_sundays_and_day_off() {
        let config = EngineConfig::default();
        let w = window();
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, d("2025-03-22"), StatusCode::Present, "#000000");
        fill_sundays(&mut store, &w, &config);
        // From Monday the 17th forward: Tue..Fri empty → Absent first
        assert_eq!(
            nearby_status(&store, 1, d("2025-03-17"), 1, &w, 7),
            Some(StatusCode::Absent)
        );
        // From Sunday 23 backwards the Saturday is Present
        assert_eq!(
            nearby_status(&store, 1, d("2025-03-23"), -1, &w, 7),
            Some(StatusCode::Present)
        );
        // Nothing after the window's last day
        assert_eq!(nearby_status(&store, 1, d("2025-03-23"), 1, &w, 7), None);
    }

    #[test]
    fn absent_rule_table() {
        let a = StatusCode::Absent;
        let p = StatusCode::Present;
        let lwp = StatusCode::LeaveWithoutPay;
        let awol = StatusCode::AbsentWithoutLeave;
        assert!(!should_mark_absent(None, None));
        assert!(should_mark_absent(Some(&a), Some(&awol)));
        assert!(should_mark_absent(Some(&a), None));
        assert!(should_mark_absent(None, Some(&a)));
        assert!(!should_mark_absent(Some(&p), Some(&a)));
        assert!(!should_mark_absent(Some(&p), None));
        // LWP is leave as well as absence: it only tips the scale when both
        // sides are absence-class
        assert!(should_mark_absent(Some(&lwp), Some(&a)));
        assert!(!should_mark_absent(Some(&lwp), None));
    }
}
