use chrono::{Datelike, Duration, NaiveDate, Weekday};
use proptest::prelude::*;

use hrms_attendance::engine::reconcile;
use hrms_attendance::model::{AttendanceInput, AttendanceLog, LeaveDay, QueryWindow};
use hrms_attendance::status::priority;
use hrms_attendance::{DayStatusStore, EngineConfig, StatusCode};

const CODES: &[&str] = &[
    "P", "CL", "SL", "EL", "LWP", "STL", "T", "TH", "H", "FL", "A", "AWOL", "OFF", "WFH",
];

fn base() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
}

fn day(offset: u32) -> NaiveDate {
    base() + Duration::days(offset as i64)
}

fn candidate() -> impl Strategy<Value = (u32, usize)> {
    (0u32..6, 0..CODES.len())
}

fn apply(store: &mut DayStatusStore, (offset, idx): (u32, usize), color: &str) -> bool {
    store.set_if_higher(1, day(offset), StatusCode::from_code(CODES[idx]), color)
}

proptest! {
    #[test]
    fn retained_status_outranks_every_candidate(cands in prop::collection::vec(candidate(), 0..40)) {
        let mut store = DayStatusStore::default();
        for c in &cands {
            apply(&mut store, *c, "#000000");
        }
        for (offset, idx) in &cands {
            let retained = priority(&store.status_or_absent(1, day(*offset)));
            prop_assert!(retained >= priority(&StatusCode::from_code(CODES[*idx])));
        }
    }

    #[test]
    fn set_if_higher_is_idempotent(cands in prop::collection::vec(candidate(), 0..40)) {
        let mut once = DayStatusStore::default();
        let mut twice = DayStatusStore::default();
        for c in &cands {
            apply(&mut once, *c, "#000000");
            apply(&mut twice, *c, "#000000");
            prop_assert!(!apply(&mut twice, *c, "#000000"));
        }
        prop_assert_eq!(once.into_map(), twice.into_map());
    }

    #[test]
    fn equal_priority_keeps_first_write(first in 0usize..6, second in 0usize..6) {
        // All nine-priority leave codes
        let tier = ["CL", "SL", "EL", "LWP", "STL", "CO"];
        let mut store = DayStatusStore::default();
        store.set_if_higher(1, base(), StatusCode::from_code(tier[first]), "#111111");
        store.set_if_higher(1, base(), StatusCode::from_code(tier[second]), "#222222");
        let entry = store.entry(1, base()).unwrap();
        prop_assert_eq!(entry.status.code(), tier[first]);
        prop_assert_eq!(entry.color.as_str(), "#111111");
    }

    #[test]
    fn engine_never_lowers_a_source_status(
        logs in prop::collection::vec((0u32..14, 0..CODES.len()), 0..20),
        leaves in prop::collection::vec((0u32..14, 0usize..3), 0..10),
    ) {
        let window = QueryWindow::new(base(), day(13)).unwrap();
        let mut input = AttendanceInput::empty(window);
        for (offset, idx) in &logs {
            input.attendance_logs.push(AttendanceLog {
                employee_id: 1,
                date: day(*offset),
                status: StatusCode::from_code(CODES[*idx]),
                color: None,
                duration_secs: None,
            });
        }
        let leave_codes = ["SL", "EL", "LWP"];
        for (offset, idx) in &leaves {
            input.leave_days.push(LeaveDay {
                employee_id: 1,
                date: day(*offset),
                leave_type_short_code: leave_codes[*idx].into(),
                half_day_short_code: None,
                is_full_day: true,
                color: None,
            });
        }

        let map = reconcile(&EngineConfig::default(), &input).unwrap();
        if logs.is_empty() && leaves.is_empty() {
            prop_assert!(map.is_empty());
            return Ok(());
        }
        let days = &map[&1];
        prop_assert_eq!(days.len(), 14);
        for (offset, idx) in &logs {
            let date = day(*offset);
            let offered = priority(&StatusCode::from_code(CODES[*idx]));
            // A candidate that does not beat the empty-day default is never
            // stored, so the Sunday fill may still place a day-off there.
            if date.weekday() == Weekday::Sun && offered <= priority(&StatusCode::Absent) {
                continue;
            }
            prop_assert!(priority(&days[&date].status) >= offered);
        }
        for (offset, idx) in &leaves {
            let kept = priority(&days[&day(*offset)].status);
            prop_assert!(kept >= priority(&StatusCode::from_code(leave_codes[*idx])));
        }
    }
}
