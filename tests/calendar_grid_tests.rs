use casebook::components::calendar_view::{color_for_event, events_by_day, month_grid, visible_range};
use casebook::components::google_calendar::{CalendarEvent, EventTime};
use chrono::{Datelike, NaiveDate, Weekday};

fn day(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn timed_event(id: &str, start: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        summary: Some(format!("Event {}", id)),
        start: EventTime::at(start, "UTC"),
        ..Default::default()
    }
}

#[test]
fn grid_is_always_whole_weeks_and_covers_the_month() {
    for (year, month) in [(2024, 2), (2024, 3), (2023, 2), (2024, 12), (2025, 1)] {
        let reference = day(year, month, 1);
        let grid = month_grid(reference, Weekday::Sun, day(2020, 1, 1), None);

        assert_eq!(grid.len() % 7, 0, "{}-{} not whole weeks", year, month);

        let in_month: Vec<_> = grid.iter().filter(|c| c.in_month).collect();
        let days_in_month = if month == 12 {
            day(year + 1, 1, 1)
        } else {
            day(year, month + 1, 1)
        }
        .signed_duration_since(reference)
        .num_days();
        assert_eq!(in_month.len() as i64, days_in_month);

        // Consecutive dates, starting on the configured week start
        assert_eq!(grid[0].date.weekday(), Weekday::Sun);
        for pair in grid.windows(2) {
            assert_eq!(pair[1].date, pair[0].date.succ_opt().unwrap());
        }
    }
}

#[test]
fn grid_honors_configured_week_start() {
    // March 2024 starts on a Friday
    let grid = month_grid(day(2024, 3, 1), Weekday::Mon, day(2020, 1, 1), None);
    assert_eq!(grid[0].date.weekday(), Weekday::Mon);
    assert_eq!(grid[0].date, day(2024, 2, 26));

    let grid = month_grid(day(2024, 3, 1), Weekday::Sun, day(2020, 1, 1), None);
    assert_eq!(grid[0].date, day(2024, 2, 25));
}

#[test]
fn exact_week_month_has_no_padding() {
    // February 2021 is exactly four Monday-to-Sunday weeks
    let grid = month_grid(day(2021, 2, 1), Weekday::Mon, day(2020, 1, 1), None);
    assert_eq!(grid.len(), 28);
    assert!(grid.iter().all(|c| c.in_month));
}

#[test]
fn today_and_selected_cells_are_flagged() {
    let today = day(2024, 3, 15);
    let selected = day(2024, 3, 20);
    let grid = month_grid(day(2024, 3, 1), Weekday::Sun, today, Some(selected));

    let today_cells: Vec<_> = grid.iter().filter(|c| c.is_today).collect();
    assert_eq!(today_cells.len(), 1);
    assert_eq!(today_cells[0].date, today);

    let selected_cells: Vec<_> = grid.iter().filter(|c| c.is_selected).collect();
    assert_eq!(selected_cells.len(), 1);
    assert_eq!(selected_cells[0].date, selected);
}

#[test]
fn late_evening_utc_event_stays_on_its_own_date() {
    // Attribution uses the timestamp as written, never the viewer timezone
    let events = vec![timed_event("e1", "2024-03-15T22:00:00Z")];
    let buckets = events_by_day(&events);

    assert_eq!(buckets[&day(2024, 3, 15)].len(), 1);
    assert!(!buckets.contains_key(&day(2024, 3, 16)));
}

#[test]
fn offset_timestamps_use_their_own_calendar_date() {
    let events = vec![timed_event("e1", "2024-03-16T00:30:00+02:00")];
    let buckets = events_by_day(&events);

    assert!(buckets.contains_key(&day(2024, 3, 16)));
}

#[test]
fn all_day_events_bucket_by_their_date_field() {
    let event = CalendarEvent {
        id: "allday".to_string(),
        start: EventTime {
            date: Some("2024-03-10".to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    let events = vec![event];
    let buckets = events_by_day(&events);

    assert_eq!(buckets[&day(2024, 3, 10)].len(), 1);
}

#[test]
fn unparseable_starts_are_skipped() {
    let events = vec![timed_event("bad", "not-a-timestamp")];
    assert!(events_by_day(&events).is_empty());
}

#[test]
fn visible_range_spans_first_to_after_last_cell() {
    let grid = month_grid(day(2024, 3, 1), Weekday::Sun, day(2020, 1, 1), None);
    let (start, end) = visible_range(&grid, chrono_tz::UTC).unwrap();

    assert_eq!(start.to_rfc3339(), "2024-02-25T00:00:00+00:00");
    // Grid ends April 6; range is exclusive of the following midnight
    assert_eq!(end.to_rfc3339(), "2024-04-07T00:00:00+00:00");
}

#[test]
fn color_assignment_is_deterministic_per_id() {
    let first = color_for_event("abc123");
    let second = color_for_event("abc123");
    assert_eq!(first, second);

    // Colors look like CSS hex values
    assert!(first.starts_with('#') && first.len() == 7);
}

#[test]
fn color_assignment_spreads_across_the_palette() {
    let distinct: std::collections::HashSet<_> =
        (0..100).map(|i| color_for_event(&format!("event-{}", i))).collect();
    assert!(distinct.len() > 1);
}
