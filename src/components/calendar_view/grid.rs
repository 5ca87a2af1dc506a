use crate::components::google_calendar::models::CalendarEvent;
use crate::error::{CrmResult, Error};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use std::collections::HashMap;
use tracing::warn;

/// One cell of the month grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the leading/trailing days of adjacent months
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

/// How many days `day` falls after the configured week start
fn days_from_week_start(day: Weekday, week_start: Weekday) -> u32 {
    (day.num_days_from_monday() + 7 - week_start.num_days_from_monday()) % 7
}

/// Build the display grid for the month containing `reference`.
///
/// Cells span complete weeks covering the month, so the result length is
/// always a multiple of 7 and every day of the month is present.
pub fn month_grid(
    reference: NaiveDate,
    week_start: Weekday,
    today: NaiveDate,
    selected: Option<NaiveDate>,
) -> Vec<DayCell> {
    let month = reference.month();
    let first = reference.with_day(1).unwrap_or(reference);
    let lead = days_from_week_start(first.weekday(), week_start);

    let mut cells = Vec::with_capacity(42);
    let mut date = first - Duration::days(i64::from(lead));
    loop {
        cells.push(DayCell {
            date,
            in_month: date.month() == month,
            is_today: date == today,
            is_selected: selected == Some(date),
        });
        date += Duration::days(1);
        // Stop once the month is fully covered and the week is complete
        if date.month() != month && cells.len() % 7 == 0 {
            break;
        }
    }
    cells
}

/// Fetch bounds for a grid: first cell midnight to the midnight after the
/// last cell, in the display timezone, expressed in UTC.
pub fn visible_range(grid: &[DayCell], tz: Tz) -> CrmResult<(DateTime<Utc>, DateTime<Utc>)> {
    let (first, last) = match (grid.first(), grid.last()) {
        (Some(first), Some(last)) => (first.date, last.date),
        _ => return Err(Error::Other("Empty calendar grid".to_string())),
    };

    let start = local_midnight(first, tz)?;
    let end = local_midnight(last + Duration::days(1), tz)?;
    Ok((start.with_timezone(&Utc), end.with_timezone(&Utc)))
}

fn local_midnight(date: NaiveDate, tz: Tz) -> CrmResult<DateTime<Tz>> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::Other("Failed to create datetime".to_string()))?;
    match tz.from_local_datetime(&naive) {
        chrono::LocalResult::Single(dt) => Ok(dt),
        // Midnight skipped or doubled by a DST transition; take the earliest
        chrono::LocalResult::Ambiguous(dt, _) => Ok(dt),
        chrono::LocalResult::None => tz
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| Error::Other("Invalid local time".to_string())),
    }
}

/// Calendar date an event is attributed to: the date containing its start
/// instant as written, in the timestamp's own offset. A start of
/// `2024-03-15T22:00:00Z` always lands on 2024-03-15.
pub fn event_start_date(event: &CalendarEvent) -> Option<NaiveDate> {
    if let Some(date_time) = &event.start.date_time {
        match DateTime::parse_from_rfc3339(date_time) {
            Ok(dt) => return Some(dt.date_naive()),
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Unparseable event start");
                return None;
            }
        }
    }
    if let Some(date) = &event.start.date {
        match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
            Ok(d) => return Some(d),
            Err(e) => {
                warn!(event_id = %event.id, error = %e, "Unparseable event date");
                return None;
            }
        }
    }
    None
}

/// Bucket events by the calendar date of their start instant.
///
/// Date-only attribution: an event belongs to exactly one cell, never to a
/// time-range overlap.
pub fn events_by_day(events: &[CalendarEvent]) -> HashMap<NaiveDate, Vec<&CalendarEvent>> {
    let mut buckets: HashMap<NaiveDate, Vec<&CalendarEvent>> = HashMap::new();
    for event in events {
        if let Some(date) = event_start_date(event) {
            buckets.entry(date).or_default().push(event);
        }
    }
    buckets
}
