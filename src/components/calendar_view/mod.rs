pub mod colors;
pub mod grid;

pub use colors::color_for_event;
pub use grid::{events_by_day, month_grid, visible_range, DayCell};

use crate::components::google_calendar::{
    CalendarEvent, CalendarProvider, Credentials, EventDraft, GoogleCalendarClient, TokenStore,
};
use crate::error::CrmResult;
use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use tracing::{info, warn};

/// Authentication state of the calendar view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    CheckingAuth,
    Unauthenticated,
    Authenticated,
}

/// Composition root for the calendar screen.
///
/// Owns the token store, the provider client, the reference month, and the
/// displayed event list. All access is single-threaded from the UI loop;
/// the only supersession rule is last-write-wins on `refresh`.
pub struct CalendarApp {
    store: TokenStore,
    client: GoogleCalendarClient,
    state: ViewState,
    reference_month: NaiveDate,
    selected: Option<NaiveDate>,
    week_start: Weekday,
    timezone: Tz,
    events: Vec<CalendarEvent>,
}

impl CalendarApp {
    pub fn new(store: TokenStore, client: GoogleCalendarClient, week_start: Weekday, timezone: Tz) -> Self {
        let today = Self::today_in(timezone);
        Self {
            store,
            client,
            state: ViewState::CheckingAuth,
            reference_month: today.with_day(1).unwrap_or(today),
            selected: None,
            week_start,
            timezone,
            events: Vec::new(),
        }
    }

    fn today_in(timezone: Tz) -> NaiveDate {
        Utc::now().with_timezone(&timezone).date_naive()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn reference_month(&self) -> NaiveDate {
        self.reference_month
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn select(&mut self, date: Option<NaiveDate>) {
        self.selected = date;
    }

    /// Restore a stored session, if a valid token exists
    pub fn bootstrap(&mut self) -> CrmResult<ViewState> {
        match self.store.load()? {
            Some(credentials) => {
                self.client.set_token(credentials.access_token);
                self.state = ViewState::Authenticated;
                info!("Restored calendar session from stored credentials");
            }
            None => {
                self.state = ViewState::Unauthenticated;
            }
        }
        Ok(self.state)
    }

    /// Persist fresh credentials and enter the authenticated state
    pub fn complete_login(&mut self, credentials: Credentials) -> CrmResult<()> {
        self.store.save(&credentials)?;
        self.client.set_token(credentials.access_token);
        self.state = ViewState::Authenticated;
        Ok(())
    }

    /// Explicit disconnect: forget the token and drop the event list
    pub fn disconnect(&mut self) -> CrmResult<()> {
        self.store.clear()?;
        self.client.clear_token();
        self.events.clear();
        self.state = ViewState::Unauthenticated;
        info!("Disconnected from calendar");
        Ok(())
    }

    /// The display grid for the current month
    pub fn grid(&self) -> Vec<DayCell> {
        month_grid(
            self.reference_month,
            self.week_start,
            Self::today_in(self.timezone),
            self.selected,
        )
    }

    /// Fetch bounds for the currently visible grid
    pub fn visible_range(&self) -> CrmResult<(DateTime<Utc>, DateTime<Utc>)> {
        visible_range(&self.grid(), self.timezone)
    }

    pub fn next_month(&mut self) {
        self.reference_month = shift_month(self.reference_month, 1);
    }

    pub fn prev_month(&mut self) {
        self.reference_month = shift_month(self.reference_month, -1);
    }

    pub fn go_to_today(&mut self) {
        let today = Self::today_in(self.timezone);
        self.reference_month = today.with_day(1).unwrap_or(today);
    }

    /// Re-fetch events for the visible range, replacing the displayed list
    pub async fn refresh(&mut self) -> CrmResult<&[CalendarEvent]> {
        let (time_min, time_max) = self.visible_range()?;
        let result = self.client.list_events(time_min, time_max).await;
        let events = self.check_auth(result)?;
        self.events = events;
        Ok(&self.events)
    }

    pub async fn create_event(&mut self, draft: &EventDraft) -> CrmResult<CalendarEvent> {
        let result = self.client.create_event(draft).await;
        self.check_auth(result)
    }

    pub async fn update_event(&mut self, event_id: &str, draft: &EventDraft) -> CrmResult<CalendarEvent> {
        let result = self.client.update_event(event_id, draft).await;
        self.check_auth(result)
    }

    pub async fn delete_event(&mut self, event_id: &str) -> CrmResult<()> {
        let result = self.client.delete_event(event_id).await;
        self.check_auth(result)
    }

    /// An unauthorized failure invalidates the session: the store is
    /// cleared and the view drops to Unauthenticated. Other errors leave
    /// state untouched and surface to the caller as inline alerts.
    fn check_auth<T>(&mut self, result: CrmResult<T>) -> CrmResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                if let Err(clear_err) = self.store.clear() {
                    warn!("Failed to clear stored credentials: {}", clear_err);
                }
                self.client.clear_token();
                self.events.clear();
                self.state = ViewState::Unauthenticated;
            }
        }
        result
    }
}

/// Move a month reference forward or back, pinned to the first of month
fn shift_month(reference: NaiveDate, delta: i32) -> NaiveDate {
    let months = reference.year() * 12 + reference.month0() as i32 + delta;
    let year = months.div_euclid(12);
    let month0 = months.rem_euclid(12) as u32;
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).unwrap_or(reference)
}
