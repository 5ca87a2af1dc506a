use super::models::{CalendarEvent, EventDraft, EventListResponse};
use crate::error::{validation_error, CrmResult, Error};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use tracing::info;
use url::Url;

/// Default base URL of the Google Calendar REST API
pub const GOOGLE_CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";

/// Events are read from and written to the user's primary calendar
const PRIMARY_CALENDAR: &str = "primary";

/// Provider operations the calendar view depends on
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> CrmResult<Vec<CalendarEvent>>;

    async fn create_event(&self, draft: &EventDraft) -> CrmResult<CalendarEvent>;

    async fn update_event(&self, event_id: &str, draft: &EventDraft) -> CrmResult<CalendarEvent>;

    async fn delete_event(&self, event_id: &str) -> CrmResult<()>;
}

/// Google Calendar API client.
///
/// Explicitly constructed and injected where needed; the token is the only
/// mutable piece and is set after login and cleared on disconnect. Every
/// operation fails with [`Error::Unauthenticated`] until a token is set.
#[derive(Debug, Clone)]
pub struct GoogleCalendarClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GoogleCalendarClient {
    pub fn new() -> Self {
        Self::with_base_url(GOOGLE_CALENDAR_API_BASE)
    }

    /// Client against a non-default API base, for tests
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn token(&self) -> CrmResult<&str> {
        self.token.as_deref().ok_or(Error::Unauthenticated)
    }

    fn events_url(&self) -> String {
        format!("{}/calendars/{}/events", self.base_url, PRIMARY_CALENDAR)
    }

    /// Turn a non-2xx response into an API error, preserving the body
    async fn error_from_response(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response".to_string());
        Error::Api { status, message }
    }

    fn validate_draft(draft: &EventDraft) -> CrmResult<()> {
        if draft.summary.trim().is_empty() {
            return Err(validation_error("Event title must not be empty"));
        }
        Ok(())
    }
}

impl Default for GoogleCalendarClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarClient {
    /// Fetch events within the given range, expanded and ordered by start time
    async fn list_events(
        &self,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> CrmResult<Vec<CalendarEvent>> {
        let access_token = self.token()?;

        let mut url = Url::parse(&self.events_url())
            .map_err(|e| Error::Other(format!("Failed to parse URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("timeMin", &time_min.to_rfc3339())
            .append_pair("timeMax", &time_max.to_rfc3339())
            .append_pair("singleEvents", "true")
            .append_pair("orderBy", "startTime")
            .append_pair("showDeleted", "false");

        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let data: EventListResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse events response: {}", e)))?;

        info!(count = data.items.len(), "Fetched calendar events");
        Ok(data.items)
    }

    async fn create_event(&self, draft: &EventDraft) -> CrmResult<CalendarEvent> {
        Self::validate_draft(draft)?;
        let access_token = self.token()?;

        let response = self
            .client
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(draft)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse event response: {}", e)))
    }

    async fn update_event(&self, event_id: &str, draft: &EventDraft) -> CrmResult<CalendarEvent> {
        Self::validate_draft(draft)?;
        let access_token = self.token()?;

        let response = self
            .client
            .put(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(access_token)
            .json(draft)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse event response: {}", e)))
    }

    async fn delete_event(&self, event_id: &str) -> CrmResult<()> {
        let access_token = self.token()?;

        let response = self
            .client
            .delete(format!("{}/{}", self.events_url(), event_id))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        info!(event_id, "Deleted calendar event");
        Ok(())
    }
}
