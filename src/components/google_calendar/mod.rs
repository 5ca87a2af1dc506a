pub mod client;
pub mod models;
pub mod oauth;
pub mod token;

pub use client::{CalendarProvider, GoogleCalendarClient};
pub use models::{CalendarEvent, EventDraft, EventTime};
pub use oauth::{CallbackOutcome, CallbackParams, OauthCallbackHandler, CALENDAR_ROUTE, REDIRECT_DELAY};
pub use token::{Credentials, TokenStore};
