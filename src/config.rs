use crate::error::{env_error, CrmResult, Error};
use chrono::Weekday;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Default base URL for the firm's backend API
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Default redirect URI used by the OAuth bootstrap binary
pub const DEFAULT_OAUTH_REDIRECT_URI: &str = "http://localhost:8080";

/// Main configuration structure for the CRM client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the CRM backend API
    pub api_base_url: String,
    /// Google Calendar API client ID (used by the OAuth bootstrap; the
    /// client secret stays on the backend, which performs the exchange)
    pub google_client_id: String,
    /// Redirect URI registered with the OAuth provider
    pub oauth_redirect_uri: String,
    /// Timezone for the calendar display range
    pub timezone: String,
    /// First day of the week in the calendar grid
    pub week_start: String,
    /// Override for the credentials file location
    pub token_store_path: Option<PathBuf>,
}

/// View preferences that can be overridden from a TOML file
#[derive(Debug, Deserialize)]
struct ViewPreferences {
    week_start: Option<String>,
    timezone: Option<String>,
}

impl Config {
    /// Load configuration from environment and the optional view preferences file
    pub fn load() -> CrmResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let api_base_url =
            env::var("CRM_API_BASE_URL").unwrap_or_else(|_| String::from(DEFAULT_API_BASE_URL));
        let google_client_id = env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
        let oauth_redirect_uri = env::var("OAUTH_REDIRECT_URI")
            .unwrap_or_else(|_| String::from(DEFAULT_OAUTH_REDIRECT_URI));

        let mut timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));
        let mut week_start = env::var("WEEK_START").unwrap_or_else(|_| String::from("sunday"));

        let token_store_path = env::var("TOKEN_STORE_PATH").ok().map(PathBuf::from);

        // View preferences file wins over environment defaults
        if let Ok(content) = fs::read_to_string("config/view.toml") {
            if let Ok(prefs) = toml::from_str::<ViewPreferences>(&content) {
                if let Some(ws) = prefs.week_start {
                    week_start = ws;
                }
                if let Some(tz) = prefs.timezone {
                    timezone = tz;
                }
            }
        }

        Ok(Config {
            api_base_url,
            google_client_id,
            oauth_redirect_uri,
            timezone,
            week_start,
            token_store_path,
        })
    }

    /// Require the Google client ID, for flows that cannot run without it
    pub fn require_google_client_id(&self) -> CrmResult<&str> {
        if self.google_client_id.is_empty() {
            return Err(env_error("GOOGLE_CLIENT_ID"));
        }
        Ok(&self.google_client_id)
    }

    /// Parse the configured week start day
    pub fn week_start_day(&self) -> CrmResult<Weekday> {
        match self.week_start.to_lowercase().as_str() {
            "monday" | "mon" => Ok(Weekday::Mon),
            "sunday" | "sun" => Ok(Weekday::Sun),
            "saturday" | "sat" => Ok(Weekday::Sat),
            other => Err(Error::Config(format!("Unsupported week start: {}", other))),
        }
    }

    /// Parse the configured display timezone
    pub fn display_timezone(&self) -> CrmResult<chrono_tz::Tz> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| Error::Config(format!("Unknown timezone: {}", self.timezone)))
    }
}
