use super::token::{Credentials, TokenStore};
use crate::error::CrmResult;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

/// Where the user lands after the callback resolves, either way
pub const CALENDAR_ROUTE: &str = "/calendar";

/// Delay before redirecting away from a failed callback
pub const REDIRECT_DELAY: Duration = Duration::from_secs(3);

/// Query parameters delivered to the OAuth redirect target
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Extract `code` / `error` from a redirect URL
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Extract `code` / `error` from a bare query string
    pub fn from_query(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }
}

/// Outcome of handling the OAuth redirect.
///
/// Success navigates to [`CALENDAR_ROUTE`] immediately, replacing history
/// so back-navigation cannot repeat the exchange. Failure shows the message
/// and navigates to the same route after [`REDIRECT_DELAY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Authenticated { credentials: Credentials },
    Failed { message: String },
}

/// Error body shape used by the backend
#[derive(Debug, Deserialize)]
struct BackendError {
    detail: String,
}

/// Handles the page-load half of the OAuth flow: reads the authorization
/// code from the redirect, exchanges it at the backend, and persists the
/// resulting credentials.
pub struct OauthCallbackHandler {
    client: Client,
    api_base_url: String,
    store: TokenStore,
}

impl OauthCallbackHandler {
    pub fn new(api_base_url: impl Into<String>, store: TokenStore) -> Self {
        Self {
            client: Client::new(),
            api_base_url: api_base_url.into(),
            store,
        }
    }

    fn exchange_url(&self) -> String {
        format!("{}/api/calendar/oauth2callback", self.api_base_url)
    }

    /// Process the redirect parameters.
    ///
    /// The transport errors of the exchange itself are folded into a
    /// `Failed` outcome; only token-store I/O surfaces as `Err`.
    pub async fn handle(&self, params: &CallbackParams) -> CrmResult<CallbackOutcome> {
        if params.error.is_some() {
            warn!(error = ?params.error, "OAuth callback reported an error");
            return Ok(CallbackOutcome::Failed {
                message: "Authentication was cancelled or failed".to_string(),
            });
        }

        let Some(code) = params.code.as_deref() else {
            return Ok(CallbackOutcome::Failed {
                message: "No authorization code received".to_string(),
            });
        };

        match self.exchange_code(code).await {
            Ok(credentials) => {
                self.store.save(&credentials)?;
                info!("OAuth code exchange succeeded");
                Ok(CallbackOutcome::Authenticated { credentials })
            }
            Err(message) => {
                warn!(message, "OAuth code exchange failed");
                Ok(CallbackOutcome::Failed { message })
            }
        }
    }

    /// Exchange the authorization code at the backend token endpoint.
    ///
    /// The backend's expected delivery of the code is ambiguous, so a
    /// GET-with-query-param attempt is made first and a POST-with-JSON-body
    /// attempt follows if the GET is not OK.
    async fn exchange_code(&self, code: &str) -> Result<Credentials, String> {
        let url = self.exchange_url();

        let mut response = self
            .client
            .get(&url)
            .query(&[("code", code)])
            .send()
            .await
            .map_err(|e| format!("Token exchange request failed: {}", e))?;

        if !response.status().is_success() {
            response = self
                .client
                .post(&url)
                .json(&json!({ "code": code }))
                .send()
                .await
                .map_err(|e| format!("Token exchange request failed: {}", e))?;
        }

        if response.status().is_success() {
            response
                .json::<Credentials>()
                .await
                .map_err(|e| format!("Failed to parse credentials: {}", e))
        } else {
            let message = match response.json::<BackendError>().await {
                Ok(body) => body.detail,
                Err(_) => "Authentication failed".to_string(),
            };
            Err(message)
        }
    }
}
