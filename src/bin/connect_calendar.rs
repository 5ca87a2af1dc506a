use casebook::components::google_calendar::{CallbackOutcome, CallbackParams, OauthCallbackHandler, TokenStore};
use casebook::config::Config;
use casebook::error::{other_error, CrmResult, Error};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;

/// Scope required for event list/create/update/delete on the primary calendar
const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events";

#[tokio::main]
async fn main() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    // Load configuration
    let config = Config::load()?;
    let client_id = config.require_google_client_id()?.to_string();

    // Random state to tie the callback to this run
    let state = uuid::Uuid::new_v4().to_string();

    // Construct authorization URL
    let auth_url = format!(
        "https://accounts.google.com/o/oauth2/v2/auth?\
        client_id={}&\
        redirect_uri={}&\
        response_type=code&\
        access_type=offline&\
        prompt=consent&\
        scope={}&\
        state={}",
        client_id, config.oauth_redirect_uri, CALENDAR_SCOPE, state
    );

    // Open browser for authorization
    println!("Opening browser for Google Calendar authorization...");
    webbrowser::open(&auth_url).map_err(Error::from)?;

    // Start local server to receive the callback
    let listen_addr = listen_address(&config.oauth_redirect_uri)?;
    let server = tiny_http::Server::http(&listen_addr)
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback on {}...", listen_addr);

    // Handle the callback
    let request = server
        .recv()
        .map_err(|e| other_error(&format!("Callback server error: {}", e)))?;
    let query = request.url().splitn(2, '?').nth(1).unwrap_or("").to_string();

    if returned_state(&query).as_deref() != Some(state.as_str()) {
        let _ = request.respond(tiny_http::Response::from_string("State mismatch, please retry."));
        return Err(other_error("OAuth state mismatch in callback").into());
    }

    let params = CallbackParams::from_query(&query);

    // Exchange the code at the backend and persist the credentials
    let store = match &config.token_store_path {
        Some(path) => TokenStore::with_path(path),
        None => TokenStore::new()?,
    };
    let handler = OauthCallbackHandler::new(config.api_base_url.clone(), store);

    let outcome = handler.handle(&params).await?;
    match outcome {
        CallbackOutcome::Authenticated { .. } => {
            let response = tiny_http::Response::from_string(
                "Authorization successful! You can close this window.",
            );
            request.respond(response).map_err(Error::from)?;
            info!("Calendar credentials saved");
            println!("Calendar connected.");
            Ok(())
        }
        CallbackOutcome::Failed { message } => {
            let response = tiny_http::Response::from_string(format!("Authorization failed: {}", message));
            let _ = request.respond(response);
            Err(other_error(&message).into())
        }
    }
}

/// Bind address derived from the configured redirect URI
fn listen_address(redirect_uri: &str) -> CrmResult<String> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| other_error(&format!("Invalid redirect URI: {}", e)))?;
    let port = url.port_or_known_default().unwrap_or(8080);
    Ok(format!("0.0.0.0:{}", port))
}

/// The `state` query parameter echoed back by the provider
fn returned_state(query: &str) -> Option<String> {
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "state")
        .map(|(_, value)| value.into_owned())
}
