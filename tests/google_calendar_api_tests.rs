use casebook::components::calendar_view::{CalendarApp, ViewState};
use casebook::components::google_calendar::{
    CalendarProvider, Credentials, EventDraft, EventTime, GoogleCalendarClient, TokenStore,
};
use casebook::error::Error;
use chrono::{TimeZone, Utc, Weekday};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn authed_client(server: &MockServer) -> GoogleCalendarClient {
    let mut client = GoogleCalendarClient::with_base_url(server.uri());
    client.set_token("ya29.test-token");
    client
}

fn draft(summary: &str) -> EventDraft {
    EventDraft {
        summary: summary.to_string(),
        start: EventTime::at("2024-03-15T10:00:00Z", "UTC"),
        end: EventTime::at("2024-03-15T11:00:00Z", "UTC"),
        ..Default::default()
    }
}

fn event_body(id: &str, summary: &str) -> serde_json::Value {
    json!({
        "id": id,
        "summary": summary,
        "start": { "dateTime": "2024-03-15T10:00:00Z", "timeZone": "UTC" },
        "end": { "dateTime": "2024-03-15T11:00:00Z", "timeZone": "UTC" }
    })
}

#[tokio::test]
async fn operations_require_a_token() {
    let server = MockServer::start().await;
    let client = GoogleCalendarClient::with_base_url(server.uri());

    let time_min = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let time_max = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();
    let err = client.list_events(time_min, time_max).await.unwrap_err();

    assert!(matches!(err, Error::Unauthenticated));
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn list_events_sends_the_expected_query_and_parses_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .and(query_param("timeMin", "2024-03-01T00:00:00+00:00"))
        .and(query_param("timeMax", "2024-04-01T00:00:00+00:00"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("showDeleted", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_body("e1", "Intake meeting"), event_body("e2", "Deposition")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let time_min = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let time_max = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

    let events = client.list_events(time_min, time_max).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].id, "e1");
    assert_eq!(events[0].summary.as_deref(), Some("Intake meeting"));
    assert_eq!(events[1].start.date_time.as_deref(), Some("2024-03-15T10:00:00Z"));
}

#[tokio::test]
async fn create_event_posts_the_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_body("new1", "Hearing")))
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let created = client.create_event(&draft("Hearing")).await.unwrap();

    assert_eq!(created.id, "new1");
}

#[tokio::test]
async fn update_event_puts_the_draft_to_the_event_path() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/e1"))
        .and(body_json(json!({
            "summary": "Hearing (rescheduled)",
            "start": { "dateTime": "2024-03-15T10:00:00Z", "timeZone": "UTC" },
            "end": { "dateTime": "2024-03-15T11:00:00Z", "timeZone": "UTC" }
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(event_body("e1", "Hearing (rescheduled)")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let updated = client
        .update_event("e1", &draft("Hearing (rescheduled)"))
        .await
        .unwrap();

    assert_eq!(updated.id, "e1");
    assert_eq!(updated.summary.as_deref(), Some("Hearing (rescheduled)"));
}

#[tokio::test]
async fn blank_titles_are_rejected_before_dispatch() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_body("x", "x")))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/calendars/primary/events/e1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(event_body("e1", "x")))
        .expect(0)
        .mount(&server)
        .await;

    let client = authed_client(&server);

    let err = client.create_event(&draft("   ")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    // Updates are validated the same way as creates
    let err = client.update_event("e1", &draft("   ")).await.unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn deleted_events_disappear_from_subsequent_lists() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_body("keep", "Keep"), event_body("gone", "Delete me")]
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/calendars/primary/events/gone"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [event_body("keep", "Keep")]
        })))
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let time_min = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let time_max = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

    let before = client.list_events(time_min, time_max).await.unwrap();
    assert!(before.iter().any(|e| e.id == "gone"));

    client.delete_event("gone").await.unwrap();

    let after = client.list_events(time_min, time_max).await.unwrap();
    assert!(!after.iter().any(|e| e.id == "gone"));
}

#[tokio::test]
async fn provider_errors_preserve_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Rate limit exceeded"))
        .mount(&server)
        .await;

    let client = authed_client(&server);
    let time_min = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let time_max = Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap();

    let err = client.list_events(time_min, time_max).await.unwrap_err();
    match err {
        Error::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Rate limit exceeded");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn unauthorized_responses_invalidate_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/calendars/primary/events"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid Credentials"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = TokenStore::with_path(dir.path().join("credentials.json"));
    store
        .save(&Credentials {
            access_token: "ya29.stale".to_string(),
            expires_at: Utc::now().timestamp() + 3600,
            scope: String::new(),
        })
        .unwrap();

    let client = GoogleCalendarClient::with_base_url(server.uri());
    let mut app = CalendarApp::new(store.clone(), client, Weekday::Sun, chrono_tz::UTC);

    assert_eq!(app.bootstrap().unwrap(), ViewState::Authenticated);

    let err = app.refresh().await.unwrap_err();
    assert!(err.is_unauthorized());

    // The 401 forced the view back to Unauthenticated and wiped the store
    assert_eq!(app.state(), ViewState::Unauthenticated);
    assert!(store.load().unwrap().is_none());
}
