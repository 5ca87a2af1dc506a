pub mod models;

pub use models::{
    Acknowledgement, Appointment, AppointmentDraft, ClientRecord, EmailRecord, EmailSend,
    EmailStats,
};

use crate::error::{CrmResult, Error};
use models::ClientEmailsResponse;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

/// Typed client for the firm's backend REST API.
///
/// JSON request/response throughout; any non-2xx status is a failure
/// carrying the backend's `detail` message (or the raw body) unmodified.
#[derive(Debug, Clone)]
pub struct CrmApiClient {
    client: Client,
    base_url: String,
}

impl CrmApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check<T: DeserializeOwned>(response: reqwest::Response) -> CrmResult<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from))
                .unwrap_or_else(|| {
                    if body.is_empty() {
                        status.canonical_reason().unwrap_or("request failed").to_string()
                    } else {
                        body
                    }
                });
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| Error::Serialization(format!("Failed to parse API response: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> CrmResult<T> {
        let response = self.client.get(self.url(path)).send().await?;
        Self::check(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> CrmResult<T> {
        let response = self.client.post(self.url(path)).json(body).send().await?;
        Self::check(response).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> CrmResult<T> {
        let response = self.client.put(self.url(path)).json(body).send().await?;
        Self::check(response).await
    }

    async fn delete(&self, path: &str) -> CrmResult<()> {
        let response = self.client.delete(self.url(path)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }

    // --- Client records ---

    pub async fn list_clients(&self) -> CrmResult<Vec<ClientRecord>> {
        self.get("/api/clients/").await
    }

    pub async fn get_client(&self, client_id: &str) -> CrmResult<ClientRecord> {
        self.get(&format!("/api/clients/{}", client_id)).await
    }

    pub async fn create_client(&self, record: &ClientRecord) -> CrmResult<ClientRecord> {
        info!(
            first_name = %record.first_name,
            last_name = %record.last_name,
            "Creating client record"
        );
        self.post("/api/clients/", record).await
    }

    pub async fn update_client(&self, client_id: &str, record: &ClientRecord) -> CrmResult<ClientRecord> {
        self.put(&format!("/api/clients/{}", client_id), record).await
    }

    pub async fn delete_client(&self, client_id: &str) -> CrmResult<()> {
        self.delete(&format!("/api/clients/{}", client_id)).await
    }

    // --- Appointments ---

    pub async fn list_appointments(&self) -> CrmResult<Vec<Appointment>> {
        self.get("/api/calendar/").await
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> CrmResult<Appointment> {
        self.get(&format!("/api/calendar/{}", appointment_id)).await
    }

    pub async fn create_appointment(&self, draft: &AppointmentDraft) -> CrmResult<Appointment> {
        self.post("/api/calendar/", draft).await
    }

    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        draft: &AppointmentDraft,
    ) -> CrmResult<Appointment> {
        self.put(&format!("/api/calendar/{}", appointment_id), draft).await
    }

    pub async fn delete_appointment(&self, appointment_id: i64) -> CrmResult<()> {
        self.delete(&format!("/api/calendar/{}", appointment_id)).await
    }

    // --- Emails ---

    pub async fn send_email(&self, email: &EmailSend) -> CrmResult<Acknowledgement> {
        self.post("/api/emails/send", email).await
    }

    pub async fn client_emails(
        &self,
        client_id: &str,
        limit: u32,
        offset: u32,
    ) -> CrmResult<Vec<EmailRecord>> {
        let response: ClientEmailsResponse = self
            .get(&format!(
                "/api/emails/client/{}?limit={}&offset={}",
                client_id, limit, offset
            ))
            .await?;
        Ok(response.emails)
    }

    pub async fn client_email_stats(&self, client_id: &str) -> CrmResult<EmailStats> {
        self.get(&format!("/api/emails/client/{}/stats", client_id)).await
    }

    pub async fn mark_email_read(&self, email_id: &str) -> CrmResult<Acknowledgement> {
        let response = self
            .client
            .patch(self.url(&format!("/api/emails/mark-read/{}", email_id)))
            .send()
            .await?;
        Self::check(response).await
    }

    pub async fn trigger_email_sync(&self) -> CrmResult<Acknowledgement> {
        self.post("/api/emails/sync", &serde_json::json!({})).await
    }

    pub async fn sync_status(&self) -> CrmResult<serde_json::Value> {
        self.get("/api/emails/sync-status").await
    }
}
