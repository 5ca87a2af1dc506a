use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// CRM client record.
///
/// Almost everything is optional: intake forms are filled in over time and
/// the backend tolerates sparse records. Identity is the `id` alone.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub middle_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fax_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alternate_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_address_line1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_address_line2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marital_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spouse_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_injury: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub communication_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_manager: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    /// Open-ended custom fields, keyed by field name
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub user_defined_fields: HashMap<String, serde_json::Value>,
    /// Document name to storage URL
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub client_documents: HashMap<String, String>,
}

/// CRM-side appointment record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub title: String,
    pub client_id: i64,
    pub date: String,
    pub time: String,
    pub appointment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Payload for creating an appointment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub title: String,
    pub client_id: i64,
    pub date: String,
    pub time: String,
    pub appointment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Outbound email request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailSend {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub client_id: String,
}

/// Stored email, as returned in a client's history
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmailRecord {
    pub id: String,
    pub client_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default)]
    pub read_status: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
}

/// Wrapper the backend uses for a client's email history
#[derive(Debug, Deserialize)]
pub(crate) struct ClientEmailsResponse {
    #[serde(default)]
    pub emails: Vec<EmailRecord>,
}

/// Per-client email counts
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EmailStats {
    pub total_emails: u64,
    pub inbound_emails: u64,
    pub outbound_emails: u64,
    pub unread_emails: u64,
}

/// Acknowledgement body: `{"message": "..."}`
#[derive(Debug, Clone, Deserialize)]
pub struct Acknowledgement {
    pub message: String,
}
