use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::store::PgStore;

#[derive(Clone)]
pub struct AppState {
    pub store: PgStore,
    pub default_country: String,
}

/* -------------------------
   Shared API envelope
--------------------------*/

/// Flat success/message body used by every mutating endpoint. Business
/// failures ride this shape on HTTP 200.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

impl StatusResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/* -------------------------
   Appointment status
--------------------------*/

/// Stored as smallint. `Cancelled` is terminal: no transition leaves it, and
/// appointments in any other status count as "active" for the
/// one-active-appointment-per-donor rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "smallint")]
#[repr(i16)]
pub enum AppointmentStatus {
    Pending = 0,
    Cancelled = 1,
}

impl AppointmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AppointmentStatus::Cancelled)
    }
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PersonRow {
    pub person_id: i64,
    pub national_no: String,
    pub first_name: String,
    pub second_name: String,
    pub third_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: i16,
    pub address: String,
    pub phone: String,
    pub email: Option<String>,
    pub nationality_country_id: i64,
    pub image_path: Option<String>,
}

impl PersonRow {
    /// Name parts the registration form left blank are stored as empty
    /// strings; skip them instead of printing doubled spaces.
    pub fn full_name(&self) -> String {
        [
            self.first_name.as_str(),
            self.second_name.as_str(),
            self.third_name.as_deref().unwrap_or(""),
            self.last_name.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct MobileUserRow {
    pub mobile_user_id: i64,
    pub person_id: i64,
    pub phone_number: String,
    pub password_hash: String,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DonorRow {
    pub donor_id: i64,
    pub person_id: i64,
    pub height: f64,
    pub weight: f64,
    pub last_donation_date: Option<NaiveDate>,
    pub medical_record: String,
    pub can_donate: bool,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DonationAppointmentRow {
    pub donation_appointment_id: i64,
    pub donor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub location: String,
    pub status: AppointmentStatus,
    pub source: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NotificationRow {
    pub notification_id: i64,
    pub mobile_user_id: i64,
    pub donation_appointment_id: Option<i64>,
    pub donation_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct DonationRow {
    pub donation_id: i64,
    pub donor_id: i64,
    pub donation_date: NaiveDate,
    pub blood_volume: f64,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CountryRow {
    pub country_id: i64,
    pub country_name: String,
}

/// Patients (blood recipients) are managed admin-side; the mobile API only
/// reads the blood type back into the profile payload.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PatientRow {
    pub patient_id: i64,
    pub person_id: i64,
    pub blood_type: String,
}

/* -------------------------
   Insert payloads
--------------------------*/

#[derive(Debug, Clone)]
pub struct NewPerson {
    pub national_no: String,
    pub first_name: String,
    pub second_name: String,
    pub third_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: i16,
    pub address: String,
    pub phone: String,
    pub email: Option<String>,
    pub nationality_country_id: i64,
    pub image_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub donor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub location: String,
    pub source: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub mobile_user_id: i64,
    pub donation_appointment_id: Option<i64>,
    pub donation_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
}
