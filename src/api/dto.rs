//! Data Transfer Objects
//!
//! Request and response types for the hospital backend. The backend declares
//! no schema, so every response type decodes leniently: unknown fields are
//! ignored and missing optional fields default.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================
// Decoding helpers
// ============================================

/// A response that is either a single object or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

/// Numbers that may arrive as JSON numbers or numeric strings ("12", "450.00")
fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        NumberOrString::Int(i) => Some(i as f64),
        NumberOrString::Float(f) => Some(f),
        NumberOrString::Text(s) => s.trim().parse().ok(),
    }))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        NumberOrString::Int(i) => Some(i),
        NumberOrString::Float(f) if f.fract() == 0.0 => Some(f as i64),
        NumberOrString::Float(_) => None,
        NumberOrString::Text(s) => s.trim().parse().ok(),
    }))
}

// ============================================
// Accounts
// ============================================

/// Account record nested inside doctor payloads
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UserAccount {
    pub id: i64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
}

/// Logged-in user as returned by `/api/auth/user/`.
///
/// Patients come back flat (`id`, `full_name`); doctors come back with a
/// nested `user` plus their practice details.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub user: Option<UserAccount>,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub available_to: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub max_appointments: Option<i64>,
}

impl Profile {
    /// Name of the person, preferring the nested account record
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.full_name.as_str())
            .filter(|n| !n.trim().is_empty())
            .or(self.full_name.as_deref())
            .filter(|n| !n.trim().is_empty())
    }

    /// Doctor name used to match `doctor_name` on appointments and bills
    pub fn doctor_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.full_name.as_str())
            .filter(|n| !n.trim().is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.email.as_deref())
            .or(self.email.as_deref())
    }

    pub fn phone_number(&self) -> Option<&str> {
        self.user
            .as_ref()
            .and_then(|u| u.phone_number.as_deref())
            .or(self.phone_number.as_deref())
    }

    /// Avatar initial: first letter of the name, upper-cased, or `fallback`
    pub fn initial(&self, fallback: char) -> char {
        self.display_name()
            .and_then(|n| n.chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or(fallback)
    }
}

/// Doctor listing entry from `/api/auth/doctors/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Doctor {
    pub user: UserAccount,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub available_from: Option<String>,
    #[serde(default)]
    pub available_to: Option<String>,
    #[serde(default)]
    pub upi_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub max_appointments: Option<i64>,
}

impl Doctor {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn specialization_label(&self) -> &str {
        self.specialization
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("General Physician")
    }

    /// "08:00:00 - 20:00:00" style availability window
    pub fn availability(&self) -> String {
        format!(
            "{} - {}",
            self.available_from.as_deref().unwrap_or("N/A"),
            self.available_to.as_deref().unwrap_or("N/A")
        )
    }
}

/// Payload for `/api/auth/create-doctor/`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewDoctor {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub specialization: String,
    pub phone_number: String,
    pub available_from: String,
    pub available_to: String,
    pub upi_id: String,
    pub max_appointments: u32,
}

impl Default for NewDoctor {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            specialization: String::new(),
            phone_number: String::new(),
            available_from: "08:00:00".to_string(),
            available_to: "20:00:00".to_string(),
            upi_id: String::new(),
            max_appointments: 10,
        }
    }
}

// ============================================
// Appointments
// ============================================

/// Appointment lifecycle state as reported by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Appointment {
    pub id: i64,
    #[serde(default)]
    pub patient: Option<i64>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub token_no: Option<i64>,
    #[serde(default)]
    pub status: Option<AppointmentStatus>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Appointment {
    /// Status, treating a missing one as pending
    pub fn status(&self) -> AppointmentStatus {
        self.status.unwrap_or_default()
    }

    pub fn is_cancellable(&self) -> bool {
        self.status() == AppointmentStatus::Pending
    }

    pub fn patient_label(&self) -> &str {
        self.patient_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown Patient")
    }
}

/// Payload for booking an appointment
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: i64,
    /// UTC, `YYYY-MM-DDTHH:MM:SS`
    pub start_time: String,
    pub end_time: String,
    pub description: String,
}

/// Marker the backend puts in `status` when a booking went through
pub const BOOKED_STATUS: &str = "appointment booked successfully";

#[derive(Debug, Clone, Deserialize)]
pub struct BookingResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "appointment data")]
    pub appointment: Option<serde_json::Value>,
}

impl BookingResponse {
    pub fn is_booked(&self) -> bool {
        self.status.as_deref() == Some(BOOKED_STATUS)
    }
}

// ============================================
// Prescriptions & pharmacy
// ============================================

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Medicine {
    pub id: i64,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

impl Medicine {
    /// Case-insensitive substring match on the medicine name
    pub fn matches(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Medication line inside a fetched prescription
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PrescribedMedication {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub medicine: Option<i64>,
    #[serde(default)]
    pub medicine_name: Option<String>,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub quantity: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Prescription {
    pub id: i64,
    #[serde(default)]
    pub appointment: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub medications: Vec<PrescribedMedication>,
}

impl Prescription {
    /// A prescription is active while any medication still has days left
    pub fn is_active(&self) -> bool {
        self.medications.iter().any(|m| m.days.unwrap_or(0) > 0)
    }
}

/// Medication line sent when creating a prescription
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MedicationLine {
    pub medicine: i64,
    pub dosage: String,
    pub quantity: u32,
    pub days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPrescription {
    pub description: String,
    pub medications: Vec<MedicationLine>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PharmacyOrder {
    pub id: i64,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ============================================
// Billing
// ============================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    #[default]
    Upi,
    Cash,
}

impl fmt::Display for PaymentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentType::Upi => f.write_str("upi"),
            PaymentType::Cash => f.write_str("cash"),
        }
    }
}

impl FromStr for PaymentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upi" => Ok(PaymentType::Upi),
            "cash" => Ok(PaymentType::Cash),
            other => Err(format!("Unknown payment type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Bill {
    pub id: i64,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub payment_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewBill {
    pub total_amount: f64,
    pub payment_type: PaymentType,
}

/// Response to creating a bill
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BillReceipt {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_amount: Option<f64>,
    #[serde(default)]
    pub patient_name: Option<String>,
}

impl BillReceipt {
    pub fn amount(&self) -> Option<f64> {
        self.amount.or(self.total_amount)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpiQrRequest {
    pub amount: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpiQr {
    /// Image path relative to the backend base URL
    pub qr_url: String,
}

// ============================================
// Patient intake
// ============================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Sex {
    Male,
    Female,
    Other,
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Sex::Male),
            "female" | "f" => Ok(Sex::Female),
            "other" | "o" => Ok(Sex::Other),
            other => Err(format!("Unknown sex: {}", other)),
        }
    }
}

/// Payload for the unauthenticated `/api/user/` form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientIntake {
    pub name: String,
    pub age: u32,
    pub sex: Sex,
}
