//! View Models
//!
//! Headless counterparts of the hospital front-end pages. Each view owns its
//! state exclusively (`&mut self`), loads through the shared
//! [`ApiClient`], and reports every outcome through a [`Notifier`].
//!
//! ## Views
//!
//! - [`AdminDashboard`]: doctor account creation
//! - [`PatientDashboard`]: profile, appointments, prescriptions, booking
//! - [`DoctorDashboard`]: daily schedule, bills, pharmacy, prescriptions
//! - [`PrescriptionForm`]: prescription for one appointment
//! - [`BillForm`]: bill and UPI QR for one appointment
//! - [`IntakeForm`]: public patient intake form
//!
//! Submit actions check required fields first and refuse with a
//! [`FormError`] before any request is made.

mod admin;
mod bill;
mod doctor;
mod intake;
mod patient;
mod prescription;

pub use admin::{AdminDashboard, SPECIALIZATIONS};
pub use bill::BillForm;
pub use doctor::{
    bill_created_message, bills_for_doctor, cancellable, schedule_for_doctor, DoctorDashboard,
};
pub use intake::IntakeForm;
pub use patient::{upcoming_label, BookingForm, PatientDashboard, PatientStats};
pub use prescription::{MedicationSelection, PrescriptionForm, SelectedMedicine};

use thiserror::Error;

use crate::booking::BookingError;
use crate::client::{ApiClient, ClientError, AUTH_REQUIRED_MESSAGE};
use crate::notify::Notifier;

/// Message shown when a form is submitted incomplete
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all required fields";

/// Client-side form rejection; nothing was sent
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in all required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Booking(#[from] BookingError),
}

/// Failure of a view action
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ViewError {
    pub fn is_auth_required(&self) -> bool {
        matches!(self, ViewError::Client(e) if e.is_auth_required())
    }
}

/// Where the user goes after a successful action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Prescription { appointment_id: i64 },
    Bill { appointment_id: i64 },
}

/// Make sure a session exists before a view starts its fetches, so a missing
/// token produces one notification instead of one per fetch.
pub(crate) async fn ensure_session(
    client: &ApiClient,
    notifier: &dyn Notifier,
) -> Result<(), ViewError> {
    match client.has_session().await {
        Ok(true) => Ok(()),
        Ok(false) => {
            tracing::warn!("No session token found");
            notifier.error(AUTH_REQUIRED_MESSAGE);
            Err(ClientError::AuthRequired.into())
        }
        Err(e) => {
            report_failure(notifier, "Failed to read session", &e, AUTH_REQUIRED_MESSAGE);
            Err(e.into())
        }
    }
}

/// Log a failed operation and show its user-facing message
pub(crate) fn report_failure(
    notifier: &dyn Notifier,
    context: &str,
    err: &ClientError,
    default: &str,
) {
    tracing::error!(error = %err, "{}", context);
    notifier.error(&err.user_message(default));
}

/// Names of the required fields that are blank
pub(crate) fn blank_fields(fields: &[(&'static str, &str)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}
