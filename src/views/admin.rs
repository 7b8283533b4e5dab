//! Admin dashboard: doctor account creation

use std::sync::Arc;

use super::{blank_fields, report_failure, FormError, ViewError, MISSING_FIELDS_MESSAGE};
use crate::api::NewDoctor;
use crate::client::ApiClient;
use crate::notify::Notifier;

/// Specializations offered when creating a doctor
pub const SPECIALIZATIONS: [&str; 7] = [
    "Cardiologist",
    "Dermatologist",
    "General Physician",
    "Neurologist",
    "Pediatrician",
    "Psychiatrist",
    "Surgeon",
];

pub struct AdminDashboard {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    /// Whether the create-doctor dialog is open
    pub creating_doctor: bool,
    pub draft: NewDoctor,
}

impl AdminDashboard {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            creating_doctor: false,
            draft: NewDoctor::default(),
        }
    }

    pub fn open_create_doctor(&mut self) {
        self.creating_doctor = true;
    }

    pub fn close_create_doctor(&mut self) {
        self.creating_doctor = false;
    }

    /// Required fields of the draft that are still blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let d = &self.draft;
        let mut missing = blank_fields(&[
            ("full_name", d.full_name.as_str()),
            ("email", d.email.as_str()),
            ("password", d.password.as_str()),
            ("specialization", d.specialization.as_str()),
            ("phone_number", d.phone_number.as_str()),
            ("available_from", d.available_from.as_str()),
            ("available_to", d.available_to.as_str()),
            ("upi_id", d.upi_id.as_str()),
        ]);
        if d.max_appointments == 0 {
            missing.push("max_appointments");
        }
        missing
    }

    pub fn can_submit(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Create the drafted doctor account. On success the dialog closes and
    /// the draft resets to its defaults.
    pub async fn submit_create_doctor(&mut self) -> Result<serde_json::Value, ViewError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            self.notifier.error(MISSING_FIELDS_MESSAGE);
            return Err(FormError::MissingFields(missing).into());
        }

        match self.client.create_doctor(&self.draft).await {
            Ok(created) => {
                tracing::info!(email = %self.draft.email, "Doctor account created");
                self.notifier.success("Doctor account created successfully!");
                self.creating_doctor = false;
                self.draft = NewDoctor::default();
                Ok(created)
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error creating doctor",
                    &e,
                    "Failed to create doctor account",
                );
                Err(e.into())
            }
        }
    }
}
