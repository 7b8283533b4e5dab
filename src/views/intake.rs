//! Public patient intake form

use std::sync::Arc;

use super::{blank_fields, FormError, ViewError, MISSING_FIELDS_MESSAGE};
use crate::api::{PatientIntake, Sex};
use crate::client::{ApiClient, ClientError};
use crate::notify::Notifier;

pub const INTAKE_SUCCESS_MESSAGE: &str = "User data submitted successfully!";
pub const INTAKE_OFFLINE_MESSAGE: &str = "Could not connect to backend!";

/// Name, age and sex of a walk-in patient. No session is needed.
pub struct IntakeForm {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    pub name: String,
    pub age: String,
    pub sex: Option<Sex>,
    /// Result line shown under the form
    pub message: Option<String>,
}

impl IntakeForm {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            name: String::new(),
            age: String::new(),
            sex: None,
            message: None,
        }
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = blank_fields(&[("name", self.name.as_str()), ("age", self.age.as_str())]);
        if self.sex.is_none() {
            missing.push("sex");
        }
        missing
    }

    fn to_request(&self) -> Result<PatientIntake, FormError> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }
        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| FormError::Invalid(format!("Invalid age: {}", self.age.trim())))?;

        Ok(PatientIntake {
            name: self.name.trim().to_string(),
            age,
            sex: self.sex.unwrap_or(Sex::Other),
        })
    }

    pub async fn submit(&mut self) -> Result<(), ViewError> {
        let intake = match self.to_request() {
            Ok(i) => i,
            Err(e) => {
                let text = match &e {
                    FormError::MissingFields(_) => MISSING_FIELDS_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                self.notifier.error(&text);
                self.message = Some(text);
                return Err(e.into());
            }
        };

        match self.client.submit_intake(&intake).await {
            Ok(_) => {
                self.notifier.success(INTAKE_SUCCESS_MESSAGE);
                self.message = Some(INTAKE_SUCCESS_MESSAGE.to_string());
                self.name.clear();
                self.age.clear();
                self.sex = None;
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Intake submission failed");
                let text = match &e {
                    ClientError::Http { message, .. } => {
                        format!("Error: {}", message.as_deref().unwrap_or("unknown error"))
                    }
                    _ => INTAKE_OFFLINE_MESSAGE.to_string(),
                };
                self.notifier.error(&text);
                self.message = Some(text);
                Err(e.into())
            }
        }
    }
}
