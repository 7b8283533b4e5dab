//! Doctor dashboard

use std::cmp::Ordering;
use std::sync::Arc;

use chrono::{Local, NaiveDate};

use super::prescription::MedicationSelection;
use super::{ensure_session, report_failure, FormError, ViewError, MISSING_FIELDS_MESSAGE};
use crate::api::{filter_medicines, Appointment, Bill, Medicine, PharmacyOrder, Profile};
use crate::client::{ApiClient, ClientError};
use crate::format::{format_inr, parse_timestamp};
use crate::notify::Notifier;

fn same_doctor(candidate: Option<&str>, doctor_name: &str) -> bool {
    candidate
        .map(|n| n.trim().to_lowercase() == doctor_name.trim().to_lowercase())
        .unwrap_or(false)
}

/// This doctor's appointments ordered by token number, missing tokens last
pub fn schedule_for_doctor(appointments: Vec<Appointment>, doctor_name: &str) -> Vec<Appointment> {
    let mut mine: Vec<Appointment> = appointments
        .into_iter()
        .filter(|a| same_doctor(a.doctor_name.as_deref(), doctor_name))
        .collect();

    mine.sort_by(|a, b| match (a.token_no, b.token_no) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    mine
}

/// Find an appointment that may still be cancelled. Only pending ones are.
pub fn cancellable(
    appointments: &[Appointment],
    appointment_id: i64,
) -> Result<&Appointment, FormError> {
    let appointment = appointments
        .iter()
        .find(|a| a.id == appointment_id)
        .ok_or_else(|| FormError::Invalid(format!("Unknown appointment {}", appointment_id)))?;
    if !appointment.is_cancellable() {
        return Err(FormError::Invalid(format!(
            "Appointment {} is {} and cannot be cancelled",
            appointment_id,
            appointment.status()
        )));
    }
    Ok(appointment)
}

/// Toast text after a bill is created
pub fn bill_created_message(amount: &str, patient: &str) -> String {
    format!("Bill created successfully\nAmount: {}\nPatient: {}", amount, patient)
}

/// This doctor's bills, newest first
pub fn bills_for_doctor(bills: Vec<Bill>, doctor_name: &str) -> Vec<Bill> {
    let mut mine: Vec<Bill> = bills
        .into_iter()
        .filter(|b| same_doctor(b.doctor_name.as_deref(), doctor_name))
        .collect();

    let created = |b: &Bill| b.created_at.as_deref().and_then(parse_timestamp);
    mine.sort_by(|a, b| created(b).cmp(&created(a)));
    mine
}

pub struct DoctorDashboard {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    pub profile: Option<Profile>,
    pub selected_date: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub bills: Vec<Bill>,
    pub medicines: Vec<Medicine>,
    pub pharmacy_orders: Vec<PharmacyOrder>,
    pub search_term: String,
    pub selection: MedicationSelection,
    pub prescription_description: String,
    pub loading: bool,
}

impl DoctorDashboard {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            profile: None,
            selected_date: Local::now().date_naive(),
            appointments: Vec::new(),
            bills: Vec::new(),
            medicines: Vec::new(),
            pharmacy_orders: Vec::new(),
            search_term: String::new(),
            selection: MedicationSelection::new(),
            prescription_description: String::new(),
            loading: true,
        }
    }

    pub fn doctor_name(&self) -> Option<&str> {
        self.profile.as_ref().and_then(|p| p.doctor_name())
    }

    /// Load profile, medicines and pharmacy orders together, then the
    /// schedule and bills for the selected date.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let result = self.load_inner().await;
        self.loading = false;
        result
    }

    async fn load_inner(&mut self) -> Result<(), ViewError> {
        ensure_session(&self.client, self.notifier.as_ref()).await?;

        let (profile, medicines, orders) = tokio::join!(
            self.client.current_user(),
            self.client.list_medicines(),
            self.client.list_pharmacy_orders(),
        );

        let mut first_error: Option<ClientError> = None;
        match profile {
            Ok(p) => self.profile = Some(p),
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching profile",
                    &e,
                    "Failed to load profile",
                );
                first_error.get_or_insert(e);
            }
        }
        match medicines {
            Ok(m) => self.medicines = m,
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching medications",
                    &e,
                    "Failed to load medications",
                );
                first_error.get_or_insert(e);
            }
        }
        match orders {
            Ok(o) => self.pharmacy_orders = o,
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching pharmacy orders",
                    &e,
                    "Failed to load pharmacy orders",
                );
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = self.refresh_schedule().await {
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Reload appointments for the selected date and all bills. Skipped
    /// until the profile carries the doctor's name.
    pub async fn refresh_schedule(&mut self) -> Result<(), ClientError> {
        let Some(name) = self.doctor_name().map(str::to_string) else {
            tracing::debug!("Doctor name unknown, skipping schedule");
            return Ok(());
        };

        let (appointments, bills) = tokio::join!(
            self.client.list_appointments(Some(self.selected_date)),
            self.client.list_bills(),
        );

        let mut first_error = None;
        match appointments {
            Ok(a) => self.appointments = schedule_for_doctor(a, &name),
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching appointments",
                    &e,
                    "Failed to load appointments",
                );
                first_error = Some(e);
            }
        }
        match bills {
            Ok(b) => self.bills = bills_for_doctor(b, &name),
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching bills",
                    &e,
                    "Failed to load bills",
                );
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Refresh only the bills list
    pub async fn refresh_bills(&mut self) -> Result<(), ClientError> {
        let Some(name) = self.doctor_name().map(str::to_string) else {
            return Ok(());
        };
        match self.client.list_bills().await {
            Ok(b) => {
                self.bills = bills_for_doctor(b, &name);
                Ok(())
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching bills",
                    &e,
                    "Failed to load bills",
                );
                Err(e)
            }
        }
    }

    pub async fn set_date(&mut self, date: NaiveDate) -> Result<(), ClientError> {
        self.selected_date = date;
        self.refresh_schedule().await
    }

    pub fn filtered_medicines(&self) -> Vec<&Medicine> {
        filter_medicines(&self.medicines, &self.search_term)
    }

    /// Add a loaded medicine to the prescription draft
    pub fn add_medicine(&mut self, medicine_id: i64) -> Result<bool, FormError> {
        let medicine = self
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| FormError::Invalid(format!("Unknown medicine {}", medicine_id)))?;
        Ok(self.selection.add(medicine))
    }

    pub fn can_prescribe(&self) -> bool {
        !self.selection.is_empty() && !self.prescription_description.trim().is_empty()
    }

    /// Prescribe the drafted medicines for an appointment; the draft resets
    /// on success.
    pub async fn create_prescription(&mut self, appointment_id: i64) -> Result<(), ViewError> {
        let request = match self.selection.to_request(&self.prescription_description) {
            Ok(r) => r,
            Err(e) => {
                self.notifier.error(MISSING_FIELDS_MESSAGE);
                return Err(e.into());
            }
        };

        match self.client.create_prescription(appointment_id, &request).await {
            Ok(_) => {
                self.notifier.success("Prescription created successfully");
                self.selection.clear();
                self.prescription_description.clear();
                Ok(())
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error creating prescription",
                    &e,
                    "Failed to create prescription",
                );
                Err(e.into())
            }
        }
    }

    /// Bill an appointment; the backend works out the amount
    pub async fn create_bill(&mut self, appointment_id: i64) -> Result<(), ViewError> {
        match self.client.create_bill(appointment_id, None).await {
            Ok(receipt) => {
                let amount = receipt.amount().map(format_inr).unwrap_or_else(|| "-".to_string());
                let patient = receipt.patient_name.as_deref().unwrap_or("patient");
                self.notifier.success(&bill_created_message(&amount, patient));
                // Bill exists either way; a failed refresh is reported separately.
                let _ = self.refresh_bills().await;
                Ok(())
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error creating bill",
                    &e,
                    "Failed to create bill",
                );
                Err(e.into())
            }
        }
    }

    /// Cancel a pending appointment and drop it from the schedule
    pub async fn cancel_appointment(&mut self, appointment_id: i64) -> Result<(), ViewError> {
        if let Err(err) = cancellable(&self.appointments, appointment_id) {
            self.notifier.error(&err.to_string());
            return Err(err.into());
        }

        match self.client.cancel_appointment(appointment_id).await {
            Ok(()) => {
                self.appointments.retain(|a| a.id != appointment_id);
                self.notifier.success("Appointment cancelled successfully");
                Ok(())
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error cancelling appointment",
                    &e,
                    "Failed to cancel appointment",
                );
                Err(e.into())
            }
        }
    }
}
