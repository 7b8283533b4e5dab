//! Prescription form and the medication selection it shares with the doctor
//! dashboard.

use std::sync::Arc;

use super::{ensure_session, report_failure, FormError, Route, ViewError, MISSING_FIELDS_MESSAGE};
use crate::api::{MedicationLine, Medicine, NewPrescription};
use crate::client::ApiClient;
use crate::notify::Notifier;

pub const DEFAULT_DOSAGE: &str = "1 tablet";

/// A medicine picked for a prescription, with its dosing
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedMedicine {
    pub medicine: Medicine,
    pub dosage: String,
    pub quantity: u32,
    pub days: u32,
}

/// Ordered set of picked medicines, at most one entry per medicine id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MedicationSelection {
    items: Vec<SelectedMedicine>,
}

fn parse_count(raw: &str) -> u32 {
    raw.trim().parse::<u32>().ok().filter(|n| *n > 0).unwrap_or(1)
}

impl MedicationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a medicine with default dosing. Returns false if it was already picked.
    pub fn add(&mut self, medicine: &Medicine) -> bool {
        if self.contains(medicine.id) {
            return false;
        }
        self.items.push(SelectedMedicine {
            medicine: medicine.clone(),
            dosage: DEFAULT_DOSAGE.to_string(),
            quantity: 1,
            days: 1,
        });
        true
    }

    pub fn remove(&mut self, medicine_id: i64) {
        self.items.retain(|m| m.medicine.id != medicine_id);
    }

    pub fn contains(&self, medicine_id: i64) -> bool {
        self.items.iter().any(|m| m.medicine.id == medicine_id)
    }

    fn get_mut(&mut self, medicine_id: i64) -> Option<&mut SelectedMedicine> {
        self.items.iter_mut().find(|m| m.medicine.id == medicine_id)
    }

    pub fn set_dosage(&mut self, medicine_id: i64, dosage: &str) {
        if let Some(item) = self.get_mut(medicine_id) {
            item.dosage = dosage.to_string();
        }
    }

    /// Set the number of days; unparseable or zero input means 1
    pub fn set_days(&mut self, medicine_id: i64, raw: &str) {
        if let Some(item) = self.get_mut(medicine_id) {
            item.days = parse_count(raw);
        }
    }

    /// Set the course duration: days and quantity both follow it
    pub fn set_duration(&mut self, medicine_id: i64, raw: &str) {
        if let Some(item) = self.get_mut(medicine_id) {
            let duration = parse_count(raw);
            item.days = duration;
            item.quantity = duration;
        }
    }

    pub fn items(&self) -> &[SelectedMedicine] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn lines(&self) -> Vec<MedicationLine> {
        self.items
            .iter()
            .map(|m| MedicationLine {
                medicine: m.medicine.id,
                dosage: m.dosage.clone(),
                quantity: m.quantity,
                days: m.days,
            })
            .collect()
    }

    /// Build the request body, or say what is missing
    pub fn to_request(&self, description: &str) -> Result<NewPrescription, FormError> {
        let mut missing = Vec::new();
        if description.trim().is_empty() {
            missing.push("description");
        }
        if self.is_empty() {
            missing.push("medications");
        }
        if !missing.is_empty() {
            return Err(FormError::MissingFields(missing));
        }

        Ok(NewPrescription {
            description: description.trim().to_string(),
            medications: self.lines(),
        })
    }
}

/// Prescription form for one appointment
pub struct PrescriptionForm {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    pub appointment_id: i64,
    pub medicines: Vec<Medicine>,
    pub selection: MedicationSelection,
    pub description: String,
    pub loading_medicines: bool,
}

impl PrescriptionForm {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>, appointment_id: i64) -> Self {
        Self {
            client,
            notifier,
            appointment_id,
            medicines: Vec::new(),
            selection: MedicationSelection::new(),
            description: String::new(),
            loading_medicines: true,
        }
    }

    /// Load the medicine catalogue
    pub async fn load(&mut self) -> Result<(), ViewError> {
        let result = self.load_medicines().await;
        self.loading_medicines = false;
        result
    }

    async fn load_medicines(&mut self) -> Result<(), ViewError> {
        ensure_session(&self.client, self.notifier.as_ref()).await?;
        match self.client.list_medicines().await {
            Ok(medicines) => {
                self.medicines = medicines;
                Ok(())
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching medications",
                    &e,
                    "Failed to load medications",
                );
                Err(e.into())
            }
        }
    }

    /// Pick a medicine from the loaded catalogue
    pub fn add_medicine(&mut self, medicine_id: i64) -> Result<bool, FormError> {
        let medicine = self
            .medicines
            .iter()
            .find(|m| m.id == medicine_id)
            .ok_or_else(|| FormError::Invalid(format!("Unknown medicine {}", medicine_id)))?;
        Ok(self.selection.add(medicine))
    }

    pub fn can_submit(&self) -> bool {
        !self.selection.is_empty() && !self.description.trim().is_empty()
    }

    pub fn clear_all(&mut self) {
        self.description.clear();
        self.selection.clear();
    }

    /// Create the prescription; on success continue to the bill form
    pub async fn submit(&mut self) -> Result<Route, ViewError> {
        let request = match self.selection.to_request(&self.description) {
            Ok(r) => r,
            Err(e) => {
                self.notifier.error(MISSING_FIELDS_MESSAGE);
                return Err(e.into());
            }
        };

        match self
            .client
            .create_prescription(self.appointment_id, &request)
            .await
        {
            Ok(_) => {
                self.notifier.success("Prescription created successfully");
                Ok(Route::Bill {
                    appointment_id: self.appointment_id,
                })
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
}
