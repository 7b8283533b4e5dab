use super::dto::{NewPrescription, Prescription};
use super::paths;
use crate::client::{ApiClient, ClientResult};

impl ApiClient {
    pub async fn list_prescriptions(&self) -> ClientResult<Vec<Prescription>> {
        self.get_json(paths::PRESCRIPTIONS).await
    }

    /// Create a prescription for an appointment
    pub async fn create_prescription(
        &self,
        appointment_id: i64,
        prescription: &NewPrescription,
    ) -> ClientResult<serde_json::Value> {
        tracing::info!(
            appointment_id,
            medications = prescription.medications.len(),
            "Creating prescription"
        );
        self.post_json(&paths::create_prescription(appointment_id), Some(prescription))
            .await
    }
}
