use super::dto::{Doctor, NewDoctor, Profile};
use super::paths;
use crate::client::{ApiClient, ClientResult};

impl ApiClient {
    /// Profile of the logged-in user
    pub async fn current_user(&self) -> ClientResult<Profile> {
        self.get_json(paths::CURRENT_USER).await
    }

    /// All doctors patients can book with
    pub async fn list_doctors(&self) -> ClientResult<Vec<Doctor>> {
        self.get_json(paths::DOCTORS).await
    }

    /// Create a doctor account. The response body is opaque.
    pub async fn create_doctor(&self, doctor: &NewDoctor) -> ClientResult<serde_json::Value> {
        tracing::info!(email = %doctor.email, "Creating doctor account");
        self.post_json(paths::CREATE_DOCTOR, Some(doctor)).await
    }
}
