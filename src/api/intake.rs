use super::dto::PatientIntake;
use super::paths;
use crate::client::{ApiClient, ClientResult};

impl ApiClient {
    /// Submit the public patient intake form. No session is needed; the
    /// backend reports problems in an `error` field.
    pub async fn submit_intake(&self, intake: &PatientIntake) -> ClientResult<serde_json::Value> {
        tracing::info!(name = %intake.name, "Submitting intake form");
        self.post_public(paths::INTAKE, intake).await
    }
}
