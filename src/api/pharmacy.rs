use super::dto::{Medicine, PharmacyOrder};
use super::paths;
use crate::client::{ApiClient, ClientResult};

impl ApiClient {
    pub async fn list_medicines(&self) -> ClientResult<Vec<Medicine>> {
        self.get_json(paths::MEDICINES).await
    }

    pub async fn list_pharmacy_orders(&self) -> ClientResult<Vec<PharmacyOrder>> {
        self.get_json(paths::PHARMACY_ORDERS).await
    }
}

/// Medicines whose name contains `query`, ignoring case
pub fn filter_medicines<'a>(medicines: &'a [Medicine], query: &str) -> Vec<&'a Medicine> {
    medicines.iter().filter(|m| m.matches(query)).collect()
}
