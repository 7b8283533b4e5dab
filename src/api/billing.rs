use super::dto::{Bill, BillReceipt, NewBill, OneOrMany, UpiQr, UpiQrRequest};
use super::paths;
use crate::client::{ApiClient, ClientResult};

impl ApiClient {
    pub async fn list_bills(&self) -> ClientResult<Vec<Bill>> {
        let items: OneOrMany<Bill> = self.get_json(paths::BILLS).await?;
        Ok(items.into_vec())
    }

    /// Create a bill for an appointment.
    ///
    /// With `None` the backend computes the amount itself (doctor flow);
    /// with a body the amount and payment type are given explicitly.
    pub async fn create_bill(
        &self,
        appointment_id: i64,
        bill: Option<&NewBill>,
    ) -> ClientResult<BillReceipt> {
        tracing::info!(appointment_id, explicit = bill.is_some(), "Creating bill");
        self.post_json(&paths::create_bill(appointment_id), bill).await
    }

    /// Ask the backend for a UPI QR code image for `amount`
    pub async fn generate_upi_qr(&self, amount: f64) -> ClientResult<UpiQr> {
        self.post_json(paths::UPI_QR, Some(&UpiQrRequest { amount }))
            .await
    }
}
