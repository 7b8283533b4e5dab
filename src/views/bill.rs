//! Bill form with UPI QR preview

use std::sync::Arc;

use super::{report_failure, FormError, Route, ViewError, MISSING_FIELDS_MESSAGE};
use crate::api::{NewBill, PaymentType};
use crate::client::ApiClient;
use crate::notify::Notifier;

pub struct BillForm {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    pub appointment_id: i64,
    pub amount: String,
    pub payment_type: PaymentType,
    /// `qr_url` from the backend, relative to the base URL
    pub qr_code: Option<String>,
}

impl BillForm {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>, appointment_id: i64) -> Self {
        Self {
            client,
            notifier,
            appointment_id,
            amount: String::new(),
            payment_type: PaymentType::Upi,
            qr_code: None,
        }
    }

    fn parsed_amount(&self) -> Option<f64> {
        self.amount.trim().parse::<f64>().ok().filter(|a| a.is_finite())
    }

    pub async fn set_amount(&mut self, amount: &str) {
        self.amount = amount.to_string();
        self.refresh_qr().await;
    }

    pub async fn set_payment_type(&mut self, payment_type: PaymentType) {
        self.payment_type = payment_type;
        self.refresh_qr().await;
    }

    /// Regenerate the QR code for UPI payments with a usable amount, clear
    /// it otherwise.
    pub async fn refresh_qr(&mut self) {
        let amount = match (self.payment_type, self.parsed_amount()) {
            (PaymentType::Upi, Some(a)) => a,
            _ => {
                self.qr_code = None;
                return;
            }
        };

        match self.client.generate_upi_qr(amount).await {
            Ok(qr) => self.qr_code = Some(qr.qr_url),
            Err(e) => {
                self.qr_code = None;
                report_failure(
                    self.notifier.as_ref(),
                    "Error generating QR code",
                    &e,
                    "Failed to generate UPI QR code",
                );
            }
        }
    }

    /// Absolute address of the QR image, only while paying by UPI
    pub fn qr_image_url(&self) -> Option<String> {
        if self.payment_type == PaymentType::Cash {
            return None;
        }
        self.qr_code.as_deref().map(|path| self.client.resolve(path))
    }

    pub fn can_submit(&self) -> bool {
        self.parsed_amount().is_some()
    }

    pub fn clear(&mut self) {
        self.amount.clear();
        self.payment_type = PaymentType::Upi;
        self.qr_code = None;
    }

    pub async fn submit(&mut self) -> Result<Route, ViewError> {
        let Some(total_amount) = self.parsed_amount() else {
            self.notifier.error(MISSING_FIELDS_MESSAGE);
            return Err(FormError::MissingFields(vec!["amount"]).into());
        };

        let bill = NewBill {
            total_amount,
            payment_type: self.payment_type,
        };
        match self.client.create_bill(self.appointment_id, Some(&bill)).await {
            Ok(_) => {
                self.notifier.success("Bill created successfully");
                Ok(Route::Home)
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
}
