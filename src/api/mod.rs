//! Hospital Backend Endpoints
//!
//! Typed fetchers and submitters, one method per backend operation, all on
//! [`ApiClient`](crate::client::ApiClient).
//!
//! # Endpoints
//!
//! ## Auth
//! - `GET /api/auth/user/` - Current user profile
//! - `GET /api/auth/doctors/` - Doctor listing
//! - `POST /api/auth/create-doctor/` - Create a doctor account (admin)
//!
//! ## Appointments
//! - `GET /api/features/appointment/` - Appointments, optionally `?date=YYYY-MM-DD`
//! - `POST /api/features/appointment/` - Book an appointment
//! - `POST /api/features/appointment/cancel/:id/` - Cancel an appointment
//!
//! ## Prescriptions & pharmacy
//! - `GET /api/features/prescription/` - Prescriptions
//! - `POST /api/features/prescription/:appointment_id/` - Create a prescription
//! - `GET /api/features/medicines/` - Medicine catalogue
//! - `GET /api/features/pharmacy-orders/` - Pharmacy orders
//!
//! ## Billing
//! - `GET /api/features/bills/` - Bills
//! - `POST /api/features/bill/:appointment_id/` - Create a bill
//! - `POST /api/features/generate-upi-qr/` - UPI QR code for an amount
//!
//! ## Intake
//! - `POST /api/user/` - Patient intake form (unauthenticated)

mod appointments;
mod auth;
mod billing;
pub mod dto;
mod intake;
mod pharmacy;
mod prescriptions;

pub use dto::*;
pub use pharmacy::filter_medicines;

/// Endpoint paths, relative to the backend base URL
pub mod paths {
    pub const CURRENT_USER: &str = "/api/auth/user/";
    pub const DOCTORS: &str = "/api/auth/doctors/";
    pub const CREATE_DOCTOR: &str = "/api/auth/create-doctor/";
    pub const APPOINTMENTS: &str = "/api/features/appointment/";
    pub const PRESCRIPTIONS: &str = "/api/features/prescription/";
    pub const BILLS: &str = "/api/features/bills/";
    pub const UPI_QR: &str = "/api/features/generate-upi-qr/";
    pub const MEDICINES: &str = "/api/features/medicines/";
    pub const PHARMACY_ORDERS: &str = "/api/features/pharmacy-orders/";
    pub const INTAKE: &str = "/api/user/";

    pub fn cancel_appointment(id: i64) -> String {
        format!("/api/features/appointment/cancel/{}/", id)
    }

    pub fn create_prescription(appointment_id: i64) -> String {
        format!("/api/features/prescription/{}/", appointment_id)
    }

    pub fn create_bill(appointment_id: i64) -> String {
        format!("/api/features/bill/{}/", appointment_id)
    }
}
