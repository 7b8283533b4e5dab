//! # MediDesk
//!
//! Session and request layer for a hospital front-end: patients book
//! appointments and review prescriptions, doctors run their daily schedule,
//! prescribe and bill, admins create doctor accounts.
//!
//! ## Modules
//!
//! - [`session`]: Bearer token storage
//! - [`client`]: Authenticated HTTP client and error taxonomy
//! - [`api`]: Backend endpoints and their payloads
//! - [`booking`]: Slot-to-UTC appointment arithmetic
//! - [`format`]: Date, time and rupee formatting
//! - [`notify`]: Success/error notifications
//! - [`views`]: Headless dashboards and forms
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use medidesk::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let session = Arc::new(FileTokenStore::new(config.session.token_path()));
//!     let client = ApiClient::new(&config.backend, session)?;
//!
//!     let mut dashboard = PatientDashboard::new(client, Arc::new(ConsoleNotifier));
//!     dashboard.load().await?;
//!
//!     println!("{}", dashboard.stats.upcoming_label());
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod booking;
pub mod client;
pub mod config;
pub mod format;
pub mod notify;
pub mod session;
pub mod views;

pub use api::{
    Appointment, AppointmentStatus, Bill, BillReceipt, BookAppointmentRequest, BookingResponse,
    Doctor, Medicine, NewBill, NewDoctor, NewPrescription, PatientIntake, PaymentType,
    PharmacyOrder, Prescription, Profile, Sex,
};

pub use booking::{default_slots, AppointmentWindow, BookingError, TimeSlot};

pub use client::{ApiClient, ClientError, ClientResult};

pub use config::{BackendConfig, Config, ConfigError, LoggingConfig, SessionConfig};

pub use notify::{
    ConsoleNotifier, LogNotifier, Notification, NotificationKind, Notifier, RecordingNotifier,
};

pub use session::{FileTokenStore, MemoryTokenStore, SessionError, TokenStore};

pub use views::{
    AdminDashboard, BillForm, DoctorDashboard, FormError, IntakeForm, PatientDashboard,
    PatientStats, PrescriptionForm, Route, ViewError,
};
