//! Patient dashboard and appointment booking

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

use super::{ensure_session, report_failure, FormError, ViewError, MISSING_FIELDS_MESSAGE};
use crate::api::{
    Appointment, AppointmentStatus, BookAppointmentRequest, Doctor, Prescription, Profile,
};
use crate::booking::{default_slots, is_bookable_date, AppointmentWindow, BookingError, TimeSlot};
use crate::client::{ApiClient, ClientError};
use crate::format::parse_timestamp;
use crate::notify::Notifier;

/// Summary numbers shown at the top of the patient dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatientStats {
    pub upcoming_appointments: usize,
    pub active_prescriptions: usize,
}

impl PatientStats {
    /// Upcoming means a start time after `now` and not cancelled. Start times
    /// without a zone are read as local wall-clock time.
    pub fn compute(
        appointments: &[Appointment],
        prescriptions: &[Prescription],
        now: DateTime<Utc>,
    ) -> Self {
        let upcoming_appointments = appointments
            .iter()
            .filter(|a| a.status() != AppointmentStatus::Cancelled)
            .filter(|a| {
                a.start_time
                    .as_deref()
                    .and_then(parse_timestamp)
                    .map(|start| start.with_timezone(&Utc) > now)
                    .unwrap_or(false)
            })
            .count();

        Self {
            upcoming_appointments,
            active_prescriptions: prescriptions.iter().filter(|p| p.is_active()).count(),
        }
    }

    pub fn upcoming_label(&self) -> String {
        upcoming_label(self.upcoming_appointments)
    }
}

pub fn upcoming_label(count: usize) -> String {
    match count {
        0 => "No upcoming appointments".to_string(),
        1 => "1 scheduled visit".to_string(),
        n => format!("{} scheduled visits", n),
    }
}

/// Booking draft: doctor, date, slot and reason
#[derive(Debug, Clone)]
pub struct BookingForm {
    pub doctor_id: Option<i64>,
    pub date: Option<NaiveDate>,
    pub slot_id: Option<String>,
    pub description: String,
    pub slots: Vec<TimeSlot>,
}

impl Default for BookingForm {
    fn default() -> Self {
        Self {
            doctor_id: None,
            date: None,
            slot_id: None,
            description: String::new(),
            slots: default_slots(),
        }
    }
}

impl BookingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_doctor(&mut self, doctor_id: i64) {
        self.doctor_id = Some(doctor_id);
    }

    /// Pick a date. Today and earlier are refused; a new date clears the slot.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> Result<(), BookingError> {
        if !is_bookable_date(date, today) {
            return Err(BookingError::DateNotBookable(date));
        }
        if self.date != Some(date) {
            self.slot_id = None;
        }
        self.date = Some(date);
        Ok(())
    }

    pub fn select_slot(&mut self, slot_id: &str) -> Result<(), FormError> {
        if self.date.is_none() {
            return Err(FormError::Invalid("Select a date first".to_string()));
        }
        let slot = self
            .slots
            .iter()
            .find(|s| s.id == slot_id)
            .ok_or_else(|| BookingError::InvalidSlot(slot_id.to_string()))?;
        if !slot.available {
            return Err(BookingError::SlotUnavailable(slot.label.clone()).into());
        }
        self.slot_id = Some(slot.id.clone());
        Ok(())
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn selected_slot(&self) -> Option<&TimeSlot> {
        let id = self.slot_id.as_deref()?;
        self.slots.iter().find(|s| s.id == id)
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.doctor_id.is_none() {
            missing.push("doctor");
        }
        if self.date.is_none() {
            missing.push("date");
        }
        if self.selected_slot().is_none() {
            missing.push("time_slot");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        missing
    }

    pub fn can_submit(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Build the request for a booking made on `today`, converting the
    /// local slot in `tz` to UTC. A date picked earlier that is no longer
    /// after `today` is refused.
    pub fn to_request_on<Tz: TimeZone>(
        &self,
        today: NaiveDate,
        tz: &Tz,
    ) -> Result<BookAppointmentRequest, FormError> {
        if let Some(date) = self.date.filter(|d| !is_bookable_date(*d, today)) {
            return Err(BookingError::DateNotBookable(date).into());
        }
        self.to_request(tz)
    }

    /// Build the request, converting the local slot in `tz` to UTC
    pub fn to_request<Tz: TimeZone>(&self, tz: &Tz) -> Result<BookAppointmentRequest, FormError> {
        let (Some(doctor_id), Some(date), Some(slot)) =
            (self.doctor_id, self.date, self.selected_slot())
        else {
            return Err(FormError::MissingFields(self.missing_fields()));
        };
        if self.description.trim().is_empty() {
            return Err(FormError::MissingFields(vec!["description"]));
        }

        let window = AppointmentWindow::new(date, slot)?;
        Ok(window.to_request(doctor_id, self.description.trim(), tz)?)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub struct PatientDashboard {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    pub profile: Option<Profile>,
    pub doctors: Vec<Doctor>,
    pub appointments: Vec<Appointment>,
    pub prescriptions: Vec<Prescription>,
    pub stats: PatientStats,
    pub loading_doctors: bool,
    pub loading_appointments: bool,
    pub loading_prescriptions: bool,
    pub booking: BookingForm,
    /// Last booking failure, shown inline next to the form
    pub booking_error: Option<String>,
}

impl PatientDashboard {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            notifier,
            profile: None,
            doctors: Vec::new(),
            appointments: Vec::new(),
            prescriptions: Vec::new(),
            stats: PatientStats::default(),
            loading_doctors: true,
            loading_appointments: true,
            loading_prescriptions: true,
            booking: BookingForm::new(),
            booking_error: None,
        }
    }

    /// Load everything the dashboard shows.
    ///
    /// Profile, doctors and prescriptions are fetched together; appointments
    /// follow once the profile id is known. Each failure is reported on its
    /// own and the first one is returned.
    pub async fn load(&mut self) -> Result<(), ViewError> {
        if let Err(e) = ensure_session(&self.client, self.notifier.as_ref()).await {
            self.loading_doctors = false;
            self.loading_appointments = false;
            self.loading_prescriptions = false;
            return Err(e);
        }

        let (profile, doctors, prescriptions) = tokio::join!(
            self.client.current_user(),
            self.client.list_doctors(),
            self.client.list_prescriptions(),
        );

        let mut first_error: Option<ClientError> = None;
        let notifier = self.notifier.clone();
        let mut record = |context: &str, default: &str, e: ClientError| {
            report_failure(notifier.as_ref(), context, &e, default);
            first_error.get_or_insert(e);
        };

        match profile {
            Ok(p) => self.profile = Some(p),
            Err(e) => record("Error fetching profile", "Failed to load profile", e),
        }
        match doctors {
            Ok(d) => self.doctors = d,
            Err(e) => record("Error fetching doctors", "Failed to load doctors", e),
        }
        self.loading_doctors = false;
        match prescriptions {
            Ok(p) => self.prescriptions = p,
            Err(e) => record("Error fetching prescriptions", "Failed to load prescriptions", e),
        }
        self.loading_prescriptions = false;

        if let Err(e) = self.refresh_appointments().await {
            first_error.get_or_insert(e);
        }

        self.recompute_stats();
        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Reload this patient's appointments. Needs a loaded profile id.
    pub async fn refresh_appointments(&mut self) -> Result<(), ClientError> {
        let Some(patient_id) = self.profile.as_ref().and_then(|p| p.id) else {
            tracing::debug!("No patient id yet, skipping appointments");
            self.loading_appointments = false;
            return Ok(());
        };

        let result = self.client.list_appointments(None).await;
        self.loading_appointments = false;
        match result {
            Ok(all) => {
                self.appointments = all
                    .into_iter()
                    .filter(|a| a.patient == Some(patient_id))
                    .collect();
                self.recompute_stats();
                Ok(())
            }
            Err(e) => {
                report_failure(
                    self.notifier.as_ref(),
                    "Error fetching appointments",
                    &e,
                    "Failed to load appointments",
                );
                Err(e)
            }
        }
    }

    fn recompute_stats(&mut self) {
        self.stats = PatientStats::compute(&self.appointments, &self.prescriptions, Utc::now());
    }

    /// Pick a doctor from the loaded list
    pub fn select_doctor(&mut self, doctor_id: i64) -> Result<(), FormError> {
        if !self.doctors.iter().any(|d| d.id() == doctor_id) {
            return Err(FormError::Invalid(format!("Unknown doctor {}", doctor_id)));
        }
        self.booking.select_doctor(doctor_id);
        Ok(())
    }

    /// Submit the booking form using the local timezone
    pub async fn book(&mut self) -> Result<(), ViewError> {
        self.booking_error = None;

        let today = Local::now().date_naive();
        let request = match self.booking.to_request_on(today, &Local) {
            Ok(r) => r,
            Err(e) => {
                let text = match &e {
                    FormError::MissingFields(_) => MISSING_FIELDS_MESSAGE.to_string(),
                    other => other.to_string(),
                };
                self.notifier.error(&text);
                self.booking_error = Some(text);
                return Err(e.into());
            }
        };

        match self.client.book_appointment(&request).await {
            Ok(_) => {
                self.notifier.success("Appointment booked successfully!");
                self.booking.reset();
                // The booking already succeeded; a failed reload is reported on its own.
                let _ = self.refresh_appointments().await;
                Ok(())
            }
            Err(e) => {
                let text = e.user_message("Failed to book appointment");
                report_failure(
                    self.notifier.as_ref(),
                    "Error booking appointment",
                    &e,
                    "Failed to book appointment",
                );
                self.booking_error = Some(text);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appointment(id: i64, start: &str, status: &str) -> Appointment {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "patient": 1,
            "start_time": start,
            "status": status,
        }))
        .unwrap()
    }

    fn prescription(days: i64) -> Prescription {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "medications": [{"days": days}],
        }))
        .unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_stats() {
        let now = "2024-03-21T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let appointments = vec![
            appointment(1, "2024-03-22T09:00:00Z", "pending"),
            appointment(2, "2024-03-25T09:00:00Z", "cancelled"),
            appointment(3, "2024-03-20T09:00:00Z", "completed"),
            appointment(4, "garbage", "pending"),
        ];
        let prescriptions = vec![prescription(3), prescription(0)];

        let stats = PatientStats::compute(&appointments, &prescriptions, now);
        assert_eq!(stats.upcoming_appointments, 1);
        assert_eq!(stats.active_prescriptions, 1);
        assert_eq!(stats.upcoming_label(), "1 scheduled visit");
    }

    #[test]
    fn test_upcoming_label() {
        assert_eq!(upcoming_label(0), "No upcoming appointments");
        assert_eq!(upcoming_label(1), "1 scheduled visit");
        assert_eq!(upcoming_label(4), "4 scheduled visits");
    }

    #[test]
    fn test_booking_form_rules() {
        let today = date(2024, 3, 21);
        let mut form = BookingForm::new();
        assert!(!form.can_submit());

        assert!(form.select_slot("1").is_err());
        assert_eq!(
            form.select_date(date(2024, 3, 20), today),
            Err(BookingError::DateNotBookable(date(2024, 3, 20)))
        );
        assert_eq!(
            form.select_date(today, today),
            Err(BookingError::DateNotBookable(today))
        );
        assert_eq!(form.date, None);

        form.select_date(date(2024, 3, 23), today).unwrap();
        assert_eq!(
            form.select_slot("3"),
            Err(FormError::Booking(BookingError::SlotUnavailable(
                "11:00 AM".to_string()
            )))
        );
        form.select_slot("4").unwrap();

        form.select_date(date(2024, 3, 22), today).unwrap();
        assert_eq!(form.slot_id, None);

        form.select_slot("4").unwrap();
        form.select_doctor(9);
        assert_eq!(form.missing_fields(), vec!["description"]);
        form.set_description("Follow-up");
        assert!(form.can_submit());

        let request = form.to_request(&Utc).unwrap();
        assert_eq!(request.doctor_id, 9);
        assert_eq!(request.start_time, "2024-03-22T14:00:00");
        assert_eq!(request.end_time, "2024-03-22T15:00:00");

        form.reset();
        assert!(form.doctor_id.is_none());
        assert_eq!(form.slots.len(), 6);
    }

    #[test]
    fn test_stale_date_refused() {
        let mut form = BookingForm::new();
        form.select_date(date(2024, 3, 22), date(2024, 3, 21)).unwrap();
        form.select_slot("1").unwrap();
        form.select_doctor(2);
        form.set_description("Checkup");

        assert!(form.to_request_on(date(2024, 3, 21), &Utc).is_ok());
        assert_eq!(
            form.to_request_on(date(2024, 3, 22), &Utc),
            Err(FormError::Booking(BookingError::DateNotBookable(date(2024, 3, 22))))
        );
    }

    #[test]
    fn test_booking_form_incomplete() {
        let form = BookingForm::new();
        assert_eq!(
            form.to_request(&Utc),
            Err(FormError::MissingFields(vec![
                "doctor",
                "date",
                "time_slot",
                "description"
            ]))
        );
    }
}
