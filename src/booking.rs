//! Appointment booking arithmetic
//!
//! Converts a picked date and a 12-hour slot label into the one-hour UTC
//! window the backend expects.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use thiserror::Error;

use crate::api::BookAppointmentRequest;

/// Wire format for appointment start/end: UTC, no fraction, no zone suffix
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Appointments are booked in one-hour blocks
pub const APPOINTMENT_LENGTH_MINUTES: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSlot {
    pub id: String,
    /// `hh:mm AM` / `hh:mm PM`
    pub label: String,
    pub available: bool,
}

impl TimeSlot {
    pub fn new(id: &str, label: &str, available: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            available,
        }
    }

    pub fn start_time(&self) -> Result<NaiveTime, BookingError> {
        parse_slot_label(&self.label)
    }
}

/// The fixed slot grid offered for every date
pub fn default_slots() -> Vec<TimeSlot> {
    vec![
        TimeSlot::new("1", "09:00 AM", true),
        TimeSlot::new("2", "10:00 AM", true),
        TimeSlot::new("3", "11:00 AM", false),
        TimeSlot::new("4", "02:00 PM", true),
        TimeSlot::new("5", "03:00 PM", true),
        TimeSlot::new("6", "04:00 PM", true),
    ]
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BookingError {
    #[error("Invalid time slot: {0}")]
    InvalidSlot(String),

    #[error("Cannot book {0}: the earliest bookable date is tomorrow")]
    DateNotBookable(NaiveDate),

    #[error("Time slot {0} is not available")]
    SlotUnavailable(String),

    #[error("{0} does not exist in the local timezone")]
    NonexistentLocalTime(NaiveDateTime),
}

/// Parse a `hh:mm AM|PM` label into a 24-hour time.
///
/// PM adds twelve hours except at 12 PM; 12 AM is midnight.
pub fn parse_slot_label(label: &str) -> Result<NaiveTime, BookingError> {
    let invalid = || BookingError::InvalidSlot(label.to_string());

    let clock = label.split_whitespace().next().ok_or_else(invalid)?;
    let (hours, minutes) = clock.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;

    if !(1..=12).contains(&hour) {
        return Err(invalid());
    }

    let upper = label.to_uppercase();
    let is_pm = upper.contains("PM");
    if !is_pm && !upper.contains("AM") {
        return Err(invalid());
    }

    let hour = match (is_pm, hour) {
        (true, 12) => 12,
        (true, h) => h + 12,
        (false, 12) => 0,
        (false, h) => h,
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Only dates after today can be booked; every slot of the current day is
/// treated as already started.
pub fn is_bookable_date(date: NaiveDate, today: NaiveDate) -> bool {
    date > today
}

/// A one-hour appointment window in local wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppointmentWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl AppointmentWindow {
    pub fn new(date: NaiveDate, slot: &TimeSlot) -> Result<Self, BookingError> {
        let start = date.and_time(slot.start_time()?);
        Ok(Self {
            start,
            end: start + Duration::minutes(APPOINTMENT_LENGTH_MINUTES),
        })
    }

    /// Convert the local window to UTC wire strings, `(start, end)`
    pub fn to_wire<Tz: TimeZone>(&self, tz: &Tz) -> Result<(String, String), BookingError> {
        let to_utc = |naive: NaiveDateTime| {
            tz.from_local_datetime(&naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc).format(WIRE_FORMAT).to_string())
                .ok_or(BookingError::NonexistentLocalTime(naive))
        };
        Ok((to_utc(self.start)?, to_utc(self.end)?))
    }

    pub fn to_request<Tz: TimeZone>(
        &self,
        doctor_id: i64,
        description: &str,
        tz: &Tz,
    ) -> Result<BookAppointmentRequest, BookingError> {
        let (start_time, end_time) = self.to_wire(tz)?;
        Ok(BookAppointmentRequest {
            doctor_id,
            start_time,
            end_time,
            description: description.to_string(),
        })
    }
}
