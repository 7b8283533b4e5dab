use chrono::NaiveDate;

use super::dto::{Appointment, BookAppointmentRequest, BookingResponse, OneOrMany};
use super::paths;
use crate::client::{ApiClient, ClientError, ClientResult};

impl ApiClient {
    /// Appointments visible to the current user, optionally for one day.
    ///
    /// The backend answers with a bare object when there is exactly one
    /// match; it is normalised to a one-element list.
    pub async fn list_appointments(
        &self,
        date: Option<NaiveDate>,
    ) -> ClientResult<Vec<Appointment>> {
        let path = match date {
            Some(d) => format!(
                "{}?date={}",
                paths::APPOINTMENTS,
                urlencoding::encode(&d.format("%Y-%m-%d").to_string())
            ),
            None => paths::APPOINTMENTS.to_string(),
        };

        let items: OneOrMany<Appointment> = self.get_json(&path).await?;
        Ok(items.into_vec())
    }

    /// Book an appointment.
    ///
    /// A 2xx answer only counts as booked when its `status` carries the
    /// booked marker; anything else becomes [`ClientError::Rejected`].
    pub async fn book_appointment(
        &self,
        request: &BookAppointmentRequest,
    ) -> ClientResult<BookingResponse> {
        tracing::info!(
            doctor_id = request.doctor_id,
            start_time = %request.start_time,
            "Booking appointment"
        );

        let response: BookingResponse = self.post_json(paths::APPOINTMENTS, Some(request)).await?;

        if response.is_booked() {
            Ok(response)
        } else {
            tracing::warn!(status = ?response.status, "Booking not confirmed by backend");
            Err(ClientError::Rejected {
                message: response.message,
            })
        }
    }

    /// Cancel an appointment
    pub async fn cancel_appointment(&self, appointment_id: i64) -> ClientResult<()> {
        tracing::info!(appointment_id, "Cancelling appointment");
        self.post_unit(&paths::cancel_appointment(appointment_id)).await
    }
}
