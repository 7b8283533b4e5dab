mod common;

use chrono::{Local, NaiveDate};
use serde_json::json;

use common::{MockBackend, TOKEN};
use medidesk::api::paths;
use medidesk::views::MISSING_FIELDS_MESSAGE;
use medidesk::*;

// ============================================
// Patient dashboard
// ============================================

fn stock_patient_backend(backend: &MockBackend) {
    backend.respond("GET", paths::CURRENT_USER, 200, common::patient_profile());
    backend.respond(
        "GET",
        paths::DOCTORS,
        200,
        json!([{"user": {"id": 3, "full_name": "Asha Rao"}, "specialization": "Cardiologist"}]),
    );
    backend.respond(
        "GET",
        paths::PRESCRIPTIONS,
        200,
        json!([
            {"id": 1, "description": "Flu", "medications": [{"medicine_name": "Paracetamol", "days": 3}]},
            {"id": 2, "description": "Old", "medications": [{"medicine_name": "Cetirizine", "days": 0}]}
        ]),
    );
    backend.respond(
        "GET",
        paths::APPOINTMENTS,
        200,
        json!([
            {"id": 1, "patient": 11, "doctor_name": "Asha Rao", "start_time": "2099-01-01T09:00:00Z", "status": "pending"},
            {"id": 2, "patient": 12, "doctor_name": "Asha Rao", "start_time": "2099-01-01T10:00:00Z", "status": "pending"},
            {"id": 3, "patient": 11, "doctor_name": "Asha Rao", "start_time": "2020-01-01T09:00:00Z", "status": "completed"},
            {"id": 4, "patient": 11, "doctor_name": "Asha Rao", "start_time": "2099-02-01T09:00:00Z", "status": "cancelled"}
        ]),
    );
}

#[tokio::test]
async fn test_patient_dashboard_load() {
    let backend = MockBackend::start().await;
    stock_patient_backend(&backend);
    let notifier = common::notifier();

    let mut dashboard = PatientDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.load().await.unwrap();

    assert_eq!(dashboard.doctors.len(), 1);
    let ids: Vec<i64> = dashboard.appointments.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
    assert_eq!(dashboard.stats.upcoming_appointments, 1);
    assert_eq!(dashboard.stats.active_prescriptions, 1);
    assert_eq!(dashboard.stats.upcoming_label(), "1 scheduled visit");
    assert!(!dashboard.loading_appointments);
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn test_patient_dashboard_without_session() {
    let backend = MockBackend::start().await;
    stock_patient_backend(&backend);
    let notifier = common::notifier();

    let mut dashboard = PatientDashboard::new(backend.client(None), notifier.clone());
    let err = dashboard.load().await.unwrap_err();

    assert!(err.is_auth_required());
    assert_eq!(notifier.errors(), vec!["Authentication required".to_string()]);
    assert!(backend.requests().is_empty());
    assert!(!dashboard.loading_doctors);
}

#[tokio::test]
async fn test_patient_dashboard_partial_failure() {
    let backend = MockBackend::start().await;
    stock_patient_backend(&backend);
    backend.respond("GET", paths::DOCTORS, 500, json!({"message": "Doctor directory offline"}));
    let notifier = common::notifier();

    let mut dashboard = PatientDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    assert!(dashboard.load().await.is_err());

    assert_eq!(notifier.errors(), vec!["Doctor directory offline".to_string()]);
    assert!(dashboard.profile.is_some());
    assert_eq!(dashboard.appointments.len(), 3);
    assert!(dashboard.doctors.is_empty());
}

fn tomorrow() -> NaiveDate {
    Local::now().date_naive().succ_opt().unwrap()
}

#[tokio::test]
async fn test_booking_success() {
    let backend = MockBackend::start().await;
    stock_patient_backend(&backend);
    backend.respond(
        "POST",
        paths::APPOINTMENTS,
        201,
        json!({"status": "appointment booked successfully", "appointment data": {"token_no": 2}}),
    );
    let notifier = common::notifier();

    let mut dashboard = PatientDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.load().await.unwrap();

    dashboard.select_doctor(3).unwrap();
    assert!(dashboard.select_doctor(99).is_err());
    dashboard
        .booking
        .select_date(tomorrow(), Local::now().date_naive())
        .unwrap();
    dashboard.booking.select_slot("1").unwrap();
    dashboard.booking.set_description("Chest pain");
    assert!(dashboard.booking.can_submit());

    dashboard.book().await.unwrap();

    assert_eq!(
        notifier.successes(),
        vec!["Appointment booked successfully!".to_string()]
    );
    assert!(dashboard.booking.doctor_id.is_none());
    assert!(dashboard.booking_error.is_none());

    let (start, end) = AppointmentWindow::new(tomorrow(), &TimeSlot::new("1", "09:00 AM", true))
        .unwrap()
        .to_wire(&Local)
        .unwrap();
    let post = backend
        .requests_to(paths::APPOINTMENTS)
        .into_iter()
        .find(|r| r.method == "POST")
        .unwrap();
    assert_eq!(
        post.body,
        Some(json!({
            "doctor_id": 3,
            "start_time": start,
            "end_time": end,
            "description": "Chest pain"
        }))
    );
}

#[tokio::test]
async fn test_booking_failure_shows_server_message() {
    let backend = MockBackend::start().await;
    backend.respond("POST", paths::APPOINTMENTS, 400, json!({"message": "Slot already taken"}));
    let notifier = common::notifier();

    let mut dashboard = PatientDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.booking.select_doctor(3);
    dashboard
        .booking
        .select_date(tomorrow(), Local::now().date_naive())
        .unwrap();
    dashboard.booking.select_slot("2").unwrap();
    dashboard.booking.set_description("Checkup");

    let err = dashboard.book().await.unwrap_err();
    assert!(matches!(err, ViewError::Client(ClientError::Http { status: 400, .. })));
    assert_eq!(dashboard.booking_error.as_deref(), Some("Slot already taken"));
    assert_eq!(notifier.errors(), vec!["Slot already taken".to_string()]);
    assert_eq!(dashboard.booking.doctor_id, Some(3));
}

#[tokio::test]
async fn test_same_day_booking_sends_nothing() {
    let backend = MockBackend::start().await;
    backend.respond(
        "POST",
        paths::APPOINTMENTS,
        201,
        json!({"status": "appointment booked successfully"}),
    );
    let notifier = common::notifier();
    let today = Local::now().date_naive();

    let mut dashboard = PatientDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    assert_eq!(
        dashboard.booking.select_date(today, today),
        Err(BookingError::DateNotBookable(today))
    );
    assert!(dashboard.booking.date.is_none());

    // A date that has become today since it was picked
    dashboard.booking.select_doctor(3);
    dashboard.booking.date = Some(today);
    dashboard.booking.slot_id = Some("1".to_string());
    dashboard.booking.set_description("Checkup");

    let err = dashboard.book().await.unwrap_err();
    assert!(matches!(
        err,
        ViewError::Form(FormError::Booking(BookingError::DateNotBookable(_)))
    ));
    assert!(dashboard.booking_error.is_some());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_incomplete_booking_sends_nothing() {
    let backend = MockBackend::start().await;
    let notifier = common::notifier();

    let mut dashboard = PatientDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.booking.select_doctor(3);

    let err = dashboard.book().await.unwrap_err();
    assert!(matches!(err, ViewError::Form(FormError::MissingFields(_))));
    assert_eq!(notifier.errors(), vec![MISSING_FIELDS_MESSAGE.to_string()]);
    assert!(backend.requests().is_empty());
}

// ============================================
// Doctor dashboard
// ============================================

fn stock_doctor_backend(backend: &MockBackend) {
    backend.respond("GET", paths::CURRENT_USER, 200, common::doctor_profile());
    backend.respond("GET", paths::MEDICINES, 200, common::medicines());
    backend.respond(
        "GET",
        paths::PHARMACY_ORDERS,
        200,
        json!([{"id": 1, "patient_name": "Ravi Kumar", "status": "pending"}]),
    );
    backend.respond(
        "GET",
        paths::APPOINTMENTS,
        200,
        json!([
            {"id": 10, "patient_name": "Ravi Kumar", "doctor_name": "asha rao", "token_no": 2, "status": "pending"},
            {"id": 11, "patient_name": "Meera", "doctor_name": "Asha Rao", "token_no": 1, "status": "completed"},
            {"id": 12, "patient_name": "Other", "doctor_name": "Vikram Shah", "token_no": 1, "status": "pending"}
        ]),
    );
    backend.respond(
        "GET",
        paths::BILLS,
        200,
        json!([
            {"id": 1, "doctor_name": "Asha Rao", "total_amount": "500.00", "created_at": "2024-03-20T10:00:00Z"},
            {"id": 2, "doctor_name": "Asha Rao", "total_amount": 300, "created_at": "2024-03-21T10:00:00Z"},
            {"id": 3, "doctor_name": "Vikram Shah", "total_amount": 100, "created_at": "2024-03-22T10:00:00Z"}
        ]),
    );
}

#[tokio::test]
async fn test_doctor_dashboard_load() {
    let backend = MockBackend::start().await;
    stock_doctor_backend(&backend);
    let notifier = common::notifier();

    let mut dashboard = DoctorDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.selected_date = NaiveDate::from_ymd_opt(2024, 3, 21).unwrap();
    dashboard.load().await.unwrap();

    let ids: Vec<i64> = dashboard.appointments.iter().map(|a| a.id).collect();
    assert_eq!(ids, vec![11, 10]);
    let bill_ids: Vec<i64> = dashboard.bills.iter().map(|b| b.id).collect();
    assert_eq!(bill_ids, vec![2, 1]);
    assert_eq!(dashboard.medicines.len(), 3);
    assert_eq!(dashboard.pharmacy_orders.len(), 1);
    assert!(!dashboard.loading);

    let appointment_requests = backend.requests_to(paths::APPOINTMENTS);
    assert_eq!(appointment_requests[0].query.as_deref(), Some("date=2024-03-21"));

    dashboard.search_term = "CILLIN".to_string();
    let found: Vec<&str> = dashboard
        .filtered_medicines()
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(found, vec!["Amoxicillin"]);
}

#[tokio::test]
async fn test_doctor_dashboard_medications_unavailable() {
    let backend = MockBackend::start().await;
    stock_doctor_backend(&backend);
    backend.respond("GET", paths::MEDICINES, 500, json!({}));
    let notifier = common::notifier();

    let mut dashboard = DoctorDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    assert!(dashboard.load().await.is_err());

    assert_eq!(notifier.errors(), vec!["Failed to load medications".to_string()]);
    assert!(dashboard.medicines.is_empty());
    assert!(dashboard.profile.is_some());
    assert_eq!(dashboard.appointments.len(), 2);
}

#[tokio::test]
async fn test_doctor_cancel_only_pending() {
    let backend = MockBackend::start().await;
    stock_doctor_backend(&backend);
    backend.respond("POST", &paths::cancel_appointment(10), 200, json!({"status": "cancelled"}));
    let notifier = common::notifier();

    let mut dashboard = DoctorDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.load().await.unwrap();

    assert!(dashboard.cancel_appointment(11).await.is_err());
    assert!(backend.requests_to(&paths::cancel_appointment(11)).is_empty());

    dashboard.cancel_appointment(10).await.unwrap();
    assert!(dashboard.appointments.iter().all(|a| a.id != 10));
    assert_eq!(
        notifier.successes(),
        vec!["Appointment cancelled successfully".to_string()]
    );
}

#[tokio::test]
async fn test_doctor_bill_and_prescription() {
    let backend = MockBackend::start().await;
    stock_doctor_backend(&backend);
    backend.respond(
        "POST",
        &paths::create_bill(10),
        201,
        json!({"amount": 500, "patient_name": "Ravi Kumar"}),
    );
    backend.respond("POST", &paths::create_prescription(10), 201, json!({"id": 5}));
    let notifier = common::notifier();

    let mut dashboard = DoctorDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    dashboard.load().await.unwrap();
    let bill_fetches = backend.requests_to(paths::BILLS).len();

    dashboard.create_bill(10).await.unwrap();
    assert_eq!(
        notifier.successes(),
        vec!["Bill created successfully\nAmount: ₹500.00\nPatient: Ravi Kumar".to_string()]
    );
    assert_eq!(backend.requests_to(paths::BILLS).len(), bill_fetches + 1);
    assert_eq!(backend.requests_to(&paths::create_bill(10))[0].body, None);

    assert!(!dashboard.can_prescribe());
    assert!(dashboard.add_medicine(1).unwrap());
    assert!(!dashboard.add_medicine(1).unwrap());
    dashboard.selection.set_duration(1, "5");
    dashboard.prescription_description = "Viral fever".to_string();
    assert!(dashboard.can_prescribe());

    dashboard.create_prescription(10).await.unwrap();
    assert!(dashboard.selection.is_empty());
    assert!(dashboard.prescription_description.is_empty());
    assert_eq!(
        backend.requests_to(&paths::create_prescription(10))[0].body,
        Some(json!({
            "description": "Viral fever",
            "medications": [{"medicine": 1, "dosage": "1 tablet", "quantity": 5, "days": 5}]
        }))
    );
}

// ============================================
// Prescription & bill forms
// ============================================

#[tokio::test]
async fn test_prescription_form_navigates_to_bill() {
    let backend = MockBackend::start().await;
    backend.respond("GET", paths::MEDICINES, 200, common::medicines());
    backend.respond("POST", &paths::create_prescription(7), 201, json!({"id": 1}));
    let notifier = common::notifier();

    let mut form = PrescriptionForm::new(backend.client(Some(TOKEN)), notifier.clone(), 7);
    form.load().await.unwrap();
    assert!(!form.loading_medicines);

    form.add_medicine(2).unwrap();
    form.selection.set_dosage(2, "1 capsule twice daily");
    form.selection.set_days(2, "7");
    assert!(!form.can_submit());

    // Blank description is refused locally
    form.description = "   ".to_string();
    assert!(form.submit().await.is_err());
    assert!(backend.requests_to(&paths::create_prescription(7)).is_empty());

    form.description = "Throat infection".to_string();
    let route = form.submit().await.unwrap();
    assert_eq!(route, Route::Bill { appointment_id: 7 });
    assert!(notifier
        .successes()
        .contains(&"Prescription created successfully".to_string()));

    form.clear_all();
    assert!(form.selection.is_empty());
    assert!(form.description.is_empty());
}

#[tokio::test]
async fn test_prescription_form_load_failure() {
    let backend = MockBackend::start().await;
    let notifier = common::notifier();

    let mut form = PrescriptionForm::new(backend.client(Some(TOKEN)), notifier.clone(), 7);
    assert!(form.load().await.is_err());
    assert_eq!(notifier.errors(), vec!["Failed to load medications".to_string()]);
}

#[tokio::test]
async fn test_bill_form_qr_follows_payment_type() {
    let backend = MockBackend::start().await;
    backend.respond("POST", paths::UPI_QR, 200, json!({"qr_url": "/media/qr/500.png"}));
    backend.respond("POST", &paths::create_bill(7), 201, json!({"id": 3}));
    let notifier = common::notifier();

    let mut form = BillForm::new(backend.client(Some(TOKEN)), notifier.clone(), 7);
    assert!(!form.can_submit());

    form.set_amount("abc").await;
    assert!(form.qr_code.is_none());
    assert!(backend.requests_to(paths::UPI_QR).is_empty());

    form.set_amount("500").await;
    assert_eq!(
        form.qr_image_url(),
        Some(format!("{}/media/qr/500.png", backend.base_url))
    );

    form.set_payment_type(PaymentType::Cash).await;
    assert!(form.qr_code.is_none());
    assert!(form.qr_image_url().is_none());
    assert_eq!(backend.requests_to(paths::UPI_QR).len(), 1);

    assert_eq!(form.submit().await.unwrap(), Route::Home);
    assert_eq!(
        backend.requests_to(&paths::create_bill(7))[0].body,
        Some(json!({"total_amount": 500.0, "payment_type": "cash"}))
    );
    assert_eq!(notifier.successes(), vec!["Bill created successfully".to_string()]);

    form.clear();
    assert!(form.amount.is_empty());
    assert_eq!(form.payment_type, PaymentType::Upi);
}

#[tokio::test]
async fn test_bill_form_failure_message() {
    let backend = MockBackend::start().await;
    backend.respond("POST", &paths::create_bill(7), 400, json!({"message": "Bill already exists"}));
    let notifier = common::notifier();

    let mut form = BillForm::new(backend.client(Some(TOKEN)), notifier.clone(), 7);
    form.payment_type = PaymentType::Cash;
    form.amount = "200".to_string();

    assert!(form.submit().await.is_err());
    assert_eq!(notifier.errors(), vec!["Bill already exists".to_string()]);
}

// ============================================
// Admin & intake
// ============================================

fn filled_doctor() -> NewDoctor {
    NewDoctor {
        full_name: "Asha Rao".to_string(),
        email: "asha@hospital.org".to_string(),
        password: "s3cret".to_string(),
        specialization: "Cardiologist".to_string(),
        phone_number: "9800000000".to_string(),
        upi_id: "asha@upi".to_string(),
        ..NewDoctor::default()
    }
}

#[tokio::test]
async fn test_admin_create_doctor() {
    let backend = MockBackend::start().await;
    backend.respond("POST", paths::CREATE_DOCTOR, 201, json!({"id": 3}));
    let notifier = common::notifier();

    let mut admin = AdminDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    admin.open_create_doctor();
    assert!(!admin.can_submit());
    assert!(admin.submit_create_doctor().await.is_err());
    assert!(backend.requests().is_empty());

    admin.draft = filled_doctor();
    admin.submit_create_doctor().await.unwrap();

    assert!(!admin.creating_doctor);
    assert_eq!(admin.draft, NewDoctor::default());
    assert_eq!(
        notifier.successes(),
        vec!["Doctor account created successfully!".to_string()]
    );

    let sent = backend.requests_to(paths::CREATE_DOCTOR);
    let body = sent[0].body.as_ref().unwrap();
    assert_eq!(body["available_from"], "08:00:00");
    assert_eq!(body["max_appointments"], 10);
}

#[tokio::test]
async fn test_admin_create_doctor_failure() {
    let backend = MockBackend::start().await;
    backend.respond("POST", paths::CREATE_DOCTOR, 400, json!({"error": "Email already registered"}));
    let notifier = common::notifier();

    let mut admin = AdminDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    admin.open_create_doctor();
    admin.draft = filled_doctor();

    assert!(admin.submit_create_doctor().await.is_err());
    assert!(admin.creating_doctor);
    assert_eq!(notifier.errors(), vec!["Email already registered".to_string()]);
}

#[tokio::test]
async fn test_admin_zero_max_appointments_blocks_submit() {
    let backend = MockBackend::start().await;
    backend.respond("POST", paths::CREATE_DOCTOR, 201, json!({"id": 3}));
    let notifier = common::notifier();

    let mut admin = AdminDashboard::new(backend.client(Some(TOKEN)), notifier.clone());
    admin.open_create_doctor();
    admin.draft = NewDoctor {
        max_appointments: 0,
        ..filled_doctor()
    };

    assert!(!admin.can_submit());
    assert_eq!(admin.missing_fields(), vec!["max_appointments"]);

    let err = admin.submit_create_doctor().await.unwrap_err();
    assert!(matches!(
        err,
        ViewError::Form(FormError::MissingFields(ref fields)) if fields == &vec!["max_appointments"]
    ));
    assert_eq!(notifier.errors(), vec![MISSING_FIELDS_MESSAGE.to_string()]);
    assert!(admin.creating_doctor);
    assert!(backend.requests().is_empty());
}

fn fill_intake(form: &mut IntakeForm) {
    form.name = "Meera".to_string();
    form.age = "34".to_string();
    form.sex = Some(Sex::Female);
}

#[tokio::test]
async fn test_intake_messages() {
    let backend = MockBackend::start().await;
    let notifier = common::notifier();

    backend.respond("POST", paths::INTAKE, 201, json!({"id": 1}));
    let mut form = IntakeForm::new(backend.client(None), notifier.clone());
    fill_intake(&mut form);
    form.submit().await.unwrap();
    assert_eq!(form.message.as_deref(), Some("User data submitted successfully!"));
    assert!(form.name.is_empty());

    backend.respond("POST", paths::INTAKE, 400, json!({"error": "Age must be positive"}));
    fill_intake(&mut form);
    assert!(form.submit().await.is_err());
    assert_eq!(form.message.as_deref(), Some("Error: Age must be positive"));

    // The intake endpoint's `error` field wins over a generic `message`
    backend.respond(
        "POST",
        paths::INTAKE,
        400,
        json!({"message": "Bad request", "error": "Name is required"}),
    );
    fill_intake(&mut form);
    assert!(form.submit().await.is_err());
    assert_eq!(form.message.as_deref(), Some("Error: Name is required"));

    let mut offline = IntakeForm::new(
        common::client_at(&common::dead_base_url().await, None),
        notifier.clone(),
    );
    fill_intake(&mut offline);
    assert!(offline.submit().await.is_err());
    assert_eq!(offline.message.as_deref(), Some("Could not connect to backend!"));
}

#[tokio::test]
async fn test_intake_requires_fields() {
    let backend = MockBackend::start().await;
    let notifier = common::notifier();

    let mut form = IntakeForm::new(backend.client(None), notifier.clone());
    form.name = "Meera".to_string();
    assert_eq!(form.missing_fields(), vec!["age", "sex"]);
    assert!(form.submit().await.is_err());
    assert!(backend.requests().is_empty());
}
