//! MediDesk CLI
//!
//! Command-line front-end for the hospital backend:
//! - Sign in with a token and inspect the session
//! - Browse doctors, appointments, prescriptions, bills and medicines
//! - Book, cancel, prescribe and bill
//! - Patient and doctor dashboards

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use medidesk::api::filter_medicines;
use medidesk::format::{format_date, format_inr, format_time, relative_day_label};
use medidesk::views::{bill_created_message, cancellable, schedule_for_doctor, SPECIALIZATIONS};
use medidesk::*;

#[derive(Parser)]
#[command(name = "medidesk")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hospital desk client for patients, doctors and admins")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Backend URL (overrides config and MEDIDESK_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Role {
    Patient,
    Doctor,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a session token
    Login {
        #[arg(long)]
        token: String,
    },

    /// Forget the session token
    Logout,

    /// Show the signed-in user
    Whoami,

    /// List doctors
    Doctors,

    /// List appointments
    Appointments {
        /// Only this day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Only the signed-in patient's appointments
        #[arg(long, conflicts_with = "doctor")]
        mine: bool,
        /// Only the signed-in doctor's schedule, by token number
        #[arg(long)]
        doctor: bool,
    },

    /// Book an appointment
    Book {
        /// Doctor id
        #[arg(long)]
        doctor: i64,
        /// Day of the visit (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Slot id (1-6), see `medidesk book --help`
        #[arg(long, long_help = slot_help())]
        slot: String,
        /// Reason for the visit
        #[arg(long)]
        description: String,
    },

    /// Cancel a pending appointment
    Cancel {
        appointment_id: i64,
    },

    /// List prescriptions
    Prescriptions,

    /// Write a prescription for an appointment
    Prescribe {
        appointment_id: i64,
        /// Medicine as id[:dosage[:days]], repeatable
        #[arg(short, long = "medicine", required = true)]
        medicines: Vec<String>,
        /// Diagnosis / notes
        #[arg(long)]
        description: String,
    },

    /// Bill an appointment
    Bill {
        appointment_id: i64,
        /// Amount in rupees (default: computed by the backend)
        #[arg(long)]
        amount: Option<String>,
        /// Payment type (upi, cash)
        #[arg(long, default_value = "upi")]
        payment: PaymentType,
    },

    /// Generate a UPI QR code for an amount
    UpiQr {
        amount: f64,
    },

    /// List medicines
    Medicines {
        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,
    },

    /// List pharmacy orders
    PharmacyOrders,

    /// List bills
    Bills,

    /// Create a doctor account (admin)
    CreateDoctor {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(SPECIALIZATIONS))]
        specialization: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        upi_id: String,
        #[arg(long, default_value = "08:00:00")]
        available_from: String,
        #[arg(long, default_value = "20:00:00")]
        available_to: String,
        #[arg(long, default_value = "10")]
        max_appointments: u32,
    },

    /// Submit the public patient intake form
    Intake {
        #[arg(long)]
        name: String,
        #[arg(long)]
        age: String,
        /// male, female, other
        #[arg(long)]
        sex: Sex,
    },

    /// Show a dashboard
    Dashboard {
        #[arg(value_enum)]
        role: Role,
        /// Schedule day for the doctor dashboard (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn slot_help() -> String {
    let slots: Vec<String> = default_slots()
        .iter()
        .map(|s| {
            let note = if s.available { "" } else { " (unavailable)" };
            format!("  {}: {}{}", s.id, s.label, note)
        })
        .collect();
    format!("Slot id. Available slots:\n{}", slots.join("\n"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.base_url {
        config.backend.base_url = url.clone();
    }

    init_logging(&config.logging);

    let session: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.session.token_path()));
    let client = ApiClient::new(&config.backend, session.clone())?;
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let json = cli.format == "json";

    match cli.command {
        Commands::Login { token } => {
            session.set_token(&token).await?;
            println!("Session saved to {:?}", config.session.token_path());
        }

        Commands::Logout => {
            session.clear().await?;
            println!("Signed out");
        }

        Commands::Whoami => {
            let profile = or_exit(client.current_user().await, "Failed to load profile");
            if json {
                print_json(&profile)?;
            } else {
                print_profile(&profile);
            }
        }

        Commands::Doctors => {
            let doctors = or_exit(client.list_doctors().await, "Failed to load doctors");
            if json {
                print_json(&doctors)?;
            } else {
                print_doctors(&doctors);
            }
        }

        Commands::Appointments { date, mine, doctor } => {
            let mut appointments = or_exit(
                client.list_appointments(date).await,
                "Failed to load appointments",
            );

            if mine || doctor {
                let profile = or_exit(client.current_user().await, "Failed to load profile");
                if mine {
                    appointments.retain(|a| a.patient.is_some() && a.patient == profile.id);
                } else {
                    let Some(name) = profile.doctor_name() else {
                        eprintln!("Signed-in user is not a doctor");
                        std::process::exit(1);
                    };
                    appointments = schedule_for_doctor(appointments, name);
                }
            }

            if json {
                print_json(&appointments)?;
            } else {
                print_appointments(&appointments);
            }
        }

        Commands::Book {
            doctor,
            date,
            slot,
            description,
        } => {
            let today = Local::now().date_naive();
            let mut dashboard = PatientDashboard::new(client, notifier);
            dashboard.booking.select_doctor(doctor);
            if let Err(e) = dashboard.booking.select_date(date, today) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            if let Err(e) = dashboard.booking.select_slot(&slot) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            dashboard.booking.set_description(&description);

            exit_on_view_error(dashboard.book().await);
        }

        Commands::Cancel { appointment_id } => {
            let appointments = or_exit(
                client.list_appointments(None).await,
                "Failed to load appointments",
            );
            if let Err(e) = cancellable(&appointments, appointment_id) {
                eprintln!("{}", e);
                std::process::exit(1);
            }
            or_exit(
                client.cancel_appointment(appointment_id).await,
                "Failed to cancel appointment",
            );
            notifier.success("Appointment cancelled successfully");
        }

        Commands::Prescriptions => {
            let prescriptions = or_exit(
                client.list_prescriptions().await,
                "Failed to load prescriptions",
            );
            if json {
                print_json(&prescriptions)?;
            } else {
                print_prescriptions(&prescriptions);
            }
        }

        Commands::Prescribe {
            appointment_id,
            medicines,
            description,
        } => {
            let mut form = PrescriptionForm::new(client, notifier, appointment_id);
            exit_on_view_error(form.load().await);

            for raw in &medicines {
                let (id, dosage, days) = match parse_medicine_arg(raw) {
                    Ok(parts) => parts,
                    Err(e) => {
                        eprintln!("{}", e);
                        std::process::exit(1);
                    }
                };
                if let Err(e) = form.add_medicine(id) {
                    eprintln!("{}", e);
                    std::process::exit(1);
                }
                if let Some(dosage) = dosage {
                    form.selection.set_dosage(id, &dosage);
                }
                if let Some(days) = days {
                    form.selection.set_duration(id, &days);
                }
            }
            form.description = description;

            if let Route::Bill { appointment_id } = exit_on_view_error(form.submit().await) {
                println!("Next: medidesk bill {}", appointment_id);
            }
        }

        Commands::Bill {
            appointment_id,
            amount,
            payment,
        } => match amount {
            Some(amount) => {
                let mut form = BillForm::new(client, notifier, appointment_id);
                form.set_payment_type(payment).await;
                form.set_amount(&amount).await;
                if let Some(url) = form.qr_image_url() {
                    println!("UPI QR: {}", url);
                }
                exit_on_view_error(form.submit().await);
            }
            None => {
                let receipt = or_exit(
                    client.create_bill(appointment_id, None).await,
                    "Failed to create bill",
                );
                let amount = receipt
                    .amount()
                    .map(format_inr)
                    .unwrap_or_else(|| "-".to_string());
                notifier.success(&bill_created_message(
                    &amount,
                    receipt.patient_name.as_deref().unwrap_or("patient"),
                ));
            }
        },

        Commands::UpiQr { amount } => {
            let qr = or_exit(
                client.generate_upi_qr(amount).await,
                "Failed to generate UPI QR code",
            );
            println!("{}", client.resolve(&qr.qr_url));
        }

        Commands::Medicines { search } => {
            let medicines = or_exit(client.list_medicines().await, "Failed to load medications");
            let shown = filter_medicines(&medicines, search.as_deref().unwrap_or(""));
            if json {
                print_json(&shown)?;
            } else {
                print_medicines(&shown);
            }
        }

        Commands::PharmacyOrders => {
            let orders = or_exit(
                client.list_pharmacy_orders().await,
                "Failed to load pharmacy orders",
            );
            if json {
                print_json(&orders)?;
            } else {
                print_pharmacy_orders(&orders);
            }
        }

        Commands::Bills => {
            let bills = or_exit(client.list_bills().await, "Failed to load bills");
            if json {
                print_json(&bills)?;
            } else {
                print_bills(&bills);
            }
        }

        Commands::CreateDoctor {
            full_name,
            email,
            password,
            specialization,
            phone,
            upi_id,
            available_from,
            available_to,
            max_appointments,
        } => {
            let mut admin = AdminDashboard::new(client, notifier);
            admin.open_create_doctor();
            admin.draft = NewDoctor {
                full_name,
                email,
                password,
                specialization,
                phone_number: phone,
                available_from,
                available_to,
                upi_id,
                max_appointments,
            };
            let created = exit_on_view_error(admin.submit_create_doctor().await);
            if json {
                print_json(&created)?;
            }
        }

        Commands::Intake { name, age, sex } => {
            let mut form = IntakeForm::new(client, notifier);
            form.name = name;
            form.age = age;
            form.sex = Some(sex);
            exit_on_view_error(form.submit().await);
        }

        Commands::Dashboard { role, date } => match role {
            Role::Patient => {
                let mut dashboard = PatientDashboard::new(client, notifier);
                if dashboard.load().await.is_err() && dashboard.profile.is_none() {
                    std::process::exit(1);
                }

                if json {
                    print_json(&serde_json::json!({
                        "profile": dashboard.profile,
                        "upcoming_appointments": dashboard.stats.upcoming_appointments,
                        "active_prescriptions": dashboard.stats.active_prescriptions,
                        "appointments": dashboard.appointments,
                        "prescriptions": dashboard.prescriptions,
                    }))?;
                } else {
                    print_patient_dashboard(&dashboard);
                }
            }
            Role::Doctor => {
                let mut dashboard = DoctorDashboard::new(client, notifier);
                if let Some(date) = date {
                    dashboard.selected_date = date;
                }
                if dashboard.load().await.is_err() && dashboard.profile.is_none() {
                    std::process::exit(1);
                }

                if json {
                    print_json(&serde_json::json!({
                        "profile": dashboard.profile,
                        "date": dashboard.selected_date,
                        "appointments": dashboard.appointments,
                        "bills": dashboard.bills,
                        "pharmacy_orders": dashboard.pharmacy_orders,
                    }))?;
                } else {
                    print_doctor_dashboard(&dashboard);
                }
            }
        },

        Commands::Config { output } => {
            let config = medidesk::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("medidesk={}", config.level)));
    let registry = tracing_subscriber::registry().with(filter);

    match config.format.as_str() {
        "json" => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

/// Print the user-facing message and exit on a failed request
fn or_exit<T>(result: ClientResult<T>, default: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Request failed");
            eprintln!("{}", e.user_message(default));
            std::process::exit(1);
        }
    }
}

/// Views already reported the failure through the notifier
fn exit_on_view_error<T>(result: Result<T, ViewError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Command failed");
            std::process::exit(1);
        }
    }
}

/// `id[:dosage[:days]]`
fn parse_medicine_arg(raw: &str) -> Result<(i64, Option<String>, Option<String>), String> {
    let mut parts = raw.splitn(3, ':');
    let id = parts
        .next()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .ok_or_else(|| format!("Invalid medicine: {}. Use id[:dosage[:days]]", raw))?;
    let dosage = parts.next().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    let days = parts.next().map(str::trim).filter(|s| !s.is_empty()).map(String::from);
    Ok((id, dosage, days))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_profile(profile: &Profile) {
    println!(
        "[{}] {}",
        profile.initial('?'),
        profile.display_name().unwrap_or("Unknown")
    );
    if let Some(email) = profile.email() {
        println!("  Email: {}", email);
    }
    if let Some(phone) = profile.phone_number() {
        println!("  Phone: {}", phone);
    }
    if let Some(spec) = profile.specialization.as_deref() {
        println!("  Specialization: {}", spec);
    }
}

fn print_doctors(doctors: &[Doctor]) {
    if doctors.is_empty() {
        println!("No doctors found");
        return;
    }

    println!("{:<6} {:<24} {:<20} {}", "ID", "Name", "Specialization", "Hours");
    println!("{}", "-".repeat(72));
    for d in doctors {
        println!(
            "{:<6} {:<24} {:<20} {}",
            d.id(),
            d.user.full_name,
            d.specialization_label(),
            d.availability()
        );
    }
}

fn print_appointments(appointments: &[Appointment]) {
    if appointments.is_empty() {
        println!("No appointments");
        return;
    }

    println!(
        "{:<6} {:<6} {:<20} {:<20} {:<20} {:<10} {}",
        "ID", "Token", "Patient", "Doctor", "Date", "Time", "Status"
    );
    println!("{}", "-".repeat(100));
    for a in appointments {
        println!(
            "{:<6} {:<6} {:<20} {:<20} {:<20} {:<10} {}",
            a.id,
            a.token_no.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string()),
            a.patient_label(),
            a.doctor_name.as_deref().unwrap_or("-"),
            format_date(a.start_time.as_deref()),
            format_time(a.start_time.as_deref()),
            a.status()
        );
    }
}

fn print_prescriptions(prescriptions: &[Prescription]) {
    if prescriptions.is_empty() {
        println!("No prescriptions");
        return;
    }

    for p in prescriptions {
        let state = if p.is_active() { "active" } else { "finished" };
        println!(
            "#{} {} ({}, {})",
            p.id,
            p.description,
            format_date(p.created_at.as_deref()),
            state
        );
        for m in &p.medications {
            println!(
                "    {:<24} {:<12} x{:<4} {} days",
                m.medicine_name.as_deref().unwrap_or("-"),
                m.dosage.as_deref().unwrap_or("-"),
                m.quantity.unwrap_or(0),
                m.days.unwrap_or(0)
            );
        }
    }
}

fn print_medicines(medicines: &[&Medicine]) {
    if medicines.is_empty() {
        println!("No medicines match");
        return;
    }

    println!("{:<6} {:<30} {}", "ID", "Name", "Type");
    println!("{}", "-".repeat(50));
    for m in medicines {
        println!("{:<6} {:<30} {}", m.id, m.name, m.kind.as_deref().unwrap_or("-"));
    }
}

fn print_pharmacy_orders(orders: &[PharmacyOrder]) {
    if orders.is_empty() {
        println!("No pharmacy orders");
        return;
    }

    println!("{:<6} {:<24} {:<12} {}", "ID", "Patient", "Status", "Created");
    println!("{}", "-".repeat(64));
    for o in orders {
        println!(
            "{:<6} {:<24} {:<12} {}",
            o.id,
            o.patient_name.as_deref().unwrap_or("-"),
            o.status.as_deref().unwrap_or("-"),
            format_date(o.created_at.as_deref())
        );
    }
}

fn print_bills(bills: &[Bill]) {
    if bills.is_empty() {
        println!("No bills");
        return;
    }

    println!("{:<6} {:<24} {:<16} {:<8} {}", "ID", "Patient", "Amount", "Paid by", "Created");
    println!("{}", "-".repeat(80));
    for b in bills {
        println!(
            "{:<6} {:<24} {:<16} {:<8} {}",
            b.id,
            b.patient_name.as_deref().unwrap_or("-"),
            b.total_amount.map(format_inr).unwrap_or_else(|| "-".to_string()),
            b.payment_type.as_deref().unwrap_or("-"),
            format_date(b.created_at.as_deref())
        );
    }
}

fn print_patient_dashboard(dashboard: &PatientDashboard) {
    if let Some(profile) = &dashboard.profile {
        print_profile(profile);
    }
    println!();
    println!("Upcoming: {}", dashboard.stats.upcoming_label());
    println!("Active prescriptions: {}", dashboard.stats.active_prescriptions);

    let today = Local::now().date_naive();
    println!();
    println!("Appointments:");
    if dashboard.appointments.is_empty() {
        println!("  none");
    }
    for a in &dashboard.appointments {
        let day = a
            .start_time
            .as_deref()
            .map(|s| relative_day_label(s, &Local, today))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<14} {:<10} {:<20} {}",
            day,
            format_time(a.start_time.as_deref()),
            a.doctor_name.as_deref().unwrap_or("-"),
            a.status()
        );
    }
}

fn print_doctor_dashboard(dashboard: &DoctorDashboard) {
    if let Some(profile) = &dashboard.profile {
        print_profile(profile);
    }
    println!();
    println!("Schedule for {}:", dashboard.selected_date.format("%a %b %-d, %Y"));
    print_appointments(&dashboard.appointments);

    println!();
    println!("Bills:");
    print_bills(&dashboard.bills);

    println!();
    println!("Pharmacy orders: {}", dashboard.pharmacy_orders.len());
}
