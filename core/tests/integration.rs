//! Page controllers against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives every page controller
//! over real HTTP through `UreqTransport`. Validates that request building,
//! response parsing and normalization work end-to-end with the actual server,
//! including the doctor envelope, the bare appointment array and the 204 update.

use std::sync::Arc;

use booking_core::types::ProfileImage;
use booking_core::views::appointments::AppointmentManager;
use booking_core::views::auth::{logout, LoginPage, RegisterPage};
use booking_core::views::doctors::DoctorDirectory;
use booking_core::views::home::HomeStats;
use booking_core::{
    connect, ApiConfig, AppointmentStatus, BookingApi, MemoryStore, Outcome, Route, SessionStore,
    UreqTransport,
};

async fn start_server() -> BookingApi<UreqTransport> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    connect(&ApiConfig::resolve(Some(&format!("http://{addr}")), None))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn booking_lifecycle() {
    let api = start_server().await;

    // Step 1: empty directory.
    let directory = DoctorDirectory::new(api.clone());
    assert_eq!(directory.load().await, Outcome::Applied);
    assert!(directory.snapshot().doctors.is_empty());

    // Step 2: add a doctor with a duplicated slot.
    directory.set_new_name(" Dr. Ada Park ");
    directory.set_new_specialty("Cardiology");
    directory.set_slot_input("2026-02-12T15:30");
    assert!(directory.add_slot());
    directory.set_slot_input("2026-02-12T15:30");
    assert!(directory.add_slot());
    assert_eq!(directory.create().await, Outcome::Applied);

    let state = directory.snapshot();
    assert_eq!(state.doctors.len(), 1);
    let doctor = state.doctors[0].clone();
    assert_eq!(doctor.name, "Dr. Ada Park");
    assert_eq!(
        booking_core::views::doctors::DoctorDirectoryState::slot_labels(&doctor),
        vec!["Feb 12, 2026, 3:30 PM"]
    );

    // Step 3: the envelope reload sees the same doctor.
    let reloaded = DoctorDirectory::new(api.clone());
    reloaded.load().await;
    assert_eq!(reloaded.snapshot().doctors, vec![doctor.clone()]);

    // Step 4: book an appointment.
    let manager = AppointmentManager::new(api.clone());
    assert_eq!(manager.load().await, Outcome::Applied);
    manager.set_patient_name("Sam Lee");
    manager.select_doctor("Dr. Ada Park");
    manager.set_date_time("2026-02-12T15:30");
    assert_eq!(manager.create().await, Outcome::Applied);

    let state = manager.snapshot();
    assert_eq!(state.appointments.len(), 1);
    let booked = state.appointments[0].clone();
    assert_eq!(booked.doctor_id, doctor.id);
    assert_eq!(booked.status, AppointmentStatus::Scheduled);
    assert_eq!(state.doctor_name(&booked.doctor_id), "Dr. Ada Park");

    // Step 5: update answers 204; local state holds the submitted values.
    manager.start_edit(&booked.id).unwrap();
    manager.set_edit_status(AppointmentStatus::Confirmed);
    manager.set_edit_date_time("2026-02-13T09:00");
    assert_eq!(manager.update().await, Outcome::Applied);
    let local = manager.snapshot().appointments[0].clone();
    assert_eq!(local.status, AppointmentStatus::Confirmed);

    let fresh = AppointmentManager::new(api.clone());
    fresh.load().await;
    assert_eq!(fresh.snapshot().appointments, vec![local]);

    // Step 6: home stats.
    let home = HomeStats::new(api.clone());
    assert_eq!(home.load().await, Outcome::Applied);
    let overview = home.overview();
    assert_eq!(overview.doctor_count_label(), "1");
    assert_eq!(overview.appointment_count_label(), "1");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unknown_doctor_selection_is_rejected() {
    let api = start_server().await;
    let manager = AppointmentManager::new(api);
    manager.load().await;

    // Doctor list is empty, so the selection maps to no id and validation stops it.
    manager.set_patient_name("Sam");
    manager.select_doctor("Nobody");
    manager.set_date_time("2026-02-12T15:30");
    assert_eq!(manager.create().await, Outcome::Rejected);
    assert!(manager.snapshot().appointments.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn account_lifecycle() {
    let api = start_server().await;
    let kv = Arc::new(MemoryStore::new());
    let sessions = SessionStore::new(Arc::clone(&kv));

    // Wrong credentials before the account exists.
    let login = LoginPage::new(api.clone(), sessions.clone());
    login.set_email("jordan@example.com");
    login.set_password("secret");
    assert_eq!(login.submit().await, Outcome::Failed);
    assert_eq!(
        login.snapshot().error.as_deref(),
        Some("Invalid email or password.")
    );
    assert!(!sessions.is_signed_in());

    // Register with an avatar.
    let register = RegisterPage::new(api.clone(), sessions.clone());
    register.set_username("jordan");
    register.set_email("jordan@example.com");
    register.set_password("secret");
    register.set_profile_image(Some(ProfileImage {
        file_name: "me.png".to_string(),
        content_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }));
    assert_eq!(register.submit().await, Outcome::Applied);
    let state = register.snapshot();
    assert_eq!(state.welcome_message().as_deref(), Some("Welcome, jordan!"));
    let stored = sessions.load().unwrap();
    assert_eq!(stored.username, "jordan");
    assert!(stored.profile_image_url.unwrap().ends_with("-me.png"));

    // Log in again.
    assert_eq!(login.submit().await, Outcome::Applied);
    assert_eq!(login.snapshot().redirect, Some(Route::Doctors));
    assert!(sessions.is_signed_in());

    assert_eq!(logout(&sessions).unwrap(), Route::Login);
    assert!(kv.is_empty());
    assert!(SessionStore::new(kv).load().is_none());
}
