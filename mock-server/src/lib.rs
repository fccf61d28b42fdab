use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{Duration, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};
use uuid::Uuid;

const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub available_slots: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctor {
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub available_slots: Vec<String>,
}

/// `GET /Doctor` answers with an envelope, the way the hosted backend does.
#[derive(Debug, Serialize, Deserialize)]
pub struct DoctorListing {
    pub value: Vec<Doctor>,
    #[serde(rename = "Count")]
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
    pub date_time: String,
    pub status: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentInput {
    pub doctor_id: String,
    pub patient_name: String,
    pub date_time: String,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub expires_at: String,
}

#[derive(Clone, Debug)]
struct Account {
    username: String,
    email: String,
    password: String,
    profile_image_url: Option<String>,
}

impl Account {
    fn issue_token(&self) -> AuthResponse {
        let expires_at = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
        AuthResponse {
            token: Uuid::new_v4().simple().to_string(),
            username: self.username.clone(),
            email: self.email.clone(),
            profile_image_url: self.profile_image_url.clone(),
            expires_at: expires_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

#[derive(Default)]
pub struct Store {
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
    accounts: HashMap<String, Account>,
}

pub type Db = Arc<RwLock<Store>>;

/// Plain-text error body; the client shows it verbatim.
pub struct Failure(StatusCode, &'static str);

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/Doctor", get(list_doctors).post(create_doctor))
        .route("/Appointment", get(list_appointments).post(create_appointment))
        .route("/Appointment/{id}", put(update_appointment))
        .route("/Auth/login", post(login))
        .route("/Auth/register", post(register))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

async fn list_doctors(State(db): State<Db>) -> Json<DoctorListing> {
    let store = db.read().await;
    Json(DoctorListing {
        value: store.doctors.clone(),
        count: store.doctors.len(),
    })
}

async fn create_doctor(
    State(db): State<Db>,
    Json(input): Json<CreateDoctor>,
) -> Result<(StatusCode, Json<Doctor>), Failure> {
    if blank(&input.name) || blank(&input.specialty) {
        return Err(Failure(StatusCode::BAD_REQUEST, "Name and specialty are required."));
    }
    let doctor = Doctor {
        id: Uuid::new_v4().to_string(),
        name: input.name,
        specialty: input.specialty,
        available_slots: input.available_slots,
    };
    info!(id = %doctor.id, name = %doctor.name, "doctor created");
    db.write().await.doctors.push(doctor.clone());
    Ok((StatusCode::CREATED, Json(doctor)))
}

/// Appointments come back as a bare array.
async fn list_appointments(State(db): State<Db>) -> Json<Vec<Appointment>> {
    Json(db.read().await.appointments.clone())
}

async fn create_appointment(
    State(db): State<Db>,
    Json(input): Json<AppointmentInput>,
) -> Result<(StatusCode, Json<Appointment>), Failure> {
    let mut store = db.write().await;
    check_appointment(&store, &input)?;
    let appointment = Appointment {
        id: Uuid::new_v4().to_string(),
        doctor_id: input.doctor_id,
        patient_name: input.patient_name,
        date_time: input.date_time,
        status: input.status.unwrap_or_else(|| "Scheduled".to_string()),
    };
    info!(id = %appointment.id, doctor_id = %appointment.doctor_id, "appointment booked");
    store.appointments.push(appointment.clone());
    Ok((StatusCode::CREATED, Json(appointment)))
}

/// Replaces the whole appointment and answers with no body.
async fn update_appointment(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<AppointmentInput>,
) -> Result<StatusCode, Failure> {
    let mut store = db.write().await;
    check_appointment(&store, &input)?;
    let appointment = store
        .appointments
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(Failure(StatusCode::NOT_FOUND, "Appointment not found."))?;
    appointment.doctor_id = input.doctor_id;
    appointment.patient_name = input.patient_name;
    appointment.date_time = input.date_time;
    if let Some(status) = input.status {
        appointment.status = status;
    }
    info!(%id, "appointment updated");
    Ok(StatusCode::NO_CONTENT)
}

fn check_appointment(store: &Store, input: &AppointmentInput) -> Result<(), Failure> {
    if blank(&input.patient_name) || blank(&input.date_time) {
        return Err(Failure(StatusCode::BAD_REQUEST, "Patient name and date are required."));
    }
    if !store.doctors.iter().any(|d| d.id == input.doctor_id) {
        return Err(Failure(StatusCode::BAD_REQUEST, "Doctor not found."));
    }
    Ok(())
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, Failure> {
    let store = db.read().await;
    match store.accounts.get(&input.email.to_lowercase()) {
        Some(account) if account.password == input.password => {
            info!(email = %account.email, "login");
            Ok(Json(account.issue_token()))
        }
        _ => {
            warn!(email = %input.email, "rejected login");
            Err(Failure(StatusCode::UNAUTHORIZED, "Invalid email or password."))
        }
    }
}

/// Multipart fields `Username`, `Email`, `Password` and an optional
/// `ProfileImage` file.
async fn register(
    State(db): State<Db>,
    mut multipart: Multipart,
) -> Result<Json<AuthResponse>, Failure> {
    let malformed = |_| Failure(StatusCode::BAD_REQUEST, "Malformed form data.");

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut profile_image_url = None;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "ProfileImage" {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let bytes = field.bytes().await.map_err(malformed)?;
            if !bytes.is_empty() {
                profile_image_url = Some(format!(
                    "/uploads/{}-{file_name}",
                    Uuid::new_v4().simple()
                ));
            }
        } else {
            let text = field.text().await.map_err(malformed)?;
            fields.insert(name, text);
        }
    }

    let field = |key: &str| fields.get(key).map(|v| v.trim().to_string()).unwrap_or_default();
    let (username, email, password) = (field("Username"), field("Email"), field("Password"));
    if username.is_empty() || email.is_empty() || password.is_empty() {
        return Err(Failure(
            StatusCode::BAD_REQUEST,
            "Username, email and password are required.",
        ));
    }

    let mut store = db.write().await;
    let key = email.to_lowercase();
    if store.accounts.contains_key(&key) {
        return Err(Failure(StatusCode::CONFLICT, "Email is already registered."));
    }
    let account = Account {
        username,
        email,
        password,
        profile_image_url,
    };
    info!(email = %account.email, "account registered");
    let response = account.issue_token();
    store.accounts.insert(key, account);
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doctor_listing_uses_envelope_keys() {
        let listing = DoctorListing {
            value: vec![Doctor {
                id: "d1".to_string(),
                name: "Dr. Ada".to_string(),
                specialty: "Cardiology".to_string(),
                available_slots: vec!["2026-02-12T15:30:00.000Z".to_string()],
            }],
            count: 1,
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["Count"], 1);
        assert_eq!(json["value"][0]["availableSlots"][0], "2026-02-12T15:30:00.000Z");
    }

    #[test]
    fn create_doctor_defaults_slots() {
        let input: CreateDoctor =
            serde_json::from_str(r#"{"name":"Dr. Ada","specialty":"Cardiology"}"#).unwrap();
        assert!(input.available_slots.is_empty());
    }

    #[test]
    fn appointment_status_is_optional() {
        let input: AppointmentInput = serde_json::from_str(
            r#"{"doctorId":"d1","patientName":"Sam","dateTime":"2026-02-12T15:30:00.000Z"}"#,
        )
        .unwrap();
        assert!(input.status.is_none());
    }

    #[test]
    fn issued_token_carries_account_details() {
        let account = Account {
            username: "jordan".to_string(),
            email: "jordan@example.com".to_string(),
            password: "secret".to_string(),
            profile_image_url: None,
        };
        let auth = account.issue_token();
        assert_eq!(auth.username, "jordan");
        assert_eq!(auth.token.len(), 32);
        assert!(auth.expires_at.ends_with('Z'));
        let json = serde_json::to_value(&auth).unwrap();
        assert!(json["profileImageUrl"].is_null());
    }
}
