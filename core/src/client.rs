//! Stateless HTTP request builder and response parser for the booking API.
//!
//! # Design
//! `BookingClient` holds only a `base_url`. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`, so the core never touches the network.
//!
//! Every parse method declares the response shape it expects: list endpoints
//! decode a [`Listing`] (bare array or `value` envelope), single-object
//! endpoints decode the object itself, and the appointment update accepts an
//! empty 204 as success. Decoded DTOs are normalized into domain values before
//! they are returned.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::model::{normalize_all, Appointment, Doctor, Session};
use crate::multipart::MultipartForm;
use crate::types::{
    AppointmentDto, AppointmentRequest, AuthResponse, CreateDoctorRequest, DoctorDto, LoginRequest,
    Listing, RegisterRequest,
};

/// Synchronous, stateless client for the booking API.
#[derive(Debug, Clone)]
pub struct BookingClient {
    base_url: String,
}

impl BookingClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- doctors ------------------------------------------------------------

    pub fn build_list_doctors(&self) -> HttpRequest {
        self.get("/Doctor")
    }

    pub fn build_create_doctor(&self, input: &CreateDoctorRequest) -> Result<HttpRequest, ApiError> {
        self.post_json("/Doctor", input)
    }

    pub fn parse_list_doctors(&self, response: HttpResponse) -> Result<Vec<Doctor>, ApiError> {
        let listing: Listing<DoctorDto> = decode(&response)?;
        normalize_all(listing.into_items())
    }

    pub fn parse_create_doctor(&self, response: HttpResponse) -> Result<Doctor, ApiError> {
        let dto: DoctorDto = decode(&response)?;
        Doctor::try_from(dto)
    }

    // -- appointments -------------------------------------------------------

    pub fn build_list_appointments(&self) -> HttpRequest {
        self.get("/Appointment")
    }

    pub fn build_create_appointment(
        &self,
        input: &AppointmentRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.post_json("/Appointment", input)
    }

    pub fn build_update_appointment(
        &self,
        id: &str,
        input: &AppointmentRequest,
    ) -> Result<HttpRequest, ApiError> {
        self.put_json(&format!("/Appointment/{id}"), input)
    }

    pub fn parse_list_appointments(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<Appointment>, ApiError> {
        let listing: Listing<AppointmentDto> = decode(&response)?;
        normalize_all(listing.into_items())
    }

    pub fn parse_create_appointment(&self, response: HttpResponse) -> Result<Appointment, ApiError> {
        let dto: AppointmentDto = decode(&response)?;
        Appointment::try_from(dto)
    }

    /// The update endpoint answers 204 or echoes a body; either way the caller
    /// keeps the values it submitted, so the body is not decoded.
    pub fn parse_update_appointment(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    // -- auth ---------------------------------------------------------------

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.post_json("/Auth/login", input)
    }

    /// Registration goes out as `multipart/form-data`. The `ProfileImage` part
    /// is left out entirely when no image is attached.
    pub fn build_register(&self, input: &RegisterRequest) -> HttpRequest {
        let mut form = MultipartForm::new()
            .text("Username", &input.username)
            .text("Email", &input.email)
            .text("Password", &input.password);
        if let Some(image) = &input.profile_image {
            form = form.file("ProfileImage", image);
        }
        self.post_form("/Auth/register", form)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<Session, ApiError> {
        let auth: AuthResponse = decode(&response)?;
        Session::try_from(auth)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<Session, ApiError> {
        self.parse_login(response)
    }

    // -- request shapes -----------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            headers: Vec::new(),
            body: None,
        }
    }

    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, path, body)
    }

    fn put_json<B: Serialize>(&self, path: &str, body: &B) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, path, body)
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    fn post_form(&self, path: &str, form: MultipartForm) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Post,
            path: self.url(path),
            headers: vec![("content-type".to_string(), form.content_type())],
            body: Some(form.into_bytes()),
        }
    }
}

/// Map any non-2xx status to `ApiError::Request`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    debug!(status = response.status, "request failed");
    Err(ApiError::from_status(response.status, &response.body))
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{to_iso_string, AppointmentStatus};
    use crate::types::ProfileImage;

    fn client() -> BookingClient {
        BookingClient::new("http://localhost:3000")
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse::new(200, body)
    }

    #[test]
    fn build_list_doctors_produces_correct_request() {
        let req = client().build_list_doctors();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:3000/Doctor");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn trailing_slashes_are_stripped() {
        let client = BookingClient::new("https://clinic.example//");
        assert_eq!(client.build_list_appointments().path, "https://clinic.example/Appointment");
    }

    #[test]
    fn build_create_doctor_sends_json() {
        let input = CreateDoctorRequest {
            name: "Dr. Sofia Patel".to_string(),
            specialty: "Cardiology".to_string(),
            available_slots: vec!["2026-02-12T15:30:00.000Z".to_string()],
        };
        let req = client().build_create_doctor(&input).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["name"], "Dr. Sofia Patel");
        assert_eq!(body["availableSlots"][0], "2026-02-12T15:30:00.000Z");
    }

    #[test]
    fn build_update_appointment_targets_id() {
        let input = AppointmentRequest {
            doctor_id: "d1".to_string(),
            patient_name: "Jordan".to_string(),
            date_time: "2026-02-12T15:30:00.000Z".to_string(),
            status: "Confirmed".to_string(),
        };
        let req = client().build_update_appointment("a7", &input).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:3000/Appointment/a7");
    }

    #[test]
    fn parse_list_doctors_accepts_both_shapes() {
        let bare = r#"[{"id":1,"name":"Dr. Ada","specialty":"Cardiology","availableSlots":["2026-02-12T15:30:00Z"]}]"#;
        let wrapped = format!(r#"{{"value":{bare},"Count":1}}"#);
        let a = client().parse_list_doctors(ok(bare)).unwrap();
        let b = client().parse_list_doctors(ok(&wrapped)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a[0].id, "1");
        assert_eq!(to_iso_string(&a[0].available_slots[0]), "2026-02-12T15:30:00.000Z");
    }

    #[test]
    fn parse_list_appointments_keeps_unknown_status() {
        let body = r#"[{"id":"a1","doctorId":"d1","patientName":"Jordan","dateTime":"2026-02-12T15:30:00","status":"NoShow"}]"#;
        let items = client().parse_list_appointments(ok(body)).unwrap();
        assert_eq!(items[0].status, AppointmentStatus::Other("NoShow".to_string()));
    }

    #[test]
    fn parse_update_accepts_no_content() {
        assert!(client().parse_update_appointment(HttpResponse::new(204, "")).is_ok());
        assert!(client()
            .parse_update_appointment(ok(r#"{"id":"a1"}"#))
            .is_ok());
    }

    #[test]
    fn parse_update_reports_failure() {
        let err = client()
            .parse_update_appointment(HttpResponse::new(404, ""))
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 404, .. }));
        assert_eq!(err.to_string(), "Request failed: 404");
    }

    #[test]
    fn parse_login_failure_surfaces_body() {
        let err = client()
            .parse_login(HttpResponse::new(401, "Invalid email or password."))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid email or password.");
    }

    #[test]
    fn parse_list_bad_json() {
        let err = client().parse_list_doctors(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn build_register_omits_missing_image() {
        let input = RegisterRequest {
            username: "jordan".to_string(),
            email: "jordan@example.com".to_string(),
            password: "secret".to_string(),
            profile_image: None,
        };
        let req = client().build_register(&input);
        assert_eq!(req.path, "http://localhost:3000/Auth/register");
        let content_type = req.header("content-type").unwrap();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert!(body.contains("name=\"Username\"\r\n\r\njordan\r\n"));
        assert!(body.contains("name=\"Email\""));
        assert!(body.contains("name=\"Password\""));
        assert!(!body.contains("ProfileImage"));
    }

    #[test]
    fn build_register_attaches_image() {
        let input = RegisterRequest {
            username: "jordan".to_string(),
            email: "jordan@example.com".to_string(),
            password: "secret".to_string(),
            profile_image: Some(ProfileImage {
                file_name: "me.gif".to_string(),
                content_type: "image/gif".to_string(),
                bytes: b"GIF89a".to_vec(),
            }),
        };
        let req = client().build_register(&input);
        let body = String::from_utf8(req.body.unwrap()).unwrap();
        assert!(body.contains("name=\"ProfileImage\"; filename=\"me.gif\"\r\nContent-Type: image/gif"));
    }
}
