//! Resource clients: one async call per endpoint.
//!
//! `BookingApi` pairs the stateless [`BookingClient`] with a [`Transport`]:
//! build the request, execute it, parse the response. Inputs are taken as
//! already-validated domain values; timestamps are rendered to their canonical
//! wire form here.

use std::sync::Arc;

use crate::client::BookingClient;
use crate::error::ApiError;
use crate::model::{to_iso_string, Appointment, AppointmentStatus, Doctor, Session, Timestamp};
use crate::transport::Transport;
use crate::types::{AppointmentRequest, CreateDoctorRequest, LoginRequest, ProfileImage, RegisterRequest};

/// Fields submitted when creating or updating an appointment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentInput {
    pub doctor_id: String,
    pub patient_name: String,
    pub date_time: Timestamp,
    pub status: AppointmentStatus,
}

impl From<&AppointmentInput> for AppointmentRequest {
    fn from(input: &AppointmentInput) -> Self {
        AppointmentRequest {
            doctor_id: input.doctor_id.clone(),
            patient_name: input.patient_name.clone(),
            date_time: to_iso_string(&input.date_time),
            status: input.status.as_str().to_string(),
        }
    }
}

pub struct BookingApi<T: ?Sized> {
    client: BookingClient,
    transport: Arc<T>,
}

impl<T: ?Sized> Clone for BookingApi<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T: Transport + ?Sized> BookingApi<T> {
    pub fn new(client: BookingClient, transport: Arc<T>) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &BookingClient {
        &self.client
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ApiError> {
        let response = self.transport.execute(self.client.build_list_doctors()).await?;
        self.client.parse_list_doctors(response)
    }

    pub async fn create_doctor(
        &self,
        name: &str,
        specialty: &str,
        slots: &[Timestamp],
    ) -> Result<Doctor, ApiError> {
        let input = CreateDoctorRequest {
            name: name.to_string(),
            specialty: specialty.to_string(),
            available_slots: slots.iter().map(to_iso_string).collect(),
        };
        let response = self
            .transport
            .execute(self.client.build_create_doctor(&input)?)
            .await?;
        self.client.parse_create_doctor(response)
    }

    pub async fn list_appointments(&self) -> Result<Vec<Appointment>, ApiError> {
        let response = self
            .transport
            .execute(self.client.build_list_appointments())
            .await?;
        self.client.parse_list_appointments(response)
    }

    pub async fn create_appointment(&self, input: &AppointmentInput) -> Result<Appointment, ApiError> {
        let request = self.client.build_create_appointment(&input.into())?;
        let response = self.transport.execute(request).await?;
        self.client.parse_create_appointment(response)
    }

    pub async fn update_appointment(&self, id: &str, input: &AppointmentInput) -> Result<(), ApiError> {
        let request = self.client.build_update_appointment(id, &input.into())?;
        let response = self.transport.execute(request).await?;
        self.client.parse_update_appointment(response)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let input = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self.transport.execute(self.client.build_login(&input)?).await?;
        self.client.parse_login(response)
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        profile_image: Option<ProfileImage>,
    ) -> Result<Session, ApiError> {
        let input = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            profile_image,
        };
        let response = self.transport.execute(self.client.build_register(&input)).await?;
        self.client.parse_register(response)
    }
}
