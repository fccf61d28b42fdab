//! Wire DTOs for the booking API.
//!
//! # Design
//! These types mirror the backend's JSON exactly: ids and timestamps travel as
//! strings and are only turned into domain values by [`crate::model`]. The
//! mock-server crate defines its own copies; integration tests catch any schema
//! drift between the two.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an id that the backend may send as a JSON string or number.
fn wire_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Signed(n) => n.to_string(),
        RawId::Unsigned(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

/// Response shape of list endpoints: either a bare array or an envelope with
/// the items under `value` and an optional `Count`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Envelope {
        value: Vec<T>,
        #[serde(rename = "Count", alias = "count", default)]
        count: Option<u64>,
    },
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Envelope { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDto {
    #[serde(deserialize_with = "wire_id")]
    pub id: String,
    pub name: String,
    pub specialty: String,
    #[serde(default)]
    pub available_slots: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub name: String,
    pub specialty: String,
    pub available_slots: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDto {
    #[serde(deserialize_with = "wire_id")]
    pub id: String,
    #[serde(deserialize_with = "wire_id")]
    pub doctor_id: String,
    pub patient_name: String,
    pub date_time: String,
    pub status: String,
}

/// Payload for both `POST /Appointment` and `PUT /Appointment/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRequest {
    pub doctor_id: String,
    pub patient_name: String,
    pub date_time: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// An image file attached to a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Registration input. Sent as `multipart/form-data`, not JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub profile_image: Option<ProfileImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    pub expires_at: String,
}
