//! Domain values and wire normalization.
//!
//! Wire DTOs from [`crate::types`] carry ids and timestamps as strings. The
//! conversions here parse every timestamp up front. A server row with a bad
//! date is still kept: an appointment carries `None`, a doctor loses only that
//! slot. Offset-less timestamps are read as UTC.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ApiError;
use crate::types::{AppointmentDto, AuthResponse, DoctorDto};

pub type Timestamp = DateTime<Utc>;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse a user- or server-supplied timestamp. Returns `None` for blank or
/// unrecognized input.
pub fn parse_timestamp(input: &str) -> Option<Timestamp> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
}

/// Canonical wire form, e.g. `2026-02-12T15:30:00.000Z`.
pub fn to_iso_string(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Display form, e.g. `Feb 12, 2026, 3:30 PM`.
pub fn format_date_time(ts: &Timestamp) -> String {
    ts.format("%b %-d, %Y, %-I:%M %p").to_string()
}

/// Value for a `datetime-local` style input, e.g. `2026-02-12T15:30`.
pub fn to_date_time_local(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M").to_string()
}

/// Appointment status. Values outside the four known literals are kept
/// verbatim in `Other` so a newer backend never breaks decoding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    Completed,
    Cancelled,
    Other(String),
}

impl AppointmentStatus {
    /// Selectable statuses, in display order.
    pub fn options() -> [AppointmentStatus; 4] {
        [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ]
    }

    pub fn parse(value: &str) -> Self {
        match value {
            "Scheduled" => AppointmentStatus::Scheduled,
            "Confirmed" => AppointmentStatus::Confirmed,
            "Completed" => AppointmentStatus::Completed,
            "Cancelled" => AppointmentStatus::Cancelled,
            other => AppointmentStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Other(value) => value,
        }
    }

    /// Badge class for the status cell.
    pub fn badge_class(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "badge badge-blue",
            AppointmentStatus::Confirmed => "badge badge-green",
            AppointmentStatus::Cancelled => "badge badge-red",
            AppointmentStatus::Completed | AppointmentStatus::Other(_) => "badge badge-gray",
        }
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        AppointmentStatus::parse(&value)
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub id: String,
    pub name: String,
    pub specialty: String,
    pub available_slots: Vec<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: String,
    pub doctor_id: String,
    pub patient_name: String,
    /// `None` when the server sent a date that does not parse.
    pub date_time: Option<Timestamp>,
    pub status: AppointmentStatus,
}

/// Proof of authentication returned by login and registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub username: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    /// Shown to the user, never enforced client-side.
    pub expires_at: Timestamp,
}

impl TryFrom<DoctorDto> for Doctor {
    type Error = ApiError;

    fn try_from(dto: DoctorDto) -> Result<Self, Self::Error> {
        let available_slots = dto
            .available_slots
            .unwrap_or_default()
            .iter()
            .filter_map(|slot| {
                let parsed = parse_timestamp(slot);
                if parsed.is_none() {
                    warn!(doctor = %dto.id, slot = %slot, "dropping unparseable slot");
                }
                parsed
            })
            .collect();
        Ok(Doctor {
            id: dto.id,
            name: dto.name,
            specialty: dto.specialty,
            available_slots,
        })
    }
}

impl TryFrom<AppointmentDto> for Appointment {
    type Error = ApiError;

    fn try_from(dto: AppointmentDto) -> Result<Self, Self::Error> {
        let date_time = parse_timestamp(&dto.date_time);
        if date_time.is_none() {
            warn!(appointment = %dto.id, date_time = %dto.date_time, "unparseable appointment date");
        }
        Ok(Appointment {
            id: dto.id,
            doctor_id: dto.doctor_id,
            patient_name: dto.patient_name,
            date_time,
            status: AppointmentStatus::parse(&dto.status),
        })
    }
}

impl TryFrom<AuthResponse> for Session {
    type Error = ApiError;

    fn try_from(response: AuthResponse) -> Result<Self, Self::Error> {
        let expires_at = parse_timestamp(&response.expires_at).ok_or_else(|| {
            ApiError::Deserialization(format!("session: unparseable expiry {:?}", response.expires_at))
        })?;
        Ok(Session {
            token: response.token,
            username: response.username,
            email: response.email,
            profile_image_url: response.profile_image_url.filter(|url| !url.is_empty()),
            expires_at,
        })
    }
}

/// Normalize a decoded list, failing on the first entry that does not convert.
pub fn normalize_all<D, T>(items: Vec<D>) -> Result<Vec<T>, ApiError>
where
    T: TryFrom<D, Error = ApiError>,
{
    items.into_iter().map(T::try_from).collect()
}
