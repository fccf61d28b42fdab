//! Home page headline stats.

use std::sync::Mutex;

use chrono::Utc;
use tracing::warn;

use super::{lock, Liveness, Outcome};
use crate::api::BookingApi;
use crate::model::{Appointment, Doctor, Timestamp};
use crate::transport::Transport;

const PLACEHOLDER: &str = "--";

/// The three headline numbers. All are `None` until a load succeeds, and all
/// go back to `None` if either fetch fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overview {
    pub doctor_count: Option<usize>,
    pub appointment_count: Option<usize>,
    /// Mean minutes until the upcoming appointments, rounded. Rows without a
    /// parsed date are counted above but left out here. `None` when nothing is
    /// upcoming.
    pub avg_wait_minutes: Option<i64>,
}

impl Overview {
    pub fn compute(doctors: &[Doctor], appointments: &[Appointment], now: Timestamp) -> Self {
        let waits: Vec<f64> = appointments
            .iter()
            .filter_map(|a| a.date_time)
            .filter(|at| *at >= now)
            .map(|at| (at - now).num_milliseconds() as f64 / 60_000.0)
            .collect();
        let avg_wait_minutes = if waits.is_empty() {
            None
        } else {
            Some((waits.iter().sum::<f64>() / waits.len() as f64).round() as i64)
        };
        Self {
            doctor_count: Some(doctors.len()),
            appointment_count: Some(appointments.len()),
            avg_wait_minutes,
        }
    }

    pub fn doctor_count_label(&self) -> String {
        format_count(self.doctor_count)
    }

    pub fn appointment_count_label(&self) -> String {
        format_count(self.appointment_count)
    }

    pub fn avg_wait_label(&self) -> String {
        match self.avg_wait_minutes {
            Some(minutes) => format!("{minutes} min"),
            None => PLACEHOLDER.to_string(),
        }
    }
}

fn format_count(value: Option<usize>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string())
}

pub struct HomeStats<T: ?Sized> {
    api: BookingApi<T>,
    overview: Mutex<Overview>,
    alive: Liveness,
}

impl<T: Transport + ?Sized> HomeStats<T> {
    pub fn new(api: BookingApi<T>) -> Self {
        Self {
            api,
            overview: Mutex::new(Overview::default()),
            alive: Liveness::default(),
        }
    }

    pub fn overview(&self) -> Overview {
        *lock(&self.overview)
    }

    pub fn teardown(&self) {
        self.alive.end();
    }

    pub async fn load(&self) -> Outcome {
        self.load_at(Utc::now()).await
    }

    /// Fetch both lists concurrently and compute the overview against `now`.
    pub async fn load_at(&self, now: Timestamp) -> Outcome {
        let result = tokio::try_join!(self.api.list_doctors(), self.api.list_appointments());
        if !self.alive.is_alive() {
            return Outcome::Skipped;
        }

        let mut overview = lock(&self.overview);
        match result {
            Ok((doctors, appointments)) => {
                *overview = Overview::compute(&doctors, &appointments, now);
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "failed to load home stats");
                *overview = Overview::default();
                Outcome::Failed
            }
        }
    }
}
