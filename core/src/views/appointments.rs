//! Appointment manager: paged list, booking form, and inline row updates.

use std::sync::Mutex;

use tracing::warn;

use super::collection::{apply_mutation, Mutation};
use super::edit::{EditState, UnsavedEdit};
use super::paging::Pager;
use super::{any_blank, lock, Liveness, Outcome};
use crate::api::{AppointmentInput, BookingApi};
use crate::model::{
    format_date_time, parse_timestamp, to_date_time_local, Appointment, AppointmentStatus, Doctor,
};
use crate::transport::Transport;

const LOAD_FAILED: &str = "Unable to load appointments from the API.";
const INCOMPLETE: &str = "Please complete all fields before confirming.";
const CREATE_FAILED: &str = "Unable to create appointment. Please try again.";
const UPDATE_FAILED: &str = "Unable to update appointment. Please try again.";
const UNKNOWN_DOCTOR: &str = "Unknown";
const INVALID_DATE: &str = "Invalid Date";

/// Booking form fields, also used as the row edit draft. `date_time` holds the
/// raw input text until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentForm {
    pub patient_name: String,
    pub doctor_id: String,
    pub date_time: String,
    pub status: AppointmentStatus,
}

impl AppointmentForm {
    /// Draft for an existing row. An unparsed date leaves the field empty, so
    /// the row must be given a real date before it can be saved.
    fn from_appointment(appointment: &Appointment) -> Self {
        Self {
            patient_name: appointment.patient_name.clone(),
            doctor_id: appointment.doctor_id.clone(),
            date_time: appointment
                .date_time
                .as_ref()
                .map(to_date_time_local)
                .unwrap_or_default(),
            status: appointment.status.clone(),
        }
    }

    /// Trim and parse the form into submittable values.
    fn validate(&self) -> Option<AppointmentInput> {
        if any_blank(&[
            self.doctor_id.as_str(),
            self.patient_name.as_str(),
            self.date_time.as_str(),
        ]) {
            return None;
        }
        let date_time = parse_timestamp(&self.date_time)?;
        Some(AppointmentInput {
            doctor_id: self.doctor_id.clone(),
            patient_name: self.patient_name.trim().to_string(),
            date_time,
            status: self.status.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentManagerState {
    pub loading: bool,
    pub error: Option<String>,
    pub appointments: Vec<Appointment>,
    pub doctors: Vec<Doctor>,
    pub form: AppointmentForm,
    pub saving: bool,
    pub saving_edit: bool,
    pub pager: Pager,
    pub edit: EditState<AppointmentForm>,
}

impl Default for AppointmentManagerState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            appointments: Vec::new(),
            doctors: Vec::new(),
            form: AppointmentForm::default(),
            saving: false,
            saving_edit: false,
            pager: Pager::default(),
            edit: EditState::Viewing,
        }
    }
}

impl AppointmentManagerState {
    pub fn total_pages(&self) -> usize {
        self.pager.total_pages(self.appointments.len())
    }

    pub fn current_page(&self) -> usize {
        self.pager.current_page(self.appointments.len())
    }

    pub fn page_items(&self) -> &[Appointment] {
        self.pager.window(&self.appointments)
    }

    /// Doctor names offered by the doctor pickers.
    pub fn doctor_options(&self) -> Vec<&str> {
        self.doctors.iter().map(|d| d.name.as_str()).collect()
    }

    /// Name of the referenced doctor, or `Unknown` when it is not loaded.
    pub fn doctor_name(&self, doctor_id: &str) -> &str {
        self.doctors
            .iter()
            .find(|d| d.id == doctor_id)
            .map(|d| d.name.as_str())
            .unwrap_or(UNKNOWN_DOCTOR)
    }

    pub fn date_label(appointment: &Appointment) -> String {
        appointment
            .date_time
            .as_ref()
            .map_or_else(|| INVALID_DATE.to_string(), format_date_time)
    }

    pub fn submit_label(&self) -> &'static str {
        if self.saving {
            "Saving..."
        } else {
            "Confirm booking"
        }
    }

    pub fn update_label(&self) -> &'static str {
        if self.saving_edit {
            "Saving..."
        } else {
            "Update"
        }
    }

    fn doctor_id_by_name(&self, name: &str) -> String {
        self.doctors
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.id.clone())
            .unwrap_or_default()
    }
}

pub struct AppointmentManager<T: ?Sized> {
    api: BookingApi<T>,
    state: Mutex<AppointmentManagerState>,
    alive: Liveness,
}

impl<T: Transport + ?Sized> AppointmentManager<T> {
    pub fn new(api: BookingApi<T>) -> Self {
        Self {
            api,
            state: Mutex::new(AppointmentManagerState::default()),
            alive: Liveness::default(),
        }
    }

    pub fn snapshot(&self) -> AppointmentManagerState {
        lock(&self.state).clone()
    }

    pub fn teardown(&self) {
        self.alive.end();
    }

    /// Fetch doctors and appointments concurrently. Both must succeed for
    /// either to be shown.
    pub async fn load(&self) -> Outcome {
        let result = tokio::try_join!(self.api.list_doctors(), self.api.list_appointments());
        if !self.alive.is_alive() {
            warn!("appointment manager torn down before load finished; dropping result");
            return Outcome::Skipped;
        }

        let mut state = lock(&self.state);
        state.loading = false;
        match result {
            Ok((doctors, appointments)) => {
                state.doctors = doctors;
                apply_mutation(&mut state.appointments, Mutation::Loaded(appointments));
                state.error = None;
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "failed to load appointments");
                state.doctors.clear();
                state.appointments.clear();
                state.error = Some(LOAD_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    // -- paging -------------------------------------------------------------

    pub fn next_page(&self) {
        let mut state = lock(&self.state);
        let count = state.appointments.len();
        state.pager.next(count);
    }

    pub fn previous_page(&self) {
        let mut state = lock(&self.state);
        let count = state.appointments.len();
        state.pager.previous(count);
    }

    // -- booking form -------------------------------------------------------

    pub fn set_patient_name(&self, value: &str) {
        lock(&self.state).form.patient_name = value.to_string();
    }

    /// Pick a doctor by display name. An unknown name clears the selection.
    pub fn select_doctor(&self, name: &str) {
        let mut state = lock(&self.state);
        let doctor_id = state.doctor_id_by_name(name);
        state.form.doctor_id = doctor_id;
    }

    pub fn set_date_time(&self, value: &str) {
        lock(&self.state).form.date_time = value.to_string();
    }

    pub fn set_status(&self, status: AppointmentStatus) {
        lock(&self.state).form.status = status;
    }

    pub async fn create(&self) -> Outcome {
        let input = {
            let mut state = lock(&self.state);
            if state.saving {
                return Outcome::Skipped;
            }
            let Some(input) = state.form.validate() else {
                state.error = Some(INCOMPLETE.to_string());
                return Outcome::Rejected;
            };
            state.saving = true;
            state.error = None;
            input
        };

        let result = self.api.create_appointment(&input).await;

        let mut state = lock(&self.state);
        state.saving = false;
        if !self.alive.is_alive() {
            return Outcome::Skipped;
        }
        match result {
            Ok(appointment) => {
                apply_mutation(&mut state.appointments, Mutation::Created(appointment));
                state.pager.reset();
                state.form = AppointmentForm::default();
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "failed to create appointment");
                state.error = Some(CREATE_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    // -- row edit -----------------------------------------------------------

    /// Open a row for editing. Refused while another row has unsaved changes.
    pub fn start_edit(&self, id: &str) -> Result<(), UnsavedEdit> {
        let mut state = lock(&self.state);
        let Some(draft) = draft_for(&state.appointments, id) else {
            return Ok(());
        };
        state.edit.begin(id, draft)
    }

    /// Open a row for editing, dropping any unsaved draft on another row.
    pub fn discard_and_edit(&self, id: &str) {
        let mut state = lock(&self.state);
        if let Some(draft) = draft_for(&state.appointments, id) {
            state.edit.discard_and_begin(id, draft);
        }
    }

    pub fn set_edit_patient_name(&self, value: &str) {
        if let Some(draft) = lock(&self.state).edit.draft_mut() {
            draft.patient_name = value.to_string();
        }
    }

    pub fn select_edit_doctor(&self, name: &str) {
        let mut state = lock(&self.state);
        let doctor_id = state.doctor_id_by_name(name);
        if let Some(draft) = state.edit.draft_mut() {
            draft.doctor_id = doctor_id;
        }
    }

    pub fn set_edit_date_time(&self, value: &str) {
        if let Some(draft) = lock(&self.state).edit.draft_mut() {
            draft.date_time = value.to_string();
        }
    }

    pub fn set_edit_status(&self, status: AppointmentStatus) {
        if let Some(draft) = lock(&self.state).edit.draft_mut() {
            draft.status = status;
        }
    }

    pub fn cancel_edit(&self) {
        lock(&self.state).edit.cancel();
    }

    /// Submit the open draft. On success the row takes the submitted values;
    /// the response body, if any, is not consulted.
    pub async fn update(&self) -> Outcome {
        let (id, input) = {
            let mut state = lock(&self.state);
            if state.saving_edit {
                return Outcome::Skipped;
            }
            let Some(id) = state.edit.editing_id().map(str::to_string) else {
                return Outcome::Skipped;
            };
            let Some(input) = state.edit.draft().and_then(AppointmentForm::validate) else {
                state.error = Some(INCOMPLETE.to_string());
                return Outcome::Rejected;
            };
            state.saving_edit = true;
            state.error = None;
            (id, input)
        };

        let result = self.api.update_appointment(&id, &input).await;

        let mut state = lock(&self.state);
        state.saving_edit = false;
        if !self.alive.is_alive() {
            return Outcome::Skipped;
        }
        match result {
            Ok(()) => {
                let updated = Appointment {
                    id,
                    doctor_id: input.doctor_id,
                    patient_name: input.patient_name,
                    date_time: Some(input.date_time),
                    status: input.status,
                };
                apply_mutation(&mut state.appointments, Mutation::Updated(updated));
                state.edit.cancel();
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, appointment = %id, "failed to update appointment");
                state.error = Some(UPDATE_FAILED.to_string());
                Outcome::Failed
            }
        }
    }
}

fn draft_for(appointments: &[Appointment], id: &str) -> Option<AppointmentForm> {
    appointments
        .iter()
        .find(|a| a.id == id)
        .map(AppointmentForm::from_appointment)
}
