//! Doctor directory: list, filter, create, and inline name/specialty edits.
//!
//! Name/specialty edits are applied locally only; the backend exposes no
//! doctor update endpoint.

use std::sync::Mutex;

use tracing::warn;

use super::collection::{apply_mutation, Mutation};
use super::edit::{EditState, UnsavedEdit};
use super::{any_blank, lock, Liveness, Outcome};
use crate::api::BookingApi;
use crate::model::{format_date_time, parse_timestamp, Doctor, Timestamp};
use crate::transport::Transport;

const LOAD_FAILED: &str = "Unable to load doctors from the API.";
const MISSING_FIELDS: &str = "Please provide name and specialty.";
const INVALID_SLOT: &str = "Please pick a valid slot date/time.";
const CREATE_FAILED: &str = "Unable to create doctor. Please try again.";

/// Editable fields of a doctor row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorDraft {
    pub name: String,
    pub specialty: String,
}

/// The "add doctor" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoctorForm {
    pub name: String,
    pub specialty: String,
    pub slot_input: String,
    /// Slots staged for submission, unique by timestamp.
    pub slots: Vec<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorDirectoryState {
    pub loading: bool,
    pub error: Option<String>,
    pub doctors: Vec<Doctor>,
    pub search: String,
    /// Exact specialty to show; empty shows all.
    pub specialty: String,
    pub form: DoctorForm,
    pub form_error: Option<String>,
    pub saving: bool,
    pub edit: EditState<DoctorDraft>,
}

impl Default for DoctorDirectoryState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            doctors: Vec::new(),
            search: String::new(),
            specialty: String::new(),
            form: DoctorForm::default(),
            form_error: None,
            saving: false,
            edit: EditState::Viewing,
        }
    }
}

impl DoctorDirectoryState {
    /// Doctors matching the name search (case-insensitive substring) and the
    /// specialty filter.
    pub fn filtered(&self) -> Vec<&Doctor> {
        let needle = self.search.to_lowercase();
        self.doctors
            .iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .filter(|d| self.specialty.is_empty() || d.specialty == self.specialty)
            .collect()
    }

    /// Distinct specialties in first-seen order.
    pub fn specialties(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for doctor in &self.doctors {
            if !seen.contains(&doctor.specialty.as_str()) {
                seen.push(&doctor.specialty);
            }
        }
        seen
    }

    pub fn slot_labels(doctor: &Doctor) -> Vec<String> {
        doctor.available_slots.iter().map(format_date_time).collect()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.saving {
            "Saving..."
        } else {
            "Add doctor"
        }
    }
}

pub struct DoctorDirectory<T: ?Sized> {
    api: BookingApi<T>,
    state: Mutex<DoctorDirectoryState>,
    alive: Liveness,
}

impl<T: Transport + ?Sized> DoctorDirectory<T> {
    /// Mount the page. It starts in the loading state until [`Self::load`]
    /// finishes.
    pub fn new(api: BookingApi<T>) -> Self {
        Self {
            api,
            state: Mutex::new(DoctorDirectoryState::default()),
            alive: Liveness::default(),
        }
    }

    pub fn snapshot(&self) -> DoctorDirectoryState {
        lock(&self.state).clone()
    }

    /// Unmount the page. Responses arriving afterwards are dropped.
    pub fn teardown(&self) {
        self.alive.end();
    }

    pub async fn load(&self) -> Outcome {
        let result = self.api.list_doctors().await;
        if !self.alive.is_alive() {
            warn!("doctor directory torn down before load finished; dropping result");
            return Outcome::Skipped;
        }

        let mut state = lock(&self.state);
        state.loading = false;
        match result {
            Ok(doctors) => {
                apply_mutation(&mut state.doctors, Mutation::Loaded(doctors));
                state.error = None;
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "failed to load doctors");
                state.doctors.clear();
                state.error = Some(LOAD_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    // -- filters ------------------------------------------------------------

    pub fn set_search(&self, value: &str) {
        lock(&self.state).search = value.to_string();
    }

    pub fn set_specialty(&self, value: &str) {
        lock(&self.state).specialty = value.to_string();
    }

    pub fn reset_filters(&self) {
        let mut state = lock(&self.state);
        state.search.clear();
        state.specialty.clear();
    }

    // -- create form --------------------------------------------------------

    pub fn set_new_name(&self, value: &str) {
        lock(&self.state).form.name = value.to_string();
    }

    pub fn set_new_specialty(&self, value: &str) {
        lock(&self.state).form.specialty = value.to_string();
    }

    pub fn set_slot_input(&self, value: &str) {
        lock(&self.state).form.slot_input = value.to_string();
    }

    /// Stage the slot input. Invalid input sets the form error and is kept in
    /// the input; a slot already staged is not added twice.
    pub fn add_slot(&self) -> bool {
        let mut state = lock(&self.state);
        let Some(slot) = parse_timestamp(&state.form.slot_input) else {
            state.form_error = Some(INVALID_SLOT.to_string());
            return false;
        };
        state.form_error = None;
        if !state.form.slots.contains(&slot) {
            state.form.slots.push(slot);
        }
        state.form.slot_input.clear();
        true
    }

    pub fn remove_slot(&self, slot: &Timestamp) {
        lock(&self.state).form.slots.retain(|s| s != slot);
    }

    pub fn clear_form(&self) {
        let mut state = lock(&self.state);
        state.form = DoctorForm::default();
        state.form_error = None;
    }

    pub async fn create(&self) -> Outcome {
        let (name, specialty, slots) = {
            let mut state = lock(&self.state);
            if state.saving {
                return Outcome::Skipped;
            }
            if any_blank(&[state.form.name.as_str(), state.form.specialty.as_str()]) {
                state.form_error = Some(MISSING_FIELDS.to_string());
                return Outcome::Rejected;
            }
            state.saving = true;
            state.form_error = None;
            (
                state.form.name.trim().to_string(),
                state.form.specialty.trim().to_string(),
                state.form.slots.clone(),
            )
        };

        let result = self.api.create_doctor(&name, &specialty, &slots).await;

        let mut state = lock(&self.state);
        state.saving = false;
        if !self.alive.is_alive() {
            return Outcome::Skipped;
        }
        match result {
            Ok(doctor) => {
                apply_mutation(&mut state.doctors, Mutation::Created(doctor));
                state.form = DoctorForm::default();
                Outcome::Applied
            }
            Err(e) => {
                warn!(error = %e, "failed to create doctor");
                state.form_error = Some(CREATE_FAILED.to_string());
                Outcome::Failed
            }
        }
    }

    // -- row edit -----------------------------------------------------------

    /// Open a row for editing. Refused while another row has unsaved changes.
    pub fn start_edit(&self, id: &str) -> Result<(), UnsavedEdit> {
        let mut state = lock(&self.state);
        let Some(draft) = draft_for(&state.doctors, id) else {
            return Ok(());
        };
        state.edit.begin(id, draft)
    }

    /// Open a row for editing, dropping any unsaved draft on another row.
    pub fn discard_and_edit(&self, id: &str) {
        let mut state = lock(&self.state);
        if let Some(draft) = draft_for(&state.doctors, id) {
            state.edit.discard_and_begin(id, draft);
        }
    }

    pub fn set_edit_name(&self, value: &str) {
        if let Some(draft) = lock(&self.state).edit.draft_mut() {
            draft.name = value.to_string();
        }
    }

    pub fn set_edit_specialty(&self, value: &str) {
        if let Some(draft) = lock(&self.state).edit.draft_mut() {
            draft.specialty = value.to_string();
        }
    }

    pub fn cancel_edit(&self) {
        lock(&self.state).edit.cancel();
    }

    /// Write the open draft into its row.
    pub fn apply_edit(&self) -> Outcome {
        let mut state = lock(&self.state);
        let (Some(id), Some(draft)) = (
            state.edit.editing_id().map(str::to_string),
            state.edit.draft().cloned(),
        ) else {
            return Outcome::Skipped;
        };
        if any_blank(&[draft.name.as_str(), draft.specialty.as_str()]) {
            state.form_error = Some(MISSING_FIELDS.to_string());
            return Outcome::Rejected;
        }
        let Some(current) = state.doctors.iter().find(|d| d.id == id).cloned() else {
            state.edit.cancel();
            return Outcome::Skipped;
        };
        let updated = Doctor {
            name: draft.name.trim().to_string(),
            specialty: draft.specialty.trim().to_string(),
            ..current
        };
        apply_mutation(&mut state.doctors, Mutation::Updated(updated));
        state.edit.cancel();
        Outcome::Applied
    }
}

fn draft_for(doctors: &[Doctor], id: &str) -> Option<DoctorDraft> {
    doctors.iter().find(|d| d.id == id).map(|d| DoctorDraft {
        name: d.name.clone(),
        specialty: d.specialty.clone(),
    })
}
