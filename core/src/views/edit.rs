//! Single-row edit mode.
//!
//! At most one row per collection is editable. Moving to another row while the
//! current draft differs from the row it was opened on is refused with
//! [`UnsavedEdit`]; the caller decides whether to call
//! [`EditState::discard_and_begin`].

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState<D> {
    Viewing,
    Editing { id: String, original: D, draft: D },
}

impl<D> Default for EditState<D> {
    fn default() -> Self {
        EditState::Viewing
    }
}

/// Returned when a row switch would drop unsaved changes on row `id`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {id} has unsaved changes")]
pub struct UnsavedEdit {
    pub id: String,
}

impl<D: Clone + PartialEq> EditState<D> {
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            EditState::Viewing => None,
            EditState::Editing { id, .. } => Some(id),
        }
    }

    pub fn is_editing(&self, row_id: &str) -> bool {
        self.editing_id() == Some(row_id)
    }

    pub fn draft(&self) -> Option<&D> {
        match self {
            EditState::Viewing => None,
            EditState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut D> {
        match self {
            EditState::Viewing => None,
            EditState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn is_dirty(&self) -> bool {
        match self {
            EditState::Viewing => false,
            EditState::Editing { original, draft, .. } => original != draft,
        }
    }

    /// Open `row_id` for editing with `fields` as the starting draft. Re-opening
    /// the row already being edited keeps its draft.
    pub fn begin(&mut self, row_id: &str, fields: D) -> Result<(), UnsavedEdit> {
        match self.editing_id() {
            Some(current) if current == row_id => return Ok(()),
            Some(current) if self.is_dirty() => {
                return Err(UnsavedEdit {
                    id: current.to_string(),
                })
            }
            _ => {}
        }
        *self = EditState::Editing {
            id: row_id.to_string(),
            original: fields.clone(),
            draft: fields,
        };
        Ok(())
    }

    /// Open `row_id`, dropping whatever draft was open. Returns the id of the
    /// row whose draft was dropped, if any.
    pub fn discard_and_begin(&mut self, row_id: &str, fields: D) -> Option<String> {
        let dropped = self.editing_id().map(str::to_string);
        *self = EditState::Editing {
            id: row_id.to_string(),
            original: fields.clone(),
            draft: fields,
        };
        dropped.filter(|id| id != row_id)
    }

    pub fn cancel(&mut self) {
        *self = EditState::Viewing;
    }
}
