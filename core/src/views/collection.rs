//! Local collection updates after a successful request.
//!
//! Every page funnels its writes through [`apply_mutation`]. After a create or
//! update succeeds the local list is patched in place and trusted; nothing is
//! refetched.

use crate::model::{Appointment, Doctor};

pub trait Identified {
    fn id(&self) -> &str;
}

impl Identified for Doctor {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Identified for Appointment {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation<T> {
    /// Initial load: replace everything.
    Loaded(Vec<T>),
    /// Server-confirmed create: prepend.
    Created(T),
    /// Confirmed update: replace the row with the same id.
    Updated(T),
}

pub fn apply_mutation<T: Identified>(items: &mut Vec<T>, mutation: Mutation<T>) {
    match mutation {
        Mutation::Loaded(all) => *items = all,
        Mutation::Created(item) => {
            // ids stay unique even if the server echoes an id we already hold
            items.retain(|existing| existing.id() != item.id());
            items.insert(0, item);
        }
        Mutation::Updated(item) => {
            if let Some(row) = items.iter_mut().find(|row| row.id() == item.id()) {
                *row = item;
            }
        }
    }
}
