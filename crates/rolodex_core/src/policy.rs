//! Record-update and soft-delete policy engine.
//!
//! # Responsibility
//! - Decide whether an incoming change set may be applied to a loaded record.
//! - Produce the merged record for the caller to persist.
//!
//! # Invariants
//! - Every function here is pure: one record in, one record out, no I/O and
//!   no shared state. Lookup and persistence happen in the service layer.
//! - `apply_full` never changes `name`; `apply_patch` changes nothing else.
//! - A blank or absent incoming field never clears a stored value.
//! - `mark_deleted` flips the tombstone flag only and does not touch the
//!   block marker.

use crate::model::birthday::Birthday;
use crate::model::person::Person;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Incoming change set for creating or fully updating a person.
///
/// Optional fields left `None` (or blank) keep the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonUpdate {
    pub name: String,
    pub hobby: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
    pub phone_number: Option<String>,
    pub blood_type: Option<String>,
    pub birthday: Option<Birthday>,
}

impl PersonUpdate {
    /// Change set carrying only a name, everything else left unset.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Rule violations detected by the policy engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// A full update tried to change the stored name.
    RenameNotPermitted { stored: String, requested: String },
}

impl Display for PolicyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RenameNotPermitted { stored, requested } => write!(
                f,
                "renaming `{stored}` to `{requested}` is not permitted through a full update"
            ),
        }
    }
}

impl Error for PolicyError {}

/// Applies a full-record update to a loaded person.
///
/// # Contract
/// - Fails with `RenameNotPermitted` when `update.name` differs from the
///   stored name (exact comparison); the input record is untouched.
/// - On success, each non-blank incoming field overwrites the stored one;
///   blank or absent fields keep their current value.
/// - The caller must already have resolved `existing` through the store;
///   missing-id handling never reaches this engine.
pub fn apply_full(existing: &Person, update: &PersonUpdate) -> Result<Person, PolicyError> {
    if update.name != existing.name {
        return Err(PolicyError::RenameNotPermitted {
            stored: existing.name.clone(),
            requested: update.name.clone(),
        });
    }

    let mut merged = existing.clone();
    merge_field(&mut merged.hobby, update.hobby.as_deref());
    merge_field(&mut merged.address, update.address.as_deref());
    merge_field(&mut merged.job, update.job.as_deref());
    merge_field(&mut merged.phone_number, update.phone_number.as_deref());
    merge_field(&mut merged.blood_type, update.blood_type.as_deref());
    if let Some(birthday) = update.birthday {
        merged.birthday = Some(birthday);
    }
    Ok(merged)
}

/// Applies a name-only patch to a loaded person.
///
/// # Contract
/// - Unconditionally replaces `name` and nothing else. This is the one
///   path that legitimately renames a record; `apply_full` forbids renames
///   precisely so that a general update cannot smuggle one in.
pub fn apply_patch(existing: &Person, new_name: impl Into<String>) -> Person {
    let mut merged = existing.clone();
    merged.name = new_name.into();
    merged
}

/// Marks a loaded person as deleted.
///
/// # Contract
/// - Sets `deleted = true`, leaving every other field, including an attached
///   block marker, unchanged. There is no hard-delete counterpart.
pub fn mark_deleted(existing: &Person) -> Person {
    let mut merged = existing.clone();
    merged.soft_delete();
    merged
}

fn merge_field(stored: &mut Option<String>, incoming: Option<&str>) {
    if let Some(value) = incoming.filter(|value| !value.trim().is_empty()) {
        *stored = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_full, merge_field, PersonUpdate};
    use crate::model::person::Person;

    #[test]
    fn merge_field_treats_blank_as_absent() {
        let mut stored = Some("reading".to_string());
        merge_field(&mut stored, Some("   "));
        assert_eq!(stored.as_deref(), Some("reading"));

        merge_field(&mut stored, Some("climbing"));
        assert_eq!(stored.as_deref(), Some("climbing"));

        merge_field(&mut stored, None);
        assert_eq!(stored.as_deref(), Some("climbing"));
    }

    #[test]
    fn apply_full_requires_exact_name_match() {
        let existing = Person::new("martin");
        let padded = PersonUpdate::named("martin ");
        assert!(apply_full(&existing, &padded).is_err());
    }
}
