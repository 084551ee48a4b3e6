//! Person domain model.
//!
//! # Responsibility
//! - Define the canonical contact record persisted by the repository.
//! - Provide lifecycle helpers for soft-delete semantics.
//! - Enforce record validity at write boundaries via `validate()`.
//!
//! # Invariants
//! - `uuid` is stable and never reused for another person.
//! - `name` is never empty once persisted.
//! - `deleted` is the source of truth for tombstone state.
//! - At most one block marker references a person.

use crate::model::birthday::Birthday;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for every person record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type PersonId = Uuid;

/// Stable identifier for a block marker row.
///
/// The marker carries no payload of its own; its presence on a person is
/// the signal. Its row lifetime is tied to the person at the store level.
pub type BlockId = Uuid;

/// Validation failures for person records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonValidationError {
    /// The nil uuid is reserved and never a valid record id.
    NilUuid,
    /// `name` is empty or whitespace-only.
    EmptyName,
    /// The birthday triple does not form a real calendar date.
    InvalidBirthday { year: i32, month: u32, day: u32 },
}

impl Display for PersonValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilUuid => write!(f, "person id must not be the nil uuid"),
            Self::EmptyName => write!(f, "person name must not be empty"),
            Self::InvalidBirthday { year, month, day } => {
                write!(f, "invalid birthday {year:04}-{month:02}-{day:02}")
            }
        }
    }
}

impl Error for PersonValidationError {}

/// Canonical contact record.
///
/// Optional fields stay `None` until a non-blank value is supplied; a blank
/// incoming value never clears a stored one (see `policy::apply_full`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Stable global ID used for lookups and block linkage.
    pub uuid: PersonId,
    /// Display name. Immutable through full updates; see `policy::apply_patch`
    /// for the one legitimate rename path.
    pub name: String,
    pub hobby: Option<String>,
    pub address: Option<String>,
    pub job: Option<String>,
    pub phone_number: Option<String>,
    /// Optional free text. A required field in an earlier schema revision.
    pub blood_type: Option<String>,
    pub birthday: Option<Birthday>,
    /// Soft delete tombstone; flagged rows stay in the store.
    pub deleted: bool,
    /// Block marker id when this person is blocked.
    pub block: Option<BlockId>,
}

impl Person {
    /// Creates a new person with a generated stable ID.
    ///
    /// # Invariants
    /// - Optional fields are initialized to `None`.
    /// - `deleted` starts as `false`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            hobby: None,
            address: None,
            job: None,
            phone_number: None,
            blood_type: None,
            birthday: None,
            deleted: false,
            block: None,
        }
    }

    /// Creates a person with a caller-provided stable ID.
    ///
    /// Used by import paths and tests where identity already exists.
    ///
    /// # Errors
    /// - `NilUuid` when the provided id is the nil uuid.
    pub fn with_id(
        uuid: PersonId,
        name: impl Into<String>,
    ) -> Result<Self, PersonValidationError> {
        if uuid.is_nil() {
            return Err(PersonValidationError::NilUuid);
        }
        let mut person = Self::new(name);
        person.uuid = uuid;
        Ok(person)
    }

    /// Checks record validity ahead of persistence.
    ///
    /// # Errors
    /// - `NilUuid` for the reserved nil id.
    /// - `EmptyName` when `name` is empty or whitespace-only.
    /// - `InvalidBirthday` when a stored triple is not a calendar date.
    pub fn validate(&self) -> Result<(), PersonValidationError> {
        if self.uuid.is_nil() {
            return Err(PersonValidationError::NilUuid);
        }
        if self.name.trim().is_empty() {
            return Err(PersonValidationError::EmptyName);
        }
        if let Some(birthday) = &self.birthday {
            birthday.validate()?;
        }
        Ok(())
    }

    /// Marks this person as softly deleted (tombstoned).
    pub fn soft_delete(&mut self) {
        self.deleted = true;
    }

    /// Clears the soft delete flag.
    pub fn restore(&mut self) {
        self.deleted = false;
    }

    /// Whether this person should be visible in default-scope queries.
    pub fn is_active(&self) -> bool {
        !self.deleted
    }

    /// Whether a block marker is attached.
    pub fn is_blocked(&self) -> bool {
        self.block.is_some()
    }

    /// Age in the given calendar year, or `None` when no birthday is stored.
    ///
    /// Callers needing birthday checks go through `birthday` directly; the
    /// `Option` is the guard against records without one.
    pub fn age_in_year(&self, current_year: i32) -> Option<i32> {
        self.birthday
            .as_ref()
            .map(|birthday| birthday.age_in_year(current_year))
    }
}
