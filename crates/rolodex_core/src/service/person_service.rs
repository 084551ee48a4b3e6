//! Person use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for contact-book use cases.
//! - Run the fetch -> policy -> persist cycle around the pure engine.
//!
//! # Invariants
//! - Read-for-display tolerates a missing id (`Ok(None)`); read-for-mutation
//!   fails with `PersonNotFound` before any policy code runs.
//! - The service never bypasses repository validation or the policy engine.
//! - Policy violations surface as-is; they are deterministic client errors,
//!   never retried.

use crate::model::person::{BlockId, Person, PersonId};
use crate::policy::{self, PersonUpdate, PolicyError};
use crate::repo::person_repo::{PersonListQuery, PersonRepository, RepoError};
use chrono::{Datelike, NaiveDate};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Service error taxonomy surfaced to the transport boundary.
#[derive(Debug)]
pub enum PersonServiceError {
    /// Mutation target does not exist (or is soft-deleted).
    PersonNotFound(PersonId),
    /// A full update tried to change the stored name.
    RenameNotPermitted { stored: String, requested: String },
    /// Client input failed validation before or at persistence.
    ValidationFailed(String),
    /// Unexpected persistence-layer failure.
    Repo(RepoError),
}

impl Display for PersonServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PersonNotFound(id) => write!(f, "person not found: {id}"),
            Self::RenameNotPermitted { stored, requested } => write!(
                f,
                "renaming `{stored}` to `{requested}` is not permitted through a full update"
            ),
            Self::ValidationFailed(message) => write!(f, "validation failed: {message}"),
            // Storage detail stays out of client-facing text; source() keeps
            // the chain for logs.
            Self::Repo(_) => write!(f, "internal storage error"),
        }
    }
}

impl Error for PersonServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for PersonServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::PersonNotFound(id),
            RepoError::Validation(err) => Self::ValidationFailed(err.to_string()),
            other => Self::Repo(other),
        }
    }
}

impl From<PolicyError> for PersonServiceError {
    fn from(value: PolicyError) -> Self {
        match value {
            PolicyError::RenameNotPermitted { stored, requested } => {
                Self::RenameNotPermitted { stored, requested }
            }
        }
    }
}

/// Use-case facade over a person repository.
pub struct PersonService<R: PersonRepository> {
    repo: R,
}

impl<R: PersonRepository> PersonService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new person from an incoming change set.
    ///
    /// # Contract
    /// - A blank name fails `ValidationFailed` before the engine runs.
    /// - Optional fields follow the same non-blank merge rules as a full
    ///   update, applied to a fresh record.
    pub fn create_person(&self, input: &PersonUpdate) -> Result<Person, PersonServiceError> {
        if input.name.trim().is_empty() {
            return Err(PersonServiceError::ValidationFailed(
                "person name is required".to_string(),
            ));
        }

        let person = policy::apply_full(&Person::new(input.name.clone()), input)?;
        self.repo.create_person(&person)?;
        Ok(person)
    }

    /// Fetches one person for display.
    ///
    /// A missing id yields `Ok(None)`, never an error.
    pub fn get_person(&self, id: PersonId) -> Result<Option<Person>, PersonServiceError> {
        Ok(self.repo.get_person(id, false)?)
    }

    /// Lists visible people with pagination options.
    pub fn list_people(&self, query: &PersonListQuery) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.repo.list_people(query)?)
    }

    pub fn people_by_name(&self, name: &str) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.repo.find_by_name(name)?)
    }

    pub fn people_by_blood_type(
        &self,
        blood_type: &str,
    ) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.repo.find_by_blood_type(blood_type)?)
    }

    pub fn people_by_birth_month(&self, month: u32) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.repo.find_by_birth_month(month)?)
    }

    /// People whose birthday falls on the given day or the day after.
    ///
    /// # Contract
    /// - Two-day inclusive window [today, tomorrow].
    /// - Tomorrow is computed calendar-correct across month and year
    ///   boundaries (Dec 31 rolls to Jan 1).
    /// - Result keeps natural record order, not date proximity.
    pub fn birthday_friends(&self, today: NaiveDate) -> Result<Vec<Person>, PersonServiceError> {
        let mut window = vec![(today.month(), today.day())];
        if let Some(tomorrow) = today.succ_opt() {
            window.push((tomorrow.month(), tomorrow.day()));
        }
        Ok(self.repo.find_birthday_on(&window)?)
    }

    /// The explicit administrative query over soft-deleted records.
    pub fn deleted_people(&self) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.repo.find_deleted()?)
    }

    /// Visible people without a block marker.
    pub fn people_without_block(&self) -> Result<Vec<Person>, PersonServiceError> {
        Ok(self.repo.find_without_block()?)
    }

    /// Applies a full-record update.
    ///
    /// # Errors
    /// - `PersonNotFound` when the id is missing, before the engine runs.
    /// - `RenameNotPermitted` when the incoming name differs.
    pub fn modify_person(
        &self,
        id: PersonId,
        update: &PersonUpdate,
    ) -> Result<Person, PersonServiceError> {
        let existing = self.fetch_for_mutation(id)?;
        let merged = policy::apply_full(&existing, update)?;
        self.repo.update_person(&merged)?;
        Ok(merged)
    }

    /// Renames a person through the explicit patch path.
    ///
    /// The rename restriction of `modify_person` deliberately does not apply
    /// here; persistence-side validation still rejects an empty name.
    pub fn rename_person(
        &self,
        id: PersonId,
        new_name: &str,
    ) -> Result<Person, PersonServiceError> {
        let existing = self.fetch_for_mutation(id)?;
        let merged = policy::apply_patch(&existing, new_name);
        self.repo.update_person(&merged)?;
        Ok(merged)
    }

    /// Soft-deletes a person.
    ///
    /// The record stays in the store, disappears from default-scope queries
    /// and remains reachable via `deleted_people`. An attached block marker
    /// is left in place.
    pub fn delete_person(&self, id: PersonId) -> Result<Person, PersonServiceError> {
        let existing = self.fetch_for_mutation(id)?;
        let merged = policy::mark_deleted(&existing);
        self.repo.update_person(&merged)?;
        Ok(merged)
    }

    /// Attaches a block marker; idempotent for an already-blocked person.
    pub fn block_person(&self, id: PersonId) -> Result<BlockId, PersonServiceError> {
        self.fetch_for_mutation(id)?;
        Ok(self.repo.set_block(id)?)
    }

    /// Removes a block marker if present.
    pub fn unblock_person(&self, id: PersonId) -> Result<(), PersonServiceError> {
        self.fetch_for_mutation(id)?;
        Ok(self.repo.clear_block(id)?)
    }

    // The mutation-path lookup: absence is an error here, unlike get_person.
    fn fetch_for_mutation(&self, id: PersonId) -> Result<Person, PersonServiceError> {
        self.repo
            .get_person(id, false)?
            .ok_or(PersonServiceError::PersonNotFound(id))
    }
}
