//! Roster use-case service.
//!
//! # Responsibility
//! - Provide CRUD entry points over the roster document.
//! - Compose search and aggregation over fresh store snapshots.
//!
//! # Invariants
//! - Every mutation is read-modify-write of the full document under one lock,
//!   so concurrent callers in this process never lose updates.
//! - Write failures are returned to the caller; success is only reported
//!   after the document was persisted.
//! - Mutations never write over a document that failed to read, whatever
//!   the read-failure policy.
//! - Unknown ids are reported as `None` / `false`, never as errors.

use crate::model::student::{Student, StudentFields, StudentId, StudentValidationError};
use crate::model::RosterDocument;
use crate::report::aggregation::{
    decorate, rank_list, roster_summary, subject_averages, top, RankedStudent, RosterSummary,
    SubjectAverage,
};
use crate::repo::document_store::{DocumentStore, ReadFailurePolicy, StoreError};
use crate::search::filter::search;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard, PoisonError};

pub type RosterResult<T> = Result<T, RosterError>;

/// Service error for roster use-cases.
#[derive(Debug)]
pub enum RosterError {
    /// Submitted fields failed presence checks.
    Validation(StudentValidationError),
    /// Backing store could not be read or written.
    Storage(StoreError),
}

impl Display for RosterError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RosterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Storage(err) => Some(err),
        }
    }
}

impl From<StudentValidationError> for RosterError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RosterError {
    fn from(value: StoreError) -> Self {
        Self::Storage(value)
    }
}

/// Roster store over an explicit document backend.
pub struct RosterService {
    store: Mutex<Box<dyn DocumentStore>>,
    read_failure: ReadFailurePolicy,
}

impl RosterService {
    pub fn new(store: impl DocumentStore + 'static) -> Self {
        Self {
            store: Mutex::new(Box::new(store)),
            read_failure: ReadFailurePolicy::default(),
        }
    }

    pub fn with_read_failure_policy(mut self, policy: ReadFailurePolicy) -> Self {
        self.read_failure = policy;
        self
    }

    /// All students in insertion order.
    pub fn list(&self) -> RosterResult<Vec<Student>> {
        let store = self.lock_store();
        Ok(self.load(&**store)?.students)
    }

    pub fn get(&self, id: StudentId) -> RosterResult<Option<Student>> {
        Ok(self.list()?.into_iter().find(|student| student.id == id))
    }

    /// Validates `fields`, assigns a fresh id and persists the new student.
    pub fn insert(&self, fields: StudentFields) -> RosterResult<Student> {
        let student = Student::from_fields(fields)?;

        let store = self.lock_store();
        let mut document = load_for_write(&**store)?;
        document.students.push(student.clone());
        store.write(&document)?;

        info!(
            "event=student_insert module=roster status=ok student_id={} subjects={}",
            student.id,
            student.subjects.len()
        );
        Ok(student)
    }

    /// Merges `fields` over the stored student with `id`.
    ///
    /// Returns `Ok(None)` when no such student exists.
    pub fn replace(&self, id: StudentId, fields: StudentFields) -> RosterResult<Option<Student>> {
        let store = self.lock_store();
        let mut document = load_for_write(&**store)?;
        let Some(student) = document.students.iter_mut().find(|s| s.id == id) else {
            info!("event=student_replace module=roster status=not_found student_id={id}");
            return Ok(None);
        };

        student.apply(fields)?;
        let updated = student.clone();
        store.write(&document)?;

        info!("event=student_replace module=roster status=ok student_id={id}");
        Ok(Some(updated))
    }

    /// Deletes the student with `id`. Returns whether one existed.
    pub fn remove(&self, id: StudentId) -> RosterResult<bool> {
        let store = self.lock_store();
        let mut document = load_for_write(&**store)?;
        let before = document.students.len();
        document.students.retain(|student| student.id != id);

        if document.students.len() == before {
            info!("event=student_remove module=roster status=not_found student_id={id}");
            return Ok(false);
        }

        store.write(&document)?;
        info!("event=student_remove module=roster status=ok student_id={id}");
        Ok(true)
    }

    /// Students matching `query`, each with its average grade, roster order.
    pub fn search(&self, query: Option<&str>) -> RosterResult<Vec<RankedStudent>> {
        let matches = search(self.list()?, query);
        Ok(matches.into_iter().map(decorate).collect())
    }

    pub fn find(&self, id: StudentId) -> RosterResult<Option<RankedStudent>> {
        Ok(self.get(id)?.map(decorate))
    }

    pub fn rank_list(&self) -> RosterResult<Vec<RankedStudent>> {
        Ok(rank_list(self.list()?))
    }

    pub fn top(&self, n: usize) -> RosterResult<Vec<RankedStudent>> {
        Ok(top(self.list()?, n))
    }

    pub fn subject_averages(&self) -> RosterResult<Vec<SubjectAverage>> {
        Ok(subject_averages(&self.list()?))
    }

    pub fn summary(&self) -> RosterResult<RosterSummary> {
        Ok(roster_summary(&self.list()?))
    }

    fn lock_store(&self) -> MutexGuard<'_, Box<dyn DocumentStore>> {
        // Poisoning is ignored: every operation re-reads the stored document.
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reads for queries, applying the configured read-failure policy.
    fn load(&self, store: &dyn DocumentStore) -> RosterResult<RosterDocument> {
        match store.read() {
            Ok(document) => Ok(document),
            Err(err) => match self.read_failure {
                ReadFailurePolicy::RecoverEmpty => {
                    warn!(
                        "event=roster_read module=roster status=recovered fallback=empty error={err}"
                    );
                    Ok(RosterDocument::default())
                }
                ReadFailurePolicy::Fail => {
                    warn!("event=roster_read module=roster status=error error={err}");
                    Err(err.into())
                }
            },
        }
    }
}

fn load_for_write(store: &dyn DocumentStore) -> RosterResult<RosterDocument> {
    store.read().map_err(|err| {
        warn!("event=roster_read module=roster status=error operation=write error={err}");
        err.into()
    })
}
