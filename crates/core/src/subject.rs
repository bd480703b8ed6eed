//! The person the record form is filled out about ("assistido").
//!
//! Subjects are owned by an external CRUD surface; the engine receives them
//! by reference and never mutates them.

use chrono::NaiveDate;
use ficha_types::{Cpf, NonEmptyText};
use serde::{Deserialize, Serialize};

/// Backend identifier of a subject record.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SubjectId(pub i64);

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Demographic data for one subject.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectRecord {
    /// Absent while the record has never been persisted.
    pub id: Option<SubjectId>,
    pub name: NonEmptyText,
    pub cpf: Cpf,
    pub birth_date: NaiveDate,
    pub active: bool,
}

/// How the editing session came to know its subject.
///
/// A persisted subject is identified by route-level id and gets its record
/// and any prior answers fetched from the backend. A draft subject was
/// carried in by navigation; no prior-answer fetch is ever attempted for it,
/// even when the carried record happens to hold an id.
#[derive(Clone, Debug)]
pub enum SubjectRef {
    Persisted(SubjectId),
    Draft(SubjectRecord),
}

impl SubjectRef {
    /// The identifier used for answer submission, if any exists yet.
    pub fn id(&self) -> Option<SubjectId> {
        match self {
            SubjectRef::Persisted(id) => Some(*id),
            SubjectRef::Draft(record) => record.id,
        }
    }

    /// Whether prior answers should be looked up for this subject.
    pub fn is_persisted(&self) -> bool {
        matches!(self, SubjectRef::Persisted(_))
    }
}
