//! # Ficha Core
//!
//! The record-form ("ficha de prontuário") questionnaire engine.
//!
//! The shape of the form is data-driven: categories and questions are
//! fetched from the backend, assembled into an ordered active-only schema,
//! and stepped through one category page at a time. This crate holds the
//! engine only:
//! - schema loading and ordering invariants
//! - the in-session answer store and prior-answer seeding
//! - the step state machine with per-category incremental persistence
//! - kind-specific payload conversion
//! - the required-question validation gate
//!
//! **No transport concerns**: HTTP, wire formats, and credentials belong in
//! `api-client`; this crate only sees the [`RecordBackend`] trait.

pub mod answers;
pub mod backend;
pub mod config;
pub mod error;
pub mod persist;
pub mod schema;
pub mod session;
pub mod steps;
pub mod subject;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

pub use answers::AnswerStore;
pub use backend::RecordBackend;
pub use config::{ClientConfig, SessionToken};
pub use error::{BackendError, EngineError, EngineResult};
pub use persist::{AnswerValue, FailurePolicy, FlushOutcome, NewAnswer, StoredAnswer};
pub use schema::{
    load_schema, AnswerKind, Category, CategoryId, CategorySection, Question, QuestionId,
    RecordSchema,
};
pub use session::open_session;
pub use steps::StepController;
pub use subject::{SubjectId, SubjectRecord, SubjectRef};
pub use validate::unmet_required;
