//! The seam between the engine and whatever persists records.
//!
//! The REST adapter in `api-client` is the production implementation; tests
//! use an in-memory fake. All calls are sequential from the engine's point
//! of view except the schema loader's one-shot question fan-out.

use crate::error::BackendError;
use crate::persist::{NewAnswer, StoredAnswer};
use crate::schema::{Category, CategoryId, Question};
use crate::subject::{SubjectId, SubjectRecord};
use async_trait::async_trait;

/// Read/write access to the record backend.
///
/// `fetch_categories` and `fetch_questions` return the full admin-managed
/// lists including inactive entries; filtering is the loader's job.
#[async_trait]
pub trait RecordBackend: Send + Sync {
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError>;

    async fn fetch_questions(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Question>, BackendError>;

    async fn fetch_subject(&self, subject: SubjectId) -> Result<SubjectRecord, BackendError>;

    /// Previously stored answers for one subject.
    async fn fetch_answers(
        &self,
        subject: SubjectId,
    ) -> Result<Vec<StoredAnswer>, BackendError>;

    /// Submits exactly one answer.
    async fn submit_answer(&self, answer: &NewAnswer) -> Result<(), BackendError>;
}
