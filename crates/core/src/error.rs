use crate::schema::{CategoryId, QuestionId};

/// Failures surfaced by a `RecordBackend` implementation.
///
/// The engine never sees transport-specific types; adapters translate their
/// own errors into this taxonomy at the trait boundary.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("not authenticated")]
    Unauthorized,
    #[error("backend returned {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("invalid payload from backend: {0}")]
    InvalidWire(String),
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load categories: {0}")]
    CategoryLoad(#[source] BackendError),
    #[error("failed to load questions for category {category}: {source}")]
    QuestionLoad {
        category: CategoryId,
        #[source]
        source: BackendError,
    },
    #[error("failed to load subject record: {0}")]
    SubjectLoad(#[source] BackendError),
    #[error("single-choice question {question} must offer at least two choices")]
    BadChoices { question: QuestionId },
    #[error("no categories with active questions to present")]
    EmptySchema,
    #[error("category index {0} is out of range")]
    StepOutOfRange(usize),
    #[error("already at the final category")]
    AtFinalStep,
    #[error("finish is only available from the final category")]
    NotAtFinalStep,
    #[error("the record form has already been completed")]
    AlreadyComplete,
    #[error("subject has no backend identifier yet")]
    MissingSubjectId,
    #[error(
        "{failed} answer(s) in category \"{category}\" were not saved",
        failed = failed.len()
    )]
    FlushRejected {
        category: String,
        failed: Vec<QuestionId>,
    },
    #[error(
        "{count} required question(s) are still unanswered",
        count = questions.len()
    )]
    UnmetRequired { questions: Vec<QuestionId> },
    #[error("failed to save categories: {}", categories.join(", "))]
    FinishIncomplete { categories: Vec<String> },
    #[error("not authenticated")]
    Unauthorized,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
