//! The required-question gate run before final submission.

use crate::answers::AnswerStore;
use crate::schema::{QuestionId, RecordSchema};

/// Required questions whose current answer is absent or blank after trim.
///
/// Kind conformance is deliberately not checked: a numeric question answered
/// with non-numeric text passes validation and is coerced to 0 at the
/// serialisation boundary.
pub fn unmet_required(schema: &RecordSchema, answers: &AnswerStore) -> Vec<QuestionId> {
    schema
        .questions()
        .filter(|q| q.required && !answers.is_answered(q.id))
        .map(|q| q.id)
        .collect()
}
