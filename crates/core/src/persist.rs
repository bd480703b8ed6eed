//! Conversion of raw answers into kind-specific payloads and the
//! per-category flush.

use crate::answers::AnswerStore;
use crate::backend::RecordBackend;
use crate::error::{BackendError, EngineError, EngineResult};
use crate::schema::{AnswerKind, CategorySection, QuestionId};
use crate::subject::SubjectId;

/// A kind-specific answer payload, dispatched once per answer-kind.
///
/// Exactly one variant is populated per answer on the wire, mirroring the
/// backend's `resposta_texto` / `resposta_numero` / `resposta_data` /
/// `resposta_boolean` columns.
#[derive(Clone, Debug, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Date(String),
    Boolean(bool),
}

impl AnswerValue {
    /// Converts raw answer text according to the question's kind.
    ///
    /// Text, choice, and sex answers pass through verbatim. Numbers parse as
    /// floating point, defaulting to 0 on failure. Dates pass through
    /// verbatim (already ISO-formatted by the date input). Booleans are
    /// `true` iff the raw text is exactly `"true"`.
    pub fn from_raw(kind: AnswerKind, raw: &str) -> Self {
        match kind {
            AnswerKind::Text | AnswerKind::Choice | AnswerKind::Sex => {
                AnswerValue::Text(raw.to_owned())
            }
            AnswerKind::Number => AnswerValue::Number(raw.parse().unwrap_or(0.0)),
            AnswerKind::Date => AnswerValue::Date(raw.to_owned()),
            AnswerKind::Boolean => AnswerValue::Boolean(raw == "true"),
        }
    }

    /// Renders the value back into the raw text form the store holds.
    pub fn to_raw(&self) -> String {
        match self {
            AnswerValue::Text(v) | AnswerValue::Date(v) => v.clone(),
            AnswerValue::Number(v) => v.to_string(),
            AnswerValue::Boolean(v) => v.to_string(),
        }
    }
}

/// One answer ready for submission.
#[derive(Clone, Debug, PartialEq)]
pub struct NewAnswer {
    pub subject: SubjectId,
    pub question: QuestionId,
    pub value: AnswerValue,
}

/// One previously persisted answer, as served by the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredAnswer {
    pub subject: SubjectId,
    pub question: QuestionId,
    pub value: AnswerValue,
}

/// How the flush treats individual answer submission failures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Log each failure and report the flush successful once the loop
    /// completes. Keeps the user moving at the cost that the "saved"
    /// marker can be wrong when answers silently fail.
    #[default]
    Lenient,
    /// The flush succeeds only when every answer persisted; failed question
    /// ids are surfaced to the caller.
    Strict,
}

/// What one per-category flush did.
#[derive(Clone, Debug)]
pub struct FlushOutcome {
    pub submitted: usize,
    pub failed: Vec<QuestionId>,
}

impl FlushOutcome {
    /// Whether the category may be marked saved under the given policy.
    pub fn accepted(&self, policy: FailurePolicy) -> bool {
        match policy {
            FailurePolicy::Lenient => true,
            FailurePolicy::Strict => self.failed.is_empty(),
        }
    }
}

/// Persists every non-blank answer of one category, one request at a time.
///
/// With no non-blank answers this is trivially successful and issues no
/// network call: an intentionally skipped, non-required category is not an
/// error. Authentication failure aborts immediately; any other per-answer
/// failure is logged and the loop continues.
pub async fn flush_category(
    backend: &dyn RecordBackend,
    section: &CategorySection,
    answers: &AnswerStore,
    subject: SubjectId,
) -> EngineResult<FlushOutcome> {
    let pending: Vec<NewAnswer> = section
        .questions
        .iter()
        .filter(|q| answers.is_answered(q.id))
        .map(|q| NewAnswer {
            subject,
            question: q.id,
            value: AnswerValue::from_raw(q.kind, answers.get(q.id).unwrap_or_default()),
        })
        .collect();

    if pending.is_empty() {
        tracing::debug!(
            category = %section.category.id,
            name = %section.category.name,
            "nothing to flush, marking category saved"
        );
        return Ok(FlushOutcome {
            submitted: 0,
            failed: Vec::new(),
        });
    }

    let mut failed = Vec::new();
    let mut submitted = 0usize;
    for answer in &pending {
        match backend.submit_answer(answer).await {
            Ok(()) => submitted += 1,
            Err(BackendError::Unauthorized) => return Err(EngineError::Unauthorized),
            Err(err) => {
                tracing::warn!(
                    question = %answer.question,
                    category = %section.category.id,
                    error = %err,
                    "answer submission failed"
                );
                failed.push(answer.question);
            }
        }
    }

    tracing::info!(
        category = %section.category.id,
        name = %section.category.name,
        submitted,
        failed = failed.len(),
        "category flushed"
    );
    Ok(FlushOutcome { submitted, failed })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnswerKind, RecordSchema};
    use crate::testing::{category, question, FakeBackend};

    fn one_section(kind: AnswerKind) -> RecordSchema {
        RecordSchema::assemble(
            vec![category(1, "Geral", 1)],
            vec![vec![question(10, 1, kind), question(11, 1, kind)]],
        )
        .unwrap()
    }

    #[test]
    fn numeric_conversion_defaults_to_zero_on_garbage() {
        assert_eq!(
            AnswerValue::from_raw(AnswerKind::Number, "abc"),
            AnswerValue::Number(0.0)
        );
        assert_eq!(
            AnswerValue::from_raw(AnswerKind::Number, "41.5"),
            AnswerValue::Number(41.5)
        );
    }

    #[test]
    fn boolean_conversion_is_exact_match_on_true() {
        assert_eq!(
            AnswerValue::from_raw(AnswerKind::Boolean, "true"),
            AnswerValue::Boolean(true)
        );
        for raw in ["false", "True", "yes", "", "garbage"] {
            assert_eq!(
                AnswerValue::from_raw(AnswerKind::Boolean, raw),
                AnswerValue::Boolean(false),
                "raw {raw:?} must convert to false"
            );
        }
    }

    #[test]
    fn text_choice_and_sex_pass_through_verbatim() {
        for kind in [AnswerKind::Text, AnswerKind::Choice, AnswerKind::Sex] {
            assert_eq!(
                AnswerValue::from_raw(kind, " as typed "),
                AnswerValue::Text(" as typed ".to_owned())
            );
        }
        assert_eq!(
            AnswerValue::from_raw(AnswerKind::Date, "2024-05-01"),
            AnswerValue::Date("2024-05-01".to_owned())
        );
    }

    #[tokio::test]
    async fn empty_category_flush_issues_no_network_call() {
        let schema = one_section(AnswerKind::Text);
        let backend = FakeBackend::new();
        let answers = AnswerStore::new();

        let outcome = flush_category(&backend, &schema.sections()[0], &answers, SubjectId(5))
            .await
            .unwrap();

        assert_eq!(outcome.submitted, 0);
        assert!(outcome.failed.is_empty());
        assert_eq!(backend.submit_calls(), 0);
    }

    #[tokio::test]
    async fn blank_answers_are_not_submitted() {
        let schema = one_section(AnswerKind::Text);
        let backend = FakeBackend::new();
        let mut answers = AnswerStore::new();
        answers.set(QuestionId(10), "   ");
        answers.set(QuestionId(11), "ok");

        let outcome = flush_category(&backend, &schema.sections()[0], &answers, SubjectId(5))
            .await
            .unwrap();

        assert_eq!(outcome.submitted, 1);
        assert_eq!(backend.submit_calls(), 1);
    }

    #[tokio::test]
    async fn per_answer_failure_does_not_halt_the_loop() {
        let schema = one_section(AnswerKind::Text);
        let backend = FakeBackend::new().failing_submission(QuestionId(10));
        let mut answers = AnswerStore::new();
        answers.set(QuestionId(10), "first");
        answers.set(QuestionId(11), "second");

        let outcome = flush_category(&backend, &schema.sections()[0], &answers, SubjectId(5))
            .await
            .unwrap();

        assert_eq!(outcome.submitted, 1);
        assert_eq!(outcome.failed, vec![QuestionId(10)]);
        assert!(outcome.accepted(FailurePolicy::Lenient));
        assert!(!outcome.accepted(FailurePolicy::Strict));
    }

    #[tokio::test]
    async fn unauthorized_submission_aborts_the_flush() {
        let schema = one_section(AnswerKind::Text);
        let backend = FakeBackend::new().unauthorized();
        let mut answers = AnswerStore::new();
        answers.set(QuestionId(10), "x");

        let err = flush_category(&backend, &schema.sections()[0], &answers, SubjectId(5))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Unauthorized));
    }
}
