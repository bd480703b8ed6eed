//! Session assembly: the dependency-ready gate in front of the controller.
//!
//! Prior answers must only be fetched once two prerequisites are settled:
//! the schema is loaded and the subject is identified. Seeding earlier risks
//! answering against the wrong subject or discarding schema context, so both
//! futures are joined before the seed is attempted.

use crate::answers::AnswerStore;
use crate::backend::RecordBackend;
use crate::error::{EngineError, EngineResult};
use crate::persist::FailurePolicy;
use crate::schema::{load_schema, CategoryId};
use crate::steps::StepController;
use crate::subject::{SubjectRecord, SubjectRef};
use std::collections::BTreeSet;

/// Loads everything one editing session needs and returns the controller
/// positioned at the first category.
///
/// For a persisted subject the record and the schema are fetched
/// concurrently; once both are ready, prior answers are fetched and seeded,
/// and every category that already holds at least one stored answer is
/// marked saved. A draft subject skips the prior-answer fetch entirely: a
/// never-persisted record has nothing to look up.
pub async fn open_session(
    backend: &dyn RecordBackend,
    subject: SubjectRef,
    policy: FailurePolicy,
) -> EngineResult<(StepController, Option<SubjectRecord>)> {
    match subject {
        SubjectRef::Persisted(id) => {
            let (record, schema) = tokio::try_join!(
                async {
                    backend
                        .fetch_subject(id)
                        .await
                        .map_err(EngineError::SubjectLoad)
                },
                load_schema(backend),
            )?;

            let mut answers = AnswerStore::new();
            let mut saved: BTreeSet<CategoryId> = BTreeSet::new();
            match backend.fetch_answers(id).await {
                Ok(prior) => {
                    for stored in &prior {
                        if let Some(question) = schema.find_question(stored.question) {
                            saved.insert(question.category_id);
                        }
                    }
                    answers.seed(
                        prior
                            .into_iter()
                            .map(|stored| (stored.question, stored.value.to_raw())),
                    );
                    tracing::debug!(
                        subject = %id,
                        seeded = answers.len(),
                        categories = saved.len(),
                        "prior answers seeded"
                    );
                }
                // A failed prior-answer lookup degrades to an empty form
                // rather than blocking the whole session.
                Err(err) => {
                    tracing::warn!(subject = %id, error = %err, "prior answer fetch failed");
                }
            }

            let controller = StepController::with_seed(
                schema,
                SubjectRef::Persisted(id),
                policy,
                answers,
                saved,
            )?;
            Ok((controller, Some(record)))
        }
        SubjectRef::Draft(record) => {
            let schema = load_schema(backend).await?;
            let controller =
                StepController::new(schema, SubjectRef::Draft(record.clone()), policy)?;
            Ok((controller, Some(record)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{AnswerValue, StoredAnswer};
    use crate::schema::{AnswerKind, QuestionId};
    use crate::subject::SubjectId;
    use crate::testing::{category, draft_subject, question, subject_record, FakeBackend};

    fn backend_with_schema() -> FakeBackend {
        FakeBackend::new()
            .with_category(category(1, "A", 1), vec![question(10, 1, AnswerKind::Text)])
            .with_category(category(2, "B", 2), vec![question(20, 2, AnswerKind::Number)])
            .with_subject(subject_record(5))
    }

    #[tokio::test]
    async fn persisted_subject_gets_answers_seeded_and_categories_marked() {
        let backend = backend_with_schema().with_stored_answer(StoredAnswer {
            subject: SubjectId(5),
            question: QuestionId(10),
            value: AnswerValue::Text("moradia própria".into()),
        });

        let (ctl, record) = open_session(
            &backend,
            SubjectRef::Persisted(SubjectId(5)),
            FailurePolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(ctl.answer(QuestionId(10)), Some("moradia própria"));
        assert!(ctl.is_saved(crate::schema::CategoryId(1)));
        assert!(!ctl.is_saved(crate::schema::CategoryId(2)));
        assert!(record.is_some());
        assert_eq!(backend.answer_fetches(), 1);
    }

    #[tokio::test]
    async fn draft_subject_never_triggers_a_prior_answer_fetch() {
        let backend = backend_with_schema();

        let (ctl, _) = open_session(
            &backend,
            SubjectRef::Draft(draft_subject()),
            FailurePolicy::default(),
        )
        .await
        .unwrap();

        assert!(ctl.answers().is_empty());
        assert_eq!(backend.answer_fetches(), 0);
    }

    #[tokio::test]
    async fn subject_fetch_failure_is_fatal_to_the_session() {
        let backend = backend_with_schema();

        let err = open_session(
            &backend,
            SubjectRef::Persisted(SubjectId(99)),
            FailurePolicy::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, EngineError::SubjectLoad(_)));
    }

    #[tokio::test]
    async fn failed_prior_answer_fetch_degrades_to_an_empty_store() {
        let backend = backend_with_schema().failing_answer_fetch();

        let (ctl, _) = open_session(
            &backend,
            SubjectRef::Persisted(SubjectId(5)),
            FailurePolicy::default(),
        )
        .await
        .unwrap();
        assert!(ctl.answers().is_empty());
    }

    #[tokio::test]
    async fn stored_answers_render_back_into_raw_text() {
        let backend = backend_with_schema()
            .with_stored_answer(StoredAnswer {
                subject: SubjectId(5),
                question: QuestionId(20),
                value: AnswerValue::Number(42.0),
            })
            .with_stored_answer(StoredAnswer {
                subject: SubjectId(5),
                question: QuestionId(10),
                value: AnswerValue::Text("sim".into()),
            });

        let (ctl, _) = open_session(
            &backend,
            SubjectRef::Persisted(SubjectId(5)),
            FailurePolicy::default(),
        )
        .await
        .unwrap();

        assert_eq!(ctl.answer(QuestionId(20)), Some("42"));
        assert_eq!(ctl.completion_percent(), 100);
    }
}
