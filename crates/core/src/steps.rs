//! The step controller: one state per category page, plus a terminal
//! "complete" state reached only through a successful finish.

use crate::answers::AnswerStore;
use crate::backend::RecordBackend;
use crate::error::{EngineError, EngineResult};
use crate::persist::{flush_category, FailurePolicy};
use crate::schema::{CategoryId, CategorySection, QuestionId, RecordSchema};
use crate::subject::{SubjectId, SubjectRef};
use crate::validate::unmet_required;
use std::collections::BTreeSet;

/// Session-scoped controller for one subject's record form.
///
/// Holds the loaded schema, the answer store, the set of categories
/// considered saved this session, and the current page. Everything lives in
/// working memory; nothing outlasts the session.
#[derive(Debug)]
pub struct StepController {
    schema: RecordSchema,
    answers: AnswerStore,
    subject: SubjectRef,
    saved: BTreeSet<CategoryId>,
    current: usize,
    complete: bool,
    policy: FailurePolicy,
}

impl StepController {
    /// Creates a controller positioned at the first category.
    pub fn new(
        schema: RecordSchema,
        subject: SubjectRef,
        policy: FailurePolicy,
    ) -> EngineResult<Self> {
        Self::with_seed(schema, subject, policy, AnswerStore::new(), BTreeSet::new())
    }

    /// Creates a controller with pre-seeded answers and completion markers,
    /// used by the session assembler after a prior-answer fetch.
    pub(crate) fn with_seed(
        schema: RecordSchema,
        subject: SubjectRef,
        policy: FailurePolicy,
        answers: AnswerStore,
        saved: BTreeSet<CategoryId>,
    ) -> EngineResult<Self> {
        if schema.is_empty() {
            return Err(EngineError::EmptySchema);
        }
        Ok(Self {
            schema,
            answers,
            subject,
            saved,
            current: 0,
            complete: false,
            policy,
        })
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub fn subject(&self) -> &SubjectRef {
        &self.subject
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The category page currently shown.
    pub fn current_section(&self) -> &CategorySection {
        // Index is maintained within bounds by construction.
        &self.schema.sections()[self.current]
    }

    /// Whether a successful finish has been reached.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the category is in this session's completion-marker set.
    pub fn is_saved(&self, category: CategoryId) -> bool {
        self.saved.contains(&category)
    }

    pub fn answer(&self, question: QuestionId) -> Option<&str> {
        self.answers.get(question)
    }

    /// Records a user edit.
    pub fn set_answer(&mut self, question: QuestionId, value: impl Into<String>) {
        self.answers.set(question, value);
    }

    /// Overall completion percentage, rounded to the nearest integer.
    ///
    /// Counts schema questions with a non-blank current answer; recomputed
    /// on demand after every store mutation.
    pub fn completion_percent(&self) -> u8 {
        let total = self.schema.question_count();
        if total == 0 {
            return 0;
        }
        let answered = self
            .schema
            .questions()
            .filter(|q| self.answers.is_answered(q.id))
            .count();
        ((answered as f64 / total as f64) * 100.0).round() as u8
    }

    /// Required questions still unanswered.
    pub fn unmet_required(&self) -> Vec<QuestionId> {
        unmet_required(&self.schema, &self.answers)
    }

    /// Moves back one category. Pure navigation, no persistence side effect.
    /// Returns `false` when already at the first category.
    pub fn retreat(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    /// Jumps straight to any category tab, without forcing a save.
    pub fn jump(&mut self, index: usize) -> EngineResult<()> {
        if index >= self.schema.len() {
            return Err(EngineError::StepOutOfRange(index));
        }
        self.current = index;
        Ok(())
    }

    /// Flushes the current category and, on success, moves to the next one.
    ///
    /// On a rejected flush the controller stays where it is so the user can
    /// retry.
    pub async fn advance(&mut self, backend: &dyn RecordBackend) -> EngineResult<()> {
        if self.current + 1 >= self.schema.len() {
            return Err(EngineError::AtFinalStep);
        }
        self.flush_current(backend).await?;
        self.current += 1;
        Ok(())
    }

    /// Runs the validation gate and flushes every category not yet marked
    /// saved. Only available from the final category.
    ///
    /// Tab-jumping may have left earlier categories unflushed, which is why
    /// this sweeps all of them rather than just the current one. Failures
    /// are aggregated and reported by category name.
    pub async fn finish(&mut self, backend: &dyn RecordBackend) -> EngineResult<()> {
        if self.complete {
            return Err(EngineError::AlreadyComplete);
        }
        if self.current + 1 != self.schema.len() {
            return Err(EngineError::NotAtFinalStep);
        }

        let unmet = self.unmet_required();
        if !unmet.is_empty() {
            return Err(EngineError::UnmetRequired { questions: unmet });
        }

        let subject = self.subject_id()?;
        let pending: Vec<usize> = (0..self.schema.len())
            .filter(|i| !self.saved.contains(&self.schema.sections()[*i].category.id))
            .collect();

        let mut failed_categories = Vec::new();
        for index in pending {
            let section = &self.schema.sections()[index];
            let outcome = flush_category(backend, section, &self.answers, subject).await?;
            if outcome.accepted(self.policy) {
                self.saved.insert(section.category.id);
            } else {
                failed_categories.push(section.category.name.to_string());
            }
        }

        if !failed_categories.is_empty() {
            return Err(EngineError::FinishIncomplete {
                categories: failed_categories,
            });
        }
        self.complete = true;
        Ok(())
    }

    async fn flush_current(&mut self, backend: &dyn RecordBackend) -> EngineResult<()> {
        let subject = self.subject_id()?;
        let section = &self.schema.sections()[self.current];
        let outcome = flush_category(backend, section, &self.answers, subject).await?;
        if !outcome.accepted(self.policy) {
            return Err(EngineError::FlushRejected {
                category: section.category.name.to_string(),
                failed: outcome.failed,
            });
        }
        self.saved.insert(section.category.id);
        Ok(())
    }

    fn subject_id(&self) -> EngineResult<SubjectId> {
        self.subject.id().ok_or(EngineError::MissingSubjectId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::AnswerKind;
    use crate::testing::{category, question, required_question, FakeBackend};

    fn controller(policy: FailurePolicy) -> StepController {
        let schema = RecordSchema::assemble(
            vec![category(1, "A", 1), category(2, "B", 2)],
            vec![
                vec![required_question(10, 1, AnswerKind::Text)],
                vec![question(20, 2, AnswerKind::Number)],
            ],
        )
        .unwrap();
        StepController::new(schema, SubjectRef::Persisted(SubjectId(5)), policy).unwrap()
    }

    #[test]
    fn refuses_an_empty_schema() {
        let err = StepController::new(
            RecordSchema::default(),
            SubjectRef::Persisted(SubjectId(5)),
            FailurePolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::EmptySchema));
    }

    #[test]
    fn completion_percent_rounds_and_reaches_exactly_100() {
        let schema = RecordSchema::assemble(
            vec![category(1, "A", 1)],
            vec![vec![
                question(10, 1, AnswerKind::Text),
                question(11, 1, AnswerKind::Text),
                question(12, 1, AnswerKind::Text),
            ]],
        )
        .unwrap();
        let mut ctl = StepController::new(
            schema,
            SubjectRef::Persisted(SubjectId(5)),
            FailurePolicy::default(),
        )
        .unwrap();

        assert_eq!(ctl.completion_percent(), 0);
        ctl.set_answer(QuestionId(10), "a");
        assert_eq!(ctl.completion_percent(), 33);
        ctl.set_answer(QuestionId(11), "b");
        assert_eq!(ctl.completion_percent(), 67);
        ctl.set_answer(QuestionId(12), "c");
        assert_eq!(ctl.completion_percent(), 100);
    }

    #[test]
    fn retreat_and_jump_are_pure_navigation() {
        let mut ctl = controller(FailurePolicy::default());
        assert!(!ctl.retreat());

        ctl.jump(1).unwrap();
        assert_eq!(ctl.current_index(), 1);
        assert!(!ctl.is_saved(CategoryId(1)));

        assert!(ctl.retreat());
        assert_eq!(ctl.current_index(), 0);
        assert!(matches!(ctl.jump(9), Err(EngineError::StepOutOfRange(9))));
    }

    #[tokio::test]
    async fn advance_flushes_and_moves_forward() {
        let backend = FakeBackend::new();
        let mut ctl = controller(FailurePolicy::default());
        ctl.set_answer(QuestionId(10), "ok");

        ctl.advance(&backend).await.unwrap();
        assert_eq!(ctl.current_index(), 1);
        assert!(ctl.is_saved(CategoryId(1)));
        assert_eq!(backend.submit_calls(), 1);

        assert!(matches!(
            ctl.advance(&backend).await,
            Err(EngineError::AtFinalStep)
        ));
    }

    #[tokio::test]
    async fn advance_stays_put_when_the_flush_is_rejected() {
        let backend = FakeBackend::new().failing_submission(QuestionId(10));
        let mut ctl = controller(FailurePolicy::Strict);
        ctl.set_answer(QuestionId(10), "ok");

        let err = ctl.advance(&backend).await.unwrap_err();
        assert!(matches!(err, EngineError::FlushRejected { .. }));
        assert_eq!(ctl.current_index(), 0);
        assert!(!ctl.is_saved(CategoryId(1)));
    }

    #[tokio::test]
    async fn lenient_policy_reports_success_despite_answer_failures() {
        let backend = FakeBackend::new().failing_submission(QuestionId(10));
        let mut ctl = controller(FailurePolicy::Lenient);
        ctl.set_answer(QuestionId(10), "ok");

        ctl.advance(&backend).await.unwrap();
        assert_eq!(ctl.current_index(), 1);
        assert!(ctl.is_saved(CategoryId(1)));
    }

    #[tokio::test]
    async fn finish_blocks_on_unmet_required_then_succeeds_after_fill() {
        let backend = FakeBackend::new();
        let mut ctl = controller(FailurePolicy::default());

        // Leave required Q10 blank, jump straight to the last category.
        ctl.jump(1).unwrap();
        let err = ctl.finish(&backend).await.unwrap_err();
        match err {
            EngineError::UnmetRequired { questions } => {
                assert_eq!(questions, vec![QuestionId(10)]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!ctl.is_complete());

        ctl.set_answer(QuestionId(10), "ok");
        ctl.finish(&backend).await.unwrap();
        assert!(ctl.is_complete());
        assert!(ctl.is_saved(CategoryId(1)));
        assert!(ctl.is_saved(CategoryId(2)));
    }

    #[tokio::test]
    async fn finish_sweeps_categories_left_unflushed_by_tab_jumping() {
        let backend = FakeBackend::new();
        let mut ctl = controller(FailurePolicy::default());
        ctl.set_answer(QuestionId(10), "ok");
        ctl.set_answer(QuestionId(20), "12");

        ctl.jump(1).unwrap();
        ctl.finish(&backend).await.unwrap();

        // Both answers submitted even though category A was never advanced
        // through.
        assert_eq!(backend.submit_calls(), 2);
    }

    #[tokio::test]
    async fn finish_is_only_available_from_the_final_step() {
        let backend = FakeBackend::new();
        let mut ctl = controller(FailurePolicy::default());
        ctl.set_answer(QuestionId(10), "ok");

        assert!(matches!(
            ctl.finish(&backend).await,
            Err(EngineError::NotAtFinalStep)
        ));
    }

    #[tokio::test]
    async fn finish_names_failing_categories_under_strict_policy() {
        let backend = FakeBackend::new().failing_submission(QuestionId(20));
        let mut ctl = controller(FailurePolicy::Strict);
        ctl.set_answer(QuestionId(10), "ok");
        ctl.set_answer(QuestionId(20), "3");

        ctl.jump(1).unwrap();
        let err = ctl.finish(&backend).await.unwrap_err();
        match err {
            EngineError::FinishIncomplete { categories } => {
                assert_eq!(categories, vec!["B".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Category A persisted fine and stays marked, so a retry only
        // resubmits B.
        assert!(ctl.is_saved(CategoryId(1)));
        assert!(!ctl.is_saved(CategoryId(2)));
    }

    #[tokio::test]
    async fn draft_subject_without_id_cannot_flush() {
        let backend = FakeBackend::new();
        let schema = RecordSchema::assemble(
            vec![category(1, "A", 1), category(2, "B", 2)],
            vec![
                vec![question(10, 1, AnswerKind::Text)],
                vec![question(20, 2, AnswerKind::Text)],
            ],
        )
        .unwrap();
        let mut ctl = StepController::new(
            schema,
            SubjectRef::Draft(crate::testing::draft_subject()),
            FailurePolicy::default(),
        )
        .unwrap();
        ctl.set_answer(QuestionId(10), "ok");

        assert!(matches!(
            ctl.advance(&backend).await,
            Err(EngineError::MissingSubjectId)
        ));
    }
}
