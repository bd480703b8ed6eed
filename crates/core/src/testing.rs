//! In-memory backend and fixture builders shared by the engine tests.

use crate::backend::RecordBackend;
use crate::error::BackendError;
use crate::persist::{NewAnswer, StoredAnswer};
use crate::schema::{AnswerKind, Category, CategoryId, Question, QuestionId};
use crate::subject::{SubjectId, SubjectRecord};
use async_trait::async_trait;
use chrono::NaiveDate;
use ficha_types::{Cpf, NonEmptyText};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn category(id: i64, name: &str, display_order: i32) -> Category {
    Category {
        id: CategoryId(id),
        name: NonEmptyText::new(name).unwrap(),
        description: None,
        display_order,
        active: true,
    }
}

pub fn inactive_category(id: i64, name: &str, display_order: i32) -> Category {
    Category {
        active: false,
        ..category(id, name, display_order)
    }
}

pub fn question(id: i64, category: i64, kind: AnswerKind) -> Question {
    Question {
        id: QuestionId(id),
        category_id: CategoryId(category),
        prompt: NonEmptyText::new(format!("Pergunta {id}")).unwrap(),
        kind,
        choices: if kind.is_choice() {
            vec!["Sim".into(), "Não".into()]
        } else {
            Vec::new()
        },
        required: false,
        rank: 0,
        active: true,
    }
}

pub fn required_question(id: i64, category: i64, kind: AnswerKind) -> Question {
    Question {
        required: true,
        ..question(id, category, kind)
    }
}

pub fn subject_record(id: i64) -> SubjectRecord {
    SubjectRecord {
        id: Some(SubjectId(id)),
        name: NonEmptyText::new("Maria da Silva").unwrap(),
        cpf: Cpf::new("123.456.789-09").unwrap(),
        birth_date: NaiveDate::from_ymd_opt(1990, 3, 14).unwrap(),
        active: true,
    }
}

pub fn draft_subject() -> SubjectRecord {
    SubjectRecord {
        id: None,
        ..subject_record(0)
    }
}

/// A scripted backend that records calls and can be told to fail.
#[derive(Default)]
pub struct FakeBackend {
    categories: Vec<Category>,
    questions: HashMap<CategoryId, Vec<Question>>,
    subjects: HashMap<SubjectId, SubjectRecord>,
    stored: Vec<StoredAnswer>,
    submitted: Mutex<Vec<NewAnswer>>,
    failing_questions: HashSet<CategoryId>,
    failing_submissions: HashSet<QuestionId>,
    fail_answer_fetch: bool,
    reject_all: bool,
    answer_fetches: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category, questions: Vec<Question>) -> Self {
        self.questions.insert(category.id, questions);
        self.categories.push(category);
        self
    }

    pub fn with_subject(mut self, record: SubjectRecord) -> Self {
        if let Some(id) = record.id {
            self.subjects.insert(id, record);
        }
        self
    }

    pub fn with_stored_answer(mut self, answer: StoredAnswer) -> Self {
        self.stored.push(answer);
        self
    }

    pub fn failing_questions_for(mut self, category: CategoryId) -> Self {
        self.failing_questions.insert(category);
        self
    }

    pub fn failing_submission(mut self, question: QuestionId) -> Self {
        self.failing_submissions.insert(question);
        self
    }

    pub fn failing_answer_fetch(mut self) -> Self {
        self.fail_answer_fetch = true;
        self
    }

    /// Every submission is rejected as unauthenticated.
    pub fn unauthorized(mut self) -> Self {
        self.reject_all = true;
        self
    }

    pub fn submit_calls(&self) -> usize {
        self.submitted.lock().unwrap().len()
    }

    pub fn answer_fetches(&self) -> usize {
        self.answer_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordBackend for FakeBackend {
    async fn fetch_categories(&self) -> Result<Vec<Category>, BackendError> {
        Ok(self.categories.clone())
    }

    async fn fetch_questions(
        &self,
        category: CategoryId,
    ) -> Result<Vec<Question>, BackendError> {
        if self.failing_questions.contains(&category) {
            return Err(BackendError::Status {
                status: 500,
                detail: "scripted failure".into(),
            });
        }
        Ok(self.questions.get(&category).cloned().unwrap_or_default())
    }

    async fn fetch_subject(&self, subject: SubjectId) -> Result<SubjectRecord, BackendError> {
        self.subjects
            .get(&subject)
            .cloned()
            .ok_or(BackendError::Status {
                status: 404,
                detail: "no such subject".into(),
            })
    }

    async fn fetch_answers(
        &self,
        subject: SubjectId,
    ) -> Result<Vec<StoredAnswer>, BackendError> {
        self.answer_fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_answer_fetch {
            return Err(BackendError::Status {
                status: 500,
                detail: "scripted failure".into(),
            });
        }
        Ok(self
            .stored
            .iter()
            .filter(|a| a.subject == subject)
            .cloned()
            .collect())
    }

    async fn submit_answer(&self, answer: &NewAnswer) -> Result<(), BackendError> {
        if self.reject_all {
            return Err(BackendError::Unauthorized);
        }
        self.submitted.lock().unwrap().push(answer.clone());
        if self.failing_submissions.contains(&answer.question) {
            return Err(BackendError::Status {
                status: 400,
                detail: "scripted failure".into(),
            });
        }
        Ok(())
    }
}
