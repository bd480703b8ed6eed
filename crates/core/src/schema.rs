//! Questionnaire schema: categories, questions, and the backend-driven loader.
//!
//! The shape of the record form is data, not code: the backend owns the
//! category/question tree and this module turns what it serves into an
//! ordered, active-only [`RecordSchema`]. Nothing here is cached beyond the
//! lifetime of one editing session.

use crate::backend::RecordBackend;
use crate::error::{EngineError, EngineResult};
use ficha_types::NonEmptyText;
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

/// Backend identifier of a category.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CategoryId(pub i64);

/// Backend identifier of a question.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct QuestionId(pub i64);

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for QuestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The enumerated type of answer a question expects.
///
/// Raw answers are held as text in the store regardless of kind; the kind
/// only matters at the serialisation boundary (see `persist::AnswerValue`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnswerKind {
    /// Free text.
    Text,
    /// Floating-point number.
    Number,
    /// Single choice from the question's choice list.
    Choice,
    /// ISO-formatted calendar date.
    Date,
    /// Yes/no.
    Boolean,
    /// Domain-specific sex choice.
    Sex,
}

impl AnswerKind {
    /// Whether this kind carries a meaningful choice list.
    pub fn is_choice(self) -> bool {
        matches!(self, AnswerKind::Choice)
    }

    /// Human-readable label, used by CLI output and prompts.
    pub fn label(self) -> &'static str {
        match self {
            AnswerKind::Text => "text",
            AnswerKind::Number => "number",
            AnswerKind::Choice => "choice",
            AnswerKind::Date => "date",
            AnswerKind::Boolean => "boolean",
            AnswerKind::Sex => "sex",
        }
    }
}

/// A named grouping of questions, ordered for display.
///
/// Read-only to the engine; an external admin surface manages the lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: NonEmptyText,
    pub description: Option<String>,
    pub display_order: i32,
    pub active: bool,
}

/// A single prompt with a typed answer-kind, belonging to one category.
#[derive(Clone, Debug, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub category_id: CategoryId,
    pub prompt: NonEmptyText,
    pub kind: AnswerKind,
    /// Choice labels; meaningful only when `kind` is single-choice.
    pub choices: Vec<String>,
    pub required: bool,
    /// Rank within the owning category.
    pub rank: i32,
    pub active: bool,
}

/// One presentable step of the form: a category plus its active questions.
#[derive(Clone, Debug)]
pub struct CategorySection {
    pub category: Category,
    pub questions: Vec<Question>,
}

/// The fully assembled, ordered, active-only question tree.
///
/// Invariants held by construction:
/// - categories are strictly ordered by `(display_order, id)` and active
/// - questions are strictly ordered by `(rank, id)` within their category
///   and active
/// - every section contains at least one question
#[derive(Clone, Debug, Default)]
pub struct RecordSchema {
    sections: Vec<CategorySection>,
}

impl RecordSchema {
    /// Assembles a schema from raw category and question lists, applying the
    /// active filter, the display ordering, and the empty-category drop.
    ///
    /// `questions` must be parallel to `categories` (one list per category,
    /// same order). Single-choice questions with fewer than two labels are
    /// rejected; choice lists on other kinds are cleared.
    pub fn assemble(
        categories: Vec<Category>,
        questions: Vec<Vec<Question>>,
    ) -> EngineResult<Self> {
        debug_assert_eq!(categories.len(), questions.len());

        let mut sections = Vec::new();
        for (category, raw_questions) in categories.into_iter().zip(questions) {
            if !category.active {
                continue;
            }
            let questions = prepare_questions(raw_questions)?;
            if questions.is_empty() {
                tracing::debug!(
                    category = %category.id,
                    name = %category.name,
                    "dropping category with no presentable questions"
                );
                continue;
            }
            sections.push(CategorySection {
                category,
                questions,
            });
        }
        sections.sort_by_key(|s| (s.category.display_order, s.category.id));
        Ok(Self { sections })
    }

    pub fn sections(&self) -> &[CategorySection] {
        &self.sections
    }

    pub fn section(&self, index: usize) -> Option<&CategorySection> {
        self.sections.get(index)
    }

    /// Number of presentable categories (form steps).
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Total question count across every category.
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// All questions in display order.
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    pub fn find_question(&self, id: QuestionId) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }
}

/// Filter, order, and normalise one category's raw question list.
fn prepare_questions(raw: Vec<Question>) -> EngineResult<Vec<Question>> {
    let mut questions: Vec<Question> = raw.into_iter().filter(|q| q.active).collect();
    questions.sort_by_key(|q| (q.rank, q.id));

    for question in &mut questions {
        if question.kind.is_choice() {
            if question.choices.len() < 2 {
                return Err(EngineError::BadChoices {
                    question: question.id,
                });
            }
        } else if !question.choices.is_empty() {
            // Choice lists are only meaningful on single-choice questions.
            question.choices.clear();
        }
    }
    Ok(questions)
}

/// Loads the complete schema from the backend.
///
/// Categories are fetched first; each surviving category's question fetch is
/// then started concurrently and the loader waits for all of them. Any fetch
/// failure aborts the whole load; a partial schema is never presented.
pub async fn load_schema(backend: &dyn RecordBackend) -> EngineResult<RecordSchema> {
    let categories = backend
        .fetch_categories()
        .await
        .map_err(EngineError::CategoryLoad)?;

    let mut active: Vec<Category> = categories.into_iter().filter(|c| c.active).collect();
    active.sort_by_key(|c| (c.display_order, c.id));

    let fetches = active.iter().map(|category| {
        let id = category.id;
        async move {
            backend
                .fetch_questions(id)
                .await
                .map_err(|source| EngineError::QuestionLoad {
                    category: id,
                    source,
                })
        }
    });
    let questions = try_join_all(fetches).await?;

    let schema = RecordSchema::assemble(active, questions)?;
    tracing::info!(
        categories = schema.len(),
        questions = schema.question_count(),
        "record schema loaded"
    );
    Ok(schema)
}
