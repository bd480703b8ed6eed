//! In-session answer state, keyed by question.

use crate::schema::QuestionId;
use std::collections::BTreeMap;

/// The in-memory mapping from question to raw answer text.
///
/// An entry exists only for questions the user has touched or that were
/// seeded from prior persistence; absence means "unanswered". Values are
/// kept as raw text regardless of answer-kind and only converted at the
/// serialisation boundary.
#[derive(Clone, Debug, Default)]
pub struct AnswerStore {
    entries: BTreeMap<QuestionId, String>,
}

impl AnswerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The raw value for a question, if one has been recorded.
    pub fn get(&self, question: QuestionId) -> Option<&str> {
        self.entries.get(&question).map(String::as_str)
    }

    /// Records the raw value for a question, replacing any previous value.
    pub fn set(&mut self, question: QuestionId, value: impl Into<String>) {
        self.entries.insert(question, value.into());
    }

    /// Merges previously persisted answers into the store.
    ///
    /// An in-session edit always wins over a seeded value, so seeding after
    /// the user has started typing never discards their work. In practice
    /// the session assembler seeds exactly once, before any edit.
    pub fn seed(&mut self, prior: impl IntoIterator<Item = (QuestionId, String)>) {
        for (question, value) in prior {
            self.entries.entry(question).or_insert(value);
        }
    }

    /// Whether the question currently has a non-blank answer.
    pub fn is_answered(&self, question: QuestionId) -> bool {
        self.get(question).is_some_and(|v| !v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &str)> {
        self.entries.iter().map(|(id, v)| (*id, v.as_str()))
    }
}
