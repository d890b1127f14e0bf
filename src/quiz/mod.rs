pub mod bank;
pub mod engine;
pub mod presenter;

use std::fmt;

use thiserror::Error;

use crate::trivia::ResponseCode;

/// Everything that can go wrong during a quiz run.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("could not reach the trivia service: {0}")]
    FetchTransport(#[from] reqwest::Error),
    #[error("trivia service answered with HTTP status {0}")]
    FetchStatus(u16),
    #[error("trivia service rejected the request: {0}")]
    ApiRejected(ResponseCode),
    #[error("the trivia service returned no questions")]
    EmptyQuestionSet,
    #[error("question index {index} is out of range for {len} questions")]
    OutOfRange { index: usize, len: usize },
    #[error("no question is waiting for an answer")]
    NotAwaitingAnswer,
    #[error("a quiz run is already in progress")]
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Multiple,
    Boolean,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionKind::Multiple => "multiple",
            QuestionKind::Boolean => "boolean",
        }
    }
}

/// One trivia question as received from the source. Text fields are kept
/// raw (entity-encoded); decoding is left to the presenter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(rename = "type")]
    kind: QuestionKind,
    difficulty: Difficulty,
    category: String,
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl Question {
    pub fn new(
        kind: QuestionKind,
        difficulty: Difficulty,
        category: impl Into<String>,
        question: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Self {
        Self {
            kind,
            difficulty,
            category: category.into(),
            question: question.into(),
            correct_answer: correct_answer.into(),
            incorrect_answers,
        }
    }

    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn text(&self) -> &str {
        &self.question
    }

    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }
}
