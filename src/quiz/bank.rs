use crate::quiz::{Question, QuizError};

/// The questions of one run and the running tally of correct answers.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    correct_count: usize,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored questions wholesale. The tally is left alone;
    /// a fresh run gets a fresh bank.
    pub fn load(&mut self, questions: Vec<Question>) -> Result<(), QuizError> {
        if questions.is_empty() {
            return Err(QuizError::EmptyQuestionSet);
        }
        self.questions = questions;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Result<&Question, QuizError> {
        self.questions.get(index).ok_or(QuizError::OutOfRange {
            index,
            len: self.questions.len(),
        })
    }

    /// Counts `submitted` as correct when it equals the stored answer exactly.
    /// Callers must record each index at most once.
    pub fn record_answer(&mut self, index: usize, submitted: &str) -> Result<bool, QuizError> {
        let is_correct = self.get(index)?.correct_answer() == submitted;
        if is_correct {
            self.correct_count += 1;
        }
        Ok(is_correct)
    }

    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}
