use std::mem;

use html_escape::{decode_html_entities, encode_text};

use crate::quiz::presenter::Presenter;

pub const WAITING_TEXT: &str = "Fetching questions, please wait a moment...";

/// A keyboard button: what the user sees and what gets submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerButton {
    pub label: String,
    pub value: String,
}

/// A chat message ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Waiting(String),
    Notice(String),
    Question { html: String, buttons: Vec<String> },
    Finished(String),
    Failure(String),
}

/// Presenter for a Telegram chat. Engine calls only fill the buffers;
/// [`ChatScreen::take_outgoing`] turns them into messages.
#[derive(Debug, Clone, Default)]
pub struct ChatScreen {
    title: String,
    question_info: Vec<String>,
    content: String,
    answer_buttons: Vec<AnswerButton>,
    question_pending: bool,
    outbox: Vec<Outgoing>,
}

/// Open Trivia DB text is entity-encoded. Decode it, then escape only what
/// Telegram's HTML mode needs.
fn to_chat_html(raw: &str) -> String {
    encode_text(&decode_html_entities(raw)).into_owned()
}

fn to_plain(raw: &str) -> String {
    decode_html_entities(raw).into_owned()
}

impl ChatScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer_buttons(&self) -> &[AnswerButton] {
        &self.answer_buttons
    }

    /// Maps the text of a pressed button back to the raw answer.
    /// Telegram trims message text, so labels are compared trimmed.
    pub fn value_for(&self, label: &str) -> Option<&str> {
        let label = label.trim();
        self.answer_buttons
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.value.as_str())
    }

    pub fn take_outgoing(&mut self) -> Vec<Outgoing> {
        let mut out = mem::take(&mut self.outbox);
        if self.question_pending {
            self.question_pending = false;
            out.push(Outgoing::Question {
                html: self.render_question(),
                buttons: self.answer_buttons.iter().map(|b| b.label.clone()).collect(),
            });
        }
        out
    }

    fn render_question(&self) -> String {
        let mut html = format!("<b>{}</b>\n", self.title);
        for line in &self.question_info {
            html.push_str(&format!("<i>{}</i>\n", line));
        }
        html.push('\n');
        html.push_str(&self.content);
        html
    }
}

impl Presenter for ChatScreen {
    fn show_waiting(&mut self) {
        self.outbox.push(Outgoing::Waiting(WAITING_TEXT.to_string()));
    }

    fn show_question(&mut self, number: usize, category: &str, difficulty: &str, content_html: &str) {
        self.title = format!("Question {}", number);
        self.question_info = vec![
            format!("[Category] {}", to_chat_html(category)),
            format!("[Difficulty] {}", to_chat_html(difficulty)),
        ];
        self.content = to_chat_html(content_html);
        self.question_pending = true;
    }

    fn show_answer_choice(&mut self, text: &str) {
        self.answer_buttons.push(AnswerButton {
            label: to_plain(text).trim().to_string(),
            value: text.to_string(),
        });
    }

    fn show_verdict(&mut self, correct: bool, correct_answer: &str) {
        let text = if correct {
            "Correct!".to_string()
        } else {
            format!("Wrong! The answer was <b>{}</b>", to_chat_html(correct_answer))
        };
        self.outbox.push(Outgoing::Notice(text));
    }

    fn show_final_score(&mut self, correct_count: usize, total: usize) {
        self.outbox.push(Outgoing::Finished(format!(
            "<b>You answered {} of {} questions correctly!</b>\nWant another round? Tap the button below.",
            correct_count, total
        )));
    }

    fn show_failure(&mut self, message: &str) {
        self.outbox.push(Outgoing::Failure(format!(
            "Sorry, the quiz could not be loaded: {}",
            encode_text(message)
        )));
    }

    fn clear_previous_question_ui(&mut self) {
        self.title.clear();
        self.question_info.clear();
        self.content.clear();
        self.answer_buttons.clear();
        self.question_pending = false;
    }
}
