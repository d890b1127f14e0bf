/// Rendering side of a quiz run. Text arrives raw, possibly with HTML
/// entities; decoding them is up to the implementation.
pub trait Presenter {
    fn show_waiting(&mut self);
    fn show_question(&mut self, number: usize, category: &str, difficulty: &str, content_html: &str);
    /// Called once per shuffled choice, in display order.
    fn show_answer_choice(&mut self, text: &str);
    fn show_verdict(&mut self, correct: bool, correct_answer: &str);
    fn show_final_score(&mut self, correct_count: usize, total: usize);
    fn show_failure(&mut self, message: &str);
    fn clear_previous_question_ui(&mut self);
}
