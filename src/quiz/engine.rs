use log::{debug, error, info, warn};
use rand::Rng;

use crate::quiz::bank::QuestionBank;
use crate::quiz::presenter::Presenter;
use crate::quiz::{Question, QuizError};
use crate::trivia::QuestionSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Presenting(usize),
    AwaitingAnswer(usize),
    Finished,
    Failed,
}

impl Phase {
    /// `Finished` and `Failed` end a run; only a new start leaves them.
    pub fn is_over(&self) -> bool {
        matches!(self, Phase::Finished | Phase::Failed)
    }
}

/// Drives one quiz at a time: load, present each question in order,
/// tally answers, report the score.
#[derive(Debug, Clone)]
pub struct QuizEngine<P> {
    presenter: P,
    bank: QuestionBank,
    phase: Phase,
    current: usize,
    terminal: usize,
}

impl<P: Presenter> QuizEngine<P> {
    pub fn new(presenter: P) -> Self {
        Self {
            presenter,
            bank: QuestionBank::new(),
            phase: Phase::Idle,
            current: 0,
            terminal: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn correct_count(&self) -> usize {
        self.bank.correct_count()
    }

    pub fn question_count(&self) -> usize {
        self.bank.len()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    /// The start signal. Resets the run and enters `Loading`; the caller
    /// performs the fetch and hands the outcome to [`Self::finish_loading`].
    pub fn start(&mut self) -> Result<(), QuizError> {
        match self.phase {
            Phase::Idle | Phase::Finished | Phase::Failed => {}
            Phase::Loading | Phase::Presenting(_) | Phase::AwaitingAnswer(_) => {
                warn!("start ignored, engine is in {:?}", self.phase);
                return Err(QuizError::AlreadyRunning);
            }
        }

        self.bank = QuestionBank::new();
        self.current = 0;
        self.terminal = 0;
        self.phase = Phase::Loading;
        self.presenter.show_waiting();
        Ok(())
    }

    /// Continuation of the fetch issued after [`Self::start`].
    pub fn finish_loading(&mut self, fetched: Result<Vec<Question>, QuizError>) -> Result<(), QuizError> {
        if self.phase != Phase::Loading {
            warn!("fetch result arrived while in {:?}, dropping it", self.phase);
            return Err(QuizError::AlreadyRunning);
        }

        let loaded = fetched.and_then(|questions| self.bank.load(questions));
        if let Err(err) = loaded {
            return Err(self.fail(err));
        }

        self.terminal = self.bank.len() - 1;
        info!("quiz loaded with {} questions", self.bank.len());
        self.present()
    }

    /// Convenience for callers that don't need to render between the
    /// start signal and the fetch.
    pub async fn start_with<S>(&mut self, source: &S, amount: u8) -> Result<(), QuizError>
    where
        S: QuestionSource + ?Sized,
    {
        self.start()?;
        let fetched = source.fetch(amount).await;
        self.finish_loading(fetched)
    }

    /// The answer signal. Only accepted in `AwaitingAnswer`.
    pub fn submit_answer(&mut self, answer: &str) -> Result<(), QuizError> {
        let index = match self.phase {
            Phase::AwaitingAnswer(index) => index,
            other => {
                warn!("answer {:?} ignored, engine is in {:?}", answer, other);
                return Err(QuizError::NotAwaitingAnswer);
            }
        };

        let is_correct = match self.bank.record_answer(index, answer) {
            Ok(is_correct) => is_correct,
            Err(err) => return Err(self.fail(err)),
        };
        match self.bank.get(index) {
            Ok(question) => self.presenter.show_verdict(is_correct, question.correct_answer()),
            Err(err) => return Err(self.fail(err)),
        }

        self.current += 1;
        if self.current > self.terminal {
            self.phase = Phase::Finished;
            self.presenter.clear_previous_question_ui();
            self.presenter
                .show_final_score(self.bank.correct_count(), self.bank.len());
            info!(
                "quiz finished with {}/{} correct",
                self.bank.correct_count(),
                self.bank.len()
            );
            return Ok(());
        }
        self.present()
    }

    fn present(&mut self) -> Result<(), QuizError> {
        let index = self.current;
        self.phase = Phase::Presenting(index);

        let question = match self.bank.get(index) {
            Ok(question) => question,
            Err(err) => return Err(self.fail(err)),
        };
        debug!("presenting question {} of {}", index + 1, self.bank.len());

        self.presenter.clear_previous_question_ui();
        self.presenter.show_question(
            index + 1,
            question.category(),
            question.difficulty().as_str(),
            question.text(),
        );
        for choice in shuffle_choices(question, &mut rand::thread_rng()) {
            self.presenter.show_answer_choice(&choice);
        }

        self.phase = Phase::AwaitingAnswer(index);
        Ok(())
    }

    fn fail(&mut self, err: QuizError) -> QuizError {
        error!("quiz run failed: {}", err);
        self.phase = Phase::Failed;
        self.presenter.show_failure(&err.to_string());
        err
    }
}

/// Removal-based Fisher-Yates: draw a uniform index from what is left,
/// take that choice out, repeat. Built fresh on every call.
pub fn shuffle_choices<R: Rng + ?Sized>(question: &Question, rng: &mut R) -> Vec<String> {
    let mut pool: Vec<&str> = question
        .incorrect_answers()
        .iter()
        .map(String::as_str)
        .collect();
    pool.push(question.correct_answer());

    let mut shuffled = Vec::with_capacity(pool.len());
    for remaining in (1..=pool.len()).rev() {
        let picked = pool.remove(rng.gen_range(0..remaining));
        shuffled.push(picked.to_string());
    }
    shuffled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::fixtures;
    use crate::quiz::presenter::recording::{RecordingPresenter, Shown};
    use async_trait::async_trait;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    struct CannedSource(Vec<Question>);

    #[async_trait]
    impl QuestionSource for CannedSource {
        async fn fetch(&self, _amount: u8) -> Result<Vec<Question>, QuizError> {
            Ok(self.0.clone())
        }
    }

    struct RejectingSource;

    #[async_trait]
    impl QuestionSource for RejectingSource {
        async fn fetch(&self, _amount: u8) -> Result<Vec<Question>, QuizError> {
            Err(QuizError::FetchStatus(503))
        }
    }

    fn sorted(mut v: Vec<String>) -> Vec<String> {
        v.sort();
        v
    }

    fn loaded_engine(questions: Vec<Question>) -> QuizEngine<RecordingPresenter> {
        let mut engine = QuizEngine::new(RecordingPresenter::default());
        engine.start().unwrap();
        engine.finish_loading(Ok(questions)).unwrap();
        engine
    }

    #[test]
    fn shuffle_keeps_every_choice() {
        let question = fixtures::capital_of_france();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..50 {
            let shuffled = shuffle_choices(&question, &mut rng);
            assert_eq!(
                sorted(shuffled),
                vec!["Lyon", "Marseille", "Nice", "Paris"]
            );
        }
    }

    #[test]
    fn shuffle_spreads_every_answer_over_every_slot() {
        let question = fixtures::capital_of_france();
        let answers = ["Lyon", "Marseille", "Nice", "Paris"];
        let mut rng = StdRng::seed_from_u64(42);
        let trials = 8000;
        // tally[answer][position]
        let mut tally = [[0usize; 4]; 4];

        for _ in 0..trials {
            let shuffled = shuffle_choices(&question, &mut rng);
            for (position, choice) in shuffled.iter().enumerate() {
                let answer = answers.iter().position(|a| a == choice).unwrap();
                tally[answer][position] += 1;
            }
        }

        // expected 2000 per cell
        for (answer, row) in tally.iter().enumerate() {
            for count in row {
                assert!(
                    (1700..=2300).contains(count),
                    "{} is skewed: {:?}",
                    answers[answer],
                    row
                );
            }
        }
    }

    #[test]
    fn start_shows_waiting_and_enters_loading() {
        let mut engine = QuizEngine::new(RecordingPresenter::default());
        engine.start().unwrap();

        assert_eq!(engine.phase(), Phase::Loading);
        assert_eq!(engine.presenter().shown, vec![Shown::Waiting]);
    }

    #[test]
    fn loading_presents_first_question() {
        let engine = loaded_engine(vec![fixtures::sun_is_a_star()]);

        assert_eq!(engine.phase(), Phase::AwaitingAnswer(0));
        let shown = &engine.presenter().shown;
        assert_eq!(
            shown[2],
            Shown::Question {
                number: 1,
                category: "Science &amp; Nature".to_string(),
                difficulty: "medium".to_string(),
                content: "The &quot;Sun&quot; is a star.".to_string(),
            }
        );
        assert_eq!(
            sorted(engine.presenter().last_choices()),
            vec!["False", "True"]
        );
    }

    #[test]
    fn visits_every_question_once_in_order() {
        let questions = vec![
            fixtures::capital_of_france(),
            fixtures::sun_is_a_star(),
            fixtures::capital_of_france(),
        ];
        let mut engine = loaded_engine(questions);

        for expected in 0..3 {
            assert_eq!(engine.phase(), Phase::AwaitingAnswer(expected));
            assert_eq!(engine.current_index(), expected);
            engine.submit_answer("whatever").unwrap();
        }

        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.current_index(), 3);
        assert_eq!(engine.presenter().question_numbers(), vec![1, 2, 3]);
    }

    #[test]
    fn correct_then_wrong_scores_one() {
        let mut engine = loaded_engine(vec![fixtures::capital_of_france(), fixtures::sun_is_a_star()]);

        engine.submit_answer("Paris").unwrap();
        engine.submit_answer("False").unwrap();

        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.correct_count(), 1);
        assert_eq!(engine.presenter().final_scores(), vec![(1, 2)]);
    }

    #[test]
    fn single_question_finishes_after_one_answer() {
        let mut engine = loaded_engine(vec![fixtures::sun_is_a_star()]);

        engine.submit_answer("True").unwrap();

        assert_eq!(engine.phase(), Phase::Finished);
        assert_eq!(engine.presenter().final_scores(), vec![(1, 1)]);
        assert_eq!(engine.presenter().question_numbers(), vec![1]);
    }

    #[test]
    fn empty_fetch_fails_without_presenting() {
        let mut engine = QuizEngine::new(RecordingPresenter::default());
        engine.start().unwrap();

        let result = engine.finish_loading(Ok(vec![]));

        assert!(matches!(result, Err(QuizError::EmptyQuestionSet)));
        assert_eq!(engine.phase(), Phase::Failed);
        assert!(engine.presenter().question_numbers().is_empty());
    }

    #[tokio::test]
    async fn rejected_fetch_fails_with_zero_score() {
        let mut engine = QuizEngine::new(RecordingPresenter::default());

        let result = engine.start_with(&RejectingSource, 10).await;

        assert!(matches!(result, Err(QuizError::FetchStatus(503))));
        assert_eq!(engine.phase(), Phase::Failed);
        assert_eq!(engine.correct_count(), 0);
        assert!(engine.presenter().question_numbers().is_empty());
        assert!(matches!(
            engine.presenter().shown.last(),
            Some(Shown::Failure(_))
        ));
    }

    #[tokio::test]
    async fn restart_after_finish_resets_the_tally() {
        let source = CannedSource(vec![fixtures::capital_of_france()]);
        let mut engine = QuizEngine::new(RecordingPresenter::default());

        engine.start_with(&source, 1).await.unwrap();
        engine.submit_answer("Paris").unwrap();
        assert_eq!(engine.correct_count(), 1);

        engine.start_with(&source, 1).await.unwrap();

        assert_eq!(engine.phase(), Phase::AwaitingAnswer(0));
        assert_eq!(engine.current_index(), 0);
        assert_eq!(engine.correct_count(), 0);
    }

    #[test]
    fn answers_outside_awaiting_are_rejected() {
        let mut engine = QuizEngine::new(RecordingPresenter::default());
        assert!(matches!(
            engine.submit_answer("Paris"),
            Err(QuizError::NotAwaitingAnswer)
        ));

        engine.start().unwrap();
        assert!(matches!(
            engine.submit_answer("Paris"),
            Err(QuizError::NotAwaitingAnswer)
        ));
        assert_eq!(engine.phase(), Phase::Loading);

        engine.finish_loading(Ok(vec![fixtures::capital_of_france()])).unwrap();
        engine.submit_answer("Paris").unwrap();
        assert!(matches!(
            engine.submit_answer("Paris"),
            Err(QuizError::NotAwaitingAnswer)
        ));
        assert_eq!(engine.correct_count(), 1);
    }

    #[test]
    fn start_during_a_run_is_rejected() {
        let mut engine = loaded_engine(vec![fixtures::capital_of_france()]);

        assert!(matches!(engine.start(), Err(QuizError::AlreadyRunning)));
        assert_eq!(engine.phase(), Phase::AwaitingAnswer(0));
    }

    #[test]
    fn stale_fetch_result_is_dropped() {
        let mut engine = loaded_engine(vec![fixtures::capital_of_france()]);

        let result = engine.finish_loading(Ok(vec![fixtures::sun_is_a_star()]));

        assert!(result.is_err());
        assert_eq!(engine.question_count(), 1);
        assert_eq!(engine.phase(), Phase::AwaitingAnswer(0));
    }

    #[test]
    fn each_presentation_is_preceded_by_a_clear() {
        let mut engine = loaded_engine(vec![fixtures::capital_of_france(), fixtures::sun_is_a_star()]);
        engine.submit_answer("Paris").unwrap();

        let shown = &engine.presenter().shown;
        for (i, s) in shown.iter().enumerate() {
            if matches!(s, Shown::Question { .. }) {
                assert_eq!(shown[i - 1], Shown::Cleared);
            }
        }
        assert_eq!(engine.presenter().question_numbers(), vec![1, 2]);
    }
}
