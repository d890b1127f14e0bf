mod config;
mod quiz;
mod screen;
mod trivia;

use std::sync::Arc;

use dotenv::dotenv;
use log::{debug, error, warn};
use quiz::{engine::QuizEngine, QuizError};
use screen::{ChatScreen, Outgoing};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup, KeyboardRemove, ParseMode},
};
use trivia::{OpenTriviaClient, QuestionSource};

type QuizDialogue = Dialogue<State, InMemStorage<State>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default)]
pub enum State {
    #[default]
    Start,
    Home,
    InQuiz {
        engine: QuizEngine<ChatScreen>,
    },
}

#[tokio::main]
async fn main() {
    if dotenv().is_err() {
        println!("No .env file found, using the environment as is");
    }

    pretty_env_logger::init();
    log::info!("Starting trivia bot...");

    let config = match config::Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };
    log::info!(
        "Questions come from {} ({} per quiz)",
        config.api_url,
        config.amount
    );

    let source: Arc<dyn QuestionSource> = Arc::new(OpenTriviaClient::from_config(&config));

    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Home].endpoint(home))
            .branch(dptree::case![State::InQuiz { engine }].endpoint(in_quiz)),
    )
    .dependencies(dptree::deps![InMemStorage::<State>::new(), config, source])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "Hi! I'm a trivia bot. I'll ask you a batch of questions and tell you how many you got right. Ready?";
const START_BUTTON: &str = "Start the quiz";
const RESTART_BUTTON: &str = "Play again";

fn start_keyboard(label: &str) -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(label)]])
}

async fn start(bot: Bot, dialogue: QuizDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(start_keyboard(START_BUTTON))
        .await?;

    dialogue.update(State::Home).await?;
    Ok(())
}

async fn home(
    bot: Bot,
    dialogue: QuizDialogue,
    msg: Message,
    config: Arc<config::Config>,
    source: Arc<dyn QuestionSource>,
) -> HandlerResult {
    match msg.text() {
        Some(START_BUTTON) | Some(RESTART_BUTTON) | Some("/start") => {}
        _ => {
            bot.send_message(msg.chat.id, "Tap the button below to start a quiz")
                .reply_markup(start_keyboard(START_BUTTON))
                .await?;
            return Ok(());
        }
    }

    // every run gets its own engine, so nothing carries over from the last one
    let mut engine = QuizEngine::new(ChatScreen::new());
    engine.start()?;
    deliver(&bot, msg.chat.id, engine.presenter_mut()).await?;

    let fetched = source.fetch(config.amount).await;
    let loaded = engine.finish_loading(fetched);
    let delivered = deliver(&bot, msg.chat.id, engine.presenter_mut()).await;

    if let Err(err) = &loaded {
        error!("Quiz for chat {} could not start: {}", msg.chat.id.0, err);
    }
    dialogue.update(state_after(engine)).await?;
    if let Err(err) = delivered {
        error!("Could not send the first question to chat {}: {}", msg.chat.id.0, err);
    }
    Ok(())
}

async fn in_quiz(
    bot: Bot,
    dialogue: QuizDialogue,
    mut engine: QuizEngine<ChatScreen>,
    msg: Message,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        bot.send_message(msg.chat.id, "Please pick one of the answers")
            .await?;
        return Ok(());
    };

    let Some(answer) = engine.presenter().value_for(text).map(str::to_string) else {
        debug!("Chat {} sent {:?}, which is not an answer button", msg.chat.id.0, text);
        bot.send_message(msg.chat.id, "Please pick one of the answers on the keyboard")
            .await?;
        return Ok(());
    };

    match engine.submit_answer(&answer) {
        Ok(()) => {}
        Err(QuizError::NotAwaitingAnswer) => {
            warn!("Chat {} answered while no question was open", msg.chat.id.0);
            dialogue.update(State::Home).await?;
            return Ok(());
        }
        Err(err) => error!("Quiz for chat {} broke off: {}", msg.chat.id.0, err),
    }
    let delivered = deliver(&bot, msg.chat.id, engine.presenter_mut()).await;

    // the engine has already moved on, so its state is kept even if sending failed
    dialogue.update(state_after(engine)).await?;
    if let Err(err) = delivered {
        error!("Could not send the quiz update to chat {}: {}", msg.chat.id.0, err);
    }
    Ok(())
}

/// Dialogue state that follows an engine call.
fn state_after(engine: QuizEngine<ChatScreen>) -> State {
    if engine.phase().is_over() {
        State::Home
    } else {
        State::InQuiz { engine }
    }
}

/// Sends whatever the engine rendered since the last call.
async fn deliver(bot: &Bot, chat_id: ChatId, screen: &mut ChatScreen) -> HandlerResult {
    for outgoing in screen.take_outgoing() {
        match outgoing {
            Outgoing::Waiting(text) => {
                // Only cosmetic, so a failed chat action is not worth aborting for
                let _ = bot.send_chat_action(chat_id, ChatAction::Typing).await;
                bot.send_message(chat_id, text)
                    .reply_markup(KeyboardRemove::new())
                    .await?;
            }
            Outgoing::Notice(html) => {
                bot.send_message(chat_id, html)
                    .parse_mode(ParseMode::Html)
                    .await?;
            }
            Outgoing::Question { html, buttons } => {
                bot.send_message(chat_id, html)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(KeyboardMarkup::new(
                        buttons
                            .into_iter()
                            .map(|b| vec![KeyboardButton::new(b)])
                            .collect::<Vec<_>>(),
                    ))
                    .await?;
            }
            Outgoing::Finished(html) | Outgoing::Failure(html) => {
                bot.send_message(chat_id, html)
                    .parse_mode(ParseMode::Html)
                    .reply_markup(start_keyboard(RESTART_BUTTON))
                    .await?;
            }
        }
    }
    Ok(())
}
