use crate::console::prompt::AnswerPrompt;
use crate::dispatch::Event;
use anyhow::Result;
use etap_engine::flow::Action;
use reedline::{Reedline, Signal};
use regex::Regex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(crate) mod prompt;

/// The console serves a single respondent.
const RESPONDENT: &str = "console";

enum Input {
    Exit,
    Action(Action),
}

/// Slash commands control the conversation; everything else is answer
/// input. Scale answers are typed as digits, boolean answers as
/// `true`/`false`, interview answers as plain text.
fn parse(command_regex: &Regex, line: &str) -> Option<Input> {
    if let Some(captures) = command_regex.captures(line) {
        let command = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
        return match command {
            "start" => Some(Input::Action(Action::Begin)),
            "interview" => Some(Input::Action(Action::StartInterview)),
            "done" => Some(Input::Action(Action::Finish)),
            "stop" => Some(Input::Action(Action::Stop)),
            "cancel" => Some(Input::Action(Action::Cancel)),
            "exit" => Some(Input::Exit),
            _ => {
                eprintln!("Unknown command {command}");
                None
            }
        };
    }
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<u8>() {
        return Some(Input::Action(Action::Scale(value)));
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Some(Input::Action(Action::Choice(true)));
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Some(Input::Action(Action::Choice(false)));
    }
    Some(Input::Action(Action::Text(trimmed.to_owned())))
}

/// Reads console input until `/exit` or Ctrl-C/D, feeding events to the
/// dispatcher. Cancels `shutdown` on the way out.
pub(crate) async fn run(events: mpsc::Sender<Event>, shutdown: CancellationToken) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = AnswerPrompt;
    let command_regex = Regex::new(r"^/(\w+)(?:\s+(.*))?$")?;

    println!("Напишите /start, чтобы начать диагностику. /exit — выход.");

    loop {
        let sig = line_editor.read_line(&prompt)?;
        match sig {
            Signal::Success(user_input) => {
                let Some(input) = parse(&command_regex, &user_input) else {
                    continue;
                };
                match input {
                    Input::Exit => {
                        println!("Exiting...");
                        break;
                    }
                    Input::Action(action) => {
                        if events
                            .send(Event {
                                respondent: RESPONDENT.to_owned(),
                                action,
                            })
                            .await
                            .is_err()
                        {
                            tracing::error!("dispatcher channel closed");
                            break;
                        }
                        // let the dispatcher print before the next prompt
                        tokio::task::yield_now().await;
                    }
                }
            }
            Signal::CtrlD | Signal::CtrlC => {
                println!("\nAborted!");
                break;
            }
        }
    }
    shutdown.cancel();
    Ok(())
}
