use portal_core::Msg;

use super::constants::{CMD_CONNECT, CMD_HELP, CMD_INIT, CMD_INPUT, CMD_QUIT, CMD_SUBMIT};

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect,
    Initialize,
    /// Replace the draft link.
    Input(String),
    /// Submit the draft, optionally replacing it first.
    Submit(Option<String>),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Empty;
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            CMD_CONNECT => Command::Connect,
            CMD_INIT | "initialize" => Command::Initialize,
            CMD_INPUT => Command::Input(rest.to_string()),
            CMD_SUBMIT if rest.is_empty() => Command::Submit(None),
            CMD_SUBMIT => Command::Submit(Some(rest.to_string())),
            CMD_HELP | "?" => Command::Help,
            CMD_QUIT | "exit" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        }
    }

    /// Messages the command feeds into the state machine, in order.
    pub fn messages(&self) -> Vec<Msg> {
        match self {
            Command::Connect => vec![Msg::ConnectClicked],
            Command::Initialize => vec![Msg::InitializeClicked],
            Command::Input(text) => vec![Msg::InputChanged(text.clone())],
            Command::Submit(None) => vec![Msg::SubmitClicked],
            Command::Submit(Some(text)) => {
                vec![Msg::InputChanged(text.clone()), Msg::SubmitClicked]
            }
            Command::Help | Command::Quit | Command::Empty | Command::Unknown(_) => Vec::new(),
        }
    }
}
