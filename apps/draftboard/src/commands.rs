//! Line commands for the interactive front end.

use shared::domain::UiAction;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Idea(String),
    Refine(String),
    Finalize,
    New,
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "idea" => Ok(Command::Idea(rest.to_string())),
            "refine" => Ok(Command::Refine(rest.to_string())),
            "finalize" => Ok(Command::Finalize),
            "new" => Ok(Command::New),
            "show" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{other}'; try 'help'")),
        }
    }

    pub fn action(&self) -> Option<UiAction> {
        match self {
            Command::Idea(_) => Some(UiAction::SubmitIdea),
            Command::Refine(_) => Some(UiAction::Refine),
            Command::Finalize => Some(UiAction::Finalize),
            Command::New => Some(UiAction::StartNew),
            Command::Show | Command::Help | Command::Quit => None,
        }
    }
}

pub const HELP: &str = "\
commands:
  idea <text>     submit an idea and show the draft
  refine <text>   refine the current draft
  finalize        turn the draft into a blog post
  new             start over
  show            print the visible view
  quit            exit";
