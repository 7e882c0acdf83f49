//! Parsing of typed lines into chat commands.

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// `/leave`: forget the identity and exit.
    Leave,
    /// `/bottom`: jump back to the newest messages.
    Bottom,
    /// `/up [N]`: scroll back N lines (a page when omitted).
    Up(Option<usize>),
    /// `/down [N]`: scroll forward N lines (a page when omitted).
    Down(Option<usize>),
    Help,
    /// Anything not starting with `/` is a chat line.
    Send(String),
    /// A `/command` that could not be parsed; carries the reason.
    Invalid(String),
}

impl Input {
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let Some(command) = line.trim_start().strip_prefix('/') else {
            return Self::Send(line.to_owned());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        if parts.next().is_some() {
            return Self::Invalid(format!("too many arguments for /{name}"));
        }

        match (name, arg) {
            ("leave" | "quit", None) => Self::Leave,
            ("bottom", None) => Self::Bottom,
            ("help", None) => Self::Help,
            ("up", arg) => parse_count(arg).map_or_else(Self::Invalid, Self::Up),
            ("down", arg) => parse_count(arg).map_or_else(Self::Invalid, Self::Down),
            ("leave" | "quit" | "bottom" | "help", Some(_)) => {
                Self::Invalid(format!("/{name} takes no arguments"))
            }
            _ => Self::Invalid(format!("unknown command: /{name}")),
        }
    }
}

fn parse_count(arg: Option<&str>) -> Result<Option<usize>, String> {
    match arg {
        None => Ok(None),
        Some(raw) => match raw.parse::<usize>() {
            Ok(0) | Err(_) => Err(format!("expected a positive line count, got `{raw}`")),
            Ok(n) => Ok(Some(n)),
        },
    }
}

pub const HELP: &str = "\
commands:
  /up [N]     scroll back N lines (default: one page)
  /down [N]   scroll forward N lines (default: one page)
  /bottom     jump to the newest messages
  /leave      forget your username and exit
anything else is sent to the room";
