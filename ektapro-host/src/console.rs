//! Line-oriented operator console

use std::io::BufRead;
use std::str::FromStr;
use std::sync::mpsc;
use std::thread;

use thiserror::Error;

pub const HELP: &str = "\
Commands:
  list                 connected projectors
  select <n>           make projector n active
  init                 home every projector (standby off, slide 1, dark)
  next | prev          change slide, fading as configured
  start                start the slideshow
  pause | resume       freeze or continue the slideshow and fades
  stop                 stop the slideshow and home every projector
  brightness <0-100>   set the active projector's lamp
  goto <slide>         move the active projector's tray
  sync                 read tray positions back from every projector
  standby              toggle standby on every projector
  cycle on|off         dissolve between projectors instead of fading one
  fade <0-59>          fade duration in seconds
  interval <1-59>      slideshow interval in seconds
  hex <b0 b1 b2>       describe a raw 3-byte command
  reconnect            close every link and probe again
  help                 this text
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    List,
    Select(usize),
    Init,
    Next,
    Prev,
    Start,
    Pause,
    Resume,
    Stop,
    Brightness(u8),
    Goto(u16),
    Sync,
    Standby,
    Cycle(bool),
    Fade(u8),
    Interval(u8),
    Hex(String),
    Reconnect,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unknown command `{0}`, try `help`")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid argument `{0}`")]
    InvalidArgument(String),
}

fn number<T: FromStr>(arg: Option<&str>, command: &'static str) -> Result<T, ParseError> {
    let arg = arg.ok_or(ParseError::MissingArgument(command))?;
    arg.parse()
        .map_err(|_| ParseError::InvalidArgument(arg.to_string()))
}

impl FromStr for ConsoleCommand {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, ParseError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = Some(rest).filter(|rest| !rest.is_empty());

        Ok(match word.to_ascii_lowercase().as_str() {
            "list" | "ls" => ConsoleCommand::List,
            "select" => ConsoleCommand::Select(number(arg, "select")?),
            "init" => ConsoleCommand::Init,
            "next" | "n" => ConsoleCommand::Next,
            "prev" | "p" => ConsoleCommand::Prev,
            "start" => ConsoleCommand::Start,
            "pause" => ConsoleCommand::Pause,
            "resume" => ConsoleCommand::Resume,
            "stop" => ConsoleCommand::Stop,
            "brightness" => ConsoleCommand::Brightness(number(arg, "brightness")?),
            "goto" => ConsoleCommand::Goto(number(arg, "goto")?),
            "sync" => ConsoleCommand::Sync,
            "standby" => ConsoleCommand::Standby,
            "cycle" => match arg {
                Some("on") => ConsoleCommand::Cycle(true),
                Some("off") => ConsoleCommand::Cycle(false),
                Some(other) => return Err(ParseError::InvalidArgument(other.to_string())),
                None => return Err(ParseError::MissingArgument("cycle")),
            },
            "fade" => ConsoleCommand::Fade(number(arg, "fade")?),
            "interval" => ConsoleCommand::Interval(number(arg, "interval")?),
            "hex" => ConsoleCommand::Hex(
                arg.ok_or(ParseError::MissingArgument("hex"))?
                    .to_string(),
            ),
            "reconnect" => ConsoleCommand::Reconnect,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" | "q" => ConsoleCommand::Quit,
            _ => return Err(ParseError::Unknown(word.to_string())),
        })
    }
}

/// Forward stdin lines to a channel from a background thread
///
/// The channel disconnects when stdin closes.
pub fn spawn_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
