//! Line input for the interactive dashboard.

use std::io::BufRead;

use tokio::sync::mpsc;
use weatherdash_core::{Command, Submission};

pub const HELP: &str = "\
Commands:
  search <city>   show weather for a city (or just type `s <city>`)
  here            show weather for the configured location
  unit            toggle between °C and °F
  auto on|off     resume or pause auto-refresh
  fav             add the displayed city to favorites
  fav <n>         show favorite number n
  rm <n>          remove favorite number n
  status          show weather, favorites and countdown
  help            show this list
  quit            exit";

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    Help,
    Empty,
}

pub fn parse_line(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match (word.to_lowercase().as_str(), rest) {
        ("", _) => return Ok(Input::Empty),
        ("help" | "?", _) => return Ok(Input::Help),
        ("search" | "s", "") => return Err("Usage: search <city>".to_string()),
        ("search" | "s", city) => Command::Search(city.to_string()),
        ("here" | "location", _) => Command::UseLocation,
        ("unit" | "u", _) => Command::ToggleUnit,
        ("auto", "on") => Command::SetAutoRefresh(true),
        ("auto", "off") => Command::SetAutoRefresh(false),
        ("auto", _) => return Err("Usage: auto on|off".to_string()),
        ("fav", "" | "add") => Command::AddFavorite,
        ("fav", n) => Command::SelectFavorite(position(n)?),
        ("rm", n) => Command::RemoveFavorite(position(n)?),
        ("status", _) => Command::ShowStatus,
        ("quit" | "q" | "exit", _) => Command::Quit,
        (other, _) => return Err(format!("Unknown command '{other}'. Type `help` for a list.")),
    };

    Ok(Input::Command(command))
}

/// 1-based position as shown in the favorites list → index.
fn position(text: &str) -> Result<usize, String> {
    match text.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("'{text}' is not a favorite number")),
    }
}

/// Read stdin on a dedicated thread and forward parsed commands.
///
/// Each command is acknowledged by the dashboard before the next line is read,
/// so prompts raised while handling it (remove confirmation) own the terminal.
pub fn spawn_reader() -> mpsc::UnboundedReceiver<Submission> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut lines = stdin.lock().lines();

        loop {
            let command = match lines.next() {
                Some(Ok(line)) => match parse_line(&line) {
                    Ok(Input::Command(command)) => command,
                    Ok(Input::Help) => {
                        println!("{HELP}");
                        continue;
                    }
                    Ok(Input::Empty) => continue,
                    Err(message) => {
                        println!("{message}");
                        continue;
                    }
                },
                Some(Err(e)) => {
                    tracing::warn!("failed to read input: {e}");
                    Command::Quit
                }
                None => Command::Quit,
            };

            let quit = command == Command::Quit;
            let (submission, handled) = Submission::with_ack(command);
            if tx.send(submission).is_err() || quit {
                break;
            }

            // Drop the stdin lock while the dashboard may prompt.
            drop(lines);
            if handled.blocking_recv().is_err() {
                break;
            }
            lines = stdin.lock().lines();
        }
    });

    rx
}
