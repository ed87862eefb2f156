// src/control/commands.rs

//! Line-oriented operator commands read from stdin.

use std::io::BufRead;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::engine::RuntimeEvent;

/// Commands the operator can type while the supervisor runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorCommand {
    /// Restart the child now.
    Restart,
    /// Stop the child and exit.
    Shutdown,
    /// Print tool and session information.
    Info,
    /// Flip the tree output between JSON and plain text.
    ToggleFormat,
    /// Flip between reporting changed files and printing the full tree.
    ToggleTree,
    /// Print the command list.
    Help,
}

/// Map one input line to a command. Matching is case-insensitive and
/// ignores surrounding whitespace; anything unknown yields `None`.
pub fn parse_command(line: &str) -> Option<OperatorCommand> {
    let token = line.trim().to_ascii_lowercase();
    let command = match token.as_str() {
        "r" | "rs" | "restart" => OperatorCommand::Restart,
        "c" | "stop" | "exit" | "quit" => OperatorCommand::Shutdown,
        "dev" | "info" => OperatorCommand::Info,
        "toggle" => OperatorCommand::ToggleFormat,
        "seefiles" | "tree" => OperatorCommand::ToggleTree,
        "help" | "?" => OperatorCommand::Help,
        _ => return None,
    };
    Some(command)
}

/// Read commands from `input` on a dedicated thread and forward them as
/// `RuntimeEvent::Operator`.
///
/// A blocking thread is used instead of `tokio::io::stdin` so that a read
/// parked on the terminal never holds up runtime shutdown. The thread ends
/// on EOF, on a read error, or once the runtime has gone away; none of
/// these shut the supervisor down.
pub fn spawn_command_reader<R>(input: R, tx: mpsc::Sender<RuntimeEvent>) -> std::io::Result<()>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("syncserver-stdin".to_string())
        .spawn(move || read_commands(input, &tx))?;
    Ok(())
}

fn read_commands<R: BufRead>(input: R, tx: &mpsc::Sender<RuntimeEvent>) {
    for line in input.lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to read operator input; command reader stopped");
                return;
            }
        };

        let Some(command) = parse_command(&line) else {
            if !line.trim().is_empty() {
                trace!(input = %line.trim(), "unrecognized operator input");
            }
            continue;
        };

        if tx.blocking_send(RuntimeEvent::Operator(command)).is_err() {
            debug!("runtime gone; command reader stopped");
            return;
        }
    }
    debug!("operator input closed");
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn tokens_map_to_commands() {
        for (token, expected) in [
            ("r", OperatorCommand::Restart),
            ("rs", OperatorCommand::Restart),
            ("restart", OperatorCommand::Restart),
            ("c", OperatorCommand::Shutdown),
            ("stop", OperatorCommand::Shutdown),
            ("quit", OperatorCommand::Shutdown),
            ("dev", OperatorCommand::Info),
            ("toggle", OperatorCommand::ToggleFormat),
            ("seeFiles", OperatorCommand::ToggleTree),
            ("?", OperatorCommand::Help),
        ] {
            assert_eq!(parse_command(token), Some(expected), "token {token:?}");
        }
    }

    #[test]
    fn matching_trims_and_ignores_case() {
        assert_eq!(parse_command("  RS \r"), Some(OperatorCommand::Restart));
        assert_eq!(parse_command("\tExit"), Some(OperatorCommand::Shutdown));
    }

    #[test]
    fn unknown_and_blank_lines_are_ignored() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("   "), None);
        assert_eq!(parse_command("restart now"), None);
        assert_eq!(parse_command("rss"), None);
    }

    #[test]
    fn reader_forwards_known_commands_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        read_commands(Cursor::new("rs\nnonsense\n\ntoggle\nc\n"), &tx);
        drop(tx);

        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                RuntimeEvent::Operator(OperatorCommand::Restart),
                RuntimeEvent::Operator(OperatorCommand::ToggleFormat),
                RuntimeEvent::Operator(OperatorCommand::Shutdown),
            ]
        );
    }

    #[test]
    fn reader_stops_when_runtime_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        // Must return rather than block or panic.
        read_commands(Cursor::new("r\nr\nr\n"), &tx);
    }
}
