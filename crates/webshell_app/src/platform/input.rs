use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

/// What the user can ask of the shell from the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum UserCommand {
    Back,
    Open(String),
    Reload,
    Pause,
    Resume,
    Status,
    Save,
    Rotate,
    Quit,
}

pub(crate) const HELP: &str =
    "commands: back | open <url> | reload | pause | resume | status | save | rotate | quit";

pub(crate) fn parse_command(line: &str) -> Option<UserCommand> {
    let mut parts = line.split_whitespace();
    let command = match parts.next()? {
        "back" | "b" => UserCommand::Back,
        "open" | "o" => UserCommand::Open(parts.next()?.to_string()),
        "reload" | "r" => UserCommand::Reload,
        "pause" => UserCommand::Pause,
        "resume" => UserCommand::Resume,
        "status" | "s" => UserCommand::Status,
        "save" => UserCommand::Save,
        "rotate" => UserCommand::Rotate,
        "quit" | "q" | "exit" => UserCommand::Quit,
        _ => return None,
    };
    Some(command)
}

/// Reads commands from stdin on a background thread. The channel closes when
/// stdin does.
pub(crate) fn spawn_stdin_reader() -> mpsc::Receiver<UserCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if line.trim().is_empty() {
                continue;
            }
            match parse_command(&line) {
                Some(command) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => eprintln!("{HELP}"),
            }
        }
    });
    rx
}

/// Next queued command, without blocking. A closed stdin reads as `Quit`.
pub(crate) fn poll_command(commands: &mpsc::Receiver<UserCommand>) -> Option<UserCommand> {
    match commands.try_recv() {
        Ok(command) => Some(command),
        Err(mpsc::TryRecvError::Empty) => None,
        Err(mpsc::TryRecvError::Disconnected) => Some(UserCommand::Quit),
    }
}
