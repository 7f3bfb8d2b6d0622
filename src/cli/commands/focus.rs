//! Focus session command implementation.
//!
//! Runs one session in the terminal. Lifecycle phases are read from stdin so
//! the background and screen-lock handling can be exercised by hand.

use std::io::{BufRead, IsTerminal, Write};
use std::sync::Arc;

use chrono::Duration;
use colored::Colorize;
use tokio::signal;
use tokio::sync::mpsc;

use crate::api::HttpClient;
use crate::cli::args::{FocusArgs, OutputFormat};
use crate::config::Config;
use crate::core::SystemClock;
use crate::error::VimayaError;
use crate::features::focus::{FocusSession, LifecyclePhase, SessionOptions};
use crate::output::{format_status_line, format_summary};

/// A line typed while a session runs.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FocusInput {
    Phase(LifecyclePhase),
    End,
    Blank,
    Unknown(String),
}

impl FocusInput {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Blank;
        }
        if matches!(line.to_lowercase().as_str(), "end" | "stop" | "quit" | "q") {
            return Self::End;
        }
        LifecyclePhase::parse(line).map_or_else(|| Self::Unknown(line.to_string()), Self::Phase)
    }
}

/// Read stdin lines on a plain thread.
///
/// A blocking stdin read cannot be cancelled, so it must not hold up runtime
/// shutdown. The channel closes at EOF.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {e}");
                    break;
                },
            }
        }
    });
    rx
}

/// Execute the focus command.
///
/// # Errors
///
/// Returns an error if the API client cannot be built, or
/// `VimayaError::SaveFailed` if the session could not be fully reported.
pub async fn focus(
    config: &Config,
    args: FocusArgs,
    format: OutputFormat,
) -> Result<String, VimayaError> {
    let client = HttpClient::new(&config.api)?;
    let goal_minutes = args.goal.unwrap_or(config.focus.daily_goal_minutes);
    let goal = Duration::minutes(i64::from(goal_minutes));

    let (phase_tx, phase_rx) = mpsc::unbounded_channel();
    let session = FocusSession::start(
        Arc::new(client),
        Arc::new(SystemClock),
        phase_rx,
        SessionOptions::from(&config.focus),
    );

    let live = format == OutputFormat::Pretty && std::io::stdout().is_terminal();
    if format == OutputFormat::Pretty {
        eprintln!(
            "{}",
            "🎯 Focusing. Type active/inactive/background to change phase, 'end' to finish."
                .dimmed()
        );
    }

    let mut updates = session.subscribe();
    let mut input = spawn_stdin_reader();
    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            line = input.recv() => match line.as_deref().map(FocusInput::parse) {
                None | Some(FocusInput::End) => break,
                Some(FocusInput::Phase(phase)) => {
                    tracing::debug!(%phase, "lifecycle input");
                    if phase_tx.send(phase).is_err() {
                        break;
                    }
                },
                Some(FocusInput::Blank) => {},
                Some(FocusInput::Unknown(text)) => {
                    eprintln!("{} unknown input '{text}'", "?".yellow());
                },
            },
            changed = updates.changed(), if live => {
                if changed.is_err() {
                    break;
                }
                let snapshot = *updates.borrow_and_update();
                print!("\r{}   ", format_status_line(&snapshot, goal));
                let _ = std::io::stdout().flush();
            },
        }
    }

    if live {
        println!();
    }

    match session.end().await {
        Ok(summary) => format_summary(&summary, goal, true, format),
        Err(VimayaError::SaveFailed { summary }) => {
            println!("{}", format_summary(&summary, goal, false, format)?);
            Err(VimayaError::SaveFailed { summary })
        },
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_phases() {
        assert_eq!(
            FocusInput::parse("background"),
            FocusInput::Phase(LifecyclePhase::Background)
        );
        assert_eq!(
            FocusInput::parse("  Inactive "),
            FocusInput::Phase(LifecyclePhase::Inactive)
        );
        assert_eq!(FocusInput::parse("a"), FocusInput::Phase(LifecyclePhase::Active));
    }

    #[test]
    fn test_parse_end_and_blank() {
        assert_eq!(FocusInput::parse("end"), FocusInput::End);
        assert_eq!(FocusInput::parse("QUIT"), FocusInput::End);
        assert_eq!(FocusInput::parse("   "), FocusInput::Blank);
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            FocusInput::parse("sleep"),
            FocusInput::Unknown("sleep".to_string())
        );
    }
}
