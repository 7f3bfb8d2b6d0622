//! Friend presence command implementation.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tokio::sync::mpsc;

use crate::api::HttpClient;
use crate::cli::args::{FriendsCommands, OutputFormat};
use crate::config::Config;
use crate::core::{Clock, SystemClock};
use crate::error::VimayaError;
use crate::features::presence::{PresenceEvent, PresenceTracker};
use crate::output::{format_event, format_friends};

/// Execute friends subcommands.
///
/// # Errors
///
/// Returns an error if the API client cannot be built or the initial fetch
/// fails.
pub async fn friends(
    config: &Config,
    cmd: FriendsCommands,
    format: OutputFormat,
) -> Result<String, VimayaError> {
    let client = HttpClient::new(&config.api)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let tracker = PresenceTracker::new(Arc::new(client), Arc::clone(&clock));

    match cmd {
        FriendsCommands::Active => {
            let sessions = tracker.initialize().await?;
            format_friends(&sessions, clock.now(), format)
        },
        FriendsCommands::Live { interval_ms } => {
            let interval = interval_ms.map_or_else(
                || config.presence.poll_interval(),
                Duration::from_millis,
            );
            follow(&tracker, clock.as_ref(), interval, format).await
        },
    }
}

/// Print the current list, then every join and leave until Ctrl-C.
async fn follow(
    tracker: &PresenceTracker,
    clock: &dyn Clock,
    interval: Duration,
    format: OutputFormat,
) -> Result<String, VimayaError> {
    let sessions = tracker.initialize().await?;

    // JSON output is a stream of events, one per line.
    match format {
        OutputFormat::Pretty => println!("{}", format_friends(&sessions, clock.now(), format)?),
        OutputFormat::Json => {
            for session in sessions {
                println!("{}", format_event(&PresenceEvent::Joined(session), format)?);
            }
        },
    }

    let (event_tx, mut events) = mpsc::unbounded_channel();
    let join_tx = event_tx.clone();
    let joined = tracker.on_friend_joined(move |session| {
        let _ = join_tx.send(PresenceEvent::Joined(session.clone()));
    });
    let left = tracker.on_friend_left(move |friend| {
        let _ = event_tx.send(PresenceEvent::Left(friend.clone()));
    });

    tracker.start_polling(interval);

    let ctrl_c = signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Some(event) => println!("{}", format_event(&event, format)?),
                None => break,
            },
        }
    }

    joined.unsubscribe();
    left.unsubscribe();
    tracker.stop_polling();

    Ok(String::new())
}
