use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "vimaya")]
#[command(about = "Focus sessions and live friend presence for Vimaya")]
#[command(long_about = "vimaya - Focus sessions and live friend presence

Run a timed focus session from the terminal, earn XP for every focused
second, and watch which of your friends are focusing right now.

QUICK START:
  vimaya focus              Start a focus session (type 'end' to finish)
  vimaya friends active     Who is focusing right now
  vimaya friends live       Follow friends joining and leaving

AUTHENTICATION:
  Set VIMAYA_TOKEN, pass --token, or add api.token to ~/.vimaya/config.yaml

OUTPUT FORMATS:
  --output pretty    Human-readable colored output (default)
  --output json      Machine-readable JSON for scripting

For more information on a specific command, run:
  vimaya <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for human-readable colored output (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, default_value = "pretty", global = true)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug)
    ///
    /// Logs are written to stderr. RUST_LOG takes precedence when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// API root URL, overriding the config file
    #[arg(long, env = "VIMAYA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token, overriding the config file
    #[arg(long, env = "VIMAYA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable colored output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a focus session in the terminal
    ///
    /// The session counts one second at a time and earns XP for every
    /// counted second. Lifecycle phases can be typed on stdin, one per line,
    /// to simulate the app moving to the background and back.
    ///
    /// # Input
    ///
    ///   active        App is in the foreground
    ///   inactive      App is transitioning (e.g. screen about to lock)
    ///   background    App is no longer visible
    ///   end           End the session (EOF and Ctrl-C also end it)
    ///
    /// When the session ends, the time and XP are reported to the server.
    ///
    /// # Examples
    ///
    ///   vimaya focus
    ///   vimaya focus --goal 25
    ///   printf 'inactive\nbackground\nactive\nend\n' | vimaya focus
    #[command(alias = "f")]
    Focus(FocusArgs),

    /// See which friends are focusing
    ///
    /// # Subcommands
    ///
    ///   active   List friends in an active session
    ///   live     Follow friends joining and leaving until Ctrl-C
    ///
    /// # Examples
    ///
    ///   vimaya friends active
    ///   vimaya friends live --interval-ms 10000
    ///   vimaya friends live -o json | jq .
    Friends(FriendsArgs),

    /// Inspect configuration
    ///
    /// # Examples
    ///
    ///   vimaya config show
    ///   vimaya config path
    ///   vimaya config init
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct FocusArgs {
    /// Goal in minutes for the progress bar
    ///
    /// Defaults to focus.daily_goal_minutes from the config file.
    #[arg(short, long)]
    pub goal: Option<u32>,
}

#[derive(Args)]
pub struct FriendsArgs {
    #[command(subcommand)]
    pub command: FriendsCommands,
}

#[derive(Subcommand)]
pub enum FriendsCommands {
    /// List friends in an active focus session
    #[command(alias = "ls")]
    Active,

    /// Follow friends joining and leaving until Ctrl-C
    Live {
        /// Polling interval in milliseconds
        ///
        /// Defaults to presence.poll_interval_ms from the config file.
        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration (token redacted)
    Show,

    /// Print the config file location
    Path,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}
