//! Clap derive structures for the `lumipoint` CLI.
//!
//! Kept free of workspace crates so `build.rs` can compile it for man pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// lumipoint -- control a nightlight outlet from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "lumipoint",
    version,
    about = "Monitor and control a lumipoint nightlight outlet",
    long_about = "Reads and writes the outlet's device state over HTTP.\n\n\
        `serve` runs the state gateway, either proxying to a real device-control\n\
        service or serving an in-memory mock device.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Device-state API base URL (overrides the config file)
    #[arg(long, short = 'a', env = "LUMIPOINT_API_BASE_URL", global = true)]
    pub api_base: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, env = "LUMIPOINT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "LUMIPOINT_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "LUMIPOINT_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain `key=value` lines (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the current device state
    #[command(alias = "st")]
    State,

    /// Write control settings immediately
    Set(SetArgs),

    /// Send a one-shot command to the outlet
    #[command(alias = "cmd")]
    Command(CommandArgs),

    /// Poll the device and print every change until interrupted
    Watch(WatchArgs),

    /// Run the device-state gateway
    Serve(ServeArgs),

    /// Inspect or create the config file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn is_on(self) -> bool {
        self == Self::On
    }
}

#[derive(Debug, Args)]
pub struct SetArgs {
    /// Night-light mode
    #[arg(long, short = 'n')]
    pub night_light: Option<Toggle>,

    /// LED brightness (0-255)
    #[arg(long, short = 'b', value_parser = clap::value_parser!(i64).range(0..=255))]
    pub brightness: Option<i64>,

    /// Auto-off delay, e.g. `30s`, `2m`, `5000ms`
    #[arg(long, short = 't')]
    pub off_timer: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DeviceCommand {
    /// Turn the LED on
    LedOn,
    /// Turn the LED off
    LedOff,
    /// Restart the outlet (asks for confirmation)
    Reboot,
}

#[derive(Debug, Args)]
pub struct CommandArgs {
    #[arg(value_enum)]
    pub action: DeviceCommand,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval in milliseconds (clamped to 1000-10000)
    #[arg(long, short = 'i')]
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Listen address (host:port)
    #[arg(long, short = 'l')]
    pub listen: Option<String>,

    /// Upstream device-control service; omit for mock mode
    #[arg(long, short = 'u')]
    pub upstream: Option<String>,

    /// Force mock mode even if an upstream is configured
    #[arg(long, conflicts_with = "upstream")]
    pub mock: bool,

    /// Reject malformed PATCH bodies with 400 (mock mode)
    #[arg(long)]
    pub strict_patch: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Create the config file interactively
    Init(ConfigInitArgs),
}

#[derive(Debug, Args)]
pub struct ConfigInitArgs {
    /// Overwrite an existing file without asking
    #[arg(long, short = 'f')]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
