//! Clap derive structures for the `danpark` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Kept free of non-clap dependencies so `build.rs` can include it for
//! man-page generation.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// danpark -- campus parking from the command line
#[derive(Debug, Parser)]
#[command(
    name = "danpark",
    version,
    about = "Find, watch, and claim campus parking from the command line",
    long_about = "A CLI client for the DanPark campus parking backend.\n\n\
        Lists the lot catalog with live occupancy pushed over SSE,\n\
        manages favorites and account settings, and records parking\n\
        events against your account.",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "DANPARK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, short = 's', env = "DANPARK_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "DANPARK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds (default: 30, or the profile value)
    #[arg(long, env = "DANPARK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Lot ordering for list output.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortOption {
    /// Nearest first
    Distance,
    /// Least congested first
    Congestion,
    /// Most free spaces first
    Free,
    /// Alphabetical by name
    Name,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store tokens in the system keyring
    Login(LoginArgs),

    /// Clear the stored login for the active profile
    Logout,

    /// Create a new account
    Signup(SignupArgs),

    /// Inspect parking lots and their live occupancy
    #[command(alias = "lot", alias = "l")]
    Lots(LotsArgs),

    /// Manage favorite lots
    #[command(alias = "fav", alias = "f")]
    Favorites(FavoritesArgs),

    /// Claim a parking spot (held until Ctrl-C)
    Park(ParkArgs),

    /// Show or update the account profile
    Me(MeArgs),

    /// Show or update app settings
    Settings(SettingsArgs),

    /// List recorded parking events
    History(HistoryArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  AUTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (default: profile email, else prompt)
    #[arg(long, short = 'e')]
    pub email: Option<String>,
}

#[derive(Debug, Args)]
pub struct SignupArgs {
    /// Account email
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Display name
    #[arg(long, short = 'n')]
    pub name: Option<String>,

    /// Student ID
    #[arg(long)]
    pub student_id: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LOTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LotsArgs {
    #[command(subcommand)]
    pub command: LotsCommand,
}

#[derive(Debug, Subcommand)]
pub enum LotsCommand {
    /// List parking lots
    #[command(alias = "ls")]
    List(LotListArgs),

    /// Show one lot in detail
    Show {
        /// Lot id or exact name
        lot: String,
    },

    /// Follow live occupancy updates until Ctrl-C
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
pub struct LotListArgs {
    /// Order lots by this key (stable; ties keep catalog order)
    #[arg(long, value_enum)]
    pub sort: Option<SortOption>,

    /// Case-insensitive name substring filter
    #[arg(long)]
    pub search: Option<String>,

    /// Only show favorite lots
    #[arg(long)]
    pub favorites: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only show updates for this lot (id or exact name)
    #[arg(long)]
    pub lot: Option<String>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  FAVORITES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct FavoritesArgs {
    #[command(subcommand)]
    pub command: FavoritesCommand,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesCommand {
    /// List favorite lots
    #[command(alias = "ls")]
    List,

    /// Mark a lot as favorite
    Add {
        /// Lot id or exact name
        lot: String,
    },

    /// Remove a lot from favorites
    #[command(alias = "rm")]
    Remove {
        /// Lot id or exact name
        lot: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PARK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ParkArgs {
    /// Lot id or exact name
    pub lot: String,

    /// Spot label, e.g. "B2-17"
    pub spot: String,

    /// Record the parking event and exit immediately instead of
    /// holding the spot until Ctrl-C
    #[arg(long)]
    pub no_wait: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MeArgs {
    #[command(subcommand)]
    pub command: MeCommand,
}

#[derive(Debug, Subcommand)]
pub enum MeCommand {
    /// Show the account profile
    Show,

    /// Update profile fields
    Update {
        /// New display name
        #[arg(long)]
        name: Option<String>,

        /// New department
        #[arg(long)]
        department: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show app settings
    Show,

    /// Set a settings value
    Set {
        /// Settings key: notifications, location, auto-refresh, theme
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Show at most this many entries (most recent first)
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Set a configuration value on the active profile
    Set {
        /// Config key: server, email, timeout, stream, reconnect_secs,
        /// access_token_env
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a login password in the system keyring
    SetPassword {
        /// Profile name
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
