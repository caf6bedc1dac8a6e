use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ballotwatch",
    version,
    about = "Election countdown and real-time polling tracker"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    Status(StatusArgs),
    List(ListArgs),
    Watch(WatchArgs),
    Countdown(CountdownArgs),
    Seed(SeedArgs),
    Init(InitArgs),
    Version,
}

/// Check dataset completeness against the configured coverage floors.
#[derive(clap::Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

/// List elections, optionally filtered.
#[derive(clap::Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Party filter: "all" or an exact party name (case-insensitive)
    #[arg(long, default_value = "all")]
    pub party: String,

    /// State filter: "all" or a state code (case-insensitive)
    #[arg(long, default_value = "all")]
    pub state: String,

    /// Type filter: "all" or a substring of the type label
    #[arg(long = "type", default_value = "all")]
    pub election_type: String,

    /// Only elections dated now or later
    #[arg(long)]
    pub upcoming: bool,

    /// Bound for --upcoming
    #[arg(long, default_value_t = 50)]
    pub limit: u32,

    #[arg(long, default_value = "text")]
    pub format: String, // text|json
}

/// Stream real-time snapshots until interrupted.
#[derive(clap::Args, Debug, Clone)]
pub struct WatchArgs {
    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Poll interval override in milliseconds
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Snapshot size override
    #[arg(long)]
    pub limit: Option<u32>,
}

/// Run the countdown clock for one election (or an explicit target).
#[derive(clap::Args, Debug, Clone)]
pub struct CountdownArgs {
    /// Election id to count down to
    pub election_id: Option<String>,

    /// Explicit RFC 3339 target instead of an election id
    #[arg(long)]
    pub target: Option<String>,

    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Display mode: days|hours|minutes|seconds|milliseconds|all
    #[arg(long, default_value = "all")]
    pub unit: String,

    /// Redraw interval in milliseconds
    #[arg(long, default_value_t = 10)]
    pub tick_ms: u64,

    /// Render this many frames and exit (default: run until elapsed)
    #[arg(long)]
    pub frames: Option<u64>,
}

/// Upsert elections and candidates from a YAML file.
#[derive(clap::Args, Debug, Clone)]
pub struct SeedArgs {
    /// Seed file (see `ballotwatch init --seed-example`)
    pub file: PathBuf,

    #[arg(long)]
    pub db: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Write a sample configuration (and optionally a sample seed file).
#[derive(clap::Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value = "ballotwatch.yaml")]
    pub config: PathBuf,

    /// Also write ballotwatch.seed.yaml next to the config
    #[arg(long)]
    pub seed_example: bool,
}
