use crate::cli::args::{Cli, Command, InitArgs};
use anyhow::Context;
use ballotwatch_core::config::{load_config, AppConfig};
use std::path::Path;

pub mod countdown;
pub mod list;
pub mod seed;
pub mod status;
pub mod watch;

pub mod exit_codes {
    pub const OK: i32 = 0;
    pub const GATE_FAILED: i32 = 1;
    pub const CONFIG_ERROR: i32 = 2;
}

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Status(args) => status::run(args).await,
        Command::List(args) => list::run(args).await,
        Command::Watch(args) => watch::run(args).await,
        Command::Countdown(args) => countdown::run(args).await,
        Command::Seed(args) => seed::run(args).await,
        Command::Init(args) => cmd_init(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_init(args: InitArgs) -> anyhow::Result<i32> {
    if args.config.exists() {
        eprintln!("{} already exists, leaving it alone", args.config.display());
    } else {
        ballotwatch_core::config::write_sample_config(&args.config)?;
        eprintln!("wrote {}", args.config.display());
    }

    if args.seed_example {
        let seed_path = args
            .config
            .parent()
            .unwrap_or(Path::new("."))
            .join("ballotwatch.seed.yaml");
        if seed_path.exists() {
            eprintln!("{} already exists, leaving it alone", seed_path.display());
        } else {
            std::fs::write(&seed_path, crate::templates::SEED_EXAMPLE)
                .with_context(|| format!("failed to write {}", seed_path.display()))?;
            eprintln!("wrote {}", seed_path.display());
        }
    }

    Ok(exit_codes::OK)
}

/// Load the app config when a path was given, defaults otherwise. Explicit
/// flags still win over whatever the file says; see the individual commands.
pub(crate) fn load_app_config(config: Option<&Path>) -> anyhow::Result<AppConfig> {
    match config {
        Some(path) => Ok(load_config(path, false)?),
        None => Ok(AppConfig::default()),
    }
}
