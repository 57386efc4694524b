//! Euclid's game in the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Play the medium bot
//! euclid
//!
//! # Two players at one keyboard, saving on quit
//! euclid --mode local --save game.cbor
//!
//! # Resume a saved game against the expert bot, searching deeper
//! euclid --load game.cbor --depth 6
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use euclid_bot::SearchConfig;
use euclid_cli::{Driver, DriverConfig, SystemEnv};
use euclid_client::SessionConfig;
use euclid_core::{Difficulty, GameMode};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    /// Play against the bot
    Bot,
    /// Two players take turns at one terminal
    Local,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Medium,
    Expert,
}

/// Euclid's game
#[derive(Parser, Debug)]
#[command(name = "euclid")]
#[command(about = "Pick two numbers, add their difference, leave your opponent stuck")]
#[command(version)]
struct Args {
    /// Game mode
    #[arg(short, long, value_enum, default_value = "bot")]
    mode: ModeArg,

    /// Bot strength
    #[arg(short, long, value_enum, default_value = "medium")]
    difficulty: DifficultyArg,

    /// Seed for reproducible boards and bot choices
    #[arg(long)]
    seed: Option<u64>,

    /// Pause before each bot move, in milliseconds
    #[arg(long, default_value = "1000")]
    bot_delay_ms: u64,

    /// Expert search depth
    #[arg(long, default_value = "4")]
    depth: u32,

    /// Resume a saved game
    #[arg(long)]
    load: Option<PathBuf>,

    /// Save file used by `save` and on quit
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let env = args.seed.map_or_else(SystemEnv::new, SystemEnv::seeded);
    let bot_delay = Duration::from_millis(args.bot_delay_ms);
    let config = DriverConfig {
        mode: match args.mode {
            ModeArg::Bot => GameMode::SinglePlayerVsBot,
            ModeArg::Local => GameMode::LocalTwoPlayer,
        },
        difficulty: match args.difficulty {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Medium => Difficulty::Medium,
            DifficultyArg::Expert => Difficulty::Expert,
        },
        session: SessionConfig {
            search: SearchConfig { depth: args.depth, ..SearchConfig::default() },
            bot_delay,
            resume_bot_delay: bot_delay + bot_delay / 2,
            ..SessionConfig::default()
        },
        save_path: args.save,
    };
    tracing::info!(?config.mode, ?config.difficulty, "euclid starting");

    let mut driver = Driver::new(env, config);
    let mut stdout = tokio::io::stdout();
    driver.start(args.load, &mut stdout).await?;
    driver.run(BufReader::new(tokio::io::stdin()), &mut stdout).await?;

    Ok(())
}
