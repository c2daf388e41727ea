//! Headless simulator: plays seeded bot games and checks the engine's
//! bookkeeping at the end of each one.
//!
//! Environment:
//! - `RUST_LOG`: log filter (default `info`)
//! - `SETTLERS_CONFIG`: path to a JSON game configuration
//! - `SETTLERS_SEED`: seed of the first game, overriding the configuration
//! - `SETTLERS_GAMES`: number of games (default 1)
//! - `SETTLERS_MAX_ACTIONS`: action limit per game (default 20000)

use anyhow::Context;
use settlers_core::GameConfig;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod table;

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(value) => value.parse().with_context(|| format!("invalid {name}: {value}")),
        Err(_) => Ok(default),
    }
}

fn load_config() -> anyhow::Result<GameConfig> {
    let mut config = match std::env::var("SETTLERS_CONFIG") {
        Ok(path) => {
            let json = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read config {path}"))?;
            GameConfig::from_json(&json)?
        }
        Err(_) => GameConfig::default(),
    };
    config.seed = env_or("SETTLERS_SEED", config.seed)?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing; stdout carries the summaries
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config()?;
    let games: u64 = env_or("SETTLERS_GAMES", 1)?;
    let max_actions: usize = env_or("SETTLERS_MAX_ACTIONS", 20_000)?;

    info!(
        games,
        players = config.players,
        seed = config.seed,
        "Starting simulation..."
    );

    let mut wins = vec![0u32; config.players as usize];
    for i in 0..games {
        let game_config = GameConfig {
            seed: config.seed.wrapping_add(i),
            ..config.clone()
        };
        let summary = table::play_game(&game_config, max_actions)?;
        if let Some(winner) = summary.winner {
            wins[winner as usize] += 1;
        }
        println!("{}", serde_json::to_string(&summary)?);
    }

    info!(?wins, "simulation finished");
    Ok(())
}
